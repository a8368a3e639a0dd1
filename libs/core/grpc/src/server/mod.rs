//! gRPC server utilities: configuration, health reporting and deadlines.

mod builder;
mod config;
mod deadline;

pub use builder::{GrpcServer, create_health_service};
pub use config::ServerConfig;
pub use deadline::{GRPC_TIMEOUT_HEADER, parse_grpc_timeout, request_timeout};
