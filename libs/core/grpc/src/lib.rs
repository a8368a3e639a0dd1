//! # gRPC Support Library
//!
//! Shared gRPC plumbing for the ToDo server and its clients.
//!
//! - **Channels**: tuned HTTP/2 channel construction for clients (`create_channel*`)
//! - **Server**: environment-driven server config, health reporting, startup logs,
//!   and `grpc-timeout` deadline parsing
//! - **Interceptors**: request-id propagation (`TracingInterceptor`)
//! - **Conversions**: `google.protobuf.Timestamp` ↔ `chrono::DateTime<Utc>` with
//!   range and nanosecond validation
//!
//! ## Quick Start
//!
//! ```ignore
//! use grpc_client::{create_channel_lazy, TracingInterceptor};
//! use rpc::todo::v1::to_do_service_client::ToDoServiceClient;
//!
//! let channel = create_channel_lazy("http://127.0.0.1:50051")?;
//! let client = ToDoServiceClient::with_interceptor(channel, TracingInterceptor::new());
//! ```

pub mod channel;
pub mod conversions;
pub mod error;
pub mod interceptors;
pub mod server;

pub use channel::{
    ChannelConfig, create_channel, create_channel_lazy, create_channel_lazy_with_config,
    create_channel_with_config,
};
pub use conversions::{TimestampError, datetime_to_timestamp, timestamp_to_datetime};
pub use error::{GrpcError, GrpcResult};
pub use interceptors::{REQUEST_ID_HEADER, TracingInterceptor};
