//! ToDo server: `v1.ToDoService` over gRPC plus an HTTP/JSON gateway that
//! forwards to it, both backed by PostgreSQL.
//!
//! Configuration comes from the environment (see [`config::Config`]).

pub mod config;
pub mod server;
pub mod service;

pub use server::{ApiDoc, ready_router, run, todo_grpc_service};
pub use service::ToDoServiceImpl;
