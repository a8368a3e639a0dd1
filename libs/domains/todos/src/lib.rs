//! ToDo Domain
//!
//! CRUD over a single ToDo entity, shared by the gRPC server and the
//! HTTP/JSON gateway.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌─────────────────┐
//! │ gRPC ToDoService │   │  HTTP gateway   │  ← transport bindings
//! └────────┬─────────┘   └────────┬────────┘
//!          │                      │ (forwards over gRPC)
//! ┌────────▼─────────┐            │
//! │   ToDoService    │  ◄─────────┘  ← version check, timestamp validation,
//! └────────┬─────────┘                  completion rule, error taxonomy
//!          │
//! ┌────────▼─────────┐
//! │ ConnectionProvider│  ← one connection per call (PostgreSQL or in-memory)
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_todos::{CallContext, PgConnectionProvider, ToDoService};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//! let service = ToDoService::new(PgConnectionProvider::new(db));
//!
//! let todos = service.read_all(&CallContext::new(), "v1").await?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod service;
pub mod store;

pub use context::CallContext;
pub use error::{ToDoError, ToDoResult};
pub use handlers::{GatewayClient, ToDoApiDoc, gateway_router};
pub use memory::{InMemoryProvider, MemoryStats};
pub use models::{API_VERSION, COMPLETED_STATUS, NewToDoRecord, ToDo, ToDoRecord, completion_time};
pub use postgres::PgConnectionProvider;
pub use service::ToDoService;
pub use store::{ConnectionProvider, ExecOutcome, StoreConnection, StoreError};
