//! Checked-in protobuf and tonic code for the ToDo API.
//!
//! The sources under `generated/` are produced from `proto/todo/v1/todo.proto`
//! with prost-build and tonic-prost-build and must not be edited by hand.

pub mod todo {
    pub mod v1 {
        include!("generated/todo/v1/todo.v1.rs");
        include!("generated/todo/v1/todo.v1.tonic.rs");
    }
}
