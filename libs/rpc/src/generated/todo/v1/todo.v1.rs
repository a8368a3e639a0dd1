// @generated
// This file is @generated by prost-build.
/// A single ToDo item.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ToDo {
    /// Assigned by the store on create
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub title: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub description: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "4")]
    pub reminder: ::core::option::Option<::prost_types::Timestamp>,
    /// Free-form status; "Completed" stamps actualTimeOfCompletion
    #[prost(string, tag = "5")]
    pub status: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "6")]
    pub estimated_time_of_completion: ::core::option::Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "7")]
    pub actual_time_of_completion: ::core::option::Option<::prost_types::Timestamp>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateRequest {
    /// API version; empty means the server's current version
    #[prost(string, tag = "1")]
    pub api: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub to_do: ::core::option::Option<ToDo>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateResponse {
    #[prost(string, tag = "1")]
    pub api: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub id: i64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRequest {
    #[prost(string, tag = "1")]
    pub api: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub id: i64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadResponse {
    #[prost(string, tag = "1")]
    pub api: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub to_do: ::core::option::Option<ToDo>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateRequest {
    #[prost(string, tag = "1")]
    pub api: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub to_do: ::core::option::Option<ToDo>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateResponse {
    #[prost(string, tag = "1")]
    pub api: ::prost::alloc::string::String,
    /// Rows updated
    #[prost(int64, tag = "2")]
    pub updated: i64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteRequest {
    #[prost(string, tag = "1")]
    pub api: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub id: i64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteResponse {
    #[prost(string, tag = "1")]
    pub api: ::prost::alloc::string::String,
    /// Rows deleted
    #[prost(int64, tag = "2")]
    pub deleted: i64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadAllRequest {
    #[prost(string, tag = "1")]
    pub api: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadAllResponse {
    #[prost(string, tag = "1")]
    pub api: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub to_dos: ::prost::alloc::vec::Vec<ToDo>,
}
