//! Kaspad Protocol Types
//!
//! Request/response envelopes for the node's RPC interface. Each envelope is
//! a closed sum type with one variant per operation, serialized as an
//! externally tagged camelCase JSON object.

pub mod error;
pub mod model;
pub mod request;
pub mod response;

pub use error::RpcError;
pub use model::*;
pub use request::*;
pub use response::*;
