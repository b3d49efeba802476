//! # Gatekeeper Shared
//!
//! Wire formats shared between the server and API clients.

pub mod response;

pub use response::{codes, ApiResponse, ErrorBody, ErrorResponse};
