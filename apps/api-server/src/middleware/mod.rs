//! Middleware modules.

pub mod error;
pub mod global;
pub mod identity;
pub mod rate_limit;
