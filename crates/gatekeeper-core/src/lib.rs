//! # Gatekeeper Core
//!
//! The domain layer of the Gatekeeper rate-limiting subsystem.
//! This crate contains policies, decisions, and port definitions with zero
//! infrastructure dependencies.

pub mod decision;
pub mod error;
pub mod policy;
pub mod ports;

pub use decision::Decision;
pub use error::{RateLimitError, StoreError};
pub use policy::{AlgorithmKind, PolicyName, RateLimitPolicy, Scope};
