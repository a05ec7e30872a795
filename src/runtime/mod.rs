//! # Runtime
//!
//! Start-up and watch-loop plumbing for the operator binary.
//!
//! - `initialization.rs` - rustls, tracing, metrics, HTTP server and Kubernetes client
//! - `error_policy.rs` - what the controller does after a failed reconciliation

pub mod error_policy;
pub mod initialization;

pub use error_policy::{handle_reconciliation_error, requeue_after_error};
pub use initialization::{initialize, InitializationResult};
