//! # Custom Resource Definitions
//!
//! CRD types for the Shoplift operator.
//!
//! ## Module Structure
//!
//! - `spec.rs` - The `Client` resource (`shoplift.example.com/v1`)
//! - `status.rs` - Status types tracking the dependent workload set

mod spec;
mod status;

pub use spec::{ClientResource, ClientSpec};
pub use status::{ClientPhase, ClientStatus, DependentState, DependentStates};
