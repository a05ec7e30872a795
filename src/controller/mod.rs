//! # Controller
//!
//! Core controller modules for the Shoplift operator.
//!
//! - `resources`: Declarative dependent object builders
//! - `reconciler`: Core reconciliation logic

pub mod reconciler;
pub mod resources;
