//! Boundary schema validation.
//!
//! This module checks every structural invariant on the authored
//! model before any of it is trusted by the execution engine.

pub mod validate;
