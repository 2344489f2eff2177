//! Pre-validation normalization passes.

pub mod pass;
