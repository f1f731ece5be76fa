//! Domain logic for Stepwise with no database dependencies.
//!
//! Progress math, status derivation and input validation live here so that
//! every mutation path computes derived fields the same way.

pub mod error;
pub mod progress;
pub mod types;
pub mod validation;
