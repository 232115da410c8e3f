//! Spatial computations and input validation.

pub mod spatial;
pub mod validation;
