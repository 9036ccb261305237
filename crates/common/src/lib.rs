//! Shared helpers used by the server crate and binary: logging setup,
//! environment checks and plain HTTP payload types.

pub mod types;
pub mod utils;
pub mod env;
