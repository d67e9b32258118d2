//! CLI command implementations.

pub mod common;
pub mod ilp;
pub mod qubo;
pub mod version;
