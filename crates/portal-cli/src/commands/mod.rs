//! CLI command implementations

pub mod address;
pub mod harness;
pub mod keygen;
