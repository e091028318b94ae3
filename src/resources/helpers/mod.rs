//! Shared helpers for entry implementations.
pub mod fs;
