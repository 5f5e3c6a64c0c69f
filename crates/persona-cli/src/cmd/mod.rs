//! Command implementations.

pub mod config;
pub mod memory;
pub mod start;
