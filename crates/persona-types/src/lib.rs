//! Core types and traits for the Persona memory store.
//!
//! This crate defines the shared data structures used across the memory
//! store, runtime, kernel, and API server. It contains no business logic.

pub mod config;
pub mod error;
pub mod memory;
pub mod tool;
