//! Boot sequence for Persona.
//!
//! Loads configuration, opens the memory store, builds the embedding driver,
//! and hands the resulting [`MemoryService`](persona_runtime::MemoryService)
//! to the API server and CLI.

pub mod config;
pub mod error;
pub mod kernel;

pub use kernel::PersonaKernel;
