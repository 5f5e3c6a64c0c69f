//! HTTP API for the Persona memory store.
//!
//! Exposes store/retrieve, per-user listing, and the memory tools over JSON.

pub mod routes;
pub mod server;
