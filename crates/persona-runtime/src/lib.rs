//! Runtime services for the Persona memory store.
//!
//! Wires an [`embedding::EmbeddingDriver`] and a
//! [`persona_types::memory::RecordStore`] into the memory writer and
//! retriever, and exposes them to the HTTP/tool layer through
//! [`service::MemoryService`].

pub mod embedding;
pub mod retriever;
pub mod service;
pub mod tool_runner;
pub mod writer;

pub use retriever::MemoryRetriever;
pub use service::MemoryService;
pub use writer::MemoryWriter;
