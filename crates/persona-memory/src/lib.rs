//! Memory store for the Persona personalization layer.
//!
//! - **Record store** (SQLite): append-only memory records keyed by user, with
//!   embeddings stored as little-endian `f32` BLOBs.
//! - **Ranking**: similarity/time-decay scoring that selects the memories most
//!   relevant to a query embedding.

pub mod migration;
pub mod ranking;
pub mod store;

pub use ranking::{rank_candidates, similarity, time_relevance};
pub use store::SqliteRecordStore;
