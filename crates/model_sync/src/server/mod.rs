//! Server-side core of the synchronization protocol.
//!
//! The protocol depends on an external guarantee: the server serializes all
//! incoming deltas for a model into one total order. This module carries the
//! pure-logic heart of such a server — the authoritative model, the ordered
//! log of committed deltas, and the rendering of full and incremental
//! updates per client — with no transport attached. It backs the integration
//! tests and is the starting point for embedding a real server.

pub mod memory_store;
pub mod session;

pub use memory_store::{MemoryStore, SessionKey};
pub use session::ModelSession;
