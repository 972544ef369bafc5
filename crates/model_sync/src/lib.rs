//! Optimistic delta synchronization for shared data models.
//!
//! A server and many independent clients share a single logical model; each
//! client edits optimistically and offline-tolerantly, with no central lock.
//! Edits travel as **deltas** — self-describing transformations — and this
//! crate keeps every client's locally-applied-but-unconfirmed edits
//! consistent with an authoritative server history advancing concurrently
//! from other clients.
//!
//! # Modules
//!
//! - `id`: identity primitives (clients, deltas, guids, model fingerprints)
//! - `context`: the execution moment a delta runs under
//! - `effect`: the inert delta-execution effect and its deterministic interpreter
//! - `delta`: the delta abstraction and the pluggable model fingerprint
//! - `reference`: typed references and the resolution boundary
//! - `protocol`: the update messages a server sends a client
//! - `state`: the client reconciliation state machine
//! - `snapshot`: persistence of client state across restarts
//! - `error`: error types for the synchronization protocol
//! - `server`: pure-logic authoritative session log and in-memory store
//!
//! # Example
//!
//! ```
//! use model_sync::{
//!     ClientId, ClientState, Delta, DeltaIoContext, Effect, ModelAndId, ModelFullUpdate,
//!     ModelId, ModelUpdate,
//! };
//!
//! #[derive(Clone)]
//! struct Add(i64);
//!
//! impl Delta<i64> for Add {
//!     fn apply(&self, model: i64) -> Effect<i64> {
//!         Effect::pure(model + self.0)
//!     }
//! }
//!
//! // The first server message must be a full update.
//! let client = ClientId::new(7);
//! let first = ModelFullUpdate::new(client, ModelAndId::new(0, ModelId::new(0)));
//! let state: ClientState<i64, Add> =
//!     ClientState::from_first_update(client, ModelUpdate::Full(first)).unwrap();
//!
//! // Local edits apply immediately and queue for confirmation.
//! let (state, delta_id) = state.apply(Add(5), DeltaIoContext::now());
//! assert_eq!(*state.model(), 5);
//! assert_eq!(state.pending_count(), 1);
//! assert_eq!(delta_id.client_delta_id.value(), 0);
//! ```

pub mod context;
pub mod delta;
pub mod effect;
pub mod error;
pub mod id;
pub mod protocol;
pub mod reference;
pub mod server;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use context::DeltaIoContext;
pub use delta::{Delta, ModelIdGen};
pub use effect::Effect;
pub use error::{SyncError, SyncResult};
pub use id::{ClientDeltaId, ClientId, DeltaId, Guid, ModelId, ParseIdError, WithinDeltaId};
pub use protocol::{ModelFullUpdate, ModelIncrementalUpdate, ModelUpdate, UpdateDelta};
pub use reference::{Ref, ResolveRef};
pub use server::{MemoryStore, ModelSession, SessionKey};
pub use snapshot::{ClientSnapshot, SnapshotError};
pub use state::{ClientState, DeltaWithIc, ModelAndId};
