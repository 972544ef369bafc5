//! Error types for the synchronization protocol.

use crate::id::{ClientId, ModelId};
use thiserror::Error;

/// Result type alias for synchronization transitions.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors a synchronization transition can return.
///
/// All variants are recoverable by the caller and leave the prior state
/// untouched. The expected recovery for every server-side disagreement is to
/// request a fresh full update, which unconditionally resynchronizes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A full update was addressed to a different client; discard it.
    #[error("full update addressed to {addressed}, but this state belongs to {own}")]
    WrongClient {
        own: ClientId,
        addressed: ClientId,
    },

    /// An incremental update does not chain onto the confirmed model;
    /// request a full update instead of retrying.
    #[error("incremental update base {base} does not match confirmed model {confirmed}")]
    StaleBase {
        confirmed: ModelId,
        base: ModelId,
    },

    /// The model produced by folding an incremental update disagrees with
    /// the server-declared fingerprint; client and server have diverged.
    #[error("model id mismatch after incremental update: computed {computed}, server declared {declared}")]
    ModelIdMismatch {
        computed: ModelId,
        declared: ModelId,
    },

    /// The very first message used to seed a client state was incremental;
    /// only a full update can seed one.
    #[error("first update for a new client state must be a full update")]
    UnexpectedIncrementalAsFirst,
}
