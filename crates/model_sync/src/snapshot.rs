//! Persistence of client synchronization state across restarts.
//!
//! An offline-tolerant client must survive being closed with unconfirmed
//! edits in its queue. A [`ClientSnapshot`] captures everything a
//! [`ClientState`] needs to come back: identity, delta numbering, the last
//! confirmed server model, and the pending queue. The derived optimistic
//! model is deliberately *not* persisted — restoring replays the pending
//! queue, so a snapshot can never smuggle in a drifted view.

use crate::delta::Delta;
use crate::id::{ClientDeltaId, ClientId};
use crate::state::{ClientState, DeltaWithIc, ModelAndId};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from saving or loading a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Reading or writing the storage location failed.
    #[error("snapshot storage error: {0}")]
    Storage(String),

    /// Encoding or decoding the snapshot failed.
    #[error("snapshot serialization error: {0}")]
    Serialization(String),
}

/// A serializable capture of a client's synchronization state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSnapshot<M, D> {
    /// The client's identity
    pub client_id: ClientId,
    /// Where the delta numbering left off
    pub next_client_delta_id: ClientDeltaId,
    /// The last confirmed server model
    pub server_model: ModelAndId<M>,
    /// Unconfirmed local deltas, in application order
    pub pending_deltas: Vec<DeltaWithIc<D>>,
    /// When the snapshot was taken
    pub saved_at: DateTime<Utc>,
}

impl<M, D> ClientSnapshot<M, D> {
    /// Capture the persistent parts of a client state.
    pub fn capture(state: &ClientState<M, D>) -> Self
    where
        M: Clone,
        D: Clone,
    {
        Self {
            client_id: state.id(),
            next_client_delta_id: state.next_client_delta_id(),
            server_model: state.server_model().clone(),
            pending_deltas: state.pending_deltas().to_vec(),
            saved_at: Utc::now(),
        }
    }

    /// Rebuild a client state, re-deriving the optimistic model by replaying
    /// the pending queue over the confirmed server model.
    pub fn restore(self) -> ClientState<M, D>
    where
        M: Clone + 'static,
        D: Delta<M> + Clone,
    {
        ClientState::from_parts(
            self.client_id,
            self.next_client_delta_id,
            self.server_model,
            self.pending_deltas,
        )
    }

    /// Write the snapshot to a file as pretty-printed JSON.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError>
    where
        M: Serialize,
        D: Serialize,
    {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        std::fs::write(path, json).map_err(|e| SnapshotError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Read a snapshot back from a file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError>
    where
        M: DeserializeOwned,
        D: DeserializeOwned,
    {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        serde_json::from_str(&json).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }
}
