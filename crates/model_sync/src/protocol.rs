//! Protocol messages the server sends a client.
//!
//! These are data-only types: deciding what to do with an update belongs to
//! the client state machine in [`state`](crate::state). Wire field naming is
//! `camelCase` with `snake_case` variant tags, matching the frontend client.
//!
//! Two invariants the transport must preserve end-to-end: the order of
//! entries in an incremental update is the authoritative application order,
//! and ids round-trip exactly.

use crate::context::DeltaIoContext;
use crate::id::{ClientId, DeltaId, ModelId};
use crate::state::ModelAndId;
use serde::{Deserialize, Serialize};

/// An authoritative replacement of everything a client knows about a model.
///
/// A full update always wins outright: the receiving client discards all
/// pending local edits (used on (re)connect after an unknown gap in history).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFullUpdate<M> {
    /// The client this update is addressed to
    pub for_client: ClientId,
    /// The authoritative model and its fingerprint
    pub server_model: ModelAndId<M>,
}

impl<M> ModelFullUpdate<M> {
    /// Create a full update addressed to one client.
    pub fn new(for_client: ClientId, server_model: ModelAndId<M>) -> Self {
        Self {
            for_client,
            server_model,
        }
    }
}

/// One entry in a server-sent incremental update.
///
/// List order in the containing update is the authoritative application
/// order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateDelta<D> {
    /// Confirms one of the receiving client's own pending deltas, carrying
    /// the server's authoritative context for it. The delta itself is not
    /// resent; the client still holds it.
    Local {
        #[serde(rename = "deltaId")]
        delta_id: DeltaId,
        context: DeltaIoContext,
    },

    /// A delta originated by another client, delivered in full.
    Remote {
        delta: D,
        #[serde(rename = "deltaId")]
        delta_id: DeltaId,
        context: DeltaIoContext,
    },
}

impl<D> UpdateDelta<D> {
    /// Create a confirmation entry for the receiving client's own delta.
    pub fn local(delta_id: DeltaId, context: DeltaIoContext) -> Self {
        Self::Local { delta_id, context }
    }

    /// Create an entry delivering another client's delta.
    pub fn remote(delta: D, delta_id: DeltaId, context: DeltaIoContext) -> Self {
        Self::Remote {
            delta,
            delta_id,
            context,
        }
    }

    /// The identity of the delta this entry applies.
    pub fn delta_id(&self) -> DeltaId {
        match self {
            UpdateDelta::Local { delta_id, .. } => *delta_id,
            UpdateDelta::Remote { delta_id, .. } => *delta_id,
        }
    }

    /// The authoritative context this entry applies under.
    pub fn context(&self) -> DeltaIoContext {
        match self {
            UpdateDelta::Local { context, .. } => *context,
            UpdateDelta::Remote { context, .. } => *context,
        }
    }

    /// Check if this entry confirms one of the receiver's own deltas.
    pub fn is_local(&self) -> bool {
        matches!(self, UpdateDelta::Local { .. })
    }

    /// Check if this entry delivers a remote delta.
    pub fn is_remote(&self) -> bool {
        matches!(self, UpdateDelta::Remote { .. })
    }
}

/// An ordered description of how the model advanced between two revisions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelIncrementalUpdate<D> {
    /// Fingerprint of the revision this update chains onto
    pub base_model_id: ModelId,
    /// The deltas that advanced the model, in authoritative order
    pub deltas: Vec<UpdateDelta<D>>,
    /// Fingerprint of the revision after applying every entry
    pub updated_model_id: ModelId,
}

impl<D> ModelIncrementalUpdate<D> {
    /// Create an incremental update between two named revisions.
    pub fn new(
        base_model_id: ModelId,
        deltas: Vec<UpdateDelta<D>>,
        updated_model_id: ModelId,
    ) -> Self {
        Self {
            base_model_id,
            deltas,
            updated_model_id,
        }
    }
}

/// The update envelope the transport delivers to a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelUpdate<M, D> {
    /// Authoritative replacement of the whole model.
    Full(ModelFullUpdate<M>),
    /// Ordered advancement between two known revisions.
    Incremental(ModelIncrementalUpdate<D>),
}

impl<M, D> ModelUpdate<M, D> {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error>
    where
        M: Serialize,
        D: Serialize,
    {
        serde_json::to_string(self)
    }
}
