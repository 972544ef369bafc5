//! The client reconciliation state machine.
//!
//! [`ClientState`] tracks three things: the last confirmed server model, the
//! ordered queue of locally-applied-but-unconfirmed deltas, and the derived
//! optimistic model. Its transitions — [`apply`](ClientState::apply),
//! [`full_update`](ClientState::full_update) and
//! [`update`](ClientState::update) — are pure: each returns a new state and
//! never mutates in place, so a failed transition leaves the caller's state
//! exactly as it was.
//!
//! Invariant held after every transition: the derived model equals the
//! confirmed server model with the pending queue replayed in order, each
//! entry under its own stored context.

use crate::context::DeltaIoContext;
use crate::delta::{Delta, ModelIdGen};
use crate::error::{SyncError, SyncResult};
use crate::id::{ClientDeltaId, ClientId, DeltaId, ModelId};
use crate::protocol::{ModelFullUpdate, ModelIncrementalUpdate, ModelUpdate, UpdateDelta};
use serde::{Deserialize, Serialize};

/// A model value paired with its fingerprint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAndId<M> {
    /// The model value
    pub model: M,
    /// Its fingerprint; must equal the pluggable generator's output for it
    pub id: ModelId,
}

impl<M> ModelAndId<M> {
    /// Pair a model with an already-computed fingerprint.
    pub fn new(model: M, id: ModelId) -> Self {
        Self { model, id }
    }

    /// Pair a model with a freshly computed fingerprint.
    pub fn from_model(model: M, id_gen: &impl ModelIdGen<M>) -> Self {
        let id = id_gen.model_id(&model);
        Self { model, id }
    }
}

/// A pending local delta plus the identity and context it executed under.
///
/// Immutable once enqueued; consumed only when the server confirms it (or
/// discarded wholesale by a full update).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaWithIc<D> {
    /// The delta itself
    pub delta: D,
    /// Its assigned identity
    pub delta_id: DeltaId,
    /// The provisional context it was executed under
    pub context: DeltaIoContext,
}

impl<D> DeltaWithIc<D> {
    /// Bundle a delta with its identity and context.
    pub fn new(delta: D, delta_id: DeltaId, context: DeltaIoContext) -> Self {
        Self {
            delta,
            delta_id,
            context,
        }
    }
}

/// The client's view of synchronization for one model.
///
/// Created once from the first server message (which must be a full update),
/// then advanced only through the three transitions.
#[derive(Clone, Debug)]
pub struct ClientState<M, D> {
    /// This client's identity
    id: ClientId,
    /// Sequence number the next locally originated delta will get
    next_client_delta_id: ClientDeltaId,
    /// The last confirmed server model
    server_model: ModelAndId<M>,
    /// Locally applied deltas the server has not yet confirmed, in order
    pending_deltas: Vec<DeltaWithIc<D>>,
    /// Derived optimistic model: `server_model` plus pending replayed
    model: M,
}

impl<M, D> ClientState<M, D>
where
    M: Clone + 'static,
    D: Delta<M> + Clone,
{
    /// Seed a client state from the first server message.
    ///
    /// Only a full update can seed a state: an incremental update describes
    /// a change between two revisions, and a fresh client holds neither.
    pub fn from_first_update(id: ClientId, update: ModelUpdate<M, D>) -> SyncResult<Self> {
        match update {
            ModelUpdate::Incremental(_) => Err(SyncError::UnexpectedIncrementalAsFirst),
            ModelUpdate::Full(full) => {
                if full.for_client != id {
                    return Err(SyncError::WrongClient {
                        own: id,
                        addressed: full.for_client,
                    });
                }
                let model = full.server_model.model.clone();
                Ok(Self {
                    id,
                    next_client_delta_id: ClientDeltaId::first(),
                    server_model: full.server_model,
                    pending_deltas: Vec::new(),
                    model,
                })
            }
        }
    }

    /// Apply a local edit optimistically.
    ///
    /// Assigns the next [`DeltaId`], executes the delta's effect under the
    /// provisional `context`, and enqueues it as pending. The caller must
    /// forward `(delta, delta_id, context)` to the server, in the order
    /// `apply` was called. No failure mode: the interpreter is total.
    pub fn apply(&self, delta: D, context: DeltaIoContext) -> (Self, DeltaId) {
        let delta_id = DeltaId::new(self.id, self.next_client_delta_id);
        let model = delta.apply(self.model.clone()).interpret(context, delta_id);
        tracing::debug!(%delta_id, "applied local delta optimistically");

        let mut pending_deltas = self.pending_deltas.clone();
        pending_deltas.push(DeltaWithIc::new(delta, delta_id, context));

        let state = Self {
            id: self.id,
            next_client_delta_id: self.next_client_delta_id.next(),
            server_model: self.server_model.clone(),
            pending_deltas,
            model,
        };
        (state, delta_id)
    }

    /// Accept an authoritative full replacement of the model.
    ///
    /// All pending local edits are discarded: a full update always wins
    /// outright. The delta numbering continues where it left off.
    pub fn full_update(&self, update: ModelFullUpdate<M>) -> SyncResult<Self> {
        if update.for_client != self.id {
            return Err(SyncError::WrongClient {
                own: self.id,
                addressed: update.for_client,
            });
        }
        tracing::debug!(
            model_id = %update.server_model.id,
            discarded = self.pending_deltas.len(),
            "full update replaced client state"
        );
        let model = update.server_model.model.clone();
        Ok(Self {
            id: self.id,
            next_client_delta_id: self.next_client_delta_id,
            server_model: update.server_model,
            pending_deltas: Vec::new(),
            model,
        })
    }

    /// Reconcile an incremental update against the pending queue.
    ///
    /// The update must chain directly onto the confirmed model; a gap means
    /// the caller needs a full update instead. Entries fold over the
    /// confirmed model in authoritative order:
    ///
    /// - A `Local` entry consumes the matching pending delta (at most once)
    ///   and re-executes it under the server's context. A confirmation with
    ///   no matching pending entry is tolerated as a no-op and logged.
    /// - A `Remote` entry always folds in; it was never in this queue.
    ///
    /// The folded model's fingerprint must equal the server-declared one;
    /// disagreement means drift and the caller should resync fully. On
    /// success the surviving pending deltas are replayed, each under its own
    /// original context, to re-derive the optimistic model.
    pub fn update(
        &self,
        update: ModelIncrementalUpdate<D>,
        id_gen: &impl ModelIdGen<M>,
    ) -> SyncResult<Self> {
        if update.base_model_id != self.server_model.id {
            return Err(SyncError::StaleBase {
                confirmed: self.server_model.id,
                base: update.base_model_id,
            });
        }

        let mut confirmed = self.server_model.model.clone();
        let mut remaining = self.pending_deltas.clone();

        for entry in update.deltas {
            match entry {
                UpdateDelta::Local { delta_id, context } => {
                    match remaining.iter().position(|p| p.delta_id == delta_id) {
                        Some(index) => {
                            let pending = remaining.remove(index);
                            confirmed =
                                pending.delta.apply(confirmed).interpret(context, delta_id);
                        }
                        None => {
                            tracing::warn!(
                                %delta_id,
                                "confirmation for a delta not in the pending queue; skipping"
                            );
                        }
                    }
                }
                UpdateDelta::Remote {
                    delta,
                    delta_id,
                    context,
                } => {
                    confirmed = delta.apply(confirmed).interpret(context, delta_id);
                }
            }
        }

        let computed = id_gen.model_id(&confirmed);
        if computed != update.updated_model_id {
            return Err(SyncError::ModelIdMismatch {
                computed,
                declared: update.updated_model_id,
            });
        }

        let model = replay(confirmed.clone(), &remaining);
        tracing::debug!(
            model_id = %computed,
            pending = remaining.len(),
            "incremental update reconciled"
        );
        Ok(Self {
            id: self.id,
            next_client_delta_id: self.next_client_delta_id,
            server_model: ModelAndId::new(confirmed, computed),
            pending_deltas: remaining,
            model,
        })
    }

    /// Rebuild a state from persisted parts, re-deriving the optimistic
    /// model by replay.
    pub(crate) fn from_parts(
        id: ClientId,
        next_client_delta_id: ClientDeltaId,
        server_model: ModelAndId<M>,
        pending_deltas: Vec<DeltaWithIc<D>>,
    ) -> Self {
        let model = replay(server_model.model.clone(), &pending_deltas);
        Self {
            id,
            next_client_delta_id,
            server_model,
            pending_deltas,
            model,
        }
    }
}

impl<M, D> ClientState<M, D> {
    /// This client's identity.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// The sequence number the next local delta will be assigned.
    pub fn next_client_delta_id(&self) -> ClientDeltaId {
        self.next_client_delta_id
    }

    /// The last confirmed server model.
    pub fn server_model(&self) -> &ModelAndId<M> {
        &self.server_model
    }

    /// The deltas the server has not yet confirmed, in application order.
    pub fn pending_deltas(&self) -> &[DeltaWithIc<D>] {
        &self.pending_deltas
    }

    /// Check if any local deltas await confirmation.
    pub fn has_pending(&self) -> bool {
        !self.pending_deltas.is_empty()
    }

    /// Number of local deltas awaiting confirmation.
    pub fn pending_count(&self) -> usize {
        self.pending_deltas.len()
    }

    /// The derived optimistic model.
    pub fn model(&self) -> &M {
        &self.model
    }
}

/// Replay pending deltas on top of a base model, each under its own stored
/// identity and context.
pub(crate) fn replay<M, D>(base: M, pending: &[DeltaWithIc<D>]) -> M
where
    M: 'static,
    D: Delta<M>,
{
    pending.iter().fold(base, |model, entry| {
        entry.delta.apply(model).interpret(entry.context, entry.delta_id)
    })
}
