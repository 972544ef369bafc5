//! The authoritative session for a single shared model.

use crate::context::DeltaIoContext;
use crate::delta::{Delta, ModelIdGen};
use crate::id::{ClientId, DeltaId, ModelId};
use crate::protocol::{ModelFullUpdate, ModelIncrementalUpdate, UpdateDelta};
use crate::state::{DeltaWithIc, ModelAndId};

/// The server's state for one shared model: the authoritative model value,
/// the total order of committed deltas, and the chain of revision
/// fingerprints.
///
/// Every delta a client sends is committed here exactly once, under a
/// server-assigned context; the log is then rendered per client as
/// incremental updates (the addressee's own deltas as confirmations,
/// everyone else's in full).
#[derive(Clone, Debug)]
pub struct ModelSession<M, D> {
    /// The authoritative model and its current fingerprint
    model: ModelAndId<M>,
    /// Committed deltas in their one total order
    log: Vec<DeltaWithIc<D>>,
    /// Revision fingerprints: `revisions[n]` is the state before `log[n]`,
    /// with the current fingerprint at the end
    revisions: Vec<ModelId>,
}

impl<M, D> ModelSession<M, D>
where
    M: Clone + 'static,
    D: Delta<M> + Clone,
{
    /// Start a session from an initial model value.
    pub fn new(model: M, id_gen: &impl ModelIdGen<M>) -> Self {
        let model = ModelAndId::from_model(model, id_gen);
        let initial = model.id;
        Self {
            model,
            log: Vec::new(),
            revisions: vec![initial],
        }
    }

    /// The authoritative model and fingerprint.
    pub fn model(&self) -> &ModelAndId<M> {
        &self.model
    }

    /// Number of deltas committed so far.
    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// Commit one delta to the authoritative log.
    ///
    /// Executes the delta under the server-assigned `context` — this is the
    /// authoritative execution that every client's reconciliation will
    /// reproduce — and appends it to the total order. Returns the new
    /// revision fingerprint.
    pub fn commit(
        &mut self,
        delta: D,
        delta_id: DeltaId,
        context: DeltaIoContext,
        id_gen: &impl ModelIdGen<M>,
    ) -> ModelId {
        let model = delta
            .apply(self.model.model.clone())
            .interpret(context, delta_id);
        let id = id_gen.model_id(&model);
        tracing::debug!(%delta_id, model_id = %id, "committed delta to authoritative log");

        self.model = ModelAndId::new(model, id);
        self.log.push(DeltaWithIc::new(delta, delta_id, context));
        self.revisions.push(id);
        id
    }

    /// Render a full update for one client.
    pub fn full_update(&self, for_client: ClientId) -> ModelFullUpdate<M> {
        ModelFullUpdate::new(for_client, self.model.clone())
    }

    /// Render the history since `base` as an incremental update for one
    /// client: its own deltas become confirmations, everyone else's are
    /// delivered in full.
    ///
    /// Returns `None` when `base` is not in the revision chain — the client
    /// is behind recorded history and must be sent a full update instead. A
    /// fingerprint that recurs in the chain resolves to its latest
    /// occurrence.
    pub fn updates_since(
        &self,
        base: ModelId,
        for_client: ClientId,
    ) -> Option<ModelIncrementalUpdate<D>> {
        let position = self.revisions.iter().rposition(|id| *id == base)?;
        let deltas = self.log[position..]
            .iter()
            .map(|entry| {
                if entry.delta_id.client_id == for_client {
                    UpdateDelta::local(entry.delta_id, entry.context)
                } else {
                    UpdateDelta::remote(entry.delta.clone(), entry.delta_id, entry.context)
                }
            })
            .collect();

        Some(ModelIncrementalUpdate::new(base, deltas, self.model.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;
    use crate::id::ClientDeltaId;
    use chrono::DateTime;

    #[derive(Clone, Debug, PartialEq)]
    struct Add(i64);

    impl Delta<i64> for Add {
        fn apply(&self, model: i64) -> Effect<i64> {
            Effect::pure(model + self.0)
        }
    }

    fn counter_id(model: &i64) -> ModelId {
        ModelId::new(*model as u64)
    }

    fn context(millis: i64) -> DeltaIoContext {
        DeltaIoContext::new(DateTime::from_timestamp_millis(millis).unwrap())
    }

    fn delta_id(client: u64, delta: u64) -> DeltaId {
        DeltaId::new(ClientId::new(client), ClientDeltaId::new(delta))
    }

    #[test]
    fn test_commit_advances_model_and_log() {
        let mut session = ModelSession::new(100, &counter_id);
        assert_eq!(session.model().id, ModelId::new(100));

        let revision = session.commit(Add(1), delta_id(1, 0), context(10), &counter_id);

        assert_eq!(revision, ModelId::new(101));
        assert_eq!(session.model().model, 101);
        assert_eq!(session.log_len(), 1);
    }

    #[test]
    fn test_updates_since_splits_local_and_remote() {
        let mut session = ModelSession::new(0, &counter_id);
        session.commit(Add(1), delta_id(1, 0), context(10), &counter_id);
        session.commit(Add(2), delta_id(2, 0), context(20), &counter_id);

        let update = session.updates_since(ModelId::new(0), ClientId::new(1)).unwrap();

        assert_eq!(update.base_model_id, ModelId::new(0));
        assert_eq!(update.updated_model_id, ModelId::new(3));
        assert_eq!(update.deltas.len(), 2);
        assert!(update.deltas[0].is_local());
        assert!(update.deltas[1].is_remote());

        // The same history rendered for the other client swaps roles.
        let update = session.updates_since(ModelId::new(0), ClientId::new(2)).unwrap();
        assert!(update.deltas[0].is_remote());
        assert!(update.deltas[1].is_local());
    }

    #[test]
    fn test_updates_since_midpoint_base() {
        let mut session = ModelSession::new(0, &counter_id);
        session.commit(Add(1), delta_id(1, 0), context(10), &counter_id);
        session.commit(Add(2), delta_id(2, 0), context(20), &counter_id);

        let update = session.updates_since(ModelId::new(1), ClientId::new(3)).unwrap();

        assert_eq!(update.deltas.len(), 1);
        assert_eq!(update.updated_model_id, ModelId::new(3));
    }

    #[test]
    fn test_updates_since_unknown_base_is_none() {
        let mut session = ModelSession::new(0, &counter_id);
        session.commit(Add(1), delta_id(1, 0), context(10), &counter_id);

        assert!(session.updates_since(ModelId::new(77), ClientId::new(1)).is_none());
    }

    #[test]
    fn test_recurring_revision_resolves_to_latest() {
        // 0 -> 5 -> 0: the fingerprint 0 appears twice in the chain.
        let mut session = ModelSession::new(0, &counter_id);
        session.commit(Add(5), delta_id(1, 0), context(10), &counter_id);
        session.commit(Add(-5), delta_id(1, 1), context(20), &counter_id);

        let update = session.updates_since(ModelId::new(0), ClientId::new(2)).unwrap();
        assert!(update.deltas.is_empty());
        assert_eq!(update.updated_model_id, ModelId::new(0));
    }

    #[test]
    fn test_full_update_is_addressed() {
        let session: ModelSession<i64, Add> = ModelSession::new(42, &counter_id);
        let update = session.full_update(ClientId::new(9));

        assert_eq!(update.for_client, ClientId::new(9));
        assert_eq!(update.server_model.model, 42);
    }
}
