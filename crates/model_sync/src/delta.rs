//! The delta abstraction and the pluggable model fingerprint.

use crate::effect::Effect;
use crate::id::ModelId;

/// A self-contained edit of a model value.
///
/// A delta consumes a model and yields an [`Effect`] describing the new
/// model, possibly requesting fresh identifiers or the execution context
/// along the way. The reconciliation core treats deltas as opaque: it never
/// inspects variants, it only calls `apply` and interprets the result.
///
/// Concrete delta types are defined per model schema by the embedding
/// application, typically as a tagged enum (replace a value, descend into a
/// field, run a named action, …).
pub trait Delta<M> {
    /// Describe the application of this delta to `model`.
    ///
    /// Building the effect performs no work; nothing happens until the
    /// effect is interpreted under a concrete context and delta identity.
    fn apply(&self, model: M) -> Effect<M>;
}

/// A deterministic fingerprint function for model values.
///
/// The protocol is agnostic to the implementation (hash, version counter, …)
/// but requires it to be stable: equal models must produce equal ids, on the
/// client and on the server alike. Fingerprints detect drift; they are never
/// used to merge.
pub trait ModelIdGen<M> {
    /// Compute the fingerprint of a model value.
    fn model_id(&self, model: &M) -> ModelId;
}

impl<M, F> ModelIdGen<M> for F
where
    F: Fn(&M) -> ModelId,
{
    fn model_id(&self, model: &M) -> ModelId {
        self(model)
    }
}
