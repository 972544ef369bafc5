//! The delta-execution effect and its deterministic interpreter.
//!
//! A delta's computation is represented as an inert [`Effect`] value with
//! exactly two primitive requests: a fresh globally unique id, and the
//! context the computation runs under. Requests compose sequentially with
//! [`Effect::and_then`]; building an effect performs no work.
//!
//! The separation between describing the computation and interpreting it is
//! what lets the *same* delta execute once optimistically on the client and
//! once authoritatively on the server and still be structurally the same
//! computation, differing only in the answers the interpreter supplies.

use crate::context::DeltaIoContext;
use crate::id::{DeltaId, Guid, WithinDeltaId};
use crate::reference::Ref;

/// An inert description of a delta computation yielding a `T`.
///
/// Interpretation is a pure function of `(effect, context, delta_id)`: the
/// same inputs always yield the same result and the same sequence of
/// allocated ids. Fresh ids are keyed by the executing delta's identity plus
/// a within-delta counter, so allocation needs no coordination and cannot
/// collide across clients or with the server's re-execution.
pub enum Effect<T> {
    /// The computation has finished with a value.
    Pure(T),
    /// The computation needs a fresh [`Guid`] before continuing.
    FreshId(Box<dyn FnOnce(Guid) -> Effect<T>>),
    /// The computation needs the [`DeltaIoContext`] before continuing.
    Context(Box<dyn FnOnce(DeltaIoContext) -> Effect<T>>),
}

impl<T: 'static> Effect<T> {
    /// Lift a plain value into an effect that requests nothing.
    pub fn pure(value: T) -> Self {
        Effect::Pure(value)
    }

    /// Sequence another effectful step after this one.
    pub fn and_then<U, F>(self, f: F) -> Effect<U>
    where
        U: 'static,
        F: FnOnce(T) -> Effect<U> + 'static,
    {
        match self {
            Effect::Pure(value) => f(value),
            Effect::FreshId(next) => Effect::FreshId(Box::new(move |guid| next(guid).and_then(f))),
            Effect::Context(next) => {
                Effect::Context(Box::new(move |context| next(context).and_then(f)))
            }
        }
    }

    /// Transform the final result with pure logic.
    pub fn map<U, F>(self, f: F) -> Effect<U>
    where
        U: 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.and_then(move |value| Effect::Pure(f(value)))
    }

    /// Execute the effect under a concrete context and delta identity.
    ///
    /// Walks the effect left to right. The n-th fresh-id request encountered
    /// (n = 0, 1, 2, …) is answered with
    /// `Guid(delta_id.client_id, delta_id.client_delta_id, WithinDeltaId(n))`;
    /// context requests are answered with `context` unchanged. Total: every
    /// effect terminates at its pure result.
    pub fn interpret(self, context: DeltaIoContext, delta_id: DeltaId) -> T {
        let mut effect = self;
        let mut allocation = WithinDeltaId::first();
        loop {
            match effect {
                Effect::Pure(value) => return value,
                Effect::FreshId(next) => {
                    let guid = Guid::new(delta_id.client_id, delta_id.client_delta_id, allocation);
                    allocation = allocation.next();
                    effect = next(guid);
                }
                Effect::Context(next) => effect = next(context),
            }
        }
    }
}

impl Effect<Guid> {
    /// Request a fresh globally unique id.
    pub fn fresh_id() -> Effect<Guid> {
        Effect::FreshId(Box::new(Effect::Pure))
    }
}

impl<A: 'static> Effect<Ref<A>> {
    /// Request a fresh id typed as a reference to an `A`.
    pub fn fresh_ref() -> Effect<Ref<A>> {
        Effect::FreshId(Box::new(|guid| Effect::Pure(Ref::new(guid))))
    }
}

impl Effect<DeltaIoContext> {
    /// Request the context the computation is running under.
    pub fn context() -> Effect<DeltaIoContext> {
        Effect::Context(Box::new(Effect::Pure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ClientDeltaId, ClientId};
    use chrono::DateTime;

    fn delta_id(client: u64, delta: u64) -> DeltaId {
        DeltaId::new(ClientId::new(client), ClientDeltaId::new(delta))
    }

    fn context(millis: i64) -> DeltaIoContext {
        DeltaIoContext::new(DateTime::from_timestamp_millis(millis).unwrap())
    }

    /// An effect requesting two ids and the context, combined with pure logic.
    fn sample_effect() -> Effect<(Guid, Guid, DeltaIoContext)> {
        Effect::fresh_id().and_then(|first| {
            Effect::fresh_id().and_then(move |second| {
                Effect::context().map(move |ctx| (first, second, ctx))
            })
        })
    }

    #[test]
    fn test_pure_effect_requests_nothing() {
        let result = Effect::pure(41).map(|n| n + 1).interpret(context(0), delta_id(1, 0));
        assert_eq!(result, 42);
    }

    #[test]
    fn test_fresh_ids_count_up_in_execution_order() {
        let (first, second, _) = sample_effect().interpret(context(5), delta_id(3, 7));

        assert_eq!(
            first,
            Guid::new(ClientId::new(3), ClientDeltaId::new(7), WithinDeltaId::new(0))
        );
        assert_eq!(
            second,
            Guid::new(ClientId::new(3), ClientDeltaId::new(7), WithinDeltaId::new(1))
        );
    }

    #[test]
    fn test_context_request_returns_context_unchanged() {
        let ctx = context(1_234);
        let (_, _, seen) = sample_effect().interpret(ctx, delta_id(1, 0));
        assert_eq!(seen, ctx);
    }

    #[test]
    fn test_interpretation_is_deterministic() {
        let ctx = context(99);
        let id = delta_id(8, 2);

        let first_run = sample_effect().interpret(ctx, id);
        let second_run = sample_effect().interpret(ctx, id);

        assert_eq!(first_run, second_run);
    }

    #[test]
    fn test_ids_do_not_depend_on_context() {
        let id = delta_id(8, 2);

        let (a1, a2, _) = sample_effect().interpret(context(1), id);
        let (b1, b2, _) = sample_effect().interpret(context(2_000_000), id);

        assert_eq!(a1, b1);
        assert_eq!(a2, b2);
    }

    #[test]
    fn test_fresh_ref_carries_the_allocated_guid() {
        struct Widget;

        let reference = Effect::<Ref<Widget>>::fresh_ref().interpret(context(0), delta_id(4, 9));
        assert_eq!(
            reference.guid(),
            Guid::new(ClientId::new(4), ClientDeltaId::new(9), WithinDeltaId::new(0))
        );
    }
}
