//! The execution moment a delta runs under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The "moment" under which a delta is executed.
///
/// A client executes a delta optimistically under a provisional context; when
/// the server later confirms the same delta it supplies the authoritative
/// context, and the client re-executes under that one. Apart from whatever a
/// delta derives from this timestamp, both executions are bit-identical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeltaIoContext {
    /// Wall-clock time the delta is considered to have executed at
    pub timestamp: DateTime<Utc>,
}

impl DeltaIoContext {
    /// Create a context for an explicit moment.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }

    /// Create a context for the current moment.
    ///
    /// This is the provisional context a client uses for optimistic
    /// execution; the server's confirmation supersedes it.
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for DeltaIoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ctx({})", self.timestamp.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contexts_order_by_timestamp() {
        let earlier = DeltaIoContext::new(DateTime::from_timestamp_millis(1_000).unwrap());
        let later = DeltaIoContext::new(DateTime::from_timestamp_millis(2_000).unwrap());

        assert!(earlier < later);
        assert_ne!(earlier, later);
    }

    #[test]
    fn test_context_serialization_round_trip() {
        let context = DeltaIoContext::new(DateTime::from_timestamp_millis(1_234_567).unwrap());
        let json = serde_json::to_string(&context).unwrap();
        let back: DeltaIoContext = serde_json::from_str(&json).unwrap();

        assert_eq!(back, context);
    }
}
