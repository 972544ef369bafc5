//! Identity primitives for delta synchronization.
//!
//! This module provides the small value types that identify clients, deltas,
//! and entities across the whole system:
//!
//! - [`ClientId`]: a stable per-client identity
//! - [`ClientDeltaId`]: the sequence number of a delta within one client
//! - [`WithinDeltaId`]: the sequence number of an identifier allocated during
//!   one delta's execution
//! - [`Guid`]: a globally unique identifier built from the triple above
//! - [`DeltaId`]: the identity of one delta instance
//! - [`ModelId`]: a content-derived fingerprint of a model value
//!
//! `Guid` and `DeltaId` carry a canonical fixed-width lowercase hexadecimal
//! encoding (`Display`) with a matching parser (`FromStr`); encoding and
//! parsing are exact inverses for every representable value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for a client in the synchronization protocol.
///
/// Assigned once per client session or install, and used to:
/// - Identify the originator of a delta
/// - Address full updates to a specific client
/// - Key the per-delta identifier space so fresh ids never collide
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClientId(pub u64);

impl ClientId {
    /// Create a new ClientId with the given value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client({})", self.0)
    }
}

impl From<u64> for ClientId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ClientId> for u64 {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

/// Sequence number of a delta within a single client.
///
/// Starts at 0 for a fresh client state and increases by exactly 1 for each
/// delta the client originates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClientDeltaId(pub u64);

impl ClientDeltaId {
    /// Create a ClientDeltaId with the given value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The sequence number of the first delta a client originates.
    pub fn first() -> Self {
        Self(0)
    }

    /// The sequence number following this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Get the raw u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientDeltaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientDelta({})", self.0)
    }
}

/// Sequence number of an identifier allocated within one delta's execution.
///
/// The interpreter hands out 0, 1, 2, … in the order fresh-id requests are
/// encountered, so re-executing the same delta always allocates the same ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WithinDeltaId(pub u64);

impl WithinDeltaId {
    /// Create a WithinDeltaId with the given value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The sequence number of the first identifier allocated in a delta.
    pub fn first() -> Self {
        Self(0)
    }

    /// The sequence number following this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Get the raw u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WithinDeltaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Within({})", self.0)
    }
}

/// Globally unique identifier for a newly created entity.
///
/// The triple `(client, delta-within-client, allocation-within-delta)` is
/// unique by construction, so ids can be minted on offline clients with no
/// coordination and no risk of collision.
///
/// Ordering is lexicographic on the triple. The canonical string form is 48
/// lowercase hex digits (16 per component).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Guid {
    /// The client that executed the allocating delta
    pub client_id: ClientId,
    /// Which of that client's deltas performed the allocation
    pub client_delta_id: ClientDeltaId,
    /// Position of this allocation within the delta's execution
    pub within_delta_id: WithinDeltaId,
}

impl Guid {
    /// Create a Guid from its three components.
    pub fn new(
        client_id: ClientId,
        client_delta_id: ClientDeltaId,
        within_delta_id: WithinDeltaId,
    ) -> Self {
        Self {
            client_id,
            client_delta_id,
            within_delta_id,
        }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:016x}{:016x}{:016x}",
            self.client_id.0, self.client_delta_id.0, self.within_delta_id.0
        )
    }
}

impl FromStr for Guid {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_hex(s, 48)?;
        Ok(Self {
            client_id: ClientId::new(parse_hex_field(&s[0..16])?),
            client_delta_id: ClientDeltaId::new(parse_hex_field(&s[16..32])?),
            within_delta_id: WithinDeltaId::new(parse_hex_field(&s[32..48])?),
        })
    }
}

/// Identity of one delta instance.
///
/// Unique per originating client; correlates a locally-applied delta with the
/// server confirmation that later arrives for it.
///
/// Ordering is lexicographic on `(client_id, client_delta_id)`. The canonical
/// string form is 32 lowercase hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeltaId {
    /// The client that originated the delta
    pub client_id: ClientId,
    /// Sequence number of the delta within that client
    pub client_delta_id: ClientDeltaId,
}

impl DeltaId {
    /// Create a DeltaId from its two components.
    pub fn new(client_id: ClientId, client_delta_id: ClientDeltaId) -> Self {
        Self {
            client_id,
            client_delta_id,
        }
    }
}

impl fmt::Display for DeltaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.client_id.0, self.client_delta_id.0)
    }
}

impl FromStr for DeltaId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_hex(s, 32)?;
        Ok(Self {
            client_id: ClientId::new(parse_hex_field(&s[0..16])?),
            client_delta_id: ClientDeltaId::new(parse_hex_field(&s[16..32])?),
        })
    }
}

/// Content-derived fingerprint of a model value.
///
/// Produced by a pluggable [`ModelIdGen`](crate::delta::ModelIdGen); two
/// models considered equal by the application's rules must produce equal ids.
/// Used only to detect drift between client and server, never to merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelId(pub u64);

impl ModelId {
    /// Create a ModelId with the given value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Errors from parsing the canonical id encodings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseIdError {
    /// The input was not the expected fixed width.
    #[error("expected {expected} hex digits, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// The input contained a non-hexadecimal character.
    #[error("invalid hex digit in {0:?}")]
    InvalidDigit(String),
}

fn check_hex(s: &str, expected: usize) -> Result<(), ParseIdError> {
    if s.len() != expected {
        return Err(ParseIdError::WrongLength {
            expected,
            actual: s.len(),
        });
    }
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseIdError::InvalidDigit(s.to_string()));
    }
    Ok(())
}

fn parse_hex_field(digits: &str) -> Result<u64, ParseIdError> {
    u64::from_str_radix(digits, 16).map_err(|_| ParseIdError::InvalidDigit(digits.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn guid(client: u64, delta: u64, within: u64) -> Guid {
        Guid::new(
            ClientId::new(client),
            ClientDeltaId::new(delta),
            WithinDeltaId::new(within),
        )
    }

    #[test]
    fn test_client_delta_id_sequence() {
        let first = ClientDeltaId::first();
        assert_eq!(first.value(), 0);
        assert_eq!(first.next().value(), 1);
        assert_eq!(first.next().next().value(), 2);
    }

    #[test]
    fn test_guid_ordering_is_lexicographic() {
        assert!(guid(1, 0, 0) < guid(2, 0, 0));
        assert!(guid(1, 0, 9) < guid(1, 1, 0));
        assert!(guid(1, 1, 0) < guid(1, 1, 1));
    }

    #[test]
    fn test_delta_id_ordering() {
        let a = DeltaId::new(ClientId::new(1), ClientDeltaId::new(5));
        let b = DeltaId::new(ClientId::new(1), ClientDeltaId::new(6));
        let c = DeltaId::new(ClientId::new(2), ClientDeltaId::new(0));

        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_guid_canonical_encoding() {
        let id = guid(0x2a, 1, 0);
        let encoded = id.to_string();

        assert_eq!(encoded.len(), 48);
        assert_eq!(
            encoded,
            "000000000000002a00000000000000010000000000000000"
        );
        assert_eq!(encoded.parse::<Guid>().unwrap(), id);
    }

    #[test]
    fn test_delta_id_canonical_encoding() {
        let id = DeltaId::new(ClientId::new(7), ClientDeltaId::new(0xff));
        let encoded = id.to_string();

        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded.parse::<DeltaId>().unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let err = "abc".parse::<Guid>().unwrap_err();
        assert_eq!(
            err,
            ParseIdError::WrongLength {
                expected: 48,
                actual: 3
            }
        );

        let err = "abc".parse::<DeltaId>().unwrap_err();
        assert_eq!(
            err,
            ParseIdError::WrongLength {
                expected: 32,
                actual: 3
            }
        );
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let input = "g".repeat(48);
        assert!(matches!(
            input.parse::<Guid>(),
            Err(ParseIdError::InvalidDigit(_))
        ));

        // Multi-byte input must be rejected, not sliced mid-character.
        let input = "é".repeat(24);
        assert!(matches!(
            input.parse::<Guid>(),
            Err(ParseIdError::InvalidDigit(_))
        ));
    }

    #[test]
    fn test_guid_extreme_values_round_trip() {
        let id = guid(u64::MAX, u64::MAX, u64::MAX);
        assert_eq!(id.to_string().parse::<Guid>().unwrap(), id);

        let id = guid(0, 0, 0);
        assert_eq!(id.to_string().parse::<Guid>().unwrap(), id);
    }

    proptest! {
        #[test]
        fn guid_encoding_round_trips(client: u64, delta: u64, within: u64) {
            let id = guid(client, delta, within);
            prop_assert_eq!(id.to_string().parse::<Guid>().unwrap(), id);
        }

        #[test]
        fn delta_id_encoding_round_trips(client: u64, delta: u64) {
            let id = DeltaId::new(ClientId::new(client), ClientDeltaId::new(delta));
            prop_assert_eq!(id.to_string().parse::<DeltaId>().unwrap(), id);
        }
    }
}
