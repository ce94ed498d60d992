//! UUIDv7-based identifiers for pipeline rows
//!
//! UUIDv7 provides chronological sortability for temporal queries,
//! 128-bit uniqueness, and no coordination between concurrent writers.

use std::fmt;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u128);

        impl $name {
            /// Generate a new UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_u128())
            }

            /// Create from a raw u128 value (storage-layer deserialization)
            pub fn from_value(value: u128) -> Self {
                Self(value)
            }

            /// Parse from a UUID string
            pub fn from_string(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map(|u| Self(u.as_u128()))
                    .map_err(|e| format!("Invalid UUID string: {}", e))
            }

            /// Get the raw u128 value
            pub fn value(&self) -> u128 {
                self.0
            }

            /// Get the timestamp component (milliseconds since Unix epoch)
            pub fn timestamp(&self) -> u64 {
                // UUIDv7: top 48 bits are Unix millisecond timestamp
                (self.0 >> 80) as u64
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", uuid::Uuid::from_u128(self.0))
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for an Event (the unit of publication)
    EventId
);
uuid_id!(
    /// Unique identifier for an EvidenceSource
    SourceId
);
uuid_id!(
    /// Unique identifier for an EvidenceSnapshot
    SnapshotId
);
uuid_id!(
    /// Unique identifier for an extracted Entity
    EntityId
);
uuid_id!(
    /// Unique identifier for an extracted Relationship claim
    RelationshipId
);
