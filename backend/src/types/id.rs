//! Typed ID wrappers for compile-time type safety.
//!
//! These types wrap UUIDs to prevent accidental mixing of different entity IDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate typed ID wrappers with common trait implementations.
macro_rules! typed_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

typed_id!(AccountId, "Unique identifier for an account.");
typed_id!(SessionId, "Unique identifier for a refresh session record.");
typed_id!(AnnouncementId, "Unique identifier for an announcement.");
typed_id!(BannerId, "Unique identifier for a banner.");
typed_id!(EventId, "Unique identifier for an event.");
typed_id!(GalleryId, "Unique identifier for a gallery item.");
typed_id!(DonationCategoryId, "Unique identifier for a donation category.");
typed_id!(DonationId, "Unique identifier for a donation.");
typed_id!(AboutId, "Unique identifier for the about page record.");
typed_id!(KajianId, "Unique identifier for a synced video.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_id_round_trips_through_string_and_json() {
        let id = AccountId::new();
        let parsed: AccountId = id.to_string().parse().expect("parse id");
        assert_eq!(parsed, id);

        let json = serde_json::to_value(id).expect("serialize id");
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }

    #[test]
    fn typed_id_rejects_non_uuid_strings() {
        assert!("not-a-uuid".parse::<BannerId>().is_err());
    }
}
