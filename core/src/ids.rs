//! Identifier newtypes.
//!
//! Identifiers are assigned by the storage layer (sequences in PostgreSQL,
//! atomic counters in memory) and serialize as plain JSON integers.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw storage key.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// The raw storage key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Registered user.
    UserId
);

define_id!(
    /// Catalog movie.
    MovieId
);

define_id!(
    /// Review written by a user about a movie.
    ReviewId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_integers() {
        let json = serde_json::to_string(&MovieId::new(7)).unwrap();
        assert_eq!(json, "7");

        let parsed: ReviewId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, ReviewId(42));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(UserId(3).to_string(), "3");
    }
}
