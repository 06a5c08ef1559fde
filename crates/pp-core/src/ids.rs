//! Strongly typed identifier wrappers.
//!
//! Identifiers in the simulation's files are arbitrary strings (`"1234"`,
//! `"pt_42"`, `"a_b_c"`), so each ID wraps a `String`.  Wrapping keeps a
//! `LinkId` from being passed where a `ReceiverPointId` is expected.  All IDs
//! are `Clone + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.

use std::borrow::Borrow;
use std::fmt;

/// Generate a typed ID wrapper around a `String`.
macro_rules! string_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub String);

        impl $name {
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// A directed road-network link (one traversable road segment).
    pub struct LinkId;
}

string_id! {
    /// A road-network node.
    pub struct NodeId;
}

string_id! {
    /// A vehicle reported by traversal and emission events.
    pub struct VehicleId;
}

string_id! {
    /// A noise receiver point produced by the external noise stage.
    pub struct ReceiverPointId;
}
