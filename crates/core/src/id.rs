// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! ID generation abstractions.

/// Define a newtype ID wrapper around a random 128-bit UUID.
///
/// Generates `new()` for random ID generation, `parse()` for reading stored
/// values, `short()` for log-friendly truncation, plus `Display`, `Default`,
/// and `From<uuid::Uuid>` implementations. Serialized transparently as the
/// hyphenated string form.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct JobId;
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Generate a new random ID.
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Parse an ID from its hyphenated string form.
            pub fn parse(s: &str) -> Option<Self> {
                uuid::Uuid::parse_str(s).ok().map(Self)
            }

            /// First eight characters of the hyphenated form, for logs.
            pub fn short(&self) -> String {
                let mut s = self.0.to_string();
                s.truncate(8);
                s
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(u: uuid::Uuid) -> Self {
                Self(u)
            }
        }
    };
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
