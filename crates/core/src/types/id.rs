//! Newtype IDs for type-safe entity references.
//!
//! The Lindo backend identifies products, categories and orders with opaque
//! strings (document ids). Use the `define_id!` macro to create wrappers that
//! prevent accidentally mixing ids from different entity types.

use thiserror::Error;

/// Errors that can occur when parsing an id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input was empty or whitespace only.
    #[error("id cannot be empty")]
    Empty,
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()` which trims and rejects empty input
/// - `Display`, `AsRef<str>`, `FromStr` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use lindo_core::define_id;
/// define_id!(ShelfId);
/// define_id!(BinId);
///
/// let shelf = ShelfId::parse("a1").unwrap();
/// let bin = BinId::parse("a1").unwrap();
/// assert_eq!(shelf.as_str(), bin.as_str());
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = bin;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an id, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`IdError::Empty`](crate::IdError::Empty) if nothing
            /// remains after trimming.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::IdError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err($crate::IdError::Empty);
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the id and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            /// Wrap a backend-provided id without validation.
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

define_id!(ProductId);
define_id!(CategoryId);
define_id!(OrderId);
