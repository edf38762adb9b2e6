//! Storage key layout.
//!
//! Collections are namespaced by [`Scope`]: the shopper's email when one is
//! known, otherwise the shared `guest` bucket. The canonical form is
//! `<collection>:<scope>`. Older builds wrote the wishlist as
//! `wishlist_<email>` and search history as `searchHistory` or
//! `searchHistory_<email>`; those are only ever read, through
//! [`legacy_wishlist`] and [`legacy_search_history`], and migrated on first
//! read.

use std::fmt;

use lindo_core::Email;

/// Stored email of the current shopper.
pub const USER_EMAIL: &str = "userEmail";
/// Bearer token.
pub const TOKEN: &str = "token";
/// Alternate bearer token key written by the registration flow.
pub const ACCESS_TOKEN: &str = "accessToken";
/// JSON blob describing the logged-in user, with a nested token.
pub const USER_DATA: &str = "userData";
/// Admin dashboard session flag (session store).
pub const ADMIN_SESSION: &str = "adminSession";

const GUEST: &str = "guest";

/// Storage namespace for per-shopper collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// No email known on this device.
    Guest,
    /// A specific shopper.
    User(Email),
}

impl Scope {
    /// The email, for user scopes.
    #[must_use]
    pub const fn email(&self) -> Option<&Email> {
        match self {
            Self::Guest => None,
            Self::User(email) => Some(email),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => f.write_str(GUEST),
            Self::User(email) => f.write_str(email.as_str()),
        }
    }
}

/// Cart lines for a scope.
#[must_use]
pub fn cart(scope: &Scope) -> String {
    format!("cart:{scope}")
}

/// Wishlist ids for a scope.
#[must_use]
pub fn wishlist(scope: &Scope) -> String {
    format!("wishlist:{scope}")
}

/// Pre-normalization wishlist keys for a scope.
#[must_use]
pub fn legacy_wishlist(scope: &Scope) -> Vec<String> {
    match scope {
        Scope::Guest => vec!["wishlist".to_string()],
        Scope::User(email) => vec![format!("wishlist_{email}")],
    }
}

/// Recent search queries for a scope.
#[must_use]
pub fn search_history(scope: &Scope) -> String {
    format!("searchHistory:{scope}")
}

/// Pre-normalization search history keys for a scope.
#[must_use]
pub fn legacy_search_history(scope: &Scope) -> Vec<String> {
    match scope {
        Scope::Guest => vec!["searchHistory".to_string()],
        Scope::User(email) => vec![format!("searchHistory_{email}")],
    }
}

/// Profile first name.
#[must_use]
pub fn first_name(email: &Email) -> String {
    format!("firstName:{email}")
}

/// Profile last name.
#[must_use]
pub fn last_name(email: &Email) -> String {
    format!("lastName:{email}")
}

/// Profile avatar URL.
#[must_use]
pub fn avatar(email: &Email) -> String {
    format!("userAvatar:{email}")
}

/// Saved shipping address.
#[must_use]
pub fn address(email: &Email) -> String {
    format!("address:{email}")
}
