//! Auth state reader.
//!
//! A shopper counts as logged in when local storage holds both a bearer token
//! and an email. Nothing here checks the token with the backend or looks at
//! its expiry: a stale token is only discovered when a remote call comes back
//! `401`, which surfaces as [`ApiError::Unauthorized`](crate::api::ApiError).

use std::fmt;

use lindo_core::Email;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::api::types::LoginSession;
use crate::events::StoreEvent;
use crate::storage::keys::{self, Scope};
use crate::storage::{LocalStorage, StorageError};

/// JSON pointers probed inside `userData` for a nested token.
const USER_DATA_TOKEN_POINTERS: &[&str] = &["/token", "/accessToken", "/data/token", "/user/token"];

/// Opaque bearer token. Never printed.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::from(raw.into()))
    }

    /// `Authorization` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }

    /// The raw token, for persisting.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Everything a remote call needs to act for a shopper.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Bearer token sent in `Authorization`.
    pub token: BearerToken,
    /// The shopper's email, which also names their storage scope.
    pub email: Email,
}

impl Credentials {
    /// Storage scope of these credentials.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::User(self.email.clone())
    }
}

/// Reads and writes the stored session marker.
#[derive(Clone)]
pub struct AuthState {
    storage: LocalStorage,
}

impl AuthState {
    /// Reader over the given storage.
    #[must_use]
    pub const fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// True iff both a token and an email are stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token().is_some() && self.email().is_some()
    }

    /// The stored bearer token, from `token`, `accessToken`, or the nested
    /// token inside `userData`, in that order. Empty values count as absent.
    #[must_use]
    pub fn token(&self) -> Option<BearerToken> {
        let direct = [keys::TOKEN, keys::ACCESS_TOKEN]
            .into_iter()
            .filter_map(|key| self.storage.get_raw(key))
            .map(|raw| raw.trim().trim_matches('"').to_string())
            .find(|raw| !raw.is_empty());

        direct
            .or_else(|| self.user_data_token())
            .map(BearerToken::new)
    }

    fn user_data_token(&self) -> Option<String> {
        let user_data: Value = self.storage.get_json(keys::USER_DATA)?;
        USER_DATA_TOKEN_POINTERS
            .iter()
            .filter_map(|pointer| user_data.pointer(pointer))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|token| !token.is_empty())
            .map(str::to_string)
    }

    /// The stored email, if present and valid.
    #[must_use]
    pub fn email(&self) -> Option<Email> {
        let raw = self.storage.get_raw(keys::USER_EMAIL)?;
        match Email::parse(raw.trim_matches('"')) {
            Ok(email) => Some(email),
            Err(e) => {
                debug!(error = %e, "Ignoring invalid stored email");
                None
            }
        }
    }

    /// Token and email together, when logged in.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            token: self.token()?,
            email: self.email()?,
        })
    }

    /// Scope for local collections: the stored email, even without a token,
    /// else the guest bucket.
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.email().map_or(Scope::Guest, Scope::User)
    }

    /// Persist a successful login: token, email, `userData` and profile
    /// names.
    ///
    /// Does not announce `userLogin`; the login flow does that once every
    /// key is written.
    ///
    /// # Errors
    ///
    /// Returns an error if any key cannot be written.
    pub fn store_login(&self, session: &LoginSession) -> Result<(), StorageError> {
        let email = &session.user.email;
        self.storage.set_raw(keys::TOKEN, session.token.expose())?;
        self.storage.set_raw(keys::USER_EMAIL, email.as_str())?;
        self.storage.set_json(
            keys::USER_DATA,
            &json!({
                "token": session.token.expose(),
                "email": email,
                "firstName": session.user.first_name,
                "lastName": session.user.last_name,
            }),
        )?;
        if let Some(first) = &session.user.first_name {
            self.storage.set_raw(&keys::first_name(email), first)?;
        }
        if let Some(last) = &session.user.last_name {
            self.storage.set_raw(&keys::last_name(email), last)?;
        }
        if let Some(avatar) = &session.user.avatar {
            self.storage.set_raw(&keys::avatar(email), avatar)?;
        }
        info!(%email, "Stored login session");
        Ok(())
    }

    /// Forget the session marker and announce `UserLogout`.
    ///
    /// Per-scope collections and profile keys stay on the device.
    ///
    /// # Errors
    ///
    /// Returns an error if a key cannot be removed.
    pub fn logout(&self) -> Result<(), StorageError> {
        for key in [keys::TOKEN, keys::ACCESS_TOKEN, keys::USER_DATA, keys::USER_EMAIL] {
            self.storage.remove(key)?;
        }
        self.storage.events().emit(StoreEvent::UserLogout);
        info!("Cleared login session");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::types::UserProfile;
    use crate::events::EventBus;
    use crate::storage::MemoryStore;

    fn auth() -> (AuthState, LocalStorage) {
        let storage = LocalStorage::new(Arc::new(MemoryStore::new()), EventBus::new());
        (AuthState::new(storage.clone()), storage)
    }

    #[test]
    fn test_logged_in_requires_token_and_email() {
        let (auth, storage) = auth();
        assert!(!auth.is_logged_in());

        storage.set_raw(keys::TOKEN, "tok").unwrap();
        assert!(!auth.is_logged_in(), "token alone is not a session");

        storage.remove(keys::TOKEN).unwrap();
        storage.set_raw(keys::USER_EMAIL, "mama@lindo.rw").unwrap();
        assert!(!auth.is_logged_in(), "email alone is not a session");

        storage.set_raw(keys::TOKEN, "tok").unwrap();
        assert!(auth.is_logged_in());
    }

    #[test]
    fn test_token_validity_is_not_checked() {
        let (auth, storage) = auth();
        storage.set_raw(keys::USER_EMAIL, "mama@lindo.rw").unwrap();
        storage.set_raw(keys::TOKEN, "expired.jwt.garbage").unwrap();
        assert!(auth.is_logged_in());
    }

    #[test]
    fn test_empty_token_counts_as_absent() {
        let (auth, storage) = auth();
        storage.set_raw(keys::USER_EMAIL, "mama@lindo.rw").unwrap();
        storage.set_raw(keys::TOKEN, "  ").unwrap();
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn test_token_fallbacks() {
        let (auth, storage) = auth();
        storage.set_raw(keys::ACCESS_TOKEN, "from-access").unwrap();
        assert_eq!(auth.token().unwrap().expose(), "from-access");

        storage.remove(keys::ACCESS_TOKEN).unwrap();
        storage
            .set_json(keys::USER_DATA, &json!({"data": {"token": "nested"}}))
            .unwrap();
        assert_eq!(auth.token().unwrap().expose(), "nested");

        storage.set_raw(keys::USER_DATA, "{broken").unwrap();
        assert!(auth.token().is_none());
    }

    #[test]
    fn test_invalid_email_counts_as_absent() {
        let (auth, storage) = auth();
        storage.set_raw(keys::TOKEN, "tok").unwrap();
        storage.set_raw(keys::USER_EMAIL, "not-an-email").unwrap();
        assert!(!auth.is_logged_in());
        assert_eq!(auth.scope(), Scope::Guest);
    }

    #[test]
    fn test_store_login_then_logout() {
        let (auth, storage) = auth();
        let session = LoginSession {
            token: BearerToken::new("tok-1"),
            user: UserProfile {
                email: Email::parse("mama@lindo.rw").unwrap(),
                first_name: Some("Aline".to_string()),
                last_name: None,
                avatar: None,
            },
        };

        auth.store_login(&session).unwrap();
        assert!(auth.is_logged_in());
        assert_eq!(storage.get_raw("firstName:mama@lindo.rw").as_deref(), Some("Aline"));

        let mut rx = storage.events().subscribe();
        auth.logout().unwrap();
        assert!(!auth.is_logged_in());
        assert_eq!(auth.scope(), Scope::Guest);

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(events.last(), Some(&StoreEvent::UserLogout));
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = BearerToken::new("super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
        assert_eq!(token.header_value(), "Bearer super-secret");
    }
}
