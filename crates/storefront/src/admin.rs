//! Vendor dashboard gate.
//!
//! Compares a username and password against the configured pair and sets the
//! `adminSession` flag in the session store. This only hides dashboard
//! screens on the device; it is not an authentication boundary, and the
//! backend never sees it.

use secrecy::ExposeSecret;
use tracing::{info, instrument, warn};

use crate::config::AdminConfig;
use crate::error::{AppError, add_breadcrumb};
use crate::storage::{LocalStorage, keys};

const SESSION_FLAG: &str = "true";

/// Admin gate over the session store.
#[derive(Debug, Clone)]
pub struct AdminGate {
    config: Option<AdminConfig>,
    session: LocalStorage,
}

impl AdminGate {
    /// A gate; `None` config disables admin login entirely.
    #[must_use]
    pub const fn new(config: Option<AdminConfig>, session: LocalStorage) -> Self {
        Self { config, session }
    }

    /// Whether admin credentials are configured at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Whether the session flag is set.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.get_raw(keys::ADMIN_SESSION).as_deref() == Some(SESSION_FLAG)
    }

    /// Check the pair and set the session flag.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the gate is disabled or the pair does not
    /// match, or a storage error if the flag cannot be written.
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<(), AppError> {
        let Some(config) = &self.config else {
            warn!("Admin login attempted with no admin credentials configured");
            return Err(AppError::Unauthorized(
                "Admin access is not configured".to_string(),
            ));
        };

        // Evaluate both so a wrong username costs the same as a wrong password.
        let user_ok = constant_time_compare(&config.username, username);
        let pass_ok = constant_time_compare(config.password.expose_secret(), password);
        if !(user_ok && pass_ok) {
            warn!("Admin login rejected");
            return Err(AppError::Unauthorized(
                "Invalid admin credentials".to_string(),
            ));
        }

        self.session.set_raw(keys::ADMIN_SESSION, SESSION_FLAG)?;
        add_breadcrumb("admin", "Admin session started", None);
        info!("Admin session started");
        Ok(())
    }

    /// Clear the session flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be removed.
    pub fn logout(&self) -> Result<(), AppError> {
        self.session.remove(keys::ADMIN_SESSION)?;
        info!("Admin session ended");
        Ok(())
    }
}

/// Constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;

    use super::*;
    use crate::events::EventBus;
    use crate::storage::MemoryStore;

    fn gate(config: Option<AdminConfig>) -> AdminGate {
        let session = LocalStorage::new(Arc::new(MemoryStore::new()), EventBus::new());
        AdminGate::new(config, session)
    }

    fn config() -> AdminConfig {
        AdminConfig {
            username: "vendor".to_string(),
            password: SecretString::from("k8#Lm2!qZr9w"),
        }
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "hellp"));
        assert!(!constant_time_compare("hello", "helloo"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let shown = format!("{:?}", gate(Some(config())));
        assert!(shown.contains("vendor"));
        assert!(!shown.contains("k8#Lm2!qZr9w"));
    }

    #[test]
    fn test_login_and_logout() {
        let gate = gate(Some(config()));
        assert!(!gate.is_admin());

        assert!(gate.login("vendor", "wrong-password").is_err());
        assert!(!gate.is_admin());

        gate.login("vendor", "k8#Lm2!qZr9w").unwrap();
        assert!(gate.is_admin());

        gate.logout().unwrap();
        assert!(!gate.is_admin());
    }

    #[test]
    fn test_disabled_gate_rejects_everything() {
        let gate = gate(None);
        assert!(!gate.is_enabled());
        assert!(matches!(
            gate.login("", ""),
            Err(AppError::Unauthorized(_))
        ));
    }
}
