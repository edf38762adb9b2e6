//! Storefront state shared by every page and command.

use std::path::Path;
use std::sync::Arc;

use lindo_core::Email;
use secrecy::SecretString;
use tracing::{info, instrument};

use crate::admin::AdminGate;
use crate::api::{LindoClient, LoginSession, Registration};
use crate::config::StorefrontConfig;
use crate::error::{AppError, add_breadcrumb, set_sentry_user};
use crate::events::{EventBus, StoreEvent};
use crate::profile::Profile;
use crate::reconcile::Reconciler;
use crate::shop::Shop;
use crate::storage::{FileStore, LocalStorage};

/// The storefront: configuration, REST client, local store and shop actions.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    client: Arc<LindoClient>,
    shop: Shop<LindoClient>,
    admin: AdminGate,
}

impl Storefront {
    /// Open the file-backed stores under the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or a store file
    /// cannot be opened.
    pub fn open(config: StorefrontConfig) -> Result<Self, AppError> {
        let events = EventBus::new();
        let local = LocalStorage::new(
            Arc::new(FileStore::open(config.local_store_path())?),
            events.clone(),
        );
        let session = LocalStorage::new(
            Arc::new(FileStore::open(config.session_store_path())?),
            events,
        );
        Self::with_storage(config, local, session)
    }

    /// Build over caller-supplied stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(
        config: StorefrontConfig,
        local: LocalStorage,
        session: LocalStorage,
    ) -> Result<Self, AppError> {
        let client = Arc::new(LindoClient::new(&config.api)?);
        let shop = Shop::new(Arc::clone(&client), local, Reconciler::new());
        let admin = AdminGate::new(config.admin.clone(), session);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                client,
                shop,
                admin,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn client(&self) -> &LindoClient {
        &self.inner.client
    }

    /// Shop actions over the REST client.
    #[must_use]
    pub fn shop(&self) -> &Shop<LindoClient> {
        &self.inner.shop
    }

    #[must_use]
    pub fn admin(&self) -> &AdminGate {
        &self.inner.admin
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        self.inner.shop.events()
    }

    /// Profile keys of the signed-in shopper.
    #[must_use]
    pub fn profile(&self) -> Option<Profile> {
        let email = self.shop().auth().email()?;
        Some(Profile::new(self.shop().local().storage().clone(), email))
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in, persist the session and announce `userLogin`.
    ///
    /// Reconciliation runs in whoever handles the event.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the credentials or the
    /// session cannot be stored.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<(), AppError> {
        let session = self.client().login(email, password).await?;
        self.start_session(&session, "Logged in")
    }

    /// Create an account and sign straight in.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration or the
    /// session cannot be stored.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<(), AppError> {
        let session = self.client().register(registration).await?;
        self.start_session(&session, "Registered")
    }

    fn start_session(&self, session: &LoginSession, action: &str) -> Result<(), AppError> {
        self.shop().auth().store_login(session)?;
        let email = &session.user.email;
        set_sentry_user(email.as_str());
        add_breadcrumb("auth", action, Some(&[("email", email.as_str())]));
        info!(%email, "{action}");
        self.events().emit(StoreEvent::UserLogin {
            email: email.clone(),
        });
        Ok(())
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// Returns an error if the session keys cannot be removed.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.shop().logout().await
    }

    /// Upload a profile picture from disk and remember its URL.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for guests, `BadRequest` if the file cannot be
    /// read, or the backend error.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn upload_avatar(&self, path: &Path) -> Result<String, AppError> {
        let auth = self.shop().require_credentials()?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("avatar");

        let url = self.client().upload_avatar(&auth, file_name, bytes).await?;
        Profile::new(self.shop().local().storage().clone(), auth.email).set_avatar(&url)?;
        info!(%url, "Avatar updated");
        Ok(url)
    }
}
