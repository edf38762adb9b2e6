//! Cart and wishlist actions shared by every page.
//!
//! Each action branches on the auth state: signed-in shoppers go to the
//! backend, guests go to local storage. Pages never make that choice
//! themselves.

use std::sync::Arc;

use lindo_core::{CartItem, CartLines, ProductId, Wishlist, WishlistToggle};
use tracing::{debug, info, instrument, warn};

use crate::auth::{AuthState, Credentials};
use crate::error::{AppError, clear_sentry_user};
use crate::events::{EventBus, StoreEvent};
use crate::local::LocalStore;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::remote::Backend;
use crate::storage::LocalStorage;

/// The shared shop actions over a backend.
pub struct Shop<B> {
    backend: Arc<B>,
    auth: AuthState,
    local: LocalStore,
    reconciler: Reconciler,
}

impl<B> Clone for Shop<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            auth: self.auth.clone(),
            local: self.local.clone(),
            reconciler: self.reconciler.clone(),
        }
    }
}

impl<B: Backend> Shop<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, storage: LocalStorage, reconciler: Reconciler) -> Self {
        Self {
            backend,
            auth: AuthState::new(storage.clone()),
            local: LocalStore::new(storage),
            reconciler,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    #[must_use]
    pub const fn local(&self) -> &LocalStore {
        &self.local
    }

    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    #[must_use]
    pub const fn events(&self) -> &EventBus {
        self.local.storage().events()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// The current cart: the server's when signed in, else the local one.
    ///
    /// Prefers the product-joined server cart and falls back to the bare one.
    ///
    /// # Errors
    ///
    /// Returns an error if both server reads fail.
    #[instrument(skip(self))]
    pub async fn load_cart(&self) -> Result<CartLines, AppError> {
        let Some(auth) = self.auth.credentials() else {
            return Ok(self.local.get_local_cart(&self.auth.scope()));
        };

        match self.backend.fetch_user_cart_with_products(&auth).await {
            Ok(cart) => Ok(cart),
            Err(e) => {
                warn!(error = %e, "Cart with products failed, falling back to bare cart");
                Ok(self.backend.fetch_user_cart(&auth).await?)
            }
        }
    }

    /// Add a line, merging with an existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend or local storage rejects the change.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub async fn add_to_cart(&self, item: CartItem) -> Result<(), AppError> {
        if let Some(auth) = self.auth.credentials() {
            self.backend.add_to_cart_server(&auth, &item).await?;
            self.events().emit(StoreEvent::CartUpdated);
            return Ok(());
        }

        let scope = self.auth.scope();
        let mut cart = self.local.get_local_cart(&scope);
        cart.add(item);
        self.local.save_local_cart(&scope, &cart)?;
        Ok(())
    }

    /// Move a line's quantity by `delta`, clamped at one. Returns the new
    /// quantity; an unchanged quantity makes no call at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend or local storage rejects the change.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn change_quantity(
        &self,
        product_id: &ProductId,
        current: u32,
        delta: i32,
    ) -> Result<u32, AppError> {
        let target = clamped_quantity(current, delta);
        if target == current {
            debug!(current, "Quantity unchanged");
            return Ok(current);
        }

        if let Some(auth) = self.auth.credentials() {
            if target > current {
                self.backend
                    .increase_cart_item_quantity(&auth, product_id, target - current)
                    .await?;
            } else {
                for _ in target..current {
                    self.backend.reduce_from_cart_server(&auth, product_id).await?;
                }
            }
            self.events().emit(StoreEvent::CartUpdated);
            return Ok(target);
        }

        let scope = self.auth.scope();
        let mut cart = self.local.get_local_cart(&scope);
        if !cart.set_quantity(product_id, target) {
            return Err(AppError::NotFound(format!("Cart item {product_id}")));
        }
        self.local.save_local_cart(&scope, &cart)?;
        Ok(target)
    }

    /// Drop a line. Dropping an absent line is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend or local storage rejects the change.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<(), AppError> {
        if let Some(auth) = self.auth.credentials() {
            self.backend.remove_from_cart_server(&auth, product_id).await?;
            self.events().emit(StoreEvent::CartUpdated);
            return Ok(());
        }

        let scope = self.auth.scope();
        let mut cart = self.local.get_local_cart(&scope);
        if cart.remove(product_id).is_some() {
            self.local.save_local_cart(&scope, &cart)?;
        }
        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend or local storage rejects the change.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), AppError> {
        if let Some(auth) = self.auth.credentials() {
            self.backend.clear_cart_server(&auth).await?;
            self.events().emit(StoreEvent::CartUpdated);
            return Ok(());
        }
        self.local.clear_local_cart(&self.auth.scope())?;
        Ok(())
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// The current wishlist: the server's when signed in, else the local one.
    ///
    /// # Errors
    ///
    /// Returns an error if the server read fails.
    #[instrument(skip(self))]
    pub async fn load_wishlist(&self) -> Result<Wishlist, AppError> {
        match self.auth.credentials() {
            Some(auth) => Ok(self.backend.fetch_user_wishlist(&auth).await?),
            None => Ok(self.local.get_local_wishlist(&self.auth.scope())),
        }
    }

    /// Flip a product's membership and report which way it went.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend or local storage rejects the change;
    /// nothing is persisted in that case.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle_wishlist(&self, product_id: &ProductId) -> Result<WishlistToggle, AppError> {
        if let Some(auth) = self.auth.credentials() {
            let outcome = self.backend.toggle_wishlist_product(&auth, product_id).await?;
            self.events().emit(StoreEvent::WishlistUpdated);
            return Ok(outcome);
        }

        let scope = self.auth.scope();
        let mut wishlist = self.local.get_local_wishlist(&scope);
        let outcome = wishlist.toggle(product_id);
        self.local.save_local_wishlist(&scope, &wishlist)?;
        Ok(outcome)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Handle `userLogin`: replay the guest cart and wishlist.
    ///
    /// Safe to call for every page that saw the event; only the first call
    /// per login does anything.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if no session is stored, or a storage error if
    /// the local buckets cannot be cleared.
    #[instrument(skip(self))]
    pub async fn on_user_login(&self) -> Result<Vec<ReconcileReport>, AppError> {
        let auth = self.require_credentials()?;
        let cart = self
            .reconciler
            .reconcile_cart(self.backend.as_ref(), &self.local, &auth)
            .await?;
        let wishlist = self
            .reconciler
            .reconcile_wishlist(self.backend.as_ref(), &self.local, &auth)
            .await?;
        if !cart.skipped || !wishlist.skipped {
            self.events().emit(StoreEvent::CartUpdated);
            self.events().emit(StoreEvent::WishlistUpdated);
        }
        Ok(vec![cart, wishlist])
    }

    /// Forget the session and re-arm reconciliation for the next login.
    ///
    /// # Errors
    ///
    /// Returns an error if the session keys cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AppError> {
        self.auth.logout()?;
        self.reconciler.reset().await;
        clear_sentry_user();
        info!("Logged out");
        Ok(())
    }

    /// Stored credentials, or `Unauthorized`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when no complete session is stored.
    pub fn require_credentials(&self) -> Result<Credentials, AppError> {
        self.auth
            .credentials()
            .ok_or_else(|| AppError::Unauthorized("Please log in to continue".to_string()))
    }
}

/// `current + delta`, never below one.
fn clamped_quantity(current: u32, delta: i32) -> u32 {
    let target = i64::from(current) + i64::from(delta);
    u32::try_from(target.max(1)).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lindo_core::Email;
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::{MemoryStore, Scope, keys};
    use crate::testing::FakeBackend;

    fn shop() -> (Shop<FakeBackend>, LocalStorage) {
        let storage = LocalStorage::new(Arc::new(MemoryStore::new()), EventBus::new());
        let shop = Shop::new(
            Arc::new(FakeBackend::new()),
            storage.clone(),
            Reconciler::new(),
        );
        (shop, storage)
    }

    fn sign_in(storage: &LocalStorage) {
        storage.set_raw(keys::TOKEN, "tok").unwrap();
        storage.set_raw(keys::USER_EMAIL, "mama@lindo.rw").unwrap();
    }

    fn item(id: &str, price: u32, quantity: u32) -> CartItem {
        CartItem::new(ProductId::from(id), id, Decimal::from(price), "", quantity)
    }

    #[test]
    fn test_clamped_quantity() {
        assert_eq!(clamped_quantity(1, -1), 1);
        assert_eq!(clamped_quantity(3, -10), 1);
        assert_eq!(clamped_quantity(2, 3), 5);
    }

    #[tokio::test]
    async fn test_guest_actions_stay_local() {
        let (shop, _) = shop();
        shop.add_to_cart(item("P1", 5000, 1)).await.unwrap();
        shop.add_to_cart(item("P1", 5000, 1)).await.unwrap();

        let cart = shop.load_cart().await.unwrap();
        assert_eq!(cart.get(&ProductId::from("P1")).unwrap().quantity, 2);
        assert_eq!(shop.backend().calls_to("add_to_cart_server"), 0);

        let quantity = shop
            .change_quantity(&ProductId::from("P1"), 2, -5)
            .await
            .unwrap();
        assert_eq!(quantity, 1);
        assert_eq!(
            shop.local().get_local_cart(&Scope::Guest).item_count(),
            1
        );
    }

    #[tokio::test]
    async fn test_signed_in_actions_go_remote() {
        let (shop, storage) = shop();
        sign_in(&storage);

        shop.add_to_cart(item("P1", 5000, 2)).await.unwrap();
        shop.change_quantity(&ProductId::from("P1"), 2, -1)
            .await
            .unwrap();

        assert_eq!(
            shop.backend().cart().get(&ProductId::from("P1")).unwrap().quantity,
            1
        );
        let scope = Scope::User(Email::parse("mama@lindo.rw").unwrap());
        assert!(shop.local().get_local_cart(&scope).is_empty());
    }

    #[tokio::test]
    async fn test_decrement_at_one_makes_no_call() {
        let (shop, storage) = shop();
        sign_in(&storage);
        shop.backend().seed_cart(vec![item("P1", 100, 1)]);

        let quantity = shop
            .change_quantity(&ProductId::from("P1"), 1, -1)
            .await
            .unwrap();
        assert_eq!(quantity, 1);
        assert_eq!(shop.backend().calls_to("reduce_from_cart_server"), 0);
    }

    #[tokio::test]
    async fn test_cart_prefers_joined_list() {
        let (shop, storage) = shop();
        sign_in(&storage);
        shop.backend().seed_cart(vec![item("P1", 100, 1)]);

        assert_eq!(shop.load_cart().await.unwrap().len(), 1);
        assert_eq!(shop.backend().calls_to("fetch_user_cart_with_products"), 1);
        assert_eq!(shop.backend().calls_to("fetch_user_cart"), 0);
    }

    #[tokio::test]
    async fn test_cart_falls_back_to_bare_list() {
        let (shop, storage) = shop();
        sign_in(&storage);
        shop.backend()
            .seed_cart(vec![item("P1", 100, 1), item("P2", 250, 3)]);
        shop.backend().fail_joined_cart();

        let cart = shop.load_cart().await.unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(&ProductId::from("P2")).unwrap().quantity, 3);
        assert_eq!(shop.backend().calls_to("fetch_user_cart_with_products"), 1);
        assert_eq!(shop.backend().calls_to("fetch_user_cart"), 1);
    }

    #[tokio::test]
    async fn test_guest_toggle_twice_is_identity() {
        let (shop, _) = shop();
        let before = shop.load_wishlist().await.unwrap();

        let id = ProductId::from("P2");
        assert_eq!(shop.toggle_wishlist(&id).await.unwrap(), WishlistToggle::Added);
        assert_eq!(shop.toggle_wishlist(&id).await.unwrap(), WishlistToggle::Removed);

        assert_eq!(shop.load_wishlist().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_login_reconciles_once_and_logout_rearms() {
        let (shop, storage) = shop();
        shop.add_to_cart(item("P1", 5000, 2)).await.unwrap();
        sign_in(&storage);

        let reports = shop.on_user_login().await.unwrap();
        assert!(reports.iter().all(|r| !r.skipped));
        let reports = shop.on_user_login().await.unwrap();
        assert!(reports.iter().all(|r| r.skipped));
        assert_eq!(
            shop.backend().cart().get(&ProductId::from("P1")).unwrap().quantity,
            2
        );

        shop.logout().await.unwrap();
        assert!(!shop.is_logged_in());
        assert!(matches!(
            shop.on_user_login().await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
