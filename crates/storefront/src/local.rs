//! Local store adapter: guest-mode cart and wishlist.
//!
//! Pure data access over [`LocalStorage`]; no network. Each collection is
//! read whole and written whole.

use lindo_core::{CartLines, Wishlist};

use crate::events::StoreEvent;
use crate::storage::keys::{self, Scope};
use crate::storage::{LocalStorage, StorageError};

/// Cart and wishlist collections in local storage.
#[derive(Clone)]
pub struct LocalStore {
    storage: LocalStorage,
}

impl LocalStore {
    #[must_use]
    pub const fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// The underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Cart lines for a scope, in insertion order. Missing or unreadable
    /// content is an empty cart.
    #[must_use]
    pub fn get_local_cart(&self, scope: &Scope) -> CartLines {
        self.storage
            .get_json(&keys::cart(scope))
            .unwrap_or_default()
    }

    /// Replace a scope's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_local_cart(&self, scope: &Scope, cart: &CartLines) -> Result<(), StorageError> {
        self.storage.set_json(&keys::cart(scope), cart)
    }

    /// Forget a scope's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    pub fn clear_local_cart(&self, scope: &Scope) -> Result<(), StorageError> {
        self.storage.remove(&keys::cart(scope))
    }

    /// Wishlist for a scope, migrating a legacy key on first read.
    #[must_use]
    pub fn get_local_wishlist(&self, scope: &Scope) -> Wishlist {
        self.storage
            .get_json_migrating(&keys::wishlist(scope), &keys::legacy_wishlist(scope))
            .unwrap_or_default()
    }

    /// Replace a scope's wishlist and announce `wishlist-updated`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_local_wishlist(
        &self,
        scope: &Scope,
        wishlist: &Wishlist,
    ) -> Result<(), StorageError> {
        self.storage.set_json(&keys::wishlist(scope), wishlist)?;
        self.storage.events().emit(StoreEvent::WishlistUpdated);
        Ok(())
    }

    /// Forget a scope's wishlist, legacy keys included.
    ///
    /// # Errors
    ///
    /// Returns an error if a removal fails.
    pub fn clear_local_wishlist(&self, scope: &Scope) -> Result<(), StorageError> {
        self.storage.remove(&keys::wishlist(scope))?;
        for legacy in keys::legacy_wishlist(scope) {
            self.storage.remove(&legacy)?;
        }
        self.storage.events().emit(StoreEvent::WishlistUpdated);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use lindo_core::{CartItem, Email, ProductId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::events::EventBus;
    use crate::storage::MemoryStore;

    fn store() -> LocalStore {
        LocalStore::new(LocalStorage::new(
            Arc::new(MemoryStore::new()),
            EventBus::new(),
        ))
    }

    fn item(id: &str, price: u32, quantity: u32) -> CartItem {
        CartItem::new(ProductId::from(id), id, Decimal::from(price), "", quantity)
    }

    #[test]
    fn test_add_present_product_increments() {
        let store = store();
        let mut cart = store.get_local_cart(&Scope::Guest);
        cart.add(item("P1", 5000, 1));
        store.save_local_cart(&Scope::Guest, &cart).unwrap();

        let mut cart = store.get_local_cart(&Scope::Guest);
        cart.add(item("P1", 5000, 1));
        store.save_local_cart(&Scope::Guest, &cart).unwrap();

        let cart = store.get_local_cart(&Scope::Guest);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ProductId::from("P1")).unwrap().quantity, 2);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let store = store();
        let mut cart = CartLines::new();
        cart.add(item("P1", 100, 1));
        assert!(cart.remove(&ProductId::from("P404")).is_none());
        store.save_local_cart(&Scope::Guest, &cart).unwrap();
        assert_eq!(store.get_local_cart(&Scope::Guest).len(), 1);
    }

    #[test]
    fn test_corrupt_cart_reads_empty() {
        let store = store();
        store.storage().set_raw("cart:guest", "[{oops").unwrap();
        assert!(store.get_local_cart(&Scope::Guest).is_empty());
    }

    #[test]
    fn test_scopes_do_not_merge() {
        let store = store();
        let a = Scope::User(Email::parse("a@lindo.rw").unwrap());
        let b = Scope::User(Email::parse("b@lindo.rw").unwrap());

        let mut cart = CartLines::new();
        cart.add(item("P1", 100, 1));
        store.save_local_cart(&a, &cart).unwrap();

        assert!(store.get_local_cart(&b).is_empty());
        assert!(store.get_local_cart(&Scope::Guest).is_empty());
    }

    #[test]
    fn test_wishlist_save_announces_update() {
        let store = store();
        let mut rx = store.storage().events().subscribe();

        let mut wishlist = Wishlist::new();
        wishlist.toggle(&ProductId::from("P2"));
        store.save_local_wishlist(&Scope::Guest, &wishlist).unwrap();

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(events.contains(&StoreEvent::WishlistUpdated));
        assert_eq!(store.get_local_wishlist(&Scope::Guest), wishlist);
    }

    #[test]
    fn test_legacy_wishlist_migrates() {
        let store = store();
        let scope = Scope::User(Email::parse("a@lindo.rw").unwrap());
        store
            .storage()
            .set_raw("wishlist_a@lindo.rw", r#"["P1","P2"]"#)
            .unwrap();

        let wishlist = store.get_local_wishlist(&scope);
        assert_eq!(wishlist.len(), 2);
        assert!(store.storage().contains("wishlist:a@lindo.rw"));
        assert!(!store.storage().contains("wishlist_a@lindo.rw"));
    }
}
