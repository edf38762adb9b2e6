//! Cart and wishlist counters in the site header.

use tracing::debug;

use crate::events::StoreEvent;
use crate::remote::Backend;
use crate::shop::Shop;
use crate::storage::keys;

/// Header badge counts. A failed refresh keeps the previous numbers.
pub struct HeaderBadges<B> {
    shop: Shop<B>,
    cart_count: u32,
    wishlist_count: usize,
}

impl<B: Backend> HeaderBadges<B> {
    #[must_use]
    pub const fn new(shop: Shop<B>) -> Self {
        Self {
            shop,
            cart_count: 0,
            wishlist_count: 0,
        }
    }

    /// Units in the cart.
    #[must_use]
    pub const fn cart_count(&self) -> u32 {
        self.cart_count
    }

    /// Saved products.
    #[must_use]
    pub const fn wishlist_count(&self) -> usize {
        self.wishlist_count
    }

    /// Re-read both counts.
    pub async fn refresh(&mut self) {
        self.refresh_cart().await;
        self.refresh_wishlist().await;
    }

    async fn refresh_cart(&mut self) {
        match self.shop.load_cart().await {
            Ok(cart) => self.cart_count = cart.item_count(),
            Err(e) => debug!(error = %e, "Keeping stale cart badge"),
        }
    }

    async fn refresh_wishlist(&mut self) {
        match self.shop.load_wishlist().await {
            Ok(wishlist) => self.wishlist_count = wishlist.len(),
            Err(e) => debug!(error = %e, "Keeping stale wishlist badge"),
        }
    }

    /// React to a store event.
    pub async fn handle_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::UserLogin { .. } | StoreEvent::UserLogout => self.refresh().await,
            StoreEvent::CartUpdated => self.refresh_cart().await,
            StoreEvent::WishlistUpdated => self.refresh_wishlist().await,
            StoreEvent::Storage { key } => {
                if key.starts_with("cart:") {
                    self.refresh_cart().await;
                } else if key.starts_with("wishlist") {
                    self.refresh_wishlist().await;
                } else if [keys::TOKEN, keys::ACCESS_TOKEN, keys::USER_EMAIL, keys::USER_DATA]
                    .contains(&key.as_str())
                {
                    self.refresh().await;
                }
            }
        }
    }
}
