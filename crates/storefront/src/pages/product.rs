//! Product detail page.

use lindo_core::ProductId;
use tracing::{instrument, warn};

use super::{Notice, PageState, optimistic};
use crate::api::Product;
use crate::error::AppError;
use crate::events::StoreEvent;
use crate::remote::Backend;
use crate::shop::Shop;

const RELATED_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductView {
    pub product: Product,
    /// Other products from the same category.
    pub related: Vec<Product>,
    pub wishlisted: bool,
}

/// The product page controller.
pub struct ProductPage<B> {
    shop: Shop<B>,
    state: PageState<ProductView>,
    notices: Vec<Notice>,
}

impl<B: Backend> ProductPage<B> {
    #[must_use]
    pub fn new(shop: Shop<B>) -> Self {
        Self {
            shop,
            state: PageState::Loading,
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PageState<ProductView> {
        &self.state
    }

    /// Drain pending toasts.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn load(&mut self, product_id: &ProductId) {
        self.state = PageState::Loading;
        self.state = PageState::from_result(self.fetch(product_id).await);
    }

    async fn fetch(&self, product_id: &ProductId) -> Result<ProductView, AppError> {
        let product = self.shop.backend().fetch_product(product_id).await?;

        // Related products and the heart are decoration; the page still
        // renders without them.
        let related = match product.category_id() {
            Some(category_id) => self
                .shop
                .backend()
                .fetch_products_by_category(category_id)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Could not load related products");
                    Vec::new()
                })
                .into_iter()
                .filter(|p| p.id != product.id)
                .take(RELATED_LIMIT)
                .collect(),
            None => Vec::new(),
        };
        let wishlisted = self.is_saved(&product.id).await;

        Ok(ProductView {
            product,
            related,
            wishlisted,
        })
    }

    async fn is_saved(&self, product_id: &ProductId) -> bool {
        match self.shop.load_wishlist().await {
            Ok(wishlist) => wishlist.contains(product_id),
            Err(e) => {
                warn!(error = %e, "Could not load wishlist");
                false
            }
        }
    }

    /// Whether the shown product is saved.
    #[must_use]
    pub fn is_wishlisted(&self) -> bool {
        self.state.loaded().is_some_and(|view| view.wishlisted)
    }

    /// Add the shown product to the cart.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&mut self, quantity: u32) {
        let Some(product) = self.state.loaded().map(|view| view.product.clone()) else {
            return;
        };

        match self.shop.add_to_cart(product.to_cart_item(quantity)).await {
            Ok(()) => self
                .notices
                .push(Notice::success(format!("{} added to cart", product.name))),
            Err(e) => {
                e.report();
                self.notices.push(Notice::error(format!(
                    "Could not add to cart. {}",
                    e.user_message()
                )));
            }
        }
    }

    /// Flip the heart.
    #[instrument(skip(self))]
    pub async fn toggle_wishlist(&mut self) {
        let Some(product_id) = self.state.loaded().map(|view| view.product.id.clone()) else {
            return;
        };

        let call = self.shop.toggle_wishlist(&product_id);
        let outcome = optimistic(
            &mut self.state,
            &mut self.notices,
            |view| view.wishlisted = !view.wishlisted,
            call,
            "Could not update wishlist",
        )
        .await;

        // The backend has the final say on which way the toggle went.
        if let (Some(outcome), Some(view)) = (outcome, self.state.loaded_mut()) {
            view.wishlisted = outcome.is_saved();
        }
    }

    /// React to a store event.
    pub async fn handle_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::UserLogin { .. } | StoreEvent::UserLogout => {
                if matches!(event, StoreEvent::UserLogin { .. })
                    && let Err(e) = self.shop.on_user_login().await
                {
                    e.report();
                }
                let Some(product_id) = self.state.loaded().map(|v| v.product.id.clone()) else {
                    return;
                };
                let saved = self.is_saved(&product_id).await;
                if let Some(view) = self.state.loaded_mut() {
                    view.wishlisted = saved;
                }
            }
            StoreEvent::CartUpdated | StoreEvent::WishlistUpdated | StoreEvent::Storage { .. } => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::events::EventBus;
    use crate::reconcile::Reconciler;
    use crate::storage::{LocalStorage, MemoryStore, Scope};
    use crate::testing::{FakeBackend, product};

    fn page() -> (ProductPage<FakeBackend>, Shop<FakeBackend>) {
        let storage = LocalStorage::new(Arc::new(MemoryStore::new()), EventBus::new());
        let backend = FakeBackend::new();
        backend.seed_products(vec![
            product("P1", 5000, "C1"),
            product("P2", 1500, "C1"),
            product("P3", 900, "C2"),
        ]);
        let shop = Shop::new(Arc::new(backend), storage, Reconciler::new());
        (ProductPage::new(shop.clone()), shop)
    }

    #[tokio::test]
    async fn test_load_with_related() {
        let (mut page, _) = page();
        page.load(&ProductId::from("P1")).await;

        let view = page.state().loaded().unwrap();
        let related: Vec<_> = view.related.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(related, vec!["P2"]);
        assert!(!page.is_wishlisted());
    }

    #[tokio::test]
    async fn test_missing_product_is_error() {
        let (mut page, _) = page();
        page.load(&ProductId::from("P404")).await;
        assert!(page.state().error().is_some());
    }

    #[tokio::test]
    async fn test_add_and_toggle() {
        let (mut page, shop) = page();
        page.load(&ProductId::from("P1")).await;

        page.add_to_cart(3).await;
        page.toggle_wishlist().await;

        assert!(page.is_wishlisted());
        let cart = shop.local().get_local_cart(&Scope::Guest);
        assert_eq!(cart.get(&ProductId::from("P1")).unwrap().quantity, 3);
        assert_eq!(page.take_notices().len(), 1);
    }
}
