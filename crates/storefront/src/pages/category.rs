//! Category listing page.

use lindo_core::{CategoryId, ProductId, Wishlist};
use tracing::{instrument, warn};

use super::{Notice, PageState, optimistic};
use crate::api::{Category, Product};
use crate::error::AppError;
use crate::events::StoreEvent;
use crate::remote::Backend;
use crate::shop::Shop;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryView {
    /// Every category, for the side menu.
    pub categories: Vec<Category>,
    /// The selected category, if the backend knows it.
    pub category: Option<Category>,
    pub products: Vec<Product>,
    /// Saved ids, for the hearts.
    pub wishlist: Wishlist,
}

/// The category page controller.
pub struct CategoryPage<B> {
    shop: Shop<B>,
    state: PageState<CategoryView>,
    notices: Vec<Notice>,
}

impl<B: Backend> CategoryPage<B> {
    #[must_use]
    pub fn new(shop: Shop<B>) -> Self {
        Self {
            shop,
            state: PageState::Loading,
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PageState<CategoryView> {
        &self.state
    }

    /// Drain pending toasts.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn load(&mut self, category_id: &CategoryId) {
        self.state = PageState::Loading;
        self.state = PageState::from_result(self.fetch(category_id).await);
    }

    async fn fetch(&self, category_id: &CategoryId) -> Result<CategoryView, AppError> {
        let backend = self.shop.backend();
        let categories = backend.fetch_categories().await?;
        let products = backend.fetch_products_by_category(category_id).await?;
        let category = categories.iter().find(|c| &c.id == category_id).cloned();

        let wishlist = self.shop.load_wishlist().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not load wishlist");
            Wishlist::new()
        });

        Ok(CategoryView {
            categories,
            category,
            products,
            wishlist,
        })
    }

    /// Add one of a listed product to the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&mut self, product_id: &ProductId) {
        let Some(product) = self
            .state
            .loaded()
            .and_then(|view| view.products.iter().find(|p| &p.id == product_id))
            .cloned()
        else {
            return;
        };

        match self.shop.add_to_cart(product.to_cart_item(1)).await {
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

    /// Flip a listed product's heart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle_wishlist(&mut self, product_id: &ProductId) {
        let call = self.shop.toggle_wishlist(product_id);
        optimistic(
            &mut self.state,
            &mut self.notices,
            |view| {
                view.wishlist.toggle(product_id);
            },
            call,
            "Could not update wishlist",
        )
        .await;
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
                let wishlist = self.shop.load_wishlist().await.unwrap_or_default();
                if let Some(view) = self.state.loaded_mut() {
                    view.wishlist = wishlist;
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
    use crate::storage::{LocalStorage, MemoryStore};
    use crate::testing::{FakeBackend, product};

    fn page() -> (CategoryPage<FakeBackend>, Shop<FakeBackend>) {
        let storage = LocalStorage::new(Arc::new(MemoryStore::new()), EventBus::new());
        let backend = FakeBackend::new();
        backend.seed_categories(&[("C1", "Diapers"), ("C2", "Feeding")]);
        backend.seed_products(vec![product("P1", 5000, "C1"), product("P3", 900, "C2")]);
        let shop = Shop::new(Arc::new(backend), storage, Reconciler::new());
        (CategoryPage::new(shop.clone()), shop)
    }

    #[tokio::test]
    async fn test_load_category() {
        let (mut page, _) = page();
        page.load(&CategoryId::from("C2")).await;

        let view = page.state().loaded().unwrap();
        assert_eq!(view.categories.len(), 2);
        assert_eq!(view.category.as_ref().unwrap().name, "Feeding");
        assert_eq!(view.products.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_page_error() {
        let (mut page, shop) = page();
        shop.backend().fail_catalog_with(Some(502));
        page.load(&CategoryId::from("C1")).await;
        assert!(page.state().error().is_some());
    }

    #[tokio::test]
    async fn test_toggle_heart() {
        let (mut page, _) = page();
        page.load(&CategoryId::from("C1")).await;
        page.toggle_wishlist(&ProductId::from("P1")).await;
        page.add_to_cart(&ProductId::from("P1")).await;

        let view = page.state().loaded().unwrap();
        assert!(view.wishlist.contains(&ProductId::from("P1")));
        assert_eq!(page.take_notices().len(), 1);
    }
}
