//! Wishlist page.

use lindo_core::{ProductId, Wishlist};
use tracing::{debug, instrument};

use super::{Notice, PageState, optimistic};
use crate::api::Product;
use crate::error::AppError;
use crate::events::StoreEvent;
use crate::remote::Backend;
use crate::shop::Shop;

/// Saved ids joined with catalog data.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistView {
    pub ids: Wishlist,
    /// Saved products still in the catalog, in wishlist order.
    pub products: Vec<Product>,
    /// Products unsaved on this page, kept so saving them again restores
    /// the card.
    unsaved: Vec<Product>,
}

impl WishlistView {
    fn new(ids: Wishlist, products: Vec<Product>) -> Self {
        Self {
            ids,
            products,
            unsaved: Vec::new(),
        }
    }

    fn toggle(&mut self, product_id: &ProductId) {
        if self.ids.toggle(product_id).is_saved() {
            if let Some(pos) = self.unsaved.iter().position(|p| &p.id == product_id) {
                let product = self.unsaved.remove(pos);
                self.products.push(product);
                let ids = &self.ids;
                self.products
                    .sort_by_key(|p| ids.iter().position(|id| id == &p.id));
            }
        } else if let Some(pos) = self.products.iter().position(|p| &p.id == product_id) {
            let product = self.products.remove(pos);
            self.unsaved.push(product);
        }
    }
}

/// The wishlist page controller.
pub struct WishlistPage<B> {
    shop: Shop<B>,
    state: PageState<WishlistView>,
    notices: Vec<Notice>,
}

impl<B: Backend> WishlistPage<B> {
    #[must_use]
    pub fn new(shop: Shop<B>) -> Self {
        Self {
            shop,
            state: PageState::Loading,
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PageState<WishlistView> {
        &self.state
    }

    /// Drain pending toasts.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetch the wishlist and the catalog, and join them.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        self.state = PageState::Loading;
        self.state = PageState::from_result(self.fetch().await);
    }

    async fn fetch(&self) -> Result<WishlistView, AppError> {
        let ids = self.shop.load_wishlist().await?;
        if ids.is_empty() {
            return Ok(WishlistView::new(ids, Vec::new()));
        }

        let catalog = self.shop.backend().fetch_products().await?;
        let products = ids
            .iter()
            .filter_map(|id| {
                let found = catalog.iter().find(|p| &p.id == id).cloned();
                if found.is_none() {
                    debug!(product_id = %id, "Saved product no longer in catalog");
                }
                found
            })
            .collect();

        Ok(WishlistView::new(ids, products))
    }

    /// Flip a product's membership.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle(&mut self, product_id: &ProductId) {
        let call = self.shop.toggle_wishlist(product_id);
        optimistic(
            &mut self.state,
            &mut self.notices,
            |view| view.toggle(product_id),
            call,
            "Could not update wishlist",
        )
        .await;
    }

    /// Put a saved product in the cart and unsave it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn move_to_cart(&mut self, product_id: &ProductId) {
        let Some(product) = self
            .state
            .loaded()
            .and_then(|view| view.products.iter().find(|p| &p.id == product_id))
            .cloned()
        else {
            debug!("Move to cart for a product not on the page");
            return;
        };

        if let Err(e) = self.shop.add_to_cart(product.to_cart_item(1)).await {
            e.report();
            self.notices.push(Notice::error(format!(
                "Could not add {} to cart. {}",
                product.name,
                e.user_message()
            )));
            return;
        }

        self.toggle(product_id).await;
        self.notices
            .push(Notice::success(format!("{} moved to cart", product.name)));
    }

    /// React to a store event.
    pub async fn handle_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::UserLogin { .. } => {
                if let Err(e) = self.shop.on_user_login().await {
                    e.report();
                    self.notices.push(Notice::error(e.user_message()));
                }
                self.load().await;
            }
            StoreEvent::UserLogout => self.load().await,
            StoreEvent::CartUpdated | StoreEvent::WishlistUpdated | StoreEvent::Storage { .. } => {}
        }
    }
}
