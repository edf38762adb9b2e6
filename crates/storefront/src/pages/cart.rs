//! Cart page.

use lindo_core::{CartItem, CartLines, Price, ProductId};
use tracing::{debug, instrument};

use super::{Notice, PageState, optimistic};
use crate::events::StoreEvent;
use crate::remote::Backend;
use crate::shop::Shop;

/// The cart page controller.
pub struct CartPage<B> {
    shop: Shop<B>,
    state: PageState<CartLines>,
    notices: Vec<Notice>,
}

impl<B: Backend> CartPage<B> {
    #[must_use]
    pub fn new(shop: Shop<B>) -> Self {
        Self {
            shop,
            state: PageState::Loading,
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PageState<CartLines> {
        &self.state
    }

    /// Drain pending toasts.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetch the cart from wherever the auth state says it lives.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        self.state = PageState::Loading;
        self.state = PageState::from_result(self.shop.load_cart().await);
    }

    /// Try again after an error.
    pub async fn retry(&mut self) {
        self.load().await;
    }

    /// Add a line.
    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub async fn add(&mut self, item: CartItem) {
        let added = item.clone();
        let call = self.shop.add_to_cart(item);
        let done = optimistic(
            &mut self.state,
            &mut self.notices,
            |cart| cart.add(added),
            call,
            "Could not add to cart",
        )
        .await;
        if done.is_some() {
            self.notices.push(Notice::success("Added to cart"));
        }
    }

    /// Apply a +/- button press. Quantities never drop below one; a press
    /// that would do so is ignored.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn handle_quantity_change(&mut self, product_id: &ProductId, delta: i32) {
        let Some(current) = self
            .state
            .loaded()
            .and_then(|cart| cart.get(product_id))
            .map(|item| item.quantity)
        else {
            debug!("Quantity change for a line not on the page");
            return;
        };

        let call = self.shop.change_quantity(product_id, current, delta);
        optimistic(
            &mut self.state,
            &mut self.notices,
            |cart| {
                cart.change_quantity(product_id, delta);
            },
            call,
            "Could not update quantity",
        )
        .await;
    }

    /// Drop a line.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&mut self, product_id: &ProductId) {
        let call = self.shop.remove_item(product_id);
        optimistic(
            &mut self.state,
            &mut self.notices,
            |cart| {
                cart.remove(product_id);
            },
            call,
            "Could not remove item",
        )
        .await;
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) {
        let call = self.shop.clear_cart();
        optimistic(
            &mut self.state,
            &mut self.notices,
            CartLines::clear,
            call,
            "Could not clear cart",
        )
        .await;
    }

    /// Subtotal of what is on the page.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.state
            .loaded()
            .map_or_else(Price::zero, CartLines::subtotal)
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
