//! Search page and per-scope search history.

use lindo_core::{ProductId, Wishlist};
use tracing::{instrument, warn};

use super::{Notice, PageState, optimistic};
use crate::api::Product;
use crate::error::AppError;
use crate::events::StoreEvent;
use crate::remote::Backend;
use crate::shop::Shop;
use crate::storage::keys;

/// Most recent queries kept per scope.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub products: Vec<Product>,
    /// Saved ids, for the hearts.
    pub wishlist: Wishlist,
}

/// The search page controller.
pub struct SearchPage<B> {
    shop: Shop<B>,
    state: PageState<SearchResults>,
    history: Vec<String>,
    notices: Vec<Notice>,
}

impl<B: Backend> SearchPage<B> {
    /// A page with the current scope's history loaded.
    #[must_use]
    pub fn new(shop: Shop<B>) -> Self {
        let mut page = Self {
            shop,
            state: PageState::Loading,
            history: Vec::new(),
            notices: Vec::new(),
        };
        page.history = page.read_history();
        page
    }

    #[must_use]
    pub const fn state(&self) -> &PageState<SearchResults> {
        &self.state
    }

    /// Recent queries, most recent first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Drain pending toasts.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn read_history(&self) -> Vec<String> {
        let scope = self.shop.auth().scope();
        self.shop
            .local()
            .storage()
            .get_json_migrating(
                &keys::search_history(&scope),
                &keys::legacy_search_history(&scope),
            )
            .unwrap_or_default()
    }

    fn write_history(&self) {
        let key = keys::search_history(&self.shop.auth().scope());
        if let Err(e) = self.shop.local().storage().set_json(&key, &self.history) {
            warn!(error = %e, "Could not save search history");
        }
    }

    /// Run a search and remember the query.
    #[instrument(skip(self))]
    pub async fn search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.state = PageState::Loaded(SearchResults {
                query: String::new(),
                products: Vec::new(),
                wishlist: Wishlist::new(),
            });
            return;
        }

        record_query(&mut self.history, query);
        self.write_history();

        self.state = PageState::Loading;
        let products: Result<Vec<Product>, AppError> = self
            .shop
            .backend()
            .search_products(query)
            .await
            .map_err(Into::into);
        let wishlist = self.shop.load_wishlist().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not load wishlist");
            Wishlist::new()
        });

        self.state = PageState::from_result(products.map(|products| SearchResults {
            query: query.to_string(),
            products,
            wishlist,
        }));
    }

    /// Forget every recent query for the current scope.
    pub fn clear_history(&mut self) {
        self.history.clear();
        let key = keys::search_history(&self.shop.auth().scope());
        if let Err(e) = self.shop.local().storage().remove(&key) {
            warn!(error = %e, "Could not clear search history");
        }
    }

    /// Flip a result's heart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle_wishlist(&mut self, product_id: &ProductId) {
        let call = self.shop.toggle_wishlist(product_id);
        optimistic(
            &mut self.state,
            &mut self.notices,
            |results| {
                results.wishlist.toggle(product_id);
            },
            call,
            "Could not update wishlist",
        )
        .await;
    }

    /// React to a store event. A login replays the guest wishlist and
    /// refreshes the hearts; the scope changes, so history is re-read.
    pub async fn handle_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::UserLogin { .. } | StoreEvent::UserLogout => {
                if matches!(event, StoreEvent::UserLogin { .. })
                    && let Err(e) = self.shop.on_user_login().await
                {
                    e.report();
                }
                self.history = self.read_history();
                let wishlist = self.shop.load_wishlist().await.unwrap_or_default();
                if let Some(results) = self.state.loaded_mut() {
                    results.wishlist = wishlist;
                }
            }
            StoreEvent::CartUpdated | StoreEvent::WishlistUpdated | StoreEvent::Storage { .. } => {}
        }
    }
}

/// Move `query` to the front, dropping case-insensitive duplicates and
/// anything past [`HISTORY_LIMIT`].
fn record_query(history: &mut Vec<String>, query: &str) {
    let lowered = query.to_lowercase();
    history.retain(|q| q.to_lowercase() != lowered);
    history.insert(0, query.to_string());
    history.truncate(HISTORY_LIMIT);
}
