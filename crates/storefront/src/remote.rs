//! Network seams.
//!
//! Page controllers and reconciliation never name [`LindoClient`] directly;
//! they take a [`Backend`] so tests can substitute an in-memory fake.
//! [`LindoClient`] implements every trait over HTTP.
//!
//! [`LindoClient`]: crate::api::LindoClient

use std::future::Future;

use lindo_core::{CartItem, CartLines, CategoryId, ProductId, Wishlist, WishlistToggle};

use crate::api::{
    Advert, ApiError, Banner, Category, Icon, OrderConfirmation, OrderRequest, PaymentInit,
    PaymentRequest, Product,
};
use crate::auth::Credentials;

/// Server-side cart of the signed-in shopper.
pub trait CartRemote: Send + Sync {
    /// Cart lines as stored, without joining product data.
    fn fetch_user_cart(
        &self,
        auth: &Credentials,
    ) -> impl Future<Output = Result<CartLines, ApiError>> + Send;

    /// Cart lines joined with product metadata.
    fn fetch_user_cart_with_products(
        &self,
        auth: &Credentials,
    ) -> impl Future<Output = Result<CartLines, ApiError>> + Send;

    /// Add a line, or raise its quantity by `item.quantity` if present.
    fn add_to_cart_server(
        &self,
        auth: &Credentials,
        item: &CartItem,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Raise a line's quantity.
    fn increase_cart_item_quantity(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
        delta: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Lower a line's quantity by one. The backend clamps at one.
    fn reduce_from_cart_server(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Drop a line.
    fn remove_from_cart_server(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Drop every line.
    fn clear_cart_server(
        &self,
        auth: &Credentials,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Server-side wishlist of the signed-in shopper.
pub trait WishlistRemote: Send + Sync {
    /// Saved product ids.
    fn fetch_user_wishlist(
        &self,
        auth: &Credentials,
    ) -> impl Future<Output = Result<Wishlist, ApiError>> + Send;

    /// Flip membership; the backend reports which way it went.
    fn toggle_wishlist_product(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<WishlistToggle, ApiError>> + Send;

    /// Save a product. Saving a saved product is a no-op on the backend.
    fn add_to_wishlist_server(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Unsave a product.
    fn remove_from_wishlist_server(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Public catalog reads.
pub trait CatalogRemote: Send + Sync {
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    fn fetch_product(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<Product, ApiError>> + Send;

    fn fetch_categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;

    fn fetch_products_by_category(
        &self,
        category_id: &CategoryId,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    fn search_products(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    fn fetch_icons(&self) -> impl Future<Output = Result<Vec<Icon>, ApiError>> + Send;

    fn fetch_banners(&self) -> impl Future<Output = Result<Vec<Banner>, ApiError>> + Send;

    fn fetch_adds(&self) -> impl Future<Output = Result<Vec<Advert>, ApiError>> + Send;
}

/// Order placement and payment initialisation.
pub trait OrderRemote: Send + Sync {
    fn create_order(
        &self,
        auth: &Credentials,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, ApiError>> + Send;

    fn initialize_payment(
        &self,
        auth: &Credentials,
        payment: &PaymentRequest,
    ) -> impl Future<Output = Result<PaymentInit, ApiError>> + Send;
}

/// Everything a page controller may call.
pub trait Backend: CartRemote + WishlistRemote + CatalogRemote + OrderRemote {}

impl<T> Backend for T where T: CartRemote + WishlistRemote + CatalogRemote + OrderRemote {}
