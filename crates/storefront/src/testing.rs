//! In-memory backend and fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex, PoisonError};

use lindo_core::{
    CartItem, CartLines, CategoryId, Email, OrderId, OrderStatus, ProductId, Wishlist,
    WishlistToggle,
};
use rust_decimal::Decimal;

use crate::api::{
    Advert, ApiError, Banner, Category, CategoryRef, Icon, OrderConfirmation, OrderRequest,
    PaymentInit, PaymentRequest, Product,
};
use crate::auth::{BearerToken, Credentials};
use crate::events::EventBus;
use crate::local::LocalStore;
use crate::remote::{CartRemote, CatalogRemote, OrderRemote, WishlistRemote};
use crate::storage::{LocalStorage, MemoryStore};

pub fn credentials(email: &str) -> Credentials {
    Credentials {
        token: BearerToken::new("test-token"),
        email: Email::parse(email).unwrap(),
    }
}

pub fn local_store() -> LocalStore {
    LocalStore::new(LocalStorage::new(
        Arc::new(MemoryStore::new()),
        EventBus::new(),
    ))
}

pub fn product(id: &str, price: u32, category: &str) -> Product {
    Product {
        id: ProductId::from(id),
        name: format!("Product {id}"),
        price: Decimal::from(price),
        description: String::new(),
        image: Some(format!("https://cdn.lindo.rw/{id}.jpg")),
        images: Vec::new(),
        category: Some(CategoryRef::Id(CategoryId::from(category))),
        stock: Some(10),
    }
}

#[derive(Default)]
struct FakeState {
    cart: CartLines,
    wishlist: Wishlist,
    products: Vec<Product>,
    categories: Vec<Category>,
    orders: Vec<OrderRequest>,
    calls: Vec<&'static str>,
    cart_failure: Option<u16>,
    joined_cart_fails: bool,
    wishlist_failure: Option<u16>,
    wishlist_fetch_fails: bool,
    catalog_failure: Option<u16>,
    order_failure: Option<u16>,
    payment_failure: Option<u16>,
}

/// Records calls and serves canned data. Failure switches make the next
/// calls of a kind fail with the given status until cleared.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

fn status_error(status: u16) -> ApiError {
    match status {
        401 | 403 => ApiError::Unauthorized { status },
        404 => ApiError::NotFound("fake".to_string()),
        _ => ApiError::Status {
            status,
            message: "fake failure".to_string(),
        },
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn seed_products(&self, products: Vec<Product>) {
        self.with(|s| s.products = products);
    }

    pub fn seed_categories(&self, categories: &[(&str, &str)]) {
        self.with(|s| {
            s.categories = categories
                .iter()
                .map(|(id, name)| Category {
                    id: CategoryId::from(*id),
                    name: (*name).to_string(),
                    image: None,
                })
                .collect();
        });
    }

    pub fn seed_wishlist(&self, ids: &[&str]) {
        self.with(|s| s.wishlist = ids.iter().map(|id| ProductId::from(*id)).collect());
    }

    pub fn seed_cart(&self, items: Vec<CartItem>) {
        self.with(|s| s.cart = CartLines::from_items(items));
    }

    pub fn fail_cart_with(&self, status: u16) {
        self.with(|s| s.cart_failure = Some(status));
    }

    /// Fail only the product-joined cart read.
    pub fn fail_joined_cart(&self) {
        self.with(|s| s.joined_cart_fails = true);
    }

    pub fn fail_wishlist_with(&self, status: u16) {
        self.with(|s| s.wishlist_failure = Some(status));
    }

    pub fn fail_wishlist_fetch(&self) {
        self.with(|s| s.wishlist_fetch_fails = true);
    }

    pub fn fail_catalog_with(&self, status: Option<u16>) {
        self.with(|s| s.catalog_failure = status);
    }

    pub fn fail_orders_with(&self, status: u16) {
        self.with(|s| s.order_failure = Some(status));
    }

    pub fn fail_payment_with(&self, status: u16) {
        self.with(|s| s.payment_failure = Some(status));
    }

    pub fn heal(&self) {
        self.with(|s| {
            s.cart_failure = None;
            s.wishlist_failure = None;
            s.wishlist_fetch_fails = false;
            s.catalog_failure = None;
            s.order_failure = None;
            s.payment_failure = None;
        });
    }

    pub fn cart(&self) -> CartLines {
        self.with(|s| s.cart.clone())
    }

    pub fn wishlist(&self) -> Wishlist {
        self.with(|s| s.wishlist.clone())
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.with(|s| s.orders.clone())
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.with(|s| s.calls.iter().filter(|c| **c == name).count())
    }

    fn cart_call<T>(
        &self,
        name: &'static str,
        f: impl FnOnce(&mut FakeState) -> T,
    ) -> Result<T, ApiError> {
        self.with(|s| {
            s.calls.push(name);
            match s.cart_failure {
                Some(status) => Err(status_error(status)),
                None => Ok(f(s)),
            }
        })
    }

    fn wishlist_call<T>(
        &self,
        name: &'static str,
        f: impl FnOnce(&mut FakeState) -> T,
    ) -> Result<T, ApiError> {
        self.with(|s| {
            s.calls.push(name);
            match s.wishlist_failure {
                Some(status) => Err(status_error(status)),
                None => Ok(f(s)),
            }
        })
    }

    fn catalog_call<T>(&self, f: impl FnOnce(&FakeState) -> Result<T, ApiError>) -> Result<T, ApiError> {
        self.with(|s| {
            s.calls.push("catalog");
            match s.catalog_failure {
                Some(status) => Err(status_error(status)),
                None => f(s),
            }
        })
    }
}

impl CartRemote for FakeBackend {
    async fn fetch_user_cart(&self, _auth: &Credentials) -> Result<CartLines, ApiError> {
        self.cart_call("fetch_user_cart", |s| s.cart.clone())
    }

    async fn fetch_user_cart_with_products(
        &self,
        _auth: &Credentials,
    ) -> Result<CartLines, ApiError> {
        if self.with(|s| s.joined_cart_fails) {
            self.with(|s| s.calls.push("fetch_user_cart_with_products"));
            return Err(status_error(500));
        }
        self.cart_call("fetch_user_cart_with_products", |s| s.cart.clone())
    }

    async fn add_to_cart_server(&self, _auth: &Credentials, item: &CartItem) -> Result<(), ApiError> {
        self.cart_call("add_to_cart_server", |s| s.cart.add(item.clone()))
    }

    async fn increase_cart_item_quantity(
        &self,
        _auth: &Credentials,
        product_id: &ProductId,
        delta: u32,
    ) -> Result<(), ApiError> {
        self.cart_call("increase_cart_item_quantity", |s| {
            s.cart.increase(product_id, delta);
        })
    }

    async fn reduce_from_cart_server(
        &self,
        _auth: &Credentials,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        self.cart_call("reduce_from_cart_server", |s| {
            s.cart.decrease(product_id);
        })
    }

    async fn remove_from_cart_server(
        &self,
        _auth: &Credentials,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        self.cart_call("remove_from_cart_server", |s| {
            s.cart.remove(product_id);
        })
    }

    async fn clear_cart_server(&self, _auth: &Credentials) -> Result<(), ApiError> {
        self.cart_call("clear_cart_server", |s| s.cart.clear())
    }
}

impl WishlistRemote for FakeBackend {
    async fn fetch_user_wishlist(&self, _auth: &Credentials) -> Result<Wishlist, ApiError> {
        if self.with(|s| s.wishlist_fetch_fails) {
            return Err(status_error(500));
        }
        self.wishlist_call("fetch_user_wishlist", |s| s.wishlist.clone())
    }

    async fn toggle_wishlist_product(
        &self,
        _auth: &Credentials,
        product_id: &ProductId,
    ) -> Result<WishlistToggle, ApiError> {
        self.wishlist_call("toggle_wishlist_product", |s| s.wishlist.toggle(product_id))
    }

    async fn add_to_wishlist_server(
        &self,
        _auth: &Credentials,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        self.wishlist_call("add_to_wishlist_server", |s| {
            s.wishlist.insert(product_id.clone());
        })
    }

    async fn remove_from_wishlist_server(
        &self,
        _auth: &Credentials,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        self.wishlist_call("remove_from_wishlist_server", |s| {
            s.wishlist.remove(product_id);
        })
    }
}

impl CatalogRemote for FakeBackend {
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        self.catalog_call(|s| Ok(s.products.clone()))
    }

    async fn fetch_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        self.catalog_call(|s| {
            s.products
                .iter()
                .find(|p| &p.id == product_id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(product_id.to_string()))
        })
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.catalog_call(|s| Ok(s.categories.clone()))
    }

    async fn fetch_products_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, ApiError> {
        self.catalog_call(|s| {
            Ok(s.products
                .iter()
                .filter(|p| p.category_id() == Some(category_id))
                .cloned()
                .collect())
        })
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let needle = query.to_lowercase();
        self.catalog_call(|s| {
            Ok(s.products
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        })
    }

    async fn fetch_icons(&self) -> Result<Vec<Icon>, ApiError> {
        self.catalog_call(|_| Ok(Vec::new()))
    }

    async fn fetch_banners(&self) -> Result<Vec<Banner>, ApiError> {
        self.catalog_call(|_| Ok(Vec::new()))
    }

    async fn fetch_adds(&self) -> Result<Vec<Advert>, ApiError> {
        self.catalog_call(|_| Ok(Vec::new()))
    }
}

impl OrderRemote for FakeBackend {
    async fn create_order(
        &self,
        _auth: &Credentials,
        order: &OrderRequest,
    ) -> Result<OrderConfirmation, ApiError> {
        self.with(|s| {
            s.calls.push("create_order");
            if let Some(status) = s.order_failure {
                return Err(status_error(status));
            }
            s.orders.push(order.clone());
            Ok(OrderConfirmation {
                id: OrderId::from(format!("O{}", s.orders.len()).as_str()),
                status: OrderStatus::Pending,
                total_amount: Some(order.total_amount),
            })
        })
    }

    async fn initialize_payment(
        &self,
        _auth: &Credentials,
        payment: &PaymentRequest,
    ) -> Result<PaymentInit, ApiError> {
        self.with(|s| {
            s.calls.push("initialize_payment");
            if let Some(status) = s.payment_failure {
                return Err(status_error(status));
            }
            Ok(PaymentInit {
                redirect_url: format!("https://pay.example/{}", payment.order_id),
                transaction_token: Some("tx-1".to_string()),
            })
        })
    }
}
