//! Integration tests for Lindo.
//!
//! The storefront is exercised over real HTTP against [`FakeBackend`], an
//! in-process axum server that speaks the Lindo REST dialect: per-token
//! carts and wishlists, a seeded catalog, and switches that make a route
//! group fail with a chosen status.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lindo-integration-tests
//! ```
//!
//! Nothing outside the test process is needed; each test binds its own
//! ephemeral port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use lindo_storefront::config::StorefrontConfig;
use lindo_storefront::events::EventBus;
use lindo_storefront::state::Storefront;
use lindo_storefront::storage::{LocalStorage, MemoryStore};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// Route groups that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteGroup {
    Catalog,
    Cart,
    /// Only `/cart/getUserCartWithProducts`.
    JoinedCart,
    Wishlist,
    Orders,
    Payment,
}

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Default)]
struct FakeState {
    products: Vec<Value>,
    categories: Vec<Value>,
    banners: Vec<Value>,
    accounts: HashMap<String, String>,
    carts: HashMap<String, Vec<(String, u32)>>,
    wishlists: HashMap<String, Vec<String>>,
    orders: Vec<Value>,
    hits: HashMap<String, usize>,
    failures: HashMap<RouteGroup, u16>,
}

impl FakeState {
    fn check(&self, group: RouteGroup) -> Result<(), (StatusCode, Json<Value>)> {
        match self.failures.get(&group) {
            Some(&status) => Err(error(status, "Simulated failure")),
            None => Ok(()),
        }
    }

    fn product(&self, id: &str) -> Option<&Value> {
        self.products.iter().find(|p| p["_id"] == id)
    }
}

fn error(status: u16, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "message": message })),
    )
}

/// Token minted for an account.
fn token_for(email: &str) -> String {
    format!("token-{email}")
}

/// Owner email of a bearer token, or 401.
fn owner(headers: &HeaderMap) -> Result<String, (StatusCode, Json<Value>)> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer token-"))
        .map(str::to_string)
        .ok_or_else(|| error(401, "Invalid or expired token"))
}

// =============================================================================
// FakeBackend
// =============================================================================

/// A running fake backend. Dropping it leaves the server task running until
/// the test runtime shuts down.
#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
    base_url: Url,
}

impl FakeBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(FakeState::default()));
        let app = router(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            state,
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Storefront configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the configuration does not validate.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn config(&self) -> StorefrontConfig {
        let base_url = self.base_url.to_string();
        StorefrontConfig::from_lookup(|key| match key {
            "LINDO_API_BASE_URL" => Some(base_url.clone()),
            "LINDO_HTTP_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .unwrap()
    }

    /// A storefront over in-memory stores, talking to this backend.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn storefront(&self) -> Storefront {
        let events = EventBus::new();
        let local = LocalStorage::new(Arc::new(MemoryStore::new()), events.clone());
        let session = LocalStorage::new(Arc::new(MemoryStore::new()), events);
        Storefront::with_storage(self.config(), local, session).unwrap()
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Add a product priced in whole francs.
    pub fn add_product(&self, id: &str, name: &str, price: u64, category: &str) {
        self.lock().products.push(json!({
            "_id": id,
            "name": name,
            "price": price,
            "description": format!("{name} for your little one"),
            "image": format!("https://img.example/{id}.jpg"),
            "category": { "_id": category, "name": category },
            "countInStock": 10,
        }));
    }

    pub fn add_category(&self, id: &str, name: &str) {
        self.lock()
            .categories
            .push(json!({ "_id": id, "name": name }));
    }

    pub fn add_banner(&self, id: &str, title: &str) {
        self.lock().banners.push(json!({
            "_id": id,
            "title": title,
            "image": format!("https://img.example/banner-{id}.jpg"),
        }));
    }

    pub fn add_account(&self, email: &str, password: &str) {
        self.lock()
            .accounts
            .insert(email.to_string(), password.to_string());
    }

    /// Make every route in `group` answer `status`.
    pub fn fail(&self, group: RouteGroup, status: u16) {
        self.lock().failures.insert(group, status);
    }

    pub fn heal(&self, group: RouteGroup) {
        self.lock().failures.remove(&group);
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Server-side cart lines of an account.
    #[must_use]
    pub fn cart_of(&self, email: &str) -> Vec<(String, u32)> {
        self.lock().carts.get(email).cloned().unwrap_or_default()
    }

    /// Server-side wishlist of an account.
    #[must_use]
    pub fn wishlist_of(&self, email: &str) -> Vec<String> {
        self.lock().wishlists.get(email).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.lock().orders.clone()
    }

    /// Requests served for a path (without query string).
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        self.lock().hits.get(path).copied().unwrap_or(0)
    }
}

// =============================================================================
// Router
// =============================================================================

type Shared = Arc<Mutex<FakeState>>;

fn lock(state: &Shared) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn hit(s: &mut FakeState, path: &str) {
    *s.hits.entry(path.to_string()).or_default() += 1;
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/product/getAllProduct", get(all_products))
        .route("/product/getProductById/{id}", get(product_by_id))
        .route("/product/getProductsByCategory/{id}", get(products_by_category))
        .route("/product/search", get(search))
        .route("/category/getAllCategories", get(categories))
        .route("/icons/getAllIcons", get(icons))
        .route("/banner/getAllBanners", get(banners))
        .route("/adds/getAllAdds", get(adverts))
        .route("/cart/getUserCart", get(user_cart))
        .route("/cart/getUserCartWithProducts", get(user_cart_with_products))
        .route("/cart/addToCart", post(add_to_cart))
        .route("/cart/increaseQuantity", put(increase_quantity))
        .route("/cart/reduceFromCart", put(reduce_from_cart))
        .route("/cart/removeFromCart/{id}", delete(remove_from_cart))
        .route("/cart/clearCart", delete(clear_cart))
        .route("/wishlist/getUserWishlist", get(user_wishlist))
        .route("/wishlist/toggleWishlist", post(toggle_wishlist))
        .route("/wishlist/addToWishlist", post(add_to_wishlist))
        .route("/wishlist/removeFromWishlist/{id}", delete(remove_from_wishlist))
        .route("/orders/createOrder", post(create_order))
        .route("/dpo/initialize/dpoPayment", post(initialize_payment))
        .route("/user/login", post(login))
        .route("/user/register", post(register))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineBody {
    product_id: String,
    #[serde(default = "one")]
    quantity: u32,
}

const fn one() -> u32 {
    1
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
}

// -- Catalog -----------------------------------------------------------------

async fn all_products(State(state): State<Shared>) -> Reply {
    let mut s = lock(&state);
    hit(&mut s, "/product/getAllProduct");
    s.check(RouteGroup::Catalog)?;
    Ok(Json(json!({ "products": s.products })))
}

async fn icons(State(state): State<Shared>) -> Reply {
    let mut s = lock(&state);
    hit(&mut s, "/icons/getAllIcons");
    s.check(RouteGroup::Catalog)?;
    let icons: Vec<Value> = s
        .categories
        .iter()
        .map(|c| json!({ "_id": c["_id"], "name": c["name"], "image": "" }))
        .collect();
    Ok(Json(json!(icons)))
}

async fn banners(State(state): State<Shared>) -> Reply {
    let mut s = lock(&state);
    hit(&mut s, "/banner/getAllBanners");
    s.check(RouteGroup::Catalog)?;
    Ok(Json(json!({ "data": s.banners })))
}

async fn adverts(State(state): State<Shared>) -> Reply {
    let mut s = lock(&state);
    hit(&mut s, "/adds/getAllAdds");
    s.check(RouteGroup::Catalog)?;
    Ok(Json(json!({ "data": [] })))
}

async fn product_by_id(State(state): State<Shared>, Path(id): Path<String>) -> Reply {
    let mut s = lock(&state);
    hit(&mut s, "/product/getProductById");
    s.check(RouteGroup::Catalog)?;
    s.product(&id)
        .map(|p| Json(json!({ "product": p })))
        .ok_or_else(|| error(404, "Product not found"))
}

async fn products_by_category(State(state): State<Shared>, Path(id): Path<String>) -> Reply {
    let mut s = lock(&state);
    hit(&mut s, "/product/getProductsByCategory");
    s.check(RouteGroup::Catalog)?;
    let products: Vec<&Value> = s
        .products
        .iter()
        .filter(|p| p["category"]["_id"] == id.as_str())
        .collect();
    Ok(Json(json!({ "data": products })))
}

async fn search(State(state): State<Shared>, Query(params): Query<SearchParams>) -> Reply {
    let mut s = lock(&state);
    hit(&mut s, "/product/search");
    s.check(RouteGroup::Catalog)?;
    let needle = params.query.to_lowercase();
    let products: Vec<&Value> = s
        .products
        .iter()
        .filter(|p| {
            p["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect();
    Ok(Json(json!(products)))
}

async fn categories(State(state): State<Shared>) -> Reply {
    let mut s = lock(&state);
    hit(&mut s, "/category/getAllCategories");
    s.check(RouteGroup::Catalog)?;
    Ok(Json(json!({ "categories": s.categories })))
}

// -- Cart --------------------------------------------------------------------

async fn user_cart(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let email = owner(&headers)?;
    let mut s = lock(&state);
    hit(&mut s, "/cart/getUserCart");
    s.check(RouteGroup::Cart)?;
    let lines: Vec<Value> = s
        .carts
        .get(&email)
        .into_iter()
        .flatten()
        .map(|(id, quantity)| json!({ "productId": id, "quantity": quantity }))
        .collect();
    Ok(Json(json!(lines)))
}

async fn user_cart_with_products(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let email = owner(&headers)?;
    let mut s = lock(&state);
    hit(&mut s, "/cart/getUserCartWithProducts");
    s.check(RouteGroup::Cart)?;
    s.check(RouteGroup::JoinedCart)?;
    let lines: Vec<Value> = s
        .carts
        .get(&email)
        .into_iter()
        .flatten()
        .map(|(id, quantity)| {
            let product = s.product(id).cloned().unwrap_or_else(|| json!(id));
            json!({ "productId": product, "quantity": quantity })
        })
        .collect();
    Ok(Json(json!({ "data": { "cart": lines } })))
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LineBody>,
) -> Reply {
    let email = owner(&headers)?;
    let mut s = lock(&state);
    hit(&mut s, "/cart/addToCart");
    s.check(RouteGroup::Cart)?;
    let cart = s.carts.entry(email).or_default();
    match cart.iter_mut().find(|(id, _)| *id == body.product_id) {
        Some((_, quantity)) => *quantity += body.quantity,
        None => cart.push((body.product_id, body.quantity)),
    }
    Ok(Json(json!({ "message": "Added to cart" })))
}

async fn increase_quantity(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LineBody>,
) -> Reply {
    let email = owner(&headers)?;
    let mut s = lock(&state);
    s.check(RouteGroup::Cart)?;
    let line = s
        .carts
        .entry(email)
        .or_default()
        .iter_mut()
        .find(|(id, _)| *id == body.product_id)
        .ok_or_else(|| error(404, "Item not in cart"))?;
    line.1 += body.quantity;
    Ok(Json(json!({ "message": "Quantity increased" })))
}

async fn reduce_from_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LineBody>,
) -> Reply {
    let email = owner(&headers)?;
    let mut s = lock(&state);
    s.check(RouteGroup::Cart)?;
    let line = s
        .carts
        .entry(email)
        .or_default()
        .iter_mut()
        .find(|(id, _)| *id == body.product_id)
        .ok_or_else(|| error(404, "Item not in cart"))?;
    line.1 = line.1.saturating_sub(1).max(1);
    Ok(Json(json!({ "message": "Quantity reduced" })))
}

async fn remove_from_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let email = owner(&headers)?;
    let mut s = lock(&state);
    s.check(RouteGroup::Cart)?;
    s.carts.entry(email).or_default().retain(|(p, _)| *p != id);
    Ok(Json(json!({ "message": "Removed" })))
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let email = owner(&headers)?;
    let mut s = lock(&state);
    s.check(RouteGroup::Cart)?;
    s.carts.remove(&email);
    Ok(Json(json!({ "message": "Cart cleared" })))
}

// -- Wishlist ----------------------------------------------------------------

async fn user_wishlist(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let email = owner(&headers)?;
    let s = lock(&state);
    s.check(RouteGroup::Wishlist)?;
    let ids = s.wishlists.get(&email).cloned().unwrap_or_default();
    Ok(Json(json!({ "wishlist": ids })))
}

async fn toggle_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LineBody>,
) -> Reply {
    let email = owner(&headers)?;
    let mut s = lock(&state);
    hit(&mut s, "/wishlist/toggleWishlist");
    s.check(RouteGroup::Wishlist)?;
    let list = s.wishlists.entry(email).or_default();
    let status = if list.contains(&body.product_id) {
        list.retain(|id| *id != body.product_id);
        "removed"
    } else {
        list.push(body.product_id);
        "added"
    };
    Ok(Json(json!({ "status": status })))
}

async fn add_to_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LineBody>,
) -> Reply {
    let email = owner(&headers)?;
    let mut s = lock(&state);
    hit(&mut s, "/wishlist/addToWishlist");
    s.check(RouteGroup::Wishlist)?;
    let list = s.wishlists.entry(email).or_default();
    if !list.contains(&body.product_id) {
        list.push(body.product_id);
    }
    Ok(Json(json!({ "message": "Added to wishlist" })))
}

async fn remove_from_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let email = owner(&headers)?;
    let mut s = lock(&state);
    s.check(RouteGroup::Wishlist)?;
    s.wishlists.entry(email).or_default().retain(|p| *p != id);
    Ok(Json(json!({ "message": "Removed from wishlist" })))
}

// -- Orders ------------------------------------------------------------------

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(order): Json<Value>,
) -> Reply {
    owner(&headers)?;
    let mut s = lock(&state);
    s.check(RouteGroup::Orders)?;
    s.orders.push(order.clone());
    let id = format!("ORD-{}", s.orders.len());
    Ok(Json(json!({
        "order": {
            "_id": id,
            "status": "pending",
            "totalAmount": order["totalAmount"],
        }
    })))
}

async fn initialize_payment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(payment): Json<Value>,
) -> Reply {
    owner(&headers)?;
    let s = lock(&state);
    s.check(RouteGroup::Payment)?;
    let order_id = payment["orderId"].as_str().unwrap_or_default();
    Ok(Json(json!({
        "data": {
            "paymentUrl": format!("https://secure.3gdirectpay.example/pay?ID={order_id}"),
            "transToken": "TT-1",
        }
    })))
}

// -- Users -------------------------------------------------------------------

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let s = lock(&state);
    if s.accounts.get(email).map(String::as_str) != Some(password) {
        return Err(error(401, "Invalid email or password"));
    }
    Ok(Json(json!({
        "token": token_for(email),
        "user": { "email": email, "firstName": "Aline" },
    })))
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let mut s = lock(&state);
    if s.accounts.contains_key(&email) {
        return Err(error(400, "Email already registered"));
    }
    s.accounts.insert(email.clone(), password);
    Ok(Json(json!({
        "data": {
            "accessToken": token_for(&email),
            "user": {
                "email": email,
                "firstName": body["firstName"],
                "lastName": body["lastName"],
            },
        }
    })))
}
