//! HTTP implementation of the backend traits.

use std::sync::Arc;

use lindo_core::{CartItem, CartLines, CategoryId, Email, ProductId, Wishlist, WishlistToggle};
use moka::future::Cache;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::cache::{CacheKey, CacheValue};
use super::endpoints;
use super::types::{
    AddToCartRequest, Advert, Banner, Category, Icon, LoginSession, OrderConfirmation,
    OrderRequest, PaymentInit, PaymentRequest, Product, ProductRef, QuantityRequest,
    Registration, RemoteCartLine, UserProfile, WishlistRequest, wishlist_from_refs,
};
use super::ApiError;
use crate::auth::{BearerToken, Credentials};
use crate::config::ApiConfig;
use crate::remote::{CartRemote, CatalogRemote, OrderRemote, WishlistRemote};

const REQUEST_ID_HEADER: &str = "X-Request-Id";
const MAX_ERROR_BODY_CHARS: usize = 200;
const CACHE_CAPACITY: u64 = 1000;

/// Wrapper fields a response payload may be nested under.
const LIST_ENVELOPE: &[&str] = &["data", "products", "categories", "items"];
const CART_ENVELOPE: &[&str] = &["data", "cart", "items", "products"];
const WISHLIST_ENVELOPE: &[&str] = &["data", "wishlist", "products", "items"];
const PRODUCT_ENVELOPE: &[&str] = &["data", "product"];
const ORDER_ENVELOPE: &[&str] = &["data", "order"];
const PAYMENT_ENVELOPE: &[&str] = &["data", "payment"];

const TOKEN_POINTERS: &[&str] = &["/token", "/accessToken", "/data/token", "/data/accessToken"];
const USER_POINTERS: &[&str] = &["/user", "/data/user", "/data"];
const AVATAR_POINTERS: &[&str] = &[
    "/avatar",
    "/url",
    "/imageUrl",
    "/data/avatar",
    "/data/url",
    "/user/avatar",
];

// =============================================================================
// LindoClient
// =============================================================================

/// Client for the Lindo REST backend.
///
/// Cheap to clone; clones share the connection pool and catalog cache.
#[derive(Clone)]
pub struct LindoClient {
    inner: Arc<LindoClientInner>,
}

struct LindoClientInner {
    http: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl LindoClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialisation).
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("lindo-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(LindoClientInner {
                http,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        debug!("Catalog cache invalidated");
    }

    // =========================================================================
    // Request Plumbing
    // =========================================================================

    /// Join an endpoint path onto the base URL, keeping any base path prefix.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    fn request(
        &self,
        method: Method,
        url: Url,
        auth: Option<&Credentials>,
    ) -> RequestBuilder {
        let request = self
            .inner
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        match auth {
            Some(credentials) => request.header(AUTHORIZATION, credentials.token.header_value()),
            None => request,
        }
    }

    /// Send a request and return the JSON body (`Null` when empty).
    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                %status,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(status_error(status, path, &body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    async fn get_json(&self, path: &str, auth: Option<&Credentials>) -> Result<Value, ApiError> {
        let request = self.request(Method::GET, self.url(path)?, auth);
        self.execute(request, path).await
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        auth: Option<&Credentials>,
        body: &B,
    ) -> Result<Value, ApiError> {
        let request = self.request(method, self.url(path)?, auth).json(body);
        self.execute(request, path).await
    }

    async fn send_empty(
        &self,
        method: Method,
        path: &str,
        auth: &Credentials,
    ) -> Result<Value, ApiError> {
        let request = self.request(method, self.url(path)?, Some(auth));
        self.execute(request, path).await
    }

    // =========================================================================
    // Account Methods
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for bad credentials, or an error if the
    /// response carries no token.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<LoginSession, ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let value = self
            .send_json(Method::POST, endpoints::LOGIN, None, &body)
            .await?;
        session_from_value(&value, email)
    }

    /// Create an account. The backend signs the new shopper in directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration or the
    /// response carries no token.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<LoginSession, ApiError> {
        let value = self
            .send_json(
                Method::POST,
                endpoints::REGISTER,
                None,
                &registration.to_body(),
            )
            .await?;
        session_from_value(&value, &registration.email)
    }

    /// Upload a profile picture and return its URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails or the response has no URL.
    #[instrument(skip(self, auth, bytes), fields(email = %auth.email, size = bytes.len()))]
    pub async fn upload_avatar(
        &self,
        auth: &Credentials,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(image_mime(file_name))?;
        let form = reqwest::multipart::Form::new().part("avatar", part);

        let request = self
            .request(Method::POST, self.url(endpoints::UPLOAD_AVATAR)?, Some(auth))
            .multipart(form);
        let value = self.execute(request, endpoints::UPLOAD_AVATAR).await?;

        first_string(&value, AVATAR_POINTERS)
            .ok_or_else(|| ApiError::Parse(serde_json::Error::custom("upload response has no URL")))
    }

    // =========================================================================
    // Cache Helpers
    // =========================================================================

    async fn cached_list<T, F>(
        &self,
        key: CacheKey,
        path: &str,
        unwrap: fn(CacheValue) -> Option<Vec<T>>,
        wrap: F,
    ) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce(Vec<T>) -> CacheValue,
        Vec<T>: Clone,
    {
        if let Some(items) = self.inner.cache.get(&key).await.and_then(unwrap) {
            debug!(path, "Cache hit");
            return Ok(items);
        }

        let value = self.get_json(path, None).await?;
        let items: Vec<T> = decode(value, LIST_ENVELOPE)?;

        self.inner.cache.insert(key, wrap(items.clone())).await;
        Ok(items)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl CatalogRemote for LindoClient {
    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        self.cached_list(
            CacheKey::Products,
            endpoints::PRODUCTS,
            |v| match v {
                CacheValue::Products(p) => Some(p),
                _ => None,
            },
            CacheValue::Products,
        )
        .await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn fetch_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(product_id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let value = self.get_json(&endpoints::product(product_id), None).await?;
        if value.is_null() {
            return Err(ApiError::NotFound(format!("Product not found: {product_id}")));
        }
        let product: Product = decode(value, PRODUCT_ENVELOPE)?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.cached_list(
            CacheKey::Categories,
            endpoints::CATEGORIES,
            |v| match v {
                CacheValue::Categories(c) => Some(c),
                _ => None,
            },
            CacheValue::Categories,
        )
        .await
    }

    #[instrument(skip(self), fields(category_id = %category_id))]
    async fn fetch_products_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, ApiError> {
        self.cached_list(
            CacheKey::CategoryProducts(category_id.clone()),
            &endpoints::products_by_category(category_id),
            |v| match v {
                CacheValue::Products(p) => Some(p),
                _ => None,
            },
            CacheValue::Products,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.url(endpoints::PRODUCT_SEARCH)?;
        url.query_pairs_mut().append_pair("query", query);

        let request = self.request(Method::GET, url, None);
        let value = self.execute(request, endpoints::PRODUCT_SEARCH).await?;
        decode(value, LIST_ENVELOPE)
    }

    #[instrument(skip(self))]
    async fn fetch_icons(&self) -> Result<Vec<Icon>, ApiError> {
        self.cached_list(
            CacheKey::Icons,
            endpoints::ICONS,
            |v| match v {
                CacheValue::Icons(i) => Some(i),
                _ => None,
            },
            CacheValue::Icons,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn fetch_banners(&self) -> Result<Vec<Banner>, ApiError> {
        self.cached_list(
            CacheKey::Banners,
            endpoints::BANNERS,
            |v| match v {
                CacheValue::Banners(b) => Some(b),
                _ => None,
            },
            CacheValue::Banners,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn fetch_adds(&self) -> Result<Vec<Advert>, ApiError> {
        self.cached_list(
            CacheKey::Adds,
            endpoints::ADDS,
            |v| match v {
                CacheValue::Adds(a) => Some(a),
                _ => None,
            },
            CacheValue::Adds,
        )
        .await
    }
}

impl CartRemote for LindoClient {
    #[instrument(skip(self, auth), fields(email = %auth.email))]
    async fn fetch_user_cart(&self, auth: &Credentials) -> Result<CartLines, ApiError> {
        let value = self.get_json(endpoints::USER_CART, Some(auth)).await?;
        cart_from_value(value)
    }

    #[instrument(skip(self, auth), fields(email = %auth.email))]
    async fn fetch_user_cart_with_products(
        &self,
        auth: &Credentials,
    ) -> Result<CartLines, ApiError> {
        let value = self
            .get_json(endpoints::USER_CART_WITH_PRODUCTS, Some(auth))
            .await?;
        cart_from_value(value)
    }

    #[instrument(skip(self, auth, item), fields(email = %auth.email, product_id = %item.product_id, quantity = item.quantity))]
    async fn add_to_cart_server(&self, auth: &Credentials, item: &CartItem) -> Result<(), ApiError> {
        let body = AddToCartRequest {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
        };
        self.send_json(Method::POST, endpoints::ADD_TO_CART, Some(auth), &body)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, auth), fields(email = %auth.email, product_id = %product_id))]
    async fn increase_cart_item_quantity(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
        delta: u32,
    ) -> Result<(), ApiError> {
        let body = QuantityRequest {
            product_id: product_id.clone(),
            quantity: delta.max(1),
        };
        self.send_json(Method::PUT, endpoints::INCREASE_QUANTITY, Some(auth), &body)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, auth), fields(email = %auth.email, product_id = %product_id))]
    async fn reduce_from_cart_server(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        let body = QuantityRequest {
            product_id: product_id.clone(),
            quantity: 1,
        };
        self.send_json(Method::PUT, endpoints::REDUCE_FROM_CART, Some(auth), &body)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, auth), fields(email = %auth.email, product_id = %product_id))]
    async fn remove_from_cart_server(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        self.send_empty(
            Method::DELETE,
            &endpoints::remove_from_cart(product_id),
            auth,
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, auth), fields(email = %auth.email))]
    async fn clear_cart_server(&self, auth: &Credentials) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, endpoints::CLEAR_CART, auth)
            .await?;
        Ok(())
    }
}

impl WishlistRemote for LindoClient {
    #[instrument(skip(self, auth), fields(email = %auth.email))]
    async fn fetch_user_wishlist(&self, auth: &Credentials) -> Result<Wishlist, ApiError> {
        let value = self.get_json(endpoints::USER_WISHLIST, Some(auth)).await?;
        if value.is_null() {
            return Ok(Wishlist::new());
        }
        let refs: Vec<ProductRef> = decode(value, WISHLIST_ENVELOPE)?;
        Ok(wishlist_from_refs(refs))
    }

    #[instrument(skip(self, auth), fields(email = %auth.email, product_id = %product_id))]
    async fn toggle_wishlist_product(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
    ) -> Result<WishlistToggle, ApiError> {
        let body = WishlistRequest {
            product_id: product_id.clone(),
        };
        let value = self
            .send_json(Method::POST, endpoints::TOGGLE_WISHLIST, Some(auth), &body)
            .await?;
        toggle_outcome(value, product_id)
    }

    #[instrument(skip(self, auth), fields(email = %auth.email, product_id = %product_id))]
    async fn add_to_wishlist_server(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        let body = WishlistRequest {
            product_id: product_id.clone(),
        };
        self.send_json(Method::POST, endpoints::ADD_TO_WISHLIST, Some(auth), &body)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, auth), fields(email = %auth.email, product_id = %product_id))]
    async fn remove_from_wishlist_server(
        &self,
        auth: &Credentials,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        self.send_empty(
            Method::DELETE,
            &endpoints::remove_from_wishlist(product_id),
            auth,
        )
        .await?;
        Ok(())
    }
}

impl OrderRemote for LindoClient {
    #[instrument(skip(self, auth, order), fields(email = %auth.email, lines = order.items.len()))]
    async fn create_order(
        &self,
        auth: &Credentials,
        order: &OrderRequest,
    ) -> Result<OrderConfirmation, ApiError> {
        let value = self
            .send_json(Method::POST, endpoints::CREATE_ORDER, Some(auth), order)
            .await?;
        decode(value, ORDER_ENVELOPE)
    }

    #[instrument(skip(self, auth, payment), fields(email = %auth.email, order_id = %payment.order_id))]
    async fn initialize_payment(
        &self,
        auth: &Credentials,
        payment: &PaymentRequest,
    ) -> Result<PaymentInit, ApiError> {
        let value = self
            .send_json(
                Method::POST,
                endpoints::INITIALIZE_PAYMENT,
                Some(auth),
                payment,
            )
            .await?;
        decode(value, PAYMENT_ENVELOPE)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Map a non-success status to an error.
fn status_error(status: StatusCode, path: &str, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized {
            status: status.as_u16(),
        },
        StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
        _ => ApiError::Status {
            status: status.as_u16(),
            message: error_message(body),
        },
    }
}

/// The backend's `message`/`error` field, else the start of the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| first_string(&v, &["/message", "/error", "/error/message"]))
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

/// Peel wrapper objects (`{"data": {"products": [...]}}`) off a payload.
///
/// Only single-purpose wrappers are peeled: an object is unwrapped through
/// the first listed field it contains, at most three levels deep.
fn unwrap_envelope(mut value: Value, fields: &[&str]) -> Value {
    for _ in 0..3 {
        let Value::Object(map) = &mut value else {
            break;
        };
        let Some(inner) = fields.iter().find_map(|field| map.remove(*field)) else {
            break;
        };
        value = inner;
    }
    value
}

fn decode<T: DeserializeOwned>(value: Value, fields: &[&str]) -> Result<T, ApiError> {
    Ok(serde_json::from_value(unwrap_envelope(value, fields))?)
}

fn cart_from_value(value: Value) -> Result<CartLines, ApiError> {
    if value.is_null() {
        return Ok(CartLines::new());
    }
    let lines: Vec<RemoteCartLine> = decode(value, CART_ENVELOPE)?;
    Ok(CartLines::from_items(
        lines.into_iter().map(RemoteCartLine::into_cart_item),
    ))
}

/// Work out which way a toggle went.
///
/// Accepts `{"status": "added"}`, `{"added": true}`, or the updated
/// wishlist itself.
fn toggle_outcome(value: Value, product_id: &ProductId) -> Result<WishlistToggle, ApiError> {
    if let Some(status) = first_string(&value, &["/status", "/action", "/data/status"]) {
        match status.to_ascii_lowercase().as_str() {
            "added" => return Ok(WishlistToggle::Added),
            "removed" => return Ok(WishlistToggle::Removed),
            _ => {}
        }
    }
    if let Some(added) = ["/added", "/data/added"]
        .iter()
        .find_map(|p| value.pointer(p).and_then(Value::as_bool))
    {
        return Ok(if added {
            WishlistToggle::Added
        } else {
            WishlistToggle::Removed
        });
    }

    let refs: Vec<ProductRef> = decode(value, WISHLIST_ENVELOPE)?;
    Ok(if wishlist_from_refs(refs).contains(product_id) {
        WishlistToggle::Added
    } else {
        WishlistToggle::Removed
    })
}

fn session_from_value(value: &Value, email: &Email) -> Result<LoginSession, ApiError> {
    let token = first_string(value, TOKEN_POINTERS)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Parse(serde_json::Error::custom("login response has no token")))?;

    let user = USER_POINTERS
        .iter()
        .filter_map(|p| value.pointer(p))
        .find_map(|v| serde_json::from_value::<UserProfile>(v.clone()).ok())
        .unwrap_or_else(|| UserProfile::bare(email.clone()));

    Ok(LoginSession {
        token: BearerToken::new(token),
        user,
    })
}

fn first_string(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| value.pointer(p))
        .find_map(Value::as_str)
        .map(str::to_string)
}

fn image_mime(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "/cart/getUserCart", ""),
            ApiError::Unauthorized { status: 401 }
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "/cart/getUserCart", ""),
            ApiError::Unauthorized { status: 403 }
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "/x", ""),
            ApiError::NotFound(path) if path == "/x"
        ));

        let err = status_error(
            StatusCode::BAD_REQUEST,
            "/orders/createOrder",
            r#"{"message":"Cart is empty"}"#,
        );
        assert!(matches!(err, ApiError::Status { status: 400, ref message } if message == "Cart is empty"));
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("<html>Bad Gateway</html>"), "<html>Bad Gateway</html>");
        assert_eq!(error_message(&"x".repeat(500)).len(), MAX_ERROR_BODY_CHARS);
    }

    #[test]
    fn test_unwrap_envelope() {
        let bare = json!([1, 2]);
        assert_eq!(unwrap_envelope(bare.clone(), LIST_ENVELOPE), bare);

        let nested = json!({"success": true, "data": {"products": [1, 2]}});
        assert_eq!(unwrap_envelope(nested, LIST_ENVELOPE), json!([1, 2]));

        let product = json!({"_id": "P1", "name": "Bib", "price": 1});
        assert_eq!(unwrap_envelope(product.clone(), PRODUCT_ENVELOPE), product);
    }

    #[test]
    fn test_cart_from_wrapped_value() {
        let cart = cart_from_value(json!({
            "cart": {"items": [
                {"productId": "P1", "quantity": 2, "price": 5000},
                {"productId": "P1", "quantity": 1, "price": 5000}
            ]}
        }))
        .unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert!(cart_from_value(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_toggle_outcome_shapes() {
        let id = ProductId::from("P2");
        assert_eq!(
            toggle_outcome(json!({"status": "added"}), &id).unwrap(),
            WishlistToggle::Added
        );
        assert_eq!(
            toggle_outcome(json!({"added": false}), &id).unwrap(),
            WishlistToggle::Removed
        );
        assert_eq!(
            toggle_outcome(json!({"wishlist": ["P1", "P2"]}), &id).unwrap(),
            WishlistToggle::Added
        );
        assert!(toggle_outcome(json!({"ok": 1}), &id).is_err());
    }

    #[test]
    fn test_session_from_value() {
        let email = Email::parse("aline@lindo.rw").unwrap();
        let session = session_from_value(
            &json!({"data": {"accessToken": "tok", "user": {"email": "aline@lindo.rw", "firstName": "Aline"}}}),
            &email,
        )
        .unwrap();
        assert_eq!(session.token.expose(), "tok");
        assert_eq!(session.user.first_name.as_deref(), Some("Aline"));

        let session = session_from_value(&json!({"token": "t2"}), &email).unwrap();
        assert_eq!(session.user, UserProfile::bare(email.clone()));

        assert!(session_from_value(&json!({"message": "ok"}), &email).is_err());
    }

    #[test]
    fn test_url_keeps_base_path() {
        let config = ApiConfig::new(Url::parse("https://api.lindo.rw/v1/").unwrap());
        let client = LindoClient::new(&config).unwrap();
        assert_eq!(
            client.url(endpoints::USER_CART).unwrap().as_str(),
            "https://api.lindo.rw/v1/cart/getUserCart"
        );
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("me.PNG"), "image/png");
        assert_eq!(image_mime("me"), "image/jpeg");
    }
}
