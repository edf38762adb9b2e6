//! Wire types for the Lindo backend.
//!
//! The backend is a document store behind Express, so ids arrive as `_id`
//! and references are sometimes populated (a nested object) and sometimes
//! bare (an id string). [`ProductRef`] and [`CategoryRef`] accept both.

use std::fmt;

use lindo_core::{CartItem, CategoryId, Email, OrderId, OrderStatus, PaymentMethod, ProductId, Wishlist};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::auth::BearerToken;

// =============================================================================
// Catalog
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default, alias = "countInStock", skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl Product {
    /// First image URL, or empty when the product has none.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.image
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
            .unwrap_or_default()
    }

    /// Id of the product's category, if it has one.
    #[must_use]
    pub fn category_id(&self) -> Option<&CategoryId> {
        self.category.as_ref().map(CategoryRef::id)
    }

    /// A cart line for this product.
    #[must_use]
    pub fn to_cart_item(&self, quantity: u32) -> CartItem {
        let item = CartItem::new(
            self.id.clone(),
            self.name.clone(),
            self.price,
            self.primary_image(),
            quantity,
        );
        match self.category.as_ref().and_then(CategoryRef::name) {
            Some(name) => item.with_category(name),
            None => item,
        }
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A category reference: either populated or a bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Populated(Category),
    Id(CategoryId),
}

impl CategoryRef {
    /// The referenced category's id.
    #[must_use]
    pub const fn id(&self) -> &CategoryId {
        match self {
            Self::Populated(category) => &category.id,
            Self::Id(id) => id,
        }
    }

    /// The category name, when populated.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Populated(category) => Some(&category.name),
            Self::Id(_) => None,
        }
    }
}

/// A product reference: either populated or a bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Populated(Box<Product>),
    Id(ProductId),
}

impl ProductRef {
    /// The referenced product's id.
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Populated(product) => &product.id,
            Self::Id(id) => id,
        }
    }
}

/// Home-page category icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// Home-page hero banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Promotional tile (the backend's "adds").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advert {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

// =============================================================================
// Cart & Wishlist
// =============================================================================

/// A line of the server-side cart.
///
/// `getUserCartWithProducts` populates `productId` with the product; the bare
/// `getUserCart` sends the id plus whatever the backend copied at add time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartLine {
    #[serde(alias = "product")]
    pub product_id: ProductRef,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

const fn one() -> u32 {
    1
}

impl RemoteCartLine {
    /// Flatten into a cart line, preferring populated product data.
    #[must_use]
    pub fn into_cart_item(self) -> CartItem {
        match self.product_id {
            ProductRef::Populated(product) => product.to_cart_item(self.quantity),
            ProductRef::Id(id) => {
                let name = self.name.unwrap_or_else(|| id.to_string());
                CartItem::new(
                    id,
                    name,
                    self.price.unwrap_or_default(),
                    self.image.unwrap_or_default(),
                    self.quantity,
                )
            }
        }
    }
}

/// Body of `POST /cart/addToCart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of the quantity endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
}

/// Body of the wishlist mutation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: ProductId,
}

/// Collect a wishlist response into a set of ids.
#[must_use]
pub fn wishlist_from_refs(refs: Vec<ProductRef>) -> Wishlist {
    refs.into_iter()
        .map(|r| match r {
            ProductRef::Populated(product) => product.id,
            ProductRef::Id(id) => id,
        })
        .collect()
}

// =============================================================================
// Orders & Payment
// =============================================================================

/// Where an order ships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ShippingAddress {
    /// Names of required fields left blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("full name", &self.full_name),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Body of `POST /orders/createOrder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub email: Email,
}

/// The backend's answer to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    #[serde(rename = "_id", alias = "id", alias = "orderId")]
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_amount: Option<Decimal>,
}

/// Body of `POST /dpo/initialize/dpoPayment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub order_id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub customer_name: String,
}

/// Hosted payment page to send the shopper to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInit {
    #[serde(alias = "paymentUrl", alias = "url")]
    pub redirect_url: String,
    #[serde(default, alias = "transToken", skip_serializing_if = "Option::is_none")]
    pub transaction_token: Option<String>,
}

// =============================================================================
// Users
// =============================================================================

/// Profile fields returned with a login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, alias = "profileImage", skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserProfile {
    /// A profile with only an email.
    #[must_use]
    pub const fn bare(email: Email) -> Self {
        Self {
            email,
            first_name: None,
            last_name: None,
            avatar: None,
        }
    }
}

/// A successful login or registration.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: BearerToken,
    pub user: UserProfile,
}

/// New-account details.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password: SecretString,
}

impl Registration {
    /// JSON body for `POST /user/register`.
    pub(crate) fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "password": self.password.expose_secret(),
        })
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_accepts_backend_shape() {
        let product: Product = serde_json::from_value(json!({
            "_id": "P1",
            "name": "Baby Wipes",
            "price": 5000,
            "images": ["https://cdn/wipes.jpg"],
            "category": {"_id": "C1", "name": "Hygiene"},
            "countInStock": 12
        }))
        .unwrap();

        assert_eq!(product.id.as_str(), "P1");
        assert_eq!(product.primary_image(), "https://cdn/wipes.jpg");
        assert_eq!(product.category_id().unwrap().as_str(), "C1");
        assert_eq!(product.stock, Some(12));

        let item = product.to_cart_item(2);
        assert_eq!(item.category.as_deref(), Some("Hygiene"));
        assert_eq!(item.line_total().display(), "10,000 RWF");
    }

    #[test]
    fn test_bare_category_reference() {
        let product: Product = serde_json::from_value(json!({
            "id": "P2", "name": "Bib", "price": 1500.0, "category": "C7"
        }))
        .unwrap();
        assert_eq!(product.category_id().unwrap().as_str(), "C7");
        assert!(product.to_cart_item(1).category.is_none());
        assert_eq!(product.primary_image(), "");
    }

    #[test]
    fn test_remote_cart_line_populated_and_bare() {
        let populated: RemoteCartLine = serde_json::from_value(json!({
            "productId": {"_id": "P1", "name": "Wipes", "price": 5000},
            "quantity": 2
        }))
        .unwrap();
        let item = populated.into_cart_item();
        assert_eq!(item.name, "Wipes");
        assert_eq!(item.quantity, 2);

        let bare: RemoteCartLine =
            serde_json::from_value(json!({"productId": "P3", "price": 700})).unwrap();
        let item = bare.into_cart_item();
        assert_eq!(item.name, "P3");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.price, Decimal::from(700));
    }

    #[test]
    fn test_wishlist_from_mixed_refs() {
        let refs: Vec<ProductRef> = serde_json::from_value(json!([
            "P1",
            {"_id": "P2", "name": "Bib", "price": 1500}
        ]))
        .unwrap();
        let wishlist = wishlist_from_refs(refs);
        assert!(wishlist.contains(&ProductId::from("P1")));
        assert!(wishlist.contains(&ProductId::from("P2")));
    }

    #[test]
    fn test_missing_address_fields() {
        let address = ShippingAddress {
            full_name: "Aline".to_string(),
            phone: " ".to_string(),
            ..ShippingAddress::default()
        };
        assert_eq!(address.missing_fields(), vec!["phone", "street", "city"]);
    }

    #[test]
    fn test_order_confirmation_aliases() {
        let confirmation: OrderConfirmation =
            serde_json::from_value(json!({"orderId": "O1", "status": "awaiting"})).unwrap();
        assert_eq!(confirmation.id.as_str(), "O1");
        assert_eq!(confirmation.status, OrderStatus::Pending);
    }

    #[test]
    fn test_payment_init_aliases() {
        let init: PaymentInit = serde_json::from_value(json!({
            "paymentUrl": "https://secure.3gdirectpay.com/pay?ID=abc",
            "transToken": "abc"
        }))
        .unwrap();
        assert_eq!(init.transaction_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_registration_debug_redacts_password() {
        let registration = Registration {
            first_name: "Aline".to_string(),
            last_name: "U".to_string(),
            email: Email::parse("aline@lindo.rw").unwrap(),
            password: SecretString::from("hunter2-hunter2".to_string()),
        };
        assert!(!format!("{registration:?}").contains("hunter2"));
        assert_eq!(registration.to_body()["password"], "hunter2-hunter2");
    }
}
