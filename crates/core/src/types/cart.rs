//! Cart lines and the invariants every cart copy shares.
//!
//! The same [`CartLines`] type backs the guest cart in local storage and the
//! in-memory view of the server cart, so both paths get identical semantics:
//!
//! - a product appears at most once; adding it again merges quantities
//! - quantities are at least one; decrements clamp instead of removing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A single cart line.
///
/// Serialized in the camelCase layout the storefront has always written to
/// local storage (`productId`, `name`, `price`, `image`, `quantity`,
/// `category`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product identifier; unique within a cart.
    pub product_id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price in RWF.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Primary image URL.
    #[serde(default)]
    pub image: String,
    /// Quantity, at least one.
    #[serde(default = "one", deserialize_with = "at_least_one")]
    pub quantity: u32,
    /// Category name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

const fn one() -> u32 {
    1
}

fn at_least_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(u32::try_from(raw.max(1)).unwrap_or(u32::MAX))
}

impl CartItem {
    /// Create a line with the given quantity (clamped to at least one).
    #[must_use]
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        image: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            price: price.max(Decimal::ZERO),
            image: image.into(),
            quantity: quantity.max(1),
            category: None,
        }
    }

    /// Attach a category name.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Unit price.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::rwf(self.price)
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price().times(self.quantity)
    }
}

/// An ordered collection of cart lines keyed by product.
///
/// Insertion order is preserved for display but carries no meaning. Stored
/// arrays with repeated products are merged on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct CartLines(Vec<CartItem>);

impl From<Vec<CartItem>> for CartLines {
    fn from(items: Vec<CartItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<CartLines> for Vec<CartItem> {
    fn from(lines: CartLines) -> Self {
        lines.0
    }
}

impl CartLines {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from raw lines, merging duplicate products.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut lines = Self::new();
        for item in items {
            lines.add(item);
        }
        lines
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.0
    }

    /// Consume into the raw lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.0
    }

    /// Look up a line by product.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.0.iter().find(|item| &item.product_id == product_id)
    }

    fn get_mut(&mut self, product_id: &ProductId) -> Option<&mut CartItem> {
        self.0.iter_mut().find(|item| &item.product_id == product_id)
    }

    /// Whether the product is in the cart.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add a line. If the product is already present its quantity grows by
    /// the incoming quantity instead of creating a second line.
    pub fn add(&mut self, item: CartItem) {
        let quantity = item.quantity.max(1);
        match self.get_mut(&item.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => self.0.push(CartItem { quantity, ..item }),
        }
    }

    /// Increase a line's quantity. Returns `false` if the product is absent.
    pub fn increase(&mut self, product_id: &ProductId, delta: u32) -> bool {
        self.get_mut(product_id).is_some_and(|item| {
            item.quantity = item.quantity.saturating_add(delta);
            true
        })
    }

    /// Decrease a line's quantity by one, never below one. Returns `false`
    /// if the product is absent.
    pub fn decrease(&mut self, product_id: &ProductId) -> bool {
        self.change_quantity(product_id, -1).is_some()
    }

    /// Apply a signed quantity change, clamped at one. Returns the new
    /// quantity, or `None` if the product is absent.
    pub fn change_quantity(&mut self, product_id: &ProductId, delta: i32) -> Option<u32> {
        let item = self.get_mut(product_id)?;
        let next = i64::from(item.quantity) + i64::from(delta);
        item.quantity = u32::try_from(next.max(1)).unwrap_or(u32::MAX);
        Some(item.quantity)
    }

    /// Set a line's quantity (clamped to at least one). Returns `false` if
    /// the product is absent.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        self.get_mut(product_id).is_some_and(|item| {
            item.quantity = quantity.max(1);
            true
        })
    }

    /// Remove a line. Removing an absent product is a no-op; the removed
    /// line is returned when there was one.
    pub fn remove(&mut self, product_id: &ProductId) -> Option<CartItem> {
        let index = self
            .0
            .iter()
            .position(|item| &item.product_id == product_id)?;
        Some(self.0.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Merge another cart into this one, summing quantities per product.
    pub fn merge(&mut self, other: Self) {
        for item in other.0 {
            self.add(item);
        }
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.0.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.0
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }
}

impl IntoIterator for CartLines {
    type Item = CartItem;
    type IntoIter = std::vec::IntoIter<CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CartLines {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
