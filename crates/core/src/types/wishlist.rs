//! Wishlist membership set.

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Result of toggling a product's wishlist membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistToggle {
    /// The product was absent and is now saved.
    Added,
    /// The product was present and is now gone.
    Removed,
}

impl WishlistToggle {
    /// Whether the product is in the wishlist after the toggle.
    #[must_use]
    pub const fn is_saved(self) -> bool {
        matches!(self, Self::Added)
    }
}

/// A set of wishlisted product ids.
///
/// Keeps insertion order so a freshly saved product renders last, but
/// equality ignores order: the server does not preserve it either.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ProductId>", into = "Vec<ProductId>")]
pub struct Wishlist(Vec<ProductId>);

impl Wishlist {
    /// An empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Whether the product is saved.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.0.contains(product_id)
    }

    /// Save a product. Returns `false` (and changes nothing) if it was
    /// already saved.
    pub fn insert(&mut self, product_id: ProductId) -> bool {
        if self.contains(&product_id) {
            return false;
        }
        self.0.push(product_id);
        true
    }

    /// Remove a product. Returns `false` if it was not saved.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|id| id != product_id);
        self.0.len() != before
    }

    /// Add if absent, remove if present.
    pub fn toggle(&mut self, product_id: &ProductId) -> WishlistToggle {
        if self.remove(product_id) {
            WishlistToggle::Removed
        } else {
            self.0.push(product_id.clone());
            WishlistToggle::Added
        }
    }

    /// Union with another wishlist.
    pub fn merge(&mut self, other: Self) {
        for id in other.0 {
            self.insert(id);
        }
    }

    /// Saved ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.0.iter()
    }

    /// Number of saved products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Wishlist {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|id| other.contains(id))
    }
}

impl Eq for Wishlist {}

impl From<Vec<ProductId>> for Wishlist {
    fn from(ids: Vec<ProductId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<Wishlist> for Vec<ProductId> {
    fn from(wishlist: Wishlist) -> Self {
        wishlist.0
    }
}

impl FromIterator<ProductId> for Wishlist {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        let mut wishlist = Self::new();
        for id in iter {
            wishlist.insert(id);
        }
        wishlist
    }
}

impl IntoIterator for Wishlist {
    type Item = ProductId;
    type IntoIter = std::vec::IntoIter<ProductId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Wishlist {
        raw.iter().map(|id| ProductId::from(*id)).collect()
    }

    #[test]
    fn test_double_toggle_restores_set() {
        for start in [ids(&[]), ids(&["P1"]), ids(&["P1", "P2", "P3"])] {
            for target in ["P1", "P2", "P9"] {
                let id = ProductId::from(target);
                let mut wishlist = start.clone();
                let first = wishlist.toggle(&id);
                let second = wishlist.toggle(&id);

                assert_ne!(first, second);
                assert_eq!(wishlist, start);
            }
        }
    }

    #[test]
    fn test_insert_present_is_noop() {
        let mut wishlist = ids(&["P1"]);
        assert!(!wishlist.insert(ProductId::from("P1")));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_equality_ignores_order() {
        assert_eq!(ids(&["A", "B"]), ids(&["B", "A"]));
        assert_ne!(ids(&["A"]), ids(&["A", "B"]));
    }

    #[test]
    fn test_stored_duplicates_collapse() {
        let wishlist: Wishlist = serde_json::from_str(r#"["P1","P2","P1"]"#).unwrap();
        assert_eq!(wishlist.len(), 2);
        assert_eq!(serde_json::to_string(&wishlist).unwrap(), r#"["P1","P2"]"#);
    }

    #[test]
    fn test_toggle_reports_membership() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.toggle(&ProductId::from("P2")).is_saved());
        assert!(!wishlist.toggle(&ProductId::from("P2")).is_saved());
    }
}
