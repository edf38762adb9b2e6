//! Cache types for catalog responses.

use lindo_core::{CategoryId, ProductId};

use super::types::{Advert, Banner, Category, Icon, Product};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(ProductId),
    Categories,
    CategoryProducts(CategoryId),
    Icons,
    Banners,
    Adds,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Categories(Vec<Category>),
    Icons(Vec<Icon>),
    Banners(Vec<Banner>),
    Adds(Vec<Advert>),
}
