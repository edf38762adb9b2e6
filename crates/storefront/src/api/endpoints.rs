//! Backend paths, relative to the configured base URL.
//!
//! Path parameters are percent-encoded by the helpers; ids are opaque
//! strings and may contain anything.

use lindo_core::{CategoryId, ProductId};

pub const PRODUCTS: &str = "/product/getAllProduct";
pub const PRODUCT_SEARCH: &str = "/product/search";
pub const CATEGORIES: &str = "/category/getAllCategories";
pub const ICONS: &str = "/icons/getAllIcons";
pub const BANNERS: &str = "/banner/getAllBanners";
pub const ADDS: &str = "/adds/getAllAdds";

pub const USER_CART: &str = "/cart/getUserCart";
pub const USER_CART_WITH_PRODUCTS: &str = "/cart/getUserCartWithProducts";
pub const ADD_TO_CART: &str = "/cart/addToCart";
pub const INCREASE_QUANTITY: &str = "/cart/increaseQuantity";
pub const REDUCE_FROM_CART: &str = "/cart/reduceFromCart";
pub const CLEAR_CART: &str = "/cart/clearCart";

pub const USER_WISHLIST: &str = "/wishlist/getUserWishlist";
pub const TOGGLE_WISHLIST: &str = "/wishlist/toggleWishlist";
pub const ADD_TO_WISHLIST: &str = "/wishlist/addToWishlist";

pub const CREATE_ORDER: &str = "/orders/createOrder";
pub const INITIALIZE_PAYMENT: &str = "/dpo/initialize/dpoPayment";

pub const LOGIN: &str = "/user/login";
pub const REGISTER: &str = "/user/register";
pub const UPLOAD_AVATAR: &str = "/user/uploadAvatar";

/// `GET` one product.
#[must_use]
pub fn product(id: &ProductId) -> String {
    format!("/product/getProductById/{}", urlencoding::encode(id.as_str()))
}

/// `GET` a category's products.
#[must_use]
pub fn products_by_category(id: &CategoryId) -> String {
    format!(
        "/product/getProductsByCategory/{}",
        urlencoding::encode(id.as_str())
    )
}

/// `DELETE` one cart line.
#[must_use]
pub fn remove_from_cart(id: &ProductId) -> String {
    format!("/cart/removeFromCart/{}", urlencoding::encode(id.as_str()))
}

/// `DELETE` one wishlist entry.
#[must_use]
pub fn remove_from_wishlist(id: &ProductId) -> String {
    format!(
        "/wishlist/removeFromWishlist/{}",
        urlencoding::encode(id.as_str())
    )
}
