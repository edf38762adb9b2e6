//! Core types for Lindo.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod status;
pub mod wishlist;

pub use cart::{CartItem, CartLines};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::*;
pub use wishlist::{Wishlist, WishlistToggle};
