//! Lindo Core - Shared domain types.
//!
//! This crate provides the types used across all Lindo components:
//! - `storefront` - Client library (local store, REST client, reconciliation, pages)
//! - `cli` - Command-line driver for the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no storage
//! access, no HTTP clients. Invariants that must hold no matter where a cart or
//! wishlist lives (a product appears once, quantities never drop below one)
//! are enforced here so the local and remote code paths share them.
//!
//! # Modules
//!
//! - [`types`] - Ids, emails, RWF prices, cart lines, wishlists, order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
