//! Lindo storefront client library.
//!
//! Guest shoppers keep their cart and wishlist in a local key-value store;
//! signed-in shoppers keep them on the Lindo REST backend. On login the guest
//! collections are replayed into the server once, through [`reconcile`].
//!
//! # Layout
//!
//! - [`storage`], [`local`] - Key-value store, key scheme and the guest buckets
//! - [`auth`] - Session keys and the logged-in predicate
//! - [`api`], [`remote`] - REST client and the traits pages call through
//! - [`shop`] - Cart and wishlist actions that pick local or remote
//! - [`pages`] - Page controllers with optimistic updates
//! - [`state`] - The [`Storefront`](state::Storefront) that wires it all up

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod local;
pub mod pages;
pub mod profile;
pub mod reconcile;
pub mod remote;
pub mod shop;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;
