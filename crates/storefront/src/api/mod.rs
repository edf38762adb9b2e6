//! Lindo backend REST client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS with `reqwest` 0.13
//! - The backend is source of truth for signed-in shoppers; guests only ever
//!   hit the catalog endpoints
//! - Catalog reads are cached in-memory via `moka` (5 minute TTL by default);
//!   cart, wishlist and order calls are never cached
//! - Every request carries an `X-Request-Id` so backend logs can be matched
//!   to ours
//!
//! # Example
//!
//! ```rust,ignore
//! use lindo_storefront::api::LindoClient;
//!
//! let client = LindoClient::new(&config.api)?;
//!
//! let products = client.fetch_products().await?;
//! let cart = client.fetch_user_cart(&credentials).await?;
//! ```

mod cache;
mod client;
pub mod endpoints;
pub mod types;

pub use client::LindoClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a response (DNS, TLS, timeout, connection).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the body, or the start of the body.
        message: String,
    },

    /// The token was missing, expired or rejected (401/403).
    #[error("Unauthorized ({status})")]
    Unauthorized {
        /// 401 or 403.
        status: u16,
    },

    /// The resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of the failure, when the backend sent one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Unauthorized { status } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Whether the request failed before any response arrived.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Whether the failure is the backend's fault (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }
}
