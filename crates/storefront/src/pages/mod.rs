//! Page controllers.
//!
//! Each page is a small state machine over [`PageState`]: it starts
//! `Loading`, becomes `Loaded` or `Error` after its first fetch, and applies
//! shopper actions optimistically, rolling back and raising a [`Notice`] when
//! the backend disagrees. Pages react to [`StoreEvent`]s through their
//! `handle_event` method; whoever owns the page forwards events to it.
//!
//! [`StoreEvent`]: crate::events::StoreEvent

mod cart;
mod category;
mod checkout;
mod header;
mod product;
mod search;
mod wishlist;

use std::future::Future;

pub use cart::CartPage;
pub use category::{CategoryPage, CategoryView};
pub use checkout::{CheckoutForm, CheckoutOutcome, CheckoutPage, CheckoutView};
pub use header::HeaderBadges;
pub use product::{ProductPage, ProductView};
pub use search::{SearchPage, SearchResults};
pub use wishlist::{WishlistPage, WishlistView};

use crate::error::AppError;

/// Load state of a page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageState<T> {
    #[default]
    Loading,
    /// Message for the shopper; the page offers a retry.
    Error(String),
    Loaded(T),
}

impl<T> PageState<T> {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub const fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    /// `Loaded` on success; on failure the error is reported and its
    /// shopper-facing message kept.
    #[must_use]
    pub fn from_result(result: Result<T, AppError>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(e) => {
                e.report();
                Self::Error(e.user_message())
            }
        }
    }
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Apply `change` to the loaded value, then await `call`. If the call fails
/// the value is restored, the error reported and a notice raised.
///
/// Returns the call's output on success.
pub(crate) async fn optimistic<T, R, Fut>(
    state: &mut PageState<T>,
    notices: &mut Vec<Notice>,
    change: impl FnOnce(&mut T),
    call: Fut,
    failure: &str,
) -> Option<R>
where
    T: Clone,
    Fut: Future<Output = Result<R, AppError>>,
{
    let snapshot = state.loaded().cloned();
    if let Some(value) = state.loaded_mut() {
        change(value);
    }

    match call.await {
        Ok(output) => Some(output),
        Err(e) => {
            e.report();
            if let Some(previous) = snapshot {
                *state = PageState::Loaded(previous);
            }
            notices.push(Notice::error(format!("{failure}. {}", e.user_message())));
            None
        }
    }
}
