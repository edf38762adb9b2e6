//! Subcommand implementations.
//!
//! Commands drive the same page controllers a UI would, then print what the
//! page ended up showing: its loaded value or error, plus any toasts.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod wishlist;

use lindo_core::Email;
use lindo_storefront::api::Product;
use lindo_storefront::error::AppError;
use lindo_storefront::events::StoreEvent;
use lindo_storefront::pages::{Notice, NoticeLevel, PageState};
use lindo_storefront::state::Storefront;
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors that end a command with a non-zero exit.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("{0}")]
    Failed(String),
}

impl CommandError {
    /// Parse an email argument.
    pub fn email(raw: &str) -> Result<Email, Self> {
        Email::parse(raw).map_err(|_| Self::InvalidEmail(raw.to_string()))
    }
}

/// Print toasts, most recent last.
#[allow(clippy::print_stdout)]
pub fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        println!("[{tag}] {}", notice.message);
    }
}

/// Print a page's value with `render`, or its error.
#[allow(clippy::print_stdout)]
pub fn print_state<T>(state: &PageState<T>, render: impl FnOnce(&T)) {
    match state {
        PageState::Loading => println!("(loading)"),
        PageState::Error(message) => println!("Error: {message}. Run the command again to retry."),
        PageState::Loaded(value) => render(value),
    }
}

/// One product per line.
#[allow(clippy::print_stdout)]
pub fn print_products(products: &[Product], saved: impl Fn(&Product) -> bool) {
    if products.is_empty() {
        println!("No products.");
        return;
    }
    for product in products {
        let heart = if saved(product) { "♥" } else { " " };
        println!(
            "{heart} {:<26} {:<40} {:>12}",
            product.id,
            product.name,
            lindo_core::Price::rwf(product.price).display()
        );
    }
}

/// Handle every event queued since `rx` subscribed, the way a mounted page
/// would: a login replays the guest cart and wishlist.
#[allow(clippy::print_stdout)]
pub async fn drain_events(store: &Storefront, rx: &mut broadcast::Receiver<StoreEvent>) {
    while let Ok(event) = rx.try_recv() {
        tracing::debug!(event = event.name(), "Handling event");
        if let StoreEvent::UserLogin { .. } = event {
            match store.shop().on_user_login().await {
                Ok(reports) => {
                    for report in reports.iter().filter(|r| !r.skipped) {
                        println!(
                            "Synced guest {}: {} replayed, {} failed",
                            report.domain,
                            report.replayed.len(),
                            report.failed.len()
                        );
                    }
                }
                Err(e) => {
                    e.report();
                    println!("Could not sync your guest cart: {}", e.user_message());
                }
            }
        }
    }
}

/// Turn a page's error state into a command failure.
pub fn fail_on_error<T>(state: &PageState<T>) -> Result<(), CommandError> {
    match state.error() {
        Some(message) => Err(CommandError::Failed(message.to_string())),
        None => Ok(()),
    }
}
