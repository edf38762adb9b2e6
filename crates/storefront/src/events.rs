//! In-process event bus.
//!
//! Stands in for the browser's custom events: the login flow announces
//! `userLogin`, local storage writes announce `storage`, and cart or
//! wishlist changes that never touch local storage announce `cart-updated`
//! or `wishlist-updated` so header badges can refresh.

use lindo_core::Email;
use tokio::sync::broadcast;
use tracing::trace;

/// Buffered events per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Events published by the storefront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A shopper signed in or registered.
    UserLogin {
        /// The shopper's email.
        email: Email,
    },
    /// The shopper signed out.
    UserLogout,
    /// The server-side cart changed.
    CartUpdated,
    /// The wishlist changed (locally or on the server).
    WishlistUpdated,
    /// A local storage key was written or removed.
    Storage {
        /// The key that changed.
        key: String,
    },
}

impl StoreEvent {
    /// Browser-style event name, for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UserLogin { .. } => "userLogin",
            Self::UserLogout => "userLogout",
            Self::CartUpdated => "cart-updated",
            Self::WishlistUpdated => "wishlist-updated",
            Self::Storage { .. } => "storage",
        }
    }
}

/// Cheaply cloneable broadcast handle.
///
/// Emitting with no subscribers is not an error. A subscriber that falls
/// more than the channel capacity behind skips the oldest events; every page
/// re-reads its data on load anyway.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// A bus with no subscribers yet.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    pub fn emit(&self, event: StoreEvent) {
        trace!(event = event.name(), "emit");
        // No receivers is fine: nothing is listening yet.
        let _ = self.sender.send(event);
    }

    /// Listen for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        EventBus::new().emit(StoreEvent::WishlistUpdated);
    }

    #[test]
    fn test_every_subscriber_sees_event() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.clone().subscribe();

        bus.emit(StoreEvent::UserLogout);

        assert_eq!(a.try_recv().unwrap(), StoreEvent::UserLogout);
        assert_eq!(b.try_recv().unwrap(), StoreEvent::UserLogout);
    }

    #[test]
    fn test_event_names() {
        let email = Email::parse("a@b.rw").unwrap();
        assert_eq!(StoreEvent::UserLogin { email }.name(), "userLogin");
        assert_eq!(StoreEvent::WishlistUpdated.name(), "wishlist-updated");
    }
}
