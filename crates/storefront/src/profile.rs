//! Per-shopper profile keys.
//!
//! Names and the avatar URL are plain strings; the saved shipping address is
//! a JSON [`ShippingAddress`] and prefills checkout.

use lindo_core::Email;
use tracing::debug;

use crate::api::ShippingAddress;
use crate::storage::{LocalStorage, StorageError, keys};

/// Profile fields stored on the device for one email.
#[derive(Debug, Clone)]
pub struct Profile {
    storage: LocalStorage,
    email: Email,
}

impl Profile {
    #[must_use]
    pub const fn new(storage: LocalStorage, email: Email) -> Self {
        Self { storage, email }
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn first_name(&self) -> Option<String> {
        self.non_empty(&keys::first_name(&self.email))
    }

    #[must_use]
    pub fn last_name(&self) -> Option<String> {
        self.non_empty(&keys::last_name(&self.email))
    }

    /// `First Last`, or whichever half is known.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match (self.first_name(), self.last_name()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (first, last) => first.or(last),
        }
    }

    #[must_use]
    pub fn avatar(&self) -> Option<String> {
        self.non_empty(&keys::avatar(&self.email))
    }

    /// Saved shipping address, if one parses.
    #[must_use]
    pub fn address(&self) -> Option<ShippingAddress> {
        self.storage.get_json(&keys::address(&self.email))
    }

    /// # Errors
    ///
    /// Returns an error if the key cannot be written.
    pub fn set_first_name(&self, value: &str) -> Result<(), StorageError> {
        self.storage.set_raw(&keys::first_name(&self.email), value.trim())
    }

    /// # Errors
    ///
    /// Returns an error if the key cannot be written.
    pub fn set_last_name(&self, value: &str) -> Result<(), StorageError> {
        self.storage.set_raw(&keys::last_name(&self.email), value.trim())
    }

    /// # Errors
    ///
    /// Returns an error if the key cannot be written.
    pub fn set_avatar(&self, url: &str) -> Result<(), StorageError> {
        self.storage.set_raw(&keys::avatar(&self.email), url)
    }

    /// # Errors
    ///
    /// Returns an error if the address cannot be serialised or written.
    pub fn set_address(&self, address: &ShippingAddress) -> Result<(), StorageError> {
        debug!(email = %self.email, "Saving shipping address");
        self.storage.set_json(&keys::address(&self.email), address)
    }

    /// A shipping address to start checkout from: the saved one, or one with
    /// the full name filled from the profile.
    #[must_use]
    pub fn checkout_address(&self) -> ShippingAddress {
        self.address().unwrap_or_else(|| ShippingAddress {
            full_name: self.display_name().unwrap_or_default(),
            ..ShippingAddress::default()
        })
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.storage
            .get_raw(key)
            .filter(|value| !value.trim().is_empty())
    }
}
