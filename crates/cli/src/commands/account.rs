//! Account commands: login, registration, logout and avatar upload.
//!
//! Login and registration subscribe to the event bus before signing in and
//! handle the resulting `userLogin` like any mounted page would, so the guest
//! cart and wishlist are replayed into the account.

use std::path::Path;

use lindo_storefront::api::Registration;
use lindo_storefront::state::Storefront;
use secrecy::SecretString;

use super::{CommandError, drain_events};

/// `lindo login`
#[allow(clippy::print_stdout)]
pub async fn login(store: &Storefront, email: &str, password: String) -> Result<(), CommandError> {
    let email = CommandError::email(email)?;
    let mut rx = store.events().subscribe();

    store.login(&email, &SecretString::from(password)).await?;
    println!("Signed in as {email}");

    drain_events(store, &mut rx).await;
    Ok(())
}

/// `lindo register`
#[allow(clippy::print_stdout)]
pub async fn register(
    store: &Storefront,
    first_name: String,
    last_name: String,
    email: &str,
    password: String,
) -> Result<(), CommandError> {
    let registration = Registration {
        first_name,
        last_name,
        email: CommandError::email(email)?,
        password: SecretString::from(password),
    };
    let mut rx = store.events().subscribe();

    store.register(&registration).await?;
    println!("Welcome to Lindo, {}", registration.first_name);

    drain_events(store, &mut rx).await;
    Ok(())
}

/// `lindo logout`
#[allow(clippy::print_stdout)]
pub async fn logout(store: &Storefront) -> Result<(), CommandError> {
    store.logout().await?;
    println!("Signed out");
    Ok(())
}

/// `lindo avatar <path>`
#[allow(clippy::print_stdout)]
pub async fn avatar(store: &Storefront, path: &Path) -> Result<(), CommandError> {
    let url = store.upload_avatar(path).await?;
    println!("Avatar updated: {url}");
    Ok(())
}
