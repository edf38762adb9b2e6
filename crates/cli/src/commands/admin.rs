//! Admin gate commands.
//!
//! # Environment Variables
//!
//! - `LINDO_ADMIN_USERNAME` / `LINDO_ADMIN_PASSWORD` - Expected credentials.
//!   Without both, admin login is disabled.

use lindo_storefront::state::Storefront;

use super::CommandError;

/// `lindo admin login`
#[allow(clippy::print_stdout)]
pub fn login(store: &Storefront, username: &str, password: &str) -> Result<(), CommandError> {
    store.admin().login(username, password)?;
    println!("Admin session started");
    Ok(())
}

/// `lindo admin logout`
#[allow(clippy::print_stdout)]
pub fn logout(store: &Storefront) -> Result<(), CommandError> {
    store.admin().logout()?;
    println!("Admin session ended");
    Ok(())
}

/// `lindo admin status`
#[allow(clippy::print_stdout)]
pub fn status(store: &Storefront) {
    let gate = store.admin();
    if !gate.is_enabled() {
        println!("Admin access is not configured");
    } else if gate.is_admin() {
        println!("Admin session open");
    } else {
        println!("No admin session");
    }
}
