//! Wishlist commands.

use lindo_core::ProductId;
use lindo_storefront::pages::{WishlistPage, WishlistView};
use lindo_storefront::state::Storefront;

use super::{CommandError, fail_on_error, print_notices, print_products, print_state};

#[allow(clippy::print_stdout)]
fn print_wishlist(view: &WishlistView) {
    if view.ids.is_empty() {
        println!("Your wishlist is empty.");
        return;
    }
    print_products(&view.products, |_| true);
    let missing = view.ids.len().saturating_sub(view.products.len());
    if missing > 0 {
        println!("({missing} saved product(s) are no longer available)");
    }
}

/// `lindo wishlist show`
pub async fn show(store: &Storefront) -> Result<(), CommandError> {
    let mut page = WishlistPage::new(store.shop().clone());
    page.load().await;
    print_state(page.state(), print_wishlist);
    fail_on_error(page.state())
}

/// `lindo wishlist toggle <id>`
pub async fn toggle(store: &Storefront, id: &str) -> Result<(), CommandError> {
    let mut page = WishlistPage::new(store.shop().clone());
    page.load().await;
    fail_on_error(page.state())?;

    page.toggle(&ProductId::from(id)).await;
    let notices = page.take_notices();
    let failed = !notices.is_empty();
    print_notices(notices);
    print_state(page.state(), print_wishlist);
    if failed {
        return Err(CommandError::Failed("Wishlist not updated".to_string()));
    }
    Ok(())
}
