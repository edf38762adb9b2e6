//! Cart commands.

use lindo_core::{CartLines, ProductId};
use lindo_storefront::api::LindoClient;
use lindo_storefront::error::AppError;
use lindo_storefront::pages::CartPage;
use lindo_storefront::remote::CatalogRemote;
use lindo_storefront::state::Storefront;

use super::{CommandError, fail_on_error, print_notices, print_state};

#[allow(clippy::print_stdout)]
fn print_cart(cart: &CartLines) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in cart.items() {
        println!(
            "{:<26} {:<36} x{:<3} {:>12}",
            item.product_id,
            item.name,
            item.quantity,
            item.line_total().display()
        );
    }
    println!("Subtotal: {}", cart.subtotal().display());
}

async fn loaded_page(store: &Storefront) -> Result<CartPage<LindoClient>, CommandError> {
    let mut page = CartPage::new(store.shop().clone());
    page.load().await;
    fail_on_error(page.state())?;
    Ok(page)
}

/// `lindo cart show`
pub async fn show(store: &Storefront) -> Result<(), CommandError> {
    let mut page = CartPage::new(store.shop().clone());
    page.load().await;
    print_state(page.state(), print_cart);
    fail_on_error(page.state())
}

/// `lindo cart add <id>`
pub async fn add(store: &Storefront, id: &str, quantity: u32) -> Result<(), CommandError> {
    let product = store
        .client()
        .fetch_product(&ProductId::from(id))
        .await
        .map_err(AppError::from)?;

    let mut page = loaded_page(store).await?;
    page.add(product.to_cart_item(quantity.max(1))).await;
    print_notices(page.take_notices());
    print_state(page.state(), print_cart);
    Ok(())
}

/// `lindo cart inc|dec <id>`
pub async fn change(store: &Storefront, id: &str, delta: i32) -> Result<(), CommandError> {
    let product_id = ProductId::from(id);
    let mut page = loaded_page(store).await?;
    if !page.state().loaded().is_some_and(|cart| cart.contains(&product_id)) {
        return Err(CommandError::Failed(format!("{id} is not in your cart")));
    }

    page.handle_quantity_change(&product_id, delta).await;
    print_notices(page.take_notices());
    print_state(page.state(), print_cart);
    Ok(())
}

/// `lindo cart remove <id>`
pub async fn remove(store: &Storefront, id: &str) -> Result<(), CommandError> {
    let mut page = loaded_page(store).await?;
    page.remove(&ProductId::from(id)).await;
    print_notices(page.take_notices());
    print_state(page.state(), print_cart);
    Ok(())
}

/// `lindo cart clear`
pub async fn clear(store: &Storefront) -> Result<(), CommandError> {
    let mut page = loaded_page(store).await?;
    page.clear().await;
    print_notices(page.take_notices());
    print_state(page.state(), print_cart);
    Ok(())
}
