//! Page controllers against the fake backend: optimistic rollback and
//! checkout.

#![allow(clippy::unwrap_used)]

use lindo_core::{Email, OrderId, PaymentMethod, ProductId};
use lindo_integration_tests::{FakeBackend, RouteGroup};
use lindo_storefront::api::ShippingAddress;
use lindo_storefront::pages::{
    CartPage, CheckoutForm, CheckoutOutcome, CheckoutPage, NoticeLevel, WishlistPage,
};
use lindo_storefront::remote::CatalogRemote;
use lindo_storefront::state::Storefront;
use lindo_storefront::storage::{Scope, keys};
use secrecy::SecretString;

const EMAIL: &str = "mama@lindo.rw";
const PASSWORD: &str = "umwana-mwiza-2024";

async fn signed_in() -> (FakeBackend, Storefront) {
    let backend = FakeBackend::spawn().await;
    backend.add_product("P1", "Baby wipes", 3000, "C1");
    backend.add_product("P2", "Cotton bib", 7000, "C1");
    backend.add_account(EMAIL, PASSWORD);

    let store = backend.storefront();
    store
        .login(
            &Email::parse(EMAIL).unwrap(),
            &SecretString::from(PASSWORD),
        )
        .await
        .unwrap();
    store.shop().on_user_login().await.unwrap();
    (backend, store)
}

async fn add(store: &Storefront, id: &str, quantity: u32) {
    let product = store
        .client()
        .fetch_product(&ProductId::from(id))
        .await
        .unwrap();
    store
        .shop()
        .add_to_cart(product.to_cart_item(quantity))
        .await
        .unwrap();
}

fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Aline Uwase".to_string(),
        phone: "0788000000".to_string(),
        street: "KG 11 Ave".to_string(),
        city: "Kigali".to_string(),
        ..ShippingAddress::default()
    }
}

// =============================================================================
// Optimistic updates
// =============================================================================

#[tokio::test]
async fn test_wishlist_toggle_reverts_when_backend_fails() {
    let (backend, store) = signed_in().await;
    let mut page = WishlistPage::new(store.shop().clone());
    page.load().await;
    let before = page.state().clone();

    let storage = store.shop().local().storage();
    let scope = Scope::User(Email::parse(EMAIL).unwrap());
    backend.fail(RouteGroup::Wishlist, 500);

    page.toggle(&ProductId::from("P2")).await;

    assert_eq!(page.state(), &before);
    let notices = page.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices.first().unwrap().level, NoticeLevel::Error);
    assert!(backend.wishlist_of(EMAIL).is_empty());
    assert!(!storage.contains(&keys::wishlist(&scope)));
}

#[tokio::test]
async fn test_quantity_never_drops_below_one() {
    let (backend, store) = signed_in().await;
    add(&store, "P1", 1).await;

    let mut page = CartPage::new(store.shop().clone());
    page.load().await;
    page.handle_quantity_change(&ProductId::from("P1"), -1).await;

    let cart = page.state().loaded().unwrap();
    assert_eq!(cart.get(&ProductId::from("P1")).unwrap().quantity, 1);
    assert_eq!(backend.cart_of(EMAIL), vec![("P1".to_string(), 1)]);
}

#[tokio::test]
async fn test_cart_page_falls_back_to_bare_cart() {
    let (backend, store) = signed_in().await;
    add(&store, "P1", 2).await;
    backend.fail(RouteGroup::JoinedCart, 500);

    let mut page = CartPage::new(store.shop().clone());
    page.load().await;

    let cart = page.state().loaded().unwrap();
    assert_eq!(cart.get(&ProductId::from("P1")).unwrap().quantity, 2);
    assert_eq!(backend.hits("/cart/getUserCartWithProducts"), 1);
    assert_eq!(backend.hits("/cart/getUserCart"), 1);
}

#[tokio::test]
async fn test_cart_quantity_change_reverts_on_failure() {
    let (backend, store) = signed_in().await;
    add(&store, "P1", 2).await;

    let mut page = CartPage::new(store.shop().clone());
    page.load().await;
    backend.fail(RouteGroup::Cart, 503);
    page.handle_quantity_change(&ProductId::from("P1"), 1).await;

    let cart = page.state().loaded().unwrap();
    assert_eq!(cart.get(&ProductId::from("P1")).unwrap().quantity, 2);
    assert_eq!(page.take_notices().len(), 1);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_redirects_to_payment() {
    let (backend, store) = signed_in().await;
    add(&store, "P1", 1).await;
    add(&store, "P2", 2).await;

    let mut page = CheckoutPage::new(store.shop().clone());
    page.load().await;
    assert_eq!(page.state().loaded().unwrap().subtotal.display(), "17,000 RWF");

    let outcome = page
        .submit(&CheckoutForm {
            address: address(),
            payment_method: PaymentMethod::Dpo,
            save_address: false,
        })
        .await
        .unwrap();

    let CheckoutOutcome::RedirectToPayment {
        order_id,
        redirect_url,
    } = outcome
    else {
        panic!("expected a payment redirect, got {outcome:?}");
    };
    assert_eq!(order_id, OrderId::from("ORD-1"));
    assert!(redirect_url.ends_with("ID=ORD-1"));

    let order = backend.orders().pop().unwrap();
    assert_eq!(order["totalAmount"], 17000.0);
    assert!(backend.cart_of(EMAIL).is_empty());
}

#[tokio::test]
async fn test_checkout_falls_back_to_manual_payment() {
    let (backend, store) = signed_in().await;
    add(&store, "P1", 1).await;
    backend.fail(RouteGroup::Payment, 502);

    let mut page = CheckoutPage::new(store.shop().clone());
    let outcome = page
        .submit(&CheckoutForm {
            address: address(),
            payment_method: PaymentMethod::Dpo,
            save_address: true,
        })
        .await
        .unwrap();

    let CheckoutOutcome::ManualPayment {
        order_id, message, ..
    } = outcome
    else {
        panic!("expected manual payment, got {outcome:?}");
    };
    assert_eq!(order_id.as_str(), "ORD-1");
    assert!(message.contains("provider is unavailable"));
    assert_eq!(backend.orders().len(), 1);
    assert!(backend.cart_of(EMAIL).is_empty());
    assert_eq!(store.profile().unwrap().address(), Some(address()));
}

#[tokio::test]
async fn test_rejected_order_keeps_cart() {
    let (backend, store) = signed_in().await;
    add(&store, "P1", 1).await;
    backend.fail(RouteGroup::Orders, 400);

    let mut page = CheckoutPage::new(store.shop().clone());
    let result = page
        .submit(&CheckoutForm {
            address: address(),
            payment_method: PaymentMethod::CashOnDelivery,
            save_address: false,
        })
        .await;

    assert!(result.is_err());
    assert_eq!(backend.cart_of(EMAIL), vec![("P1".to_string(), 1)]);
    let notice = page.take_notices().pop().unwrap();
    assert!(notice.message.starts_with("Invalid payment details"));
}
