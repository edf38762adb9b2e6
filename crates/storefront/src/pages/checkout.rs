//! Checkout: order creation followed by payment initialisation.
//!
//! Once the backend has accepted an order the cart is cleared and the
//! shopper always gets an order id back, even when the payment gateway is
//! down; in that case they are told how to pay manually instead.

use lindo_core::{CartLines, Email, OrderId, PaymentMethod, Price};
use tracing::{info, instrument, warn};

use super::{Notice, PageState};
use crate::api::{ApiError, OrderLine, OrderRequest, PaymentRequest, ShippingAddress};
use crate::auth::Credentials;
use crate::error::{AppError, add_breadcrumb};
use crate::events::StoreEvent;
use crate::profile::Profile;
use crate::remote::Backend;
use crate::shop::Shop;

const MANUAL_PAYMENT_INSTRUCTIONS: &str = "Your order has been saved. Pay by mobile money to \
     the Lindo merchant account quoting your order number, or choose cash on delivery when our \
     team calls to confirm.";

/// What the checkout page shows before submitting.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutView {
    pub cart: CartLines,
    pub subtotal: Price,
    /// Prefilled from the saved address or the profile name.
    pub address: ShippingAddress,
}

/// The shopper's checkout choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    pub address: ShippingAddress,
    pub payment_method: PaymentMethod,
    /// Remember the address for next time.
    pub save_address: bool,
}

/// How a submitted checkout ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Cash on delivery; nothing more to do.
    Placed { order_id: OrderId },
    /// Send the shopper to the hosted payment page.
    RedirectToPayment {
        order_id: OrderId,
        redirect_url: String,
    },
    /// The order exists but the gateway could not be reached.
    ManualPayment {
        order_id: OrderId,
        message: String,
        instructions: String,
    },
}

impl CheckoutOutcome {
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        match self {
            Self::Placed { order_id }
            | Self::RedirectToPayment { order_id, .. }
            | Self::ManualPayment { order_id, .. } => order_id,
        }
    }
}

/// The checkout page controller.
pub struct CheckoutPage<B> {
    shop: Shop<B>,
    state: PageState<CheckoutView>,
    notices: Vec<Notice>,
}

impl<B: Backend> CheckoutPage<B> {
    #[must_use]
    pub fn new(shop: Shop<B>) -> Self {
        Self {
            shop,
            state: PageState::Loading,
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PageState<CheckoutView> {
        &self.state
    }

    /// Drain pending toasts.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Snapshot the cart and prefill the address.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        self.state = PageState::Loading;
        let result = self.shop.load_cart().await.map(|cart| {
            let address = self
                .shop
                .auth()
                .email()
                .map(|email| self.profile(email).checkout_address())
                .unwrap_or_default();
            CheckoutView {
                subtotal: cart.subtotal(),
                cart,
                address,
            }
        });
        self.state = PageState::from_result(result);
    }

    fn profile(&self, email: Email) -> Profile {
        Profile::new(self.shop.local().storage().clone(), email)
    }

    /// Place the order and start payment.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for guests, `BadRequest` for an empty cart or
    /// incomplete address, and the backend error when the order itself is
    /// rejected. Payment failures are not errors: the order exists, so they
    /// come back as [`CheckoutOutcome::ManualPayment`].
    #[instrument(skip(self, form), fields(payment_method = %form.payment_method))]
    pub async fn submit(&mut self, form: &CheckoutForm) -> Result<CheckoutOutcome, AppError> {
        let auth = self.shop.require_credentials()?;

        let cart = self.shop.load_cart().await?;
        if cart.is_empty() {
            return Err(AppError::BadRequest("Your cart is empty".to_string()));
        }
        let missing = form.address.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Please fill in your {}",
                missing.join(", ")
            )));
        }

        if form.save_address
            && let Err(e) = self.profile(auth.email.clone()).set_address(&form.address)
        {
            warn!(error = %e, "Could not save shipping address");
        }

        let subtotal = cart.subtotal();
        let order = OrderRequest {
            items: cart.items().iter().map(OrderLine::from).collect(),
            shipping_address: form.address.clone(),
            payment_method: form.payment_method,
            total_amount: subtotal.amount(),
            email: auth.email.clone(),
        };

        let confirmation = match self.shop.backend().create_order(&auth, &order).await {
            Ok(confirmation) => confirmation,
            Err(e) => {
                let message = payment_failure_message(&e);
                let err = AppError::from(e);
                err.report();
                self.notices.push(Notice::error(message));
                return Err(err);
            }
        };
        let order_id = confirmation.id;
        info!(%order_id, "Order created");
        add_breadcrumb(
            "checkout",
            "Order created",
            Some(&[
                ("order_id", order_id.as_str()),
                ("payment_method", &form.payment_method.to_string()),
            ]),
        );

        self.clear_cart_after_order().await;

        let outcome = if form.payment_method.needs_gateway() {
            self.start_payment(&auth, order_id, subtotal, &form.address)
                .await
        } else {
            CheckoutOutcome::Placed { order_id }
        };

        match &outcome {
            CheckoutOutcome::ManualPayment { message, .. } => {
                self.notices.push(Notice::info(message.clone()));
            }
            CheckoutOutcome::Placed { .. } | CheckoutOutcome::RedirectToPayment { .. } => {
                self.notices.push(Notice::success("Order placed"));
            }
        }
        Ok(outcome)
    }

    async fn start_payment(
        &self,
        auth: &Credentials,
        order_id: OrderId,
        amount: Price,
        address: &ShippingAddress,
    ) -> CheckoutOutcome {
        let payment = PaymentRequest {
            order_id: order_id.clone(),
            amount: amount.amount(),
            currency: amount.currency_code().code().to_string(),
            customer_email: auth.email.clone(),
            customer_phone: address.phone.clone(),
            customer_name: address.full_name.clone(),
        };

        match self.shop.backend().initialize_payment(auth, &payment).await {
            Ok(init) => {
                info!(%order_id, "Payment initialised");
                CheckoutOutcome::RedirectToPayment {
                    order_id,
                    redirect_url: init.redirect_url,
                }
            }
            Err(e) => {
                let message = payment_failure_message(&e);
                AppError::from(e).report();
                add_breadcrumb("checkout", "Payment fallback", Some(&[("order_id", order_id.as_str())]));
                CheckoutOutcome::ManualPayment {
                    order_id,
                    message,
                    instructions: MANUAL_PAYMENT_INSTRUCTIONS.to_string(),
                }
            }
        }
    }

    async fn clear_cart_after_order(&mut self) {
        if let Err(e) = self.shop.clear_cart().await {
            warn!(error = %e, "Could not clear cart after order");
        }
        if let Some(view) = self.state.loaded_mut() {
            view.cart.clear();
            view.subtotal = Price::zero();
        }
    }

    /// React to a store event.
    pub async fn handle_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::UserLogin { .. } => {
                if let Err(e) = self.shop.on_user_login().await {
                    e.report();
                }
                self.load().await;
            }
            StoreEvent::UserLogout | StoreEvent::CartUpdated => self.load().await,
            StoreEvent::WishlistUpdated | StoreEvent::Storage { .. } => {}
        }
    }
}

/// Shopper-facing text for an order or payment failure.
fn payment_failure_message(err: &ApiError) -> String {
    if err.is_network() {
        return "Could not reach the payment provider. Check your connection and try again."
            .to_string();
    }
    match err.status() {
        Some(400) => "Invalid payment details. Please check your information and try again.",
        Some(401 | 403) => "Your session has expired, please log in again.",
        Some(404) => "The payment service is unavailable right now.",
        Some(500..=599) => "The payment provider is unavailable. Please try again later.",
        _ => "Something went wrong while placing your order.",
    }
    .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use lindo_core::{CartItem, ProductId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::events::EventBus;
    use crate::reconcile::Reconciler;
    use crate::storage::{LocalStorage, MemoryStore, keys};
    use crate::testing::FakeBackend;

    fn page(signed_in: bool) -> (CheckoutPage<FakeBackend>, Shop<FakeBackend>) {
        let storage = LocalStorage::new(Arc::new(MemoryStore::new()), EventBus::new());
        if signed_in {
            storage.set_raw(keys::TOKEN, "tok").unwrap();
            storage.set_raw(keys::USER_EMAIL, "mama@lindo.rw").unwrap();
        }
        let backend = FakeBackend::new();
        backend.seed_cart(vec![
            CartItem::new(ProductId::from("P1"), "Wipes", Decimal::from(3000), "", 1),
            CartItem::new(ProductId::from("P2"), "Cot", Decimal::from(7000), "", 2),
        ]);
        let shop = Shop::new(Arc::new(backend), storage, Reconciler::new());
        (CheckoutPage::new(shop.clone()), shop)
    }

    fn form(method: PaymentMethod) -> CheckoutForm {
        CheckoutForm {
            address: ShippingAddress {
                full_name: "Aline Uwase".to_string(),
                phone: "0788000000".to_string(),
                street: "KG 11 Ave".to_string(),
                city: "Kigali".to_string(),
                ..ShippingAddress::default()
            },
            payment_method: method,
            save_address: true,
        }
    }

    #[test]
    fn test_failure_messages() {
        let msg = |status| {
            payment_failure_message(&ApiError::Status {
                status,
                message: String::new(),
            })
        };
        assert!(msg(400).starts_with("Invalid payment details"));
        assert!(msg(503).contains("provider is unavailable"));
        assert!(payment_failure_message(&ApiError::NotFound("x".to_string())).contains("service"));
        assert!(
            payment_failure_message(&ApiError::Unauthorized { status: 403 }).contains("expired")
        );
    }

    #[tokio::test]
    async fn test_load_snapshot() {
        let (mut page, _) = page(true);
        page.load().await;
        let view = page.state().loaded().unwrap();
        assert_eq!(view.subtotal.display(), "17,000 RWF");
    }

    #[tokio::test]
    async fn test_guest_must_log_in() {
        let (mut page, shop) = page(false);
        let result = page.submit(&form(PaymentMethod::Dpo)).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        assert!(shop.backend().orders().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_address_rejected() {
        let (mut page, shop) = page(true);
        let mut form = form(PaymentMethod::CashOnDelivery);
        form.address.phone.clear();

        let err = page.submit(&form).await.unwrap_err();
        assert!(err.user_message().contains("phone"));
        assert!(shop.backend().orders().is_empty());
    }

    #[tokio::test]
    async fn test_dpo_redirects_and_clears_cart() {
        let (mut page, shop) = page(true);
        let outcome = page.submit(&form(PaymentMethod::Dpo)).await.unwrap();

        assert_eq!(
            outcome,
            CheckoutOutcome::RedirectToPayment {
                order_id: OrderId::from("O1"),
                redirect_url: "https://pay.example/O1".to_string(),
            }
        );
        let order = shop.backend().orders().pop().unwrap();
        assert_eq!(order.total_amount, Decimal::from(17000));
        assert!(shop.backend().cart().is_empty());
    }

    #[tokio::test]
    async fn test_payment_failure_falls_back_to_manual() {
        let (mut page, shop) = page(true);
        shop.backend().fail_payment_with(503);

        let outcome = page.submit(&form(PaymentMethod::Dpo)).await.unwrap();
        let CheckoutOutcome::ManualPayment { order_id, message, .. } = outcome else {
            panic!("expected manual payment");
        };
        assert_eq!(order_id.as_str(), "O1");
        assert!(message.contains("provider is unavailable"));
        assert!(shop.backend().cart().is_empty());
    }

    #[tokio::test]
    async fn test_order_failure_keeps_cart() {
        let (mut page, shop) = page(true);
        shop.backend().fail_orders_with(400);

        assert!(page.submit(&form(PaymentMethod::CashOnDelivery)).await.is_err());
        assert_eq!(shop.backend().cart().len(), 2);
        let notice = page.take_notices().pop().unwrap();
        assert!(notice.message.starts_with("Invalid payment details"));
    }

    #[tokio::test]
    async fn test_cash_on_delivery_saves_address() {
        let (mut page, shop) = page(true);
        let outcome = page.submit(&form(PaymentMethod::CashOnDelivery)).await.unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Placed { .. }));
        assert_eq!(shop.backend().calls_to("initialize_payment"), 0);

        page.load().await;
        assert_eq!(page.state().loaded().unwrap().address.city, "Kigali");
    }
}
