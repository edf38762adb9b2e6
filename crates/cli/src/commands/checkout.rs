//! `lindo checkout`

use clap::Args;
use lindo_core::PaymentMethod;
use lindo_storefront::api::ShippingAddress;
use lindo_storefront::pages::{CheckoutForm, CheckoutOutcome, CheckoutPage};
use lindo_storefront::state::Storefront;

use super::{CommandError, fail_on_error, print_notices};

/// Shipping and payment choices. Blank fields fall back to the saved
/// address or profile name.
#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    full_name: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    street: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    district: Option<String>,

    #[arg(long)]
    notes: Option<String>,

    /// `dpo` (card / mobile money) or `cash_on_delivery`
    #[arg(long, default_value = "dpo")]
    payment: PaymentMethod,

    /// Remember this address for next time
    #[arg(long)]
    save_address: bool,
}

impl CheckoutArgs {
    fn into_form(self, prefill: ShippingAddress) -> CheckoutForm {
        CheckoutForm {
            address: ShippingAddress {
                full_name: self.full_name.unwrap_or(prefill.full_name),
                phone: self.phone.unwrap_or(prefill.phone),
                street: self.street.unwrap_or(prefill.street),
                city: self.city.unwrap_or(prefill.city),
                district: self.district.unwrap_or(prefill.district),
                notes: self.notes.or(prefill.notes),
            },
            payment_method: self.payment,
            save_address: self.save_address,
        }
    }
}

/// Place the order and report how to pay.
#[allow(clippy::print_stdout)]
pub async fn run(store: &Storefront, args: CheckoutArgs) -> Result<(), CommandError> {
    let mut page = CheckoutPage::new(store.shop().clone());
    page.load().await;
    fail_on_error(page.state())?;

    let prefill = page
        .state()
        .loaded()
        .map(|view| {
            println!("Order total: {}", view.subtotal.display());
            view.address.clone()
        })
        .unwrap_or_default();

    let result = page.submit(&args.into_form(prefill)).await;
    print_notices(page.take_notices());

    match result? {
        CheckoutOutcome::Placed { order_id } => {
            println!("Order {order_id} placed. Pay the courier on delivery.");
        }
        CheckoutOutcome::RedirectToPayment {
            order_id,
            redirect_url,
        } => {
            println!("Order {order_id} placed. Complete payment at:");
            println!("  {redirect_url}");
        }
        CheckoutOutcome::ManualPayment {
            order_id,
            message,
            instructions,
        } => {
            println!("Order {order_id} placed, but online payment is unavailable: {message}");
            println!("{instructions}");
        }
    }
    Ok(())
}
