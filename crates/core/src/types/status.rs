//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the backend.
///
/// Unknown strings deserialize to [`OrderStatus::Pending`] so a new backend
/// status never breaks an order confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[default]
    #[serde(other)]
    Pending,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// How the shopper intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card or mobile money through the DPO hosted payment page.
    #[default]
    Dpo,
    /// Pay the courier on delivery.
    CashOnDelivery,
}

impl PaymentMethod {
    /// Whether the method goes through payment-gateway initialisation.
    #[must_use]
    pub const fn needs_gateway(self) -> bool {
        matches!(self, Self::Dpo)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dpo => write!(f, "dpo"),
            Self::CashOnDelivery => write!(f, "cash_on_delivery"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dpo" | "card" | "momo" => Ok(Self::Dpo),
            "cash_on_delivery" | "cash" | "cod" => Ok(Self::CashOnDelivery),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_order_status_is_pending() {
        let status: OrderStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(status, OrderStatus::Pending);

        let status: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);

        let status: OrderStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, OrderStatus::Pending);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"pending\"");
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("cod".parse::<PaymentMethod>().unwrap(), PaymentMethod::CashOnDelivery);
        assert_eq!("momo".parse::<PaymentMethod>().unwrap(), PaymentMethod::Dpo);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
        assert!(PaymentMethod::Dpo.needs_gateway());
    }
}
