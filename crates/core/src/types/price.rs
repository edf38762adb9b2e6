//! Type-safe price representation using decimal arithmetic.
//!
//! Storefront prices are Rwandan Francs. The backend sends them as JSON
//! numbers that are integer-like in practice, but nothing stops a vendor from
//! entering `4999.5`, so amounts stay decimal until display, where they are
//! rounded to whole francs and grouped by thousands: `17,000 RWF`.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A non-negative price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (francs, not centimes).
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    /// ISO 4217 currency code.
    currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price. Negative amounts are clamped to zero.
    #[must_use]
    pub fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount: amount.max(Decimal::ZERO),
            currency_code,
        }
    }

    /// Create a price in Rwandan Francs.
    #[must_use]
    pub fn rwf(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::RWF)
    }

    /// Create a whole-franc price.
    #[must_use]
    pub fn from_francs(francs: u64) -> Self {
        Self::rwf(Decimal::from(francs))
    }

    /// Zero francs.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            amount: Decimal::ZERO,
            currency_code: CurrencyCode::RWF,
        }
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency code.
    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Add two prices. The left-hand currency wins; the storefront only
    /// ever deals in one currency at a time.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self::new(self.amount + other.amount, self.currency_code)
    }

    /// Whole-unit amount, rounded half away from zero.
    #[must_use]
    pub fn whole_units(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Format for display, e.g. `17,000 RWF`.
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{} {}",
            group_thousands(&self.whole_units().trunc().to_string()),
            self.currency_code.code()
        )
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Self::plus)
    }
}

/// Insert `,` between every group of three digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    RWF,
    USD,
}

impl CurrencyCode {
    /// The ISO code string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RWF => "RWF",
            Self::USD => "USD",
        }
    }
}
