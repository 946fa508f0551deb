//! # Money Types
//!
//! Rates and fees. Amounts are kept in the smallest currency unit
//! so billing arithmetic stays exact.

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::INR => "inr",
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "₹",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
        }
    }

    /// Minor units per major unit (paise, cents, pence)
    pub fn minor_per_major(&self) -> i64 {
        100
    }

    /// Convert a decimal amount to the smallest currency unit
    pub fn to_minor(&self, amount: f64) -> i64 {
        (amount * self.minor_per_major() as f64).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_minor(&self, amount: i64) -> f64 {
        amount as f64 / self.minor_per_major() as f64
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// An amount in the smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in smallest currency unit (paise for INR)
    pub amount: i64,
    pub currency: Currency,
}

impl Money {
    /// Create from a decimal amount
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: currency.to_minor(amount),
            currency,
        }
    }

    /// Create from smallest unit
    pub fn from_minor(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::from_minor(0, currency)
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.from_minor(self.amount)
    }

    /// Multiply by a whole number of billing units
    pub fn times(&self, units: i64) -> Self {
        Self {
            amount: self.amount.saturating_mul(units),
            currency: self.currency,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Format for display (e.g., "₹120.00")
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency.symbol(), self.as_decimal())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}
