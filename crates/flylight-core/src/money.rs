//! # Money
//!
//! Currency and price types. Payment amounts are kept in the smallest
//! currency unit so equality checks never compare floats.

use serde::{Deserialize, Serialize};

/// Every supported currency has two decimal places
const MINOR_PER_MAJOR: f64 = 100.0;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
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
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }

    /// Parse an ISO code, case-insensitively
    pub fn parse(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            _ => None,
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

    /// Decimal amount to paise or cents, rounded to the nearest unit
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        (amount * MINOR_PER_MAJOR).round() as i64
    }

    pub fn to_major_unit(&self, amount: i64) -> f64 {
        amount as f64 / MINOR_PER_MAJOR
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (paise for INR)
    pub amount: i64,
    pub currency: Currency,
}

impl Price {
    /// Create a new price from decimal amount
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: currency.to_smallest_unit(amount),
            currency,
        }
    }

    /// Create a price from smallest unit
    pub fn from_minor(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.to_major_unit(self.amount)
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Format for display (e.g., "₹500.00")
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency.symbol(), self.as_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_conversion() {
        let inr = Currency::INR;
        assert_eq!(inr.to_smallest_unit(199.99), 19999);
        assert_eq!(inr.to_major_unit(19999), 199.99);
        assert_eq!(inr.to_smallest_unit(0.1 + 0.2), 30);
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::new(500.0, Currency::INR).display(), "₹500.00");
        assert_eq!(Price::new(19.5, Currency::USD).display(), "$19.50");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("inr"), Some(Currency::INR));
        assert_eq!(Currency::parse("XYZ"), None);
        assert_eq!(Currency::default(), Currency::INR);
    }
}
