use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{AssertionError, JourneyError, Result};

/// Parse a displayed currency string into a decimal amount.
///
/// Everything except digits and the decimal point is discarded, so both
/// `"$29.99"` and `"Item total: $39.98"` parse. The result is rounded to cents.
pub fn parse_price(text: &str) -> Result<Decimal> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    Decimal::from_str(&digits)
        .map(|d| d.round_dp(2))
        .map_err(|_| {
            JourneyError::Assertion(AssertionError::new(
                "parse_price",
                "a currency amount",
                format!("{:?}", text),
            ))
        })
}

/// Sum of unit prices, rounded to cents.
pub fn sum_prices<'a>(prices: impl IntoIterator<Item = &'a Decimal>) -> Decimal {
    prices
        .into_iter()
        .fold(Decimal::ZERO, |acc, p| acc + *p)
        .round_dp(2)
}

/// Render an amount the way the storefront does (`$7.99`).
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}
