//! Savings estimation from free-form discount text.
//!
//! The discount field is free-form ("10%", "€5", "$2.50 off"), so savings
//! per use are an estimate: a currency amount is taken at face value, a
//! percentage is applied to the record's original price, and anything else
//! is undefined.

use std::sync::LazyLock;

use regex::Regex;

/// First numeric token in a currency-style discount ("€5", "$2.50", "5,99 €").
static CURRENCY_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)").expect("valid currency pattern"));

/// Percentage token ("10%", "12.5 %").
static PERCENTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("valid percentage pattern"));

/// Currency symbols recognized in discount text.
const CURRENCY_SYMBOLS: [char; 3] = ['€', '$', '£'];

/// Estimates the savings for one use of a discount code.
///
/// - Discount text containing a currency symbol: the numeric amount in the
///   text, parsed directly (comma decimal separators accepted).
/// - Discount text containing a percentage, with a known original price:
///   `percentage / 100 × original_price`.
/// - Anything else: `None` (savings undefined).
#[must_use]
pub fn estimate_savings(discount: &str, original_price: Option<f64>) -> Option<f64> {
    if CURRENCY_SYMBOLS.iter().any(|symbol| discount.contains(*symbol)) {
        let captures = CURRENCY_AMOUNT.captures(discount)?;
        let amount = captures.get(1)?.as_str().replace(',', ".");
        return amount.parse::<f64>().ok();
    }

    if let Some(captures) = PERCENTAGE.captures(discount) {
        let pct = captures.get(1)?.as_str().parse::<f64>().ok()?;
        let price = original_price?;
        return Some(pct / 100.0 * price);
    }

    None
}
