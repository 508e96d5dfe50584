//! Money display helpers.
//!
//! Prices are stored as `rust_decimal::Decimal` (the NUMERIC column type) and
//! formatted into display strings before they reach a template. The store is
//! single-currency (USD), so there is no currency field on prices.

use rust_decimal::Decimal;

/// Format a decimal amount as a USD price string, e.g. `$19.99`.
///
/// Negative amounts keep the sign after the symbol (`$-1.00`); they should
/// not occur for catalog prices but the formatter does not enforce that.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::format_usd;

    #[test]
    fn test_whole_amount() {
        assert_eq!(format_usd(Decimal::new(19, 0)), "$19.00");
    }

    #[test]
    fn test_cents() {
        assert_eq!(format_usd(Decimal::new(1999, 2)), "$19.99");
    }

    #[test]
    fn test_zero() {
        assert_eq!(format_usd(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_rounds_to_cents() {
        assert_eq!(format_usd(Decimal::new(12346, 3)), "$12.35");
    }
}
