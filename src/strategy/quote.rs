//! Quote-needed-to-move-price calculator
//!
//! Pure per-market math: how much quote-asset notional, traded against the
//! AMM, would move its mark price back onto the oracle index price.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::common::errors::{BotError, Result};

/// Trades below `reserve / SIGNIFICANCE_DIVISOR` are not worth executing
const SIGNIFICANCE_DIVISOR: Decimal = dec!(20);

/// Compute the signed quote notional that rebalances the mark price to the
/// index price.
///
/// Under a sqrt-price AMM the quote reserve scales with the square root of
/// the implied price, so for `qp = sqrt(index / mark)`:
///
/// ```text
/// quote_to_move = -1 * ((Q / qp) - Q)  =  Q - Q / qp
/// ```
///
/// Positive means the corrective trade is a net quote inflow (go long),
/// negative a net outflow (go short); zero exactly when the prices agree.
/// Markets are independent: this is computed one market at a time and
/// order never matters.
///
/// # Errors
///
/// `InvalidPriceRatio` when `index / mark` is non-positive or its square
/// root is undefined. Both prices are strictly positive whenever a pair
/// survives the snapshot join, so this is a defensive check only.
pub fn quote_needed_to_move_price(
    pair: &str,
    quote_reserve: Decimal,
    index_price: Decimal,
    mark_price: Decimal,
) -> Result<Decimal> {
    if mark_price <= Decimal::ZERO {
        return Err(BotError::InvalidPriceRatio {
            pair: pair.to_string(),
            ratio: mark_price,
        });
    }

    let ratio = index_price / mark_price;
    let qp = ratio
        .sqrt()
        .filter(|qp| !qp.is_zero())
        .ok_or_else(|| BotError::InvalidPriceRatio {
            pair: pair.to_string(),
            ratio,
        })?;

    Ok(quote_reserve - quote_reserve / qp)
}

/// True when a corrective trade is too small to bother executing.
///
/// A notional worth less than 5% of the quote reserve has negligible price
/// impact; the boundary itself (exactly reserve/20) is significant.
pub fn is_insignificant(quote_to_move: Decimal, quote_reserve: Decimal) -> bool {
    quote_to_move.abs() < quote_reserve / SIGNIFICANCE_DIVISOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_when_prices_agree() {
        let q = quote_needed_to_move_price("ubtc:unusd", dec!(10000), dec!(100), dec!(100))
            .unwrap();
        assert_eq!(q, dec!(0));
    }

    #[test]
    fn test_matches_reference_values() {
        // index 100, mark 125: qp = sqrt(0.8), Q = 10
        let q = quote_needed_to_move_price("ubtc:unusd", dec!(10), dec!(100), dec!(125)).unwrap();
        let qp = (dec!(100) / dec!(125)).sqrt().unwrap();
        let expected = (dec!(10) / qp - dec!(10)) * dec!(-1);
        assert_eq!(q, expected);
        // Mark above index means quote must flow out: short
        assert!(q < dec!(0));
    }

    #[test]
    fn test_sign_flips_with_divergence() {
        let short = quote_needed_to_move_price("p", dec!(10000), dec!(100), dec!(125)).unwrap();
        let long = quote_needed_to_move_price("p", dec!(10000), dec!(125), dec!(100)).unwrap();
        assert!(short < dec!(0));
        assert!(long > dec!(0));
    }

    #[test]
    fn test_negative_ratio_rejected() {
        let err =
            quote_needed_to_move_price("p", dec!(10000), dec!(-100), dec!(125)).unwrap_err();
        assert!(matches!(err, BotError::InvalidPriceRatio { .. }));

        let err = quote_needed_to_move_price("p", dec!(10000), dec!(100), dec!(0)).unwrap_err();
        assert!(matches!(err, BotError::InvalidPriceRatio { .. }));
    }

    #[test]
    fn test_insignificance_boundary_is_strict() {
        let reserve = dec!(10000);
        assert!(is_insignificant(dec!(499.99), reserve));
        assert!(is_insignificant(dec!(-499.99), reserve));
        // Exactly reserve/20 is NOT insignificant
        assert!(!is_insignificant(dec!(500), reserve));
        assert!(!is_insignificant(dec!(-500), reserve));
        assert!(!is_insignificant(dec!(3500), reserve));
    }
}
