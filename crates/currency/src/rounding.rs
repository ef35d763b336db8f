//! Price rounding policy shared by every converter.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits in a rendered price.
pub const PRICE_SCALE: u32 = 2;

/// Round to 2 decimal places, midpoints away from zero (0.775 → 0.78).
///
/// The result always carries exactly two fractional digits, so `1` comes
/// back as `1.00`.
pub fn round_price(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(PRICE_SCALE);
    rounded
}
