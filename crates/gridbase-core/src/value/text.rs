use rust_decimal::{Decimal, RoundingStrategy};

/// Case-fold text for case-insensitive comparison and containment.
#[must_use]
pub fn casefold(input: &str) -> String {
    if input.is_ascii() {
        return input.to_ascii_lowercase();
    }

    input.to_lowercase()
}

/// Round half away from zero to `places` fractional digits.
#[must_use]
pub fn round_decimal(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Render a decimal with exactly `places` fractional digits.
#[must_use]
pub fn format_decimal(value: Decimal, places: u32) -> String {
    let mut rounded = round_decimal(value, places);
    rounded.rescale(places);

    rounded.to_string()
}
