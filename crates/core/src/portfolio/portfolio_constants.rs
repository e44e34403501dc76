use rust_decimal::Decimal;

/// Multiplier from ratio to percent
pub const PERCENT: Decimal = Decimal::ONE_HUNDRED;
