//! Currency minor-unit precision and half-up rounding.
//!
//! Every monetary amount in this crate is finalized by [`round`] exactly once
//! at the point it comes into existence: line-item creation, each discount,
//! each wallet draw, each true-up. Downstream stages only ever add and
//! subtract already-rounded values, so sums of parts stay internally
//! consistent ("round at source").

use rust_decimal::{Decimal, RoundingStrategy};

/// Default minor-unit precision for currencies not in the table.
pub const DEFAULT_PRECISION: u32 = 2;

/// Minor-unit precision for `code` (lowercase ISO 4217).
///
/// Unknown codes fall back to [`DEFAULT_PRECISION`].
pub fn precision(code: &str) -> u32 {
    match CURRENCY_PRECISIONS.binary_search_by(|(c, _)| (*c).cmp(code)) {
        Ok(idx) => CURRENCY_PRECISIONS[idx].1,
        Err(_) => DEFAULT_PRECISION,
    }
}

/// Round `amount` to the minor-unit precision of `code`, half-up.
///
/// Half-up means 0.5 rounds away from zero (standard invoice convention,
/// not banker's rounding). Valid for any decimal input including negative
/// amounts (credits) and zero; idempotent on already-rounded values.
pub fn round(amount: Decimal, code: &str) -> Decimal {
    amount.round_dp_with_strategy(precision(code), RoundingStrategy::MidpointAwayFromZero)
}

/// Check whether `code` is a known lowercase ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_PRECISIONS
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .is_ok()
}

/// Sorted list of lowercase ISO 4217 codes with their minor-unit precision.
/// Sorted for binary search.
static CURRENCY_PRECISIONS: &[(&str, u32)] = &[
    ("aed", 2), // UAE Dirham
    ("aud", 2), // Australian Dollar
    ("brl", 2), // Brazilian Real
    ("cad", 2), // Canadian Dollar
    ("chf", 2), // Swiss Franc
    ("clp", 0), // Chilean Peso
    ("cny", 2), // Chinese Yuan
    ("czk", 2), // Czech Koruna
    ("dkk", 2), // Danish Krone
    ("eur", 2), // Euro
    ("gbp", 2), // Pound Sterling
    ("hkd", 2), // Hong Kong Dollar
    ("huf", 2), // Hungarian Forint
    ("idr", 2), // Indonesian Rupiah
    ("ils", 2), // Israeli Shekel
    ("inr", 2), // Indian Rupee
    ("jpy", 0), // Japanese Yen
    ("krw", 0), // South Korean Won
    ("mxn", 2), // Mexican Peso
    ("myr", 2), // Malaysian Ringgit
    ("nok", 2), // Norwegian Krone
    ("nzd", 2), // New Zealand Dollar
    ("php", 2), // Philippine Peso
    ("pln", 2), // Polish Zloty
    ("ron", 2), // Romanian Leu
    ("rub", 2), // Russian Ruble
    ("sar", 2), // Saudi Riyal
    ("sek", 2), // Swedish Krona
    ("sgd", 2), // Singapore Dollar
    ("thb", 2), // Thai Baht
    ("try", 2), // Turkish Lira
    ("twd", 2), // New Taiwan Dollar
    ("usd", 2), // US Dollar
    ("vnd", 0), // Vietnamese Dong
    ("zar", 2), // South African Rand
];
