//! Configuration validation for prices, coupons and invoices.
//!
//! The calculators themselves never fail: they assume well-formed inputs
//! and degrade safely on edge cases. Rejecting malformed configuration
//! (tier lists without a terminal unbounded tier, zero package divisors,
//! out-of-range percentages) is this module's job, before a price or
//! coupon is ever priced. Each function returns all errors found, not just
//! the first.

use rust_decimal::Decimal;

use crate::currency;
use crate::error::ValidationError;
use crate::types::{BillingScheme, Coupon, Discount, Invoice, Price, PriceTier};

/// Validate a price definition.
pub fn validate_price(price: &Price) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_currency_code(&price.currency, "currency", &mut errors);

    if price.amount.is_sign_negative() {
        errors.push(ValidationError::new(
            "amount",
            "amount must not be negative",
        ));
    }

    match &price.scheme {
        BillingScheme::FlatFee => {}
        BillingScheme::Package(transform) => {
            if transform.divide_by == 0 {
                errors.push(ValidationError::new(
                    "scheme.divide_by",
                    "package size must be positive",
                ));
            }
        }
        BillingScheme::TieredVolume { tiers } | BillingScheme::TieredSlab { tiers } => {
            validate_tiers(tiers, &mut errors);
        }
    }

    errors
}

fn validate_tiers(tiers: &[PriceTier], errors: &mut Vec<ValidationError>) {
    if tiers.is_empty() {
        errors.push(ValidationError::new(
            "scheme.tiers",
            "tiered prices require at least one tier",
        ));
        return;
    }

    let mut previous_bound: Option<Decimal> = None;
    let last = tiers.len() - 1;

    for (i, tier) in tiers.iter().enumerate() {
        let prefix = format!("scheme.tiers[{i}]");

        if tier.unit_amount.is_sign_negative() {
            errors.push(ValidationError::new(
                format!("{prefix}.unit_amount"),
                "unit amount must not be negative",
            ));
        }
        if tier.flat_amount.is_some_and(|flat| flat.is_sign_negative()) {
            errors.push(ValidationError::new(
                format!("{prefix}.flat_amount"),
                "flat amount must not be negative",
            ));
        }

        match tier.up_to {
            Some(bound) => {
                if i == last {
                    errors.push(ValidationError::new(
                        format!("{prefix}.up_to"),
                        "final tier must be unbounded",
                    ));
                }
                if bound <= previous_bound.unwrap_or(Decimal::ZERO) {
                    errors.push(ValidationError::new(
                        format!("{prefix}.up_to"),
                        "tier bounds must be strictly ascending",
                    ));
                }
                previous_bound = Some(bound);
            }
            None => {
                if i != last {
                    errors.push(ValidationError::new(
                        format!("{prefix}.up_to"),
                        "only the final tier may be unbounded",
                    ));
                }
            }
        }
    }
}

/// Validate a coupon's discount definition.
pub fn validate_coupon(coupon: &Coupon) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match coupon.discount {
        Discount::Percentage(percentage) => {
            if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
                errors.push(ValidationError::new(
                    "discount.percentage",
                    "percentage must be in (0, 100]",
                ));
            }
        }
        Discount::Fixed(amount) => {
            if amount.is_sign_negative() {
                errors.push(ValidationError::new(
                    "discount.fixed",
                    "fixed discount must not be negative",
                ));
            }
        }
    }

    errors
}

/// Validate an invoice and its line items.
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_currency_code(&invoice.currency, "currency", &mut errors);

    if let Some(period) = &invoice.period {
        if period.end < period.start {
            errors.push(ValidationError::new(
                "period",
                "period end must not precede period start",
            ));
        }
    }

    let mut seen_ids = std::collections::HashSet::new();
    for (i, line) in invoice.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");

        if !seen_ids.insert(&line.id) {
            errors.push(ValidationError::new(
                format!("{prefix}.id"),
                format!("duplicate line item identifier '{}'", line.id),
            ));
        }

        if line.currency != invoice.currency {
            errors.push(ValidationError::new(
                format!("{prefix}.currency"),
                format!(
                    "line currency '{}' does not match invoice currency '{}'",
                    line.currency, invoice.currency
                ),
            ));
        }

        if line.amount.is_sign_negative() {
            errors.push(ValidationError::new(
                format!("{prefix}.amount"),
                "amount must not be negative",
            ));
        }
        if line.quantity.is_sign_negative() {
            errors.push(ValidationError::new(
                format!("{prefix}.quantity"),
                "quantity must not be negative",
            ));
        }

        // Persisted amounts carry at most the currency's precision.
        if line.amount != currency::round(line.amount, &invoice.currency) {
            errors.push(ValidationError::new(
                format!("{prefix}.amount"),
                format!(
                    "amount {} exceeds the precision of '{}'",
                    line.amount, invoice.currency
                ),
            ));
        }

        for (field, value) in [
            ("line_item_discount", line.line_item_discount),
            ("invoice_level_discount", line.invoice_level_discount),
            ("prepaid_credits_applied", line.prepaid_credits_applied),
        ] {
            if value.is_sign_negative() {
                errors.push(ValidationError::new(
                    format!("{prefix}.{field}"),
                    "adjustment must not be negative",
                ));
            }
        }

        let adjustments =
            line.line_item_discount + line.invoice_level_discount + line.prepaid_credits_applied;
        if adjustments > line.amount {
            errors.push(ValidationError::new(
                prefix,
                "discounts and credits must not exceed the line amount",
            ));
        }

        if let Some(period) = &line.period {
            if period.end < period.start {
                errors.push(ValidationError::new(
                    format!("line_items[{i}].period"),
                    "period end must not precede period start",
                ));
            }
        }
    }

    errors
}

fn validate_currency_code(code: &str, field: &str, errors: &mut Vec<ValidationError>) {
    if code.trim().is_empty() {
        errors.push(ValidationError::new(field, "currency code must not be empty"));
    } else if !currency::is_known_currency_code(code) {
        errors.push(ValidationError::new(
            field,
            format!("currency code '{code}' is not a known lowercase ISO 4217 code"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PackageRounding, PackageTransform, PriceType};
    use rust_decimal_macros::dec;

    fn tiered_price(tiers: Vec<PriceTier>) -> Price {
        Price {
            id: "price-1".into(),
            currency: "usd".into(),
            price_type: PriceType::Usage,
            amount: Decimal::ZERO,
            scheme: BillingScheme::TieredSlab { tiers },
        }
    }

    fn tier(up_to: Option<Decimal>, unit_amount: Decimal) -> PriceTier {
        PriceTier {
            up_to,
            unit_amount,
            flat_amount: None,
        }
    }

    #[test]
    fn well_formed_tiers_pass() {
        let price = tiered_price(vec![
            tier(Some(dec!(10)), dec!(0.50)),
            tier(Some(dec!(20)), dec!(0.40)),
            tier(None, dec!(0.30)),
        ]);
        assert!(validate_price(&price).is_empty());
    }

    #[test]
    fn bounded_final_tier_is_rejected() {
        let price = tiered_price(vec![
            tier(Some(dec!(10)), dec!(0.50)),
            tier(Some(dec!(20)), dec!(0.40)),
        ]);
        let errors = validate_price(&price);
        assert!(errors.iter().any(|e| e.message.contains("unbounded")));
    }

    #[test]
    fn non_ascending_bounds_are_rejected() {
        let price = tiered_price(vec![
            tier(Some(dec!(20)), dec!(0.50)),
            tier(Some(dec!(10)), dec!(0.40)),
            tier(None, dec!(0.30)),
        ]);
        let errors = validate_price(&price);
        assert!(errors.iter().any(|e| e.message.contains("ascending")));
    }

    #[test]
    fn zero_package_divisor_is_rejected() {
        let price = Price {
            id: "price-2".into(),
            currency: "usd".into(),
            price_type: PriceType::Usage,
            amount: dec!(1),
            scheme: BillingScheme::Package(PackageTransform {
                divide_by: 0,
                round: PackageRounding::Up,
            }),
        };
        let errors = validate_price(&price);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "scheme.divide_by");
    }

    #[test]
    fn percentage_out_of_range_is_rejected() {
        let coupon = Coupon {
            id: "c".into(),
            discount: Discount::Percentage(dec!(150)),
        };
        assert!(!validate_coupon(&coupon).is_empty());

        let coupon = Coupon {
            id: "c".into(),
            discount: Discount::Percentage(dec!(100)),
        };
        assert!(validate_coupon(&coupon).is_empty());
    }

    #[test]
    fn uppercase_currency_is_rejected() {
        let price = Price {
            id: "price-3".into(),
            currency: "USD".into(),
            price_type: PriceType::Fixed,
            amount: dec!(10),
            scheme: BillingScheme::FlatFee,
        };
        let errors = validate_price(&price);
        assert!(errors.iter().any(|e| e.field == "currency"));
    }
}
