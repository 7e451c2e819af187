//! Ordered discount application.
//!
//! Discounts apply in a fixed precedence: line-item coupons first, each
//! capped so its line never goes negative; then invoice-level coupons,
//! computed sequentially against the progressively-reduced subtotal and
//! finally distributed across line items in proportion to what each line
//! still charges. Every discount amount is rounded to currency precision
//! at the moment it is computed.

use rust_decimal::Decimal;

use crate::currency;
use crate::types::{Coupon, Discount, Invoice, LineItem, LineItemCoupon};

/// Outcome of one coupon applied to one base amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountResult {
    /// Discount granted, rounded to currency precision.
    pub discount: Decimal,
    /// `base - discount`, never negative.
    pub final_price: Decimal,
}

/// Aggregate discount outcome for an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscountOutcome {
    /// `line_item_discount_total + invoice_level_discount_total`.
    pub total_discount: Decimal,
    /// Sum of per-line coupon discounts.
    pub line_item_discount_total: Decimal,
    /// Invoice-level discount actually distributed onto line items.
    pub invoice_level_discount_total: Decimal,
}

/// Apply a single coupon to a base amount.
///
/// Percentage coupons compute `base * percentage / 100` rounded at source;
/// fixed coupons are capped at the base. The result never exceeds the base,
/// so `final_price` never goes negative.
pub fn apply_coupon(coupon: &Coupon, base: Decimal, currency_code: &str) -> DiscountResult {
    if base <= Decimal::ZERO {
        return DiscountResult {
            discount: Decimal::ZERO,
            final_price: base,
        };
    }

    let discount = match coupon.discount {
        Discount::Percentage(percentage) => {
            let raw = base * percentage / Decimal::ONE_HUNDRED;
            currency::round(raw, currency_code).min(base)
        }
        Discount::Fixed(amount) => currency::round(amount.min(base), currency_code),
    };

    DiscountResult {
        discount,
        final_price: base - discount,
    }
}

/// Apply per-line and invoice-level coupons to an invoice, in that order.
///
/// Mutates each targeted line item's `line_item_discount` and every line
/// item's `invoice_level_discount` share. Coupons targeting unknown line
/// items are skipped. Invoice-level coupons apply in the order given
/// (callers configure percentage coupons ahead of fixed ones).
pub fn apply_discounts(
    invoice: &mut Invoice,
    line_item_coupons: &[LineItemCoupon],
    invoice_coupons: &[Coupon],
) -> DiscountOutcome {
    let currency_code = invoice.currency.clone();
    let mut line_item_total = Decimal::ZERO;

    for targeted in line_item_coupons {
        let Some(line) = invoice
            .line_items
            .iter_mut()
            .find(|line| line.id == targeted.line_item_id)
        else {
            continue;
        };

        // A second coupon on the same line sees only what the line still
        // charges, so stacked discounts can never push it negative.
        let base = line.amount - line.line_item_discount;
        let result = apply_coupon(&targeted.coupon, base, &currency_code);
        line.line_item_discount += result.discount;
        line_item_total += result.discount;
    }

    // Invoice-level coupons chain on the subtotal left after line discounts.
    let mut running_subtotal: Decimal = invoice
        .line_items
        .iter()
        .map(|line| line.amount - line.line_item_discount)
        .sum();

    let mut invoice_level_total = Decimal::ZERO;
    for coupon in invoice_coupons {
        if running_subtotal <= Decimal::ZERO {
            break;
        }
        let result = apply_coupon(coupon, running_subtotal, &currency_code);
        invoice_level_total += result.discount;
        running_subtotal = result.final_price;
    }

    let distributed = distribute_invoice_level_discount(
        &mut invoice.line_items,
        invoice_level_total,
        &currency_code,
    );

    DiscountOutcome {
        total_discount: line_item_total + distributed,
        line_item_discount_total: line_item_total,
        invoice_level_discount_total: distributed,
    }
}

/// Distribute an invoice-level discount across line items in proportion to
/// each line's post-line-discount amount.
///
/// Every share is rounded to currency precision; the last line with any
/// chargeable amount receives the exact remainder so no penny goes missing.
/// Each share is capped at the line's remaining amount; leftover discount
/// a capped line cannot absorb is not redistributed. Returns the amount
/// actually distributed.
pub fn distribute_invoice_level_discount(
    line_items: &mut [LineItem],
    total_discount: Decimal,
    currency_code: &str,
) -> Decimal {
    if total_discount <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let remaining_amounts: Vec<Decimal> = line_items
        .iter()
        .map(|line| (line.amount - line.line_item_discount).max(Decimal::ZERO))
        .collect();
    let base: Decimal = remaining_amounts.iter().copied().sum();
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let eligible: Vec<usize> = (0..line_items.len())
        .filter(|&idx| remaining_amounts[idx] > Decimal::ZERO)
        .collect();
    let Some((&last_idx, head)) = eligible.split_last() else {
        return Decimal::ZERO;
    };

    let mut left_to_distribute = total_discount;
    let mut distributed = Decimal::ZERO;

    for &idx in head {
        let proportional = total_discount * remaining_amounts[idx] / base;
        let share = currency::round(proportional, currency_code)
            .min(remaining_amounts[idx])
            .min(left_to_distribute);
        line_items[idx].invoice_level_discount += share;
        left_to_distribute -= share;
        distributed += share;
    }

    // Exact remainder to the last chargeable line. Both operands carry
    // currency precision already, so no further rounding is needed.
    let share = left_to_distribute.min(remaining_amounts[last_idx]);
    line_items[last_idx].invoice_level_discount += share;
    distributed += share;

    distributed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceType;
    use rust_decimal_macros::dec;

    fn line(id: &str, amount: Decimal) -> LineItem {
        LineItem {
            id: id.into(),
            price_id: None,
            display_name: None,
            price_type: PriceType::Usage,
            amount,
            quantity: Decimal::ONE,
            currency: "usd".into(),
            period: None,
            line_item_discount: Decimal::ZERO,
            invoice_level_discount: Decimal::ZERO,
            prepaid_credits_applied: Decimal::ZERO,
        }
    }

    fn percentage(id: &str, pct: Decimal) -> Coupon {
        Coupon {
            id: id.into(),
            discount: Discount::Percentage(pct),
        }
    }

    fn fixed(id: &str, amount: Decimal) -> Coupon {
        Coupon {
            id: id.into(),
            discount: Discount::Fixed(amount),
        }
    }

    #[test]
    fn percentage_discount_rounds_at_source() {
        let result = apply_coupon(&percentage("c", dec!(33.333)), dec!(10.00), "usd");
        assert_eq!(result.discount, dec!(3.33));
        assert_eq!(result.final_price, dec!(6.67));
    }

    #[test]
    fn fixed_discount_caps_at_base() {
        let result = apply_coupon(&fixed("c", dec!(15.00)), dec!(10.00), "usd");
        assert_eq!(result.discount, dec!(10.00));
        assert_eq!(result.final_price, dec!(0.00));
    }

    #[test]
    fn jpy_discount_has_no_fraction() {
        let result = apply_coupon(&percentage("c", dec!(33.333)), dec!(1000), "jpy");
        assert_eq!(result.discount, dec!(333));
        assert_eq!(result.final_price, dec!(667));
    }

    #[test]
    fn distribution_assigns_exact_remainder_to_last_line() {
        // 10% of $1.00 over three sub-dollar lines: proportional rounded
        // shares alone would lose a penny.
        let mut lines = vec![
            line("1", dec!(0.33)),
            line("2", dec!(0.34)),
            line("3", dec!(0.33)),
        ];
        let distributed = distribute_invoice_level_discount(&mut lines, dec!(0.10), "usd");
        assert_eq!(distributed, dec!(0.10));
        let sum: Decimal = lines.iter().map(|l| l.invoice_level_discount).sum();
        assert_eq!(sum, dec!(0.10));
    }

    #[test]
    fn distribution_caps_at_line_floor() {
        let mut lines = vec![line("1", dec!(10.00)), line("2", dec!(0.01))];
        let distributed = distribute_invoice_level_discount(&mut lines, dec!(10.01), "usd");
        assert_eq!(distributed, dec!(10.01));
        assert_eq!(lines[0].invoice_level_discount, dec!(10.00));
        assert_eq!(lines[1].invoice_level_discount, dec!(0.01));
    }

    #[test]
    fn stacked_line_coupons_cannot_negate_the_line() {
        let mut invoice = Invoice {
            id: "inv".into(),
            customer_id: "cust".into(),
            currency: "usd".into(),
            issue_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            period: None,
            line_items: vec![line("1", dec!(30.00))],
            totals: None,
        };

        let outcome = apply_discounts(
            &mut invoice,
            &[
                LineItemCoupon {
                    line_item_id: "1".into(),
                    coupon: fixed("a", dec!(25.00)),
                },
                LineItemCoupon {
                    line_item_id: "1".into(),
                    coupon: fixed("b", dec!(25.00)),
                },
            ],
            &[],
        );

        assert_eq!(outcome.line_item_discount_total, dec!(30.00));
        assert_eq!(invoice.line_items[0].line_item_discount, dec!(30.00));
    }

    #[test]
    fn invoice_coupons_chain_on_reduced_base() {
        let mut invoice = Invoice {
            id: "inv".into(),
            customer_id: "cust".into(),
            currency: "usd".into(),
            issue_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            period: None,
            line_items: vec![line("1", dec!(50.00)), line("2", dec!(50.00))],
            totals: None,
        };

        // 10% of $100 = $10, then $10 fixed off the remaining $90.
        let outcome = apply_discounts(
            &mut invoice,
            &[],
            &[percentage("pct", dec!(10)), fixed("flat", dec!(10.00))],
        );

        assert_eq!(outcome.invoice_level_discount_total, dec!(20.00));
        assert_eq!(outcome.total_discount, dec!(20.00));
    }

    #[test]
    fn coupon_for_unknown_line_is_skipped() {
        let mut invoice = Invoice {
            id: "inv".into(),
            customer_id: "cust".into(),
            currency: "usd".into(),
            issue_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            period: None,
            line_items: vec![line("1", dec!(50.00))],
            totals: None,
        };

        let outcome = apply_discounts(
            &mut invoice,
            &[LineItemCoupon {
                line_item_id: "missing".into(),
                coupon: fixed("a", dec!(10.00)),
            }],
            &[],
        );

        assert_eq!(outcome.total_discount, Decimal::ZERO);
    }
}
