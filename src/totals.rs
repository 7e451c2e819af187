//! Invoice totals composition.
//!
//! The composer is the thin orchestration layer over the calculation core:
//! it sequences discount application and credit allocation, then derives
//! subtotal, total and amount due from the adjusted line items. All the
//! hard arithmetic lives in [`crate::discount`] and [`crate::credit`]; this
//! module only adds and clamps already-rounded values.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::credit;
use crate::currency;
use crate::discount::{self, DiscountOutcome};
use crate::types::{Coupon, Invoice, LineItemCoupon, Totals, Wallet};

/// Everything a caller needs to persist after one billing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingOutcome {
    /// Discount totals, split by stage.
    pub discounts: DiscountOutcome,
    /// Prepaid credits applied across line items.
    pub prepaid_credits_applied: Decimal,
    /// Amount to debit per wallet. The caller commits these debits and the
    /// updated line items in one transaction.
    pub wallet_debits: BTreeMap<String, Decimal>,
}

/// Derive invoice totals from the line items' current state.
///
/// Sets `invoice.totals`. Idempotent: calling it again without touching the
/// line items produces the same totals.
pub fn compose_totals(invoice: &mut Invoice) {
    let mut subtotal = Decimal::ZERO;
    let mut line_item_discount_total = Decimal::ZERO;
    let mut invoice_level_discount_total = Decimal::ZERO;
    let mut prepaid_credits_applied = Decimal::ZERO;

    for line in &invoice.line_items {
        subtotal += line.amount;
        line_item_discount_total += line.line_item_discount;
        invoice_level_discount_total += line.invoice_level_discount;
        prepaid_credits_applied += line.prepaid_credits_applied;
    }

    let total_discount = line_item_discount_total + invoice_level_discount_total;
    let total = (subtotal - total_discount - prepaid_credits_applied).max(Decimal::ZERO);

    invoice.totals = Some(Totals {
        subtotal,
        total_discount,
        line_item_discount_total,
        invoice_level_discount_total,
        prepaid_credits_applied,
        total,
        amount_due: total,
    });
}

/// Run the full billing pass over an invoice: discounts, then prepaid
/// credits, then totals.
///
/// `wallets` may contain any of the customer's wallets — only prepaid
/// wallets in the invoice currency participate, in the order given
/// (ordering policy, e.g. earliest-expiring-first, is the caller's).
/// Mutates the invoice's line items and totals; performs no I/O.
pub fn apply_discounts_and_credits(
    invoice: &mut Invoice,
    line_item_coupons: &[LineItemCoupon],
    invoice_coupons: &[Coupon],
    wallets: &[Wallet],
) -> BillingOutcome {
    let discounts = discount::apply_discounts(invoice, line_item_coupons, invoice_coupons);

    let eligible = credit::wallets_for_credit_adjustment(wallets, &invoice.currency);
    let wallet_debits = credit::calculate_credit_adjustments(invoice, &eligible);

    compose_totals(invoice);
    let prepaid_credits_applied = invoice
        .totals
        .as_ref()
        .map(|totals| totals.prepaid_credits_applied)
        .unwrap_or(Decimal::ZERO);

    BillingOutcome {
        discounts,
        prepaid_credits_applied,
        wallet_debits,
    }
}

/// Residual owed on a commitment after crediting the amount already used.
///
/// The used amount is rounded first (it arrives as a sum of usage charges),
/// then the residual is rounded and floored at zero; overage past the
/// commitment is billed through usage charges, not refunded here.
pub fn commitment_true_up(commitment: Decimal, used: Decimal, currency_code: &str) -> Decimal {
    let rounded_used = currency::round(used, currency_code);
    currency::round(commitment - rounded_used, currency_code).max(Decimal::ZERO)
}
