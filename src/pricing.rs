//! Cost calculation for usage-based charges.
//!
//! [`calculate_cost_with_breakup`] turns a price definition and a quantity
//! into a cost plus breakdown metadata (effective unit cost, selected tier).
//! [`calculate_bucketed_cost`] sums the cost over per-time-bucket peak
//! quantities: "charge the peak usage in each billing sub-window,
//! independently tiered."
//!
//! The pricer itself never fails: zero quantities price to zero, and
//! malformed tier lists are the job of [`crate::validation::validate_price`]
//! to reject before a price is ever used here.

use rust_decimal::Decimal;

use crate::currency;
use crate::types::{BillingScheme, CostBreakup, PackageRounding, Price, PriceTier};

/// Calculate the cost of `quantity` under `price`.
///
/// When `round` is set, `final_cost` is rounded to currency precision at
/// source; breakdown metadata stays unrounded so callers can audit the
/// exact arithmetic.
pub fn calculate_cost_with_breakup(price: &Price, quantity: Decimal, round: bool) -> CostBreakup {
    // Zero usage costs zero under every billing model, with no tier lookup.
    if quantity.is_zero() {
        return CostBreakup::zero();
    }

    let mut breakup = match &price.scheme {
        BillingScheme::FlatFee => CostBreakup {
            final_cost: price.amount * quantity,
            effective_unit_cost: price.amount,
            tier_unit_amount: price.amount,
            selected_tier: None,
        },
        BillingScheme::Package(transform) => {
            // Validation guarantees divide_by > 0; the max(1) only keeps a
            // malformed price from panicking on division.
            let divisor = Decimal::from(transform.divide_by.max(1));
            let packages = quantity / divisor;
            let units = match transform.round {
                PackageRounding::Up => packages.ceil(),
                PackageRounding::Down => packages.floor(),
            };
            let final_cost = units * price.amount;
            CostBreakup {
                final_cost,
                effective_unit_cost: final_cost / quantity,
                tier_unit_amount: price.amount / divisor,
                selected_tier: None,
            }
        }
        BillingScheme::TieredVolume { tiers } => volume_cost(tiers, quantity),
        BillingScheme::TieredSlab { tiers } => slab_cost(tiers, quantity),
    };

    if round {
        breakup.final_cost = currency::round(breakup.final_cost, &price.currency);
    }
    breakup
}

/// Total cost of `quantity` under `price`, unrounded.
pub fn calculate_cost(price: &Price, quantity: Decimal) -> Decimal {
    calculate_cost_with_breakup(price, quantity, false).final_cost
}

/// Sum of per-bucket costs, where each bucket value is the peak quantity
/// observed in one time window. Each bucket is tiered independently.
pub fn calculate_bucketed_cost(price: &Price, bucket_peaks: &[Decimal]) -> Decimal {
    bucket_peaks
        .iter()
        .map(|peak| calculate_cost(price, *peak))
        .sum()
}

/// Volume pricing: the whole quantity is billed at the single tier it
/// falls into, meaning the first tier whose bound covers it, else the unbounded
/// final tier.
fn volume_cost(tiers: &[PriceTier], quantity: Decimal) -> CostBreakup {
    let selected = tiers
        .iter()
        .position(|tier| tier.up_to.is_none_or(|bound| quantity <= bound));

    let Some(idx) = selected else {
        // No tier covers the quantity: misconfigured tier list (no
        // unbounded final tier). Validation owns rejecting this.
        return CostBreakup::zero();
    };

    let tier = &tiers[idx];
    let flat = tier.flat_amount.unwrap_or(Decimal::ZERO);
    CostBreakup {
        final_cost: quantity * tier.unit_amount + flat,
        effective_unit_cost: tier.unit_amount,
        tier_unit_amount: tier.unit_amount,
        selected_tier: Some(idx),
    }
}

/// Slab pricing: walk tiers in order, billing each tier's consumed width at
/// that tier's rate, until the quantity is exhausted. A tier's flat amount
/// is charged whenever any quantity lands in it; the walk stops the moment
/// the remaining quantity reaches zero, so a tier is never entered with
/// zero width.
fn slab_cost(tiers: &[PriceTier], quantity: Decimal) -> CostBreakup {
    let mut remaining = quantity;
    let mut previous_bound = Decimal::ZERO;
    let mut final_cost = Decimal::ZERO;
    let mut last_touched: Option<usize> = None;

    for (idx, tier) in tiers.iter().enumerate() {
        let consumed = match tier.up_to {
            Some(bound) => {
                let width = (bound - previous_bound).max(Decimal::ZERO);
                previous_bound = bound;
                remaining.min(width)
            }
            None => remaining,
        };

        if consumed > Decimal::ZERO {
            final_cost += consumed * tier.unit_amount;
            final_cost += tier.flat_amount.unwrap_or(Decimal::ZERO);
            last_touched = Some(idx);
            remaining -= consumed;
        }

        if remaining <= Decimal::ZERO {
            break;
        }
    }

    let tier_unit_amount = last_touched
        .map(|idx| tiers[idx].unit_amount)
        .unwrap_or(Decimal::ZERO);

    CostBreakup {
        final_cost,
        effective_unit_cost: final_cost / quantity,
        tier_unit_amount,
        selected_tier: last_touched,
    }
}
