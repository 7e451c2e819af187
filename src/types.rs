use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An invoice — the unit the billing core operates on.
///
/// The core never persists anything: it prices, discounts and credits the
/// line items in memory and records the outcome in [`Totals`]. The caller
/// owns writing the updated line items and the wallet debits back, typically
/// inside one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice identifier.
    pub id: String,
    /// Customer the invoice bills.
    pub customer_id: String,
    /// Invoice currency (lowercase ISO 4217, e.g. "usd").
    pub currency: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Billed period covered by this invoice, if any.
    pub period: Option<Period>,
    /// Line items. All amounts are already rounded to currency precision.
    pub line_items: Vec<LineItem>,
    /// Calculated totals (set by `compose_totals()`).
    pub totals: Option<Totals>,
}

/// One priced component of an invoice — a fixed charge or a usage charge.
///
/// `amount` is the gross amount, rounded at creation. The three adjustment
/// fields are the only values the billing core mutates; they default to zero
/// and always satisfy
/// `line_item_discount + invoice_level_discount + prepaid_credits_applied <= amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Line identifier, unique within the invoice.
    pub id: String,
    /// Price definition this line was computed from, if any.
    pub price_id: Option<String>,
    /// Human-readable label.
    pub display_name: Option<String>,
    /// Usage charges are prepaid-credit-eligible; fixed charges are not.
    pub price_type: PriceType,
    /// Gross amount in invoice currency, rounded to currency precision.
    pub amount: Decimal,
    /// Billed quantity.
    pub quantity: Decimal,
    /// Currency (matches the invoice currency).
    pub currency: String,
    /// Service period this line covers, if any.
    pub period: Option<Period>,
    /// Discount applied directly to this line item.
    #[serde(default)]
    pub line_item_discount: Decimal,
    /// This line's share of the invoice-level discount.
    #[serde(default)]
    pub invoice_level_discount: Decimal,
    /// Amount covered by prepaid wallet credits.
    #[serde(default)]
    pub prepaid_credits_applied: Decimal,
}

impl LineItem {
    /// Amount still owed on this line after discounts and credits,
    /// floored at zero.
    pub fn remaining_due(&self) -> Decimal {
        let due = self.amount
            - self.line_item_discount
            - self.invoice_level_discount
            - self.prepaid_credits_applied;
        due.max(Decimal::ZERO)
    }
}

/// Whether a price (and the line items it produces) is metered or fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    /// Metered, usage-based charge. Eligible for prepaid-credit adjustment.
    Usage,
    /// One-time or recurring fixed charge. Never credit-adjusted.
    Fixed,
}

/// Invoice totals (set by `compose_totals()`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line-item gross amounts.
    pub subtotal: Decimal,
    /// Sum of all discounts = line-item + invoice-level.
    pub total_discount: Decimal,
    /// Sum of per-line discounts.
    pub line_item_discount_total: Decimal,
    /// Sum of distributed invoice-level discounts.
    pub invoice_level_discount_total: Decimal,
    /// Sum of prepaid wallet credits applied across line items.
    pub prepaid_credits_applied: Decimal,
    /// subtotal - total_discount - prepaid_credits_applied, floored at zero.
    pub total: Decimal,
    /// Amount the customer still owes.
    pub amount_due: Decimal,
}

/// A date range (inclusive start, exclusive end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A price definition: what one unit (or package, or tier span) costs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    /// Price identifier.
    pub id: String,
    /// Currency (lowercase ISO 4217).
    pub currency: String,
    /// Usage or fixed.
    pub price_type: PriceType,
    /// Per-unit amount for flat-fee billing, per-package amount for package
    /// billing. Unused by tiered schemes (tiers carry their own amounts).
    pub amount: Decimal,
    /// How quantity maps to cost.
    pub scheme: BillingScheme,
}

/// How a quantity is turned into a cost.
///
/// Closed variant set: the billing models are fixed and small, so the
/// pricer dispatches here exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "billing_model", rename_all = "snake_case")]
pub enum BillingScheme {
    /// `cost = amount * quantity`.
    FlatFee,
    /// `cost = ceil_or_floor(quantity / divide_by) * amount`,
    /// e.g. 1000 emails for $100.
    Package(PackageTransform),
    /// All units priced at the single tier the total quantity falls into.
    TieredVolume { tiers: Vec<PriceTier> },
    /// Tiers apply progressively: each tier's width is priced at that
    /// tier's rate and the spans are summed.
    TieredSlab { tiers: Vec<PriceTier> },
}

/// Package billing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageTransform {
    /// Units per package. Must be positive.
    pub divide_by: u64,
    /// Whether a partial package is billed as a whole one or dropped.
    #[serde(default)]
    pub round: PackageRounding,
}

/// Partial-package handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageRounding {
    /// Round up to the next whole package (1.99 packages -> 2).
    #[default]
    Up,
    /// Round down to whole packages (1.99 packages -> 1).
    Down,
}

/// One tier of a tiered price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTier {
    /// Inclusive upper quantity bound. `None` marks the unbounded final
    /// tier; validation requires exactly the last tier to be unbounded.
    pub up_to: Option<Decimal>,
    /// Cost per unit within this tier.
    pub unit_amount: Decimal,
    /// Flat amount charged once when any quantity falls into this tier.
    pub flat_amount: Option<Decimal>,
}

/// Cost of a quantity under a price, with breakdown metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakup {
    /// Total cost. Unrounded unless rounding was requested at the call.
    pub final_cost: Decimal,
    /// `final_cost / quantity` (zero when quantity is zero).
    pub effective_unit_cost: Decimal,
    /// Unit amount of the tier the quantity (last) fell into; for package
    /// billing, the per-unit cost of a full package.
    pub tier_unit_amount: Decimal,
    /// Index of the selected tier; for slab pricing the last tier touched.
    /// `None` for non-tiered schemes and zero quantity.
    pub selected_tier: Option<usize>,
}

impl CostBreakup {
    /// An all-zero breakup — the cost of nothing.
    pub fn zero() -> Self {
        Self {
            final_cost: Decimal::ZERO,
            effective_unit_cost: Decimal::ZERO,
            tier_unit_amount: Decimal::ZERO,
            selected_tier: None,
        }
    }
}

/// A customer credit pool.
///
/// The core reads balances and computes draws; the wallet ledger owns the
/// actual balance mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// Wallet identifier.
    pub id: String,
    /// Currency (lowercase ISO 4217).
    pub currency: String,
    /// Available balance in wallet currency.
    pub balance: Decimal,
    /// Prepaid wallets fund credit adjustments; postpaid wallets fund
    /// invoice payments. The two pools are disjoint.
    pub wallet_type: WalletType,
}

impl Wallet {
    pub fn new(
        id: impl Into<String>,
        currency: impl Into<String>,
        balance: Decimal,
        wallet_type: WalletType,
    ) -> Self {
        Self {
            id: id.into(),
            currency: currency.into(),
            balance,
            wallet_type,
        }
    }
}

/// Wallet funding model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    /// Credit purchased or granted up front, drawn down against usage.
    Prepaid,
    /// Settled after the fact against invoice payment. Excluded from
    /// credit adjustment.
    Postpaid,
}

/// A discount instruction resolved from a coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    /// Coupon identifier.
    pub id: String,
    /// The discount it grants.
    pub discount: Discount,
}

/// Percentage-off or fixed-amount-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the base amount, in (0, 100].
    Percentage(Decimal),
    /// Fixed amount off, capped at the base amount.
    Fixed(Decimal),
}

/// Targets a [`Coupon`] at one line item of the invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemCoupon {
    /// Id of the line item the coupon applies to.
    pub line_item_id: String,
    pub coupon: Coupon,
}
