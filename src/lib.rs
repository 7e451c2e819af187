//! # abrechnung
//!
//! Usage-billing calculation library: currency-precision rounding, price-tier
//! cost calculation, ordered discount application, and prepaid-credit
//! allocation across invoice line items.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! Every amount is rounded half-up to its currency's precision exactly once,
//! at the moment it is finalized ("round at source"), so sums of parts stay
//! bit-exact and auditable. The whole crate is a pure computation core: it
//! performs no I/O, holds no shared state, and is safe to call repeatedly —
//! the caller persists updated line items and wallet debits, typically inside
//! one transaction.
//!
//! ## Quick Start
//!
//! ```rust
//! use abrechnung::*;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let mut invoice = InvoiceBuilder::new(
//!     "inv-2025-001",
//!     "cust-42",
//!     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
//! )
//! .add_line(LineItemBuilder::new("li-1", dec!(30.00), dec!(300)).build())
//! .add_line(LineItemBuilder::new("li-2", dec!(70.00), dec!(700)).build())
//! .build()
//! .unwrap();
//!
//! let ten_percent = Coupon {
//!     id: "coupon-10pct".into(),
//!     discount: Discount::Percentage(dec!(10)),
//! };
//! let wallet = Wallet::new("wallet-1", "usd", dec!(20.00), WalletType::Prepaid);
//!
//! let outcome = apply_discounts_and_credits(&mut invoice, &[], &[ten_percent], &[wallet]);
//!
//! assert_eq!(outcome.discounts.total_discount, dec!(10.00));
//! assert_eq!(outcome.prepaid_credits_applied, dec!(20.00));
//! assert_eq!(invoice.totals.unwrap().amount_due, dec!(70.00));
//! ```
//!
//! ## Modules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`currency`] | minor-unit precision lookup and half-up rounding |
//! | [`pricing`] | flat-fee / package / tiered-volume / tiered-slab cost calculation, per-bucket aggregation |
//! | [`discount`] | per-line and invoice-level discount application and distribution |
//! | [`credit`] | prepaid-wallet credit allocation with ordered wallet draw-down |
//! | [`totals`] | totals composition and the full billing pass |
//! | [`validation`] | price / coupon / invoice configuration validation |

pub mod builder;
pub mod credit;
pub mod currency;
pub mod discount;
pub mod error;
pub mod pricing;
pub mod totals;
pub mod types;
pub mod validation;

pub use builder::{InvoiceBuilder, LineItemBuilder};
pub use credit::{calculate_credit_adjustments, wallets_for_credit_adjustment};
pub use discount::{apply_coupon, apply_discounts, distribute_invoice_level_discount};
pub use discount::{DiscountOutcome, DiscountResult};
pub use error::{AbrechnungError, ValidationError};
pub use pricing::{calculate_bucketed_cost, calculate_cost, calculate_cost_with_breakup};
pub use totals::{apply_discounts_and_credits, commitment_true_up, compose_totals, BillingOutcome};
pub use types::*;
pub use validation::{validate_coupon, validate_invoice, validate_price};
