//! Prepaid-credit allocation across invoice line items.
//!
//! Wallet balances form one pool consumed strictly in input order: a later
//! wallet is touched only once every earlier wallet is exhausted. Credits
//! apply to usage line items only, against the amount left after discounts,
//! and every wallet draw is rounded to currency precision the moment it is
//! committed. The engine only computes how much to take from each wallet;
//! the wallet ledger owns the actual debit, which the caller persists
//! together with the updated line items.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::currency;
use crate::types::{Invoice, PriceType, Wallet, WalletType};

/// Filter a customer's wallets down to the ones eligible for credit
/// adjustment: prepaid, in the invoice currency, with a positive balance.
///
/// Input order is preserved: consumption priority (e.g.
/// earliest-expiring-first) is the caller's ordering contract.
pub fn wallets_for_credit_adjustment(wallets: &[Wallet], currency_code: &str) -> Vec<Wallet> {
    wallets
        .iter()
        .filter(|wallet| {
            wallet.wallet_type == WalletType::Prepaid
                && wallet.currency == currency_code
                && wallet.balance > Decimal::ZERO
        })
        .cloned()
        .collect()
}

/// Draw prepaid credit from `wallets`, in order, to cover each eligible
/// line item's post-discount amount.
///
/// Sets every line item's `prepaid_credits_applied` (zero for skipped
/// lines) and returns the amount to debit per wallet. The returned map
/// totals exactly the credits applied, and no wallet is ever drawn beyond
/// its starting balance. Wallet balances passed in must reflect the latest
/// committed ledger state; the engine does not mutate the wallets
/// themselves.
pub fn calculate_credit_adjustments(
    invoice: &mut Invoice,
    wallets: &[Wallet],
) -> BTreeMap<String, Decimal> {
    let mut debits: BTreeMap<String, Decimal> = BTreeMap::new();
    if wallets.is_empty() {
        return debits;
    }

    // Track each wallet's balance as draws consume it.
    let mut balances: HashMap<&str, Decimal> = wallets
        .iter()
        .map(|wallet| (wallet.id.as_str(), wallet.balance))
        .collect();

    let mut pool: Decimal = wallets.iter().map(|wallet| wallet.balance).sum();
    if pool <= Decimal::ZERO {
        return debits;
    }

    let currency_code = invoice.currency.clone();

    // Wallets are consumed front to back; a passed wallet is never revisited.
    let mut cursor = 0usize;

    for line in &mut invoice.line_items {
        // Only usage-based items get credits applied.
        if line.price_type != PriceType::Usage {
            line.prepaid_credits_applied = Decimal::ZERO;
            continue;
        }

        // Credits cover the net amount, after both discount stages.
        let due = line.amount - line.line_item_discount - line.invoice_level_discount;
        if due <= Decimal::ZERO {
            line.prepaid_credits_applied = Decimal::ZERO;
            continue;
        }

        let max_applicable = pool.min(due);
        let mut applied = Decimal::ZERO;

        while cursor < wallets.len() && applied < max_applicable {
            let wallet = &wallets[cursor];
            let balance = balances[wallet.id.as_str()];

            if balance <= Decimal::ZERO {
                cursor += 1;
                continue;
            }

            let still_needed = max_applicable - applied;
            let raw = balance.min(still_needed);
            // Rounding must never inflate the draw beyond what is actually
            // available unrounded.
            let draw = currency::round(raw, &currency_code).min(raw);

            if draw.is_zero() && raw > Decimal::ZERO {
                // A positive remainder below currency precision rounds to
                // nothing: treat the wallet as exhausted and move on rather
                // than spinning on it.
                balances.insert(wallet.id.as_str(), Decimal::ZERO);
                cursor += 1;
                continue;
            }

            if draw > Decimal::ZERO {
                *debits.entry(wallet.id.clone()).or_insert(Decimal::ZERO) += draw;
                balances.insert(wallet.id.as_str(), balance - draw);
                applied += draw;
            }

            if balances[wallet.id.as_str()] <= Decimal::ZERO {
                cursor += 1;
            }
        }

        line.prepaid_credits_applied = applied;
        pool -= applied;
    }

    debits
}
