//! Shared-expense balance computation
//!
//! Derives a viewer's owed/owing position from the full expense set of a
//! house. The summary is recomputed from scratch on every refresh, never
//! maintained incrementally, so edits and deletions cannot leave a stale
//! running total behind.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::invariants::assert_balance_invariants;
use crate::models::Expense;

/// Derived per-viewer balance position for a house
///
/// `net_balance` is always exactly `you_are_owed - you_owe`; positive
/// means the house owes the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub you_owe: Decimal,
    pub you_are_owed: Decimal,
    pub net_balance: Decimal,
}

impl BalanceSummary {
    /// A settled balance: nothing owed either way
    pub fn zero() -> Self {
        Self {
            you_owe: Decimal::ZERO,
            you_are_owed: Decimal::ZERO,
            net_balance: Decimal::ZERO,
        }
    }

    /// Round every figure to `dp` decimal places for presentation
    ///
    /// Accumulation stays unrounded; rounding once at the end keeps
    /// repeated uneven splits from drifting.
    pub fn rounded(&self, dp: u32) -> Self {
        let round = |d: Decimal| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        Self {
            you_owe: round(self.you_owe),
            you_are_owed: round(self.you_are_owed),
            net_balance: round(self.net_balance),
        }
    }
}

impl Default for BalanceSummary {
    fn default() -> Self {
        Self::zero()
    }
}

/// Compute the viewer's balance across `expenses`
///
/// Each expense contributes independently, so the result is the same in
/// any order. The payer fronts `amount - share` for the others; every
/// listed sharer owes one share; a viewer who neither paid nor shares
/// contributes nothing.
pub fn balance_for(expenses: &[Expense], viewer: Uuid) -> BalanceSummary {
    let mut you_owe = Decimal::ZERO;
    let mut you_are_owed = Decimal::ZERO;

    for expense in expenses {
        let share = expense.share_amount();
        if expense.paid_by == viewer {
            you_are_owed += expense.amount - share;
        } else if expense.shared_with.contains(&viewer) {
            you_owe += share;
        }
    }

    let summary = BalanceSummary {
        you_owe,
        you_are_owed,
        net_balance: you_are_owed - you_owe,
    };
    assert_balance_invariants(&summary);
    summary
}
