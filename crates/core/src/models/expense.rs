//! Expense model

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categories offered when recording an expense
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "General",
    "Food",
    "Transport",
    "Utilities",
    "Entertainment",
    "Shopping",
    "Other",
];

/// A shared household expense
///
/// The payer is always an implicit participant: the amount divides evenly
/// across `shared_with.len() + 1` people, even when the payer also appears
/// in `shared_with`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub title: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub paid_by: Uuid,
    pub house_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub category: Option<String>,
    /// Users sharing the expense besides the payer
    pub shared_with: BTreeSet<Uuid>,
}

impl Expense {
    pub fn new(house_id: Uuid, paid_by: Uuid, title: String, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            amount,
            description: None,
            paid_by,
            house_id,
            created_at: Utc::now(),
            category: None,
            shared_with: BTreeSet::new(),
        }
    }

    pub fn with_shared(mut self, shared_with: BTreeSet<Uuid>) -> Self {
        self.shared_with = shared_with;
        self
    }

    pub fn with_category(mut self, category: String) -> Self {
        self.category = Some(category);
        self
    }

    /// Number of people splitting the amount, payer included
    pub fn share_count(&self) -> usize {
        self.shared_with.len() + 1
    }

    /// Even share each participant owes
    ///
    /// Kept at full precision; rounding happens only at presentation.
    pub fn share_amount(&self) -> Decimal {
        // share_count is at least 1, so the division cannot fail
        self.amount / Decimal::from(self.share_count() as u64)
    }
}
