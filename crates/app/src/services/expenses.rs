//! Shared expense tracking
//!
//! Snapshot of the current house's expenses plus the viewer's derived
//! balance. The balance is recomputed from the freshly listed full set on
//! every fetch and after every mutation; nothing is maintained
//! incrementally.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use uuid::Uuid;

use hearth_core::balance::{balance_for, BalanceSummary};
use hearth_core::models::EXPENSE_CATEGORIES;
use hearth_core::{Error, Expense, ExpenseRepository, Result};

use super::ServiceStatus;

/// Most recent expenses surfaced on a dashboard
pub const RECENT_EXPENSE_LIMIT: usize = 5;

/// Fields accepted when recording an expense
#[derive(Debug, Clone, Default)]
pub struct NewExpense {
    pub title: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Sharers besides the payer
    pub shared_with: BTreeSet<Uuid>,
}

pub struct ExpenseService<B: ExpenseRepository> {
    backend: Arc<Mutex<B>>,
    expenses: Vec<Expense>,
    balance: Option<BalanceSummary>,
    status: ServiceStatus,
}

impl<B: ExpenseRepository> ExpenseService<B> {
    pub fn new(backend: Arc<Mutex<B>>) -> Self {
        Self {
            backend,
            expenses: Vec::new(),
            balance: None,
            status: ServiceStatus::default(),
        }
    }

    /// The expense list from the last refresh, newest first
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// The most recent expenses, up to [`RECENT_EXPENSE_LIMIT`]
    pub fn recent(&self) -> &[Expense] {
        let n = self.expenses.len().min(RECENT_EXPENSE_LIMIT);
        &self.expenses[..n]
    }

    /// The viewer's balance derived from the last refresh
    pub fn balance(&self) -> Option<&BalanceSummary> {
        self.balance.as_ref()
    }

    /// Categories offered for new expenses
    pub fn categories() -> &'static [&'static str] {
        EXPENSE_CATEGORIES
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.status.last_error()
    }

    /// Load the expense list and recompute the viewer's balance
    pub fn fetch(&mut self, house_id: Uuid, viewer: Uuid) -> Result<Vec<Expense>> {
        self.status.begin();
        let result = self.refresh(house_id, viewer, |_| Ok(()));
        self.status.finish(result)
    }

    /// Record an expense, then re-list and recompute
    pub fn create(
        &mut self,
        house_id: Uuid,
        viewer: Uuid,
        fields: NewExpense,
    ) -> Result<Vec<Expense>> {
        self.status.begin();
        let result = self.create_inner(house_id, viewer, fields);
        self.status.finish(result)
    }

    fn create_inner(
        &mut self,
        house_id: Uuid,
        viewer: Uuid,
        fields: NewExpense,
    ) -> Result<Vec<Expense>> {
        let title = fields.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("expense title must not be empty".into()));
        }

        let mut expense = Expense::new(house_id, viewer, title.to_string(), fields.amount);
        expense.description = fields.description;
        expense.category = fields.category;
        expense.shared_with = fields.shared_with;

        self.refresh(house_id, viewer, |backend| backend.create_expense(&expense))
    }

    /// Update an expense's editable fields, then re-list and recompute
    pub fn update(&mut self, viewer: Uuid, expense: &Expense) -> Result<Vec<Expense>> {
        self.status.begin();
        let result = self.update_inner(viewer, expense);
        self.status.finish(result)
    }

    fn update_inner(&mut self, viewer: Uuid, expense: &Expense) -> Result<Vec<Expense>> {
        if expense.title.trim().is_empty() {
            return Err(Error::Validation("expense title must not be empty".into()));
        }
        self.refresh(expense.house_id, viewer, |backend| {
            backend.update_expense(expense)
        })
    }

    /// Delete an expense, then re-list and recompute
    pub fn delete(&mut self, house_id: Uuid, viewer: Uuid, id: Uuid) -> Result<Vec<Expense>> {
        self.status.begin();
        let result = self.refresh(house_id, viewer, |backend| backend.delete_expense(id));
        self.status.finish(result)
    }

    /// Run `mutate` under the backend lock, then re-list and re-derive
    /// the balance from the same lock acquisition
    fn refresh<F>(&mut self, house_id: Uuid, viewer: Uuid, mutate: F) -> Result<Vec<Expense>>
    where
        F: FnOnce(&B) -> Result<()>,
    {
        let backend = self.backend.lock().unwrap();
        mutate(&backend)?;
        let fresh = backend.list_expenses(house_id)?;
        drop(backend);

        self.balance = Some(balance_for(&fresh, viewer));
        self.expenses = fresh.clone();
        Ok(fresh)
    }

    pub(crate) fn clear(&mut self) {
        self.expenses.clear();
        self.balance = None;
        self.status.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{Database, House};

    fn service_with_house() -> (ExpenseService<Database>, Uuid, Uuid) {
        let db = Database::open_in_memory().unwrap();
        let viewer = Uuid::new_v4();
        let house = House::new("Test House".to_string(), viewer);
        db.houses().create(&house).unwrap();
        let house_id = house.id;
        (
            ExpenseService::new(Arc::new(Mutex::new(db))),
            house_id,
            viewer,
        )
    }

    fn new_expense(title: &str, amount: Decimal, shared_with: &[Uuid]) -> NewExpense {
        NewExpense {
            title: title.to_string(),
            amount,
            shared_with: shared_with.iter().copied().collect(),
            ..NewExpense::default()
        }
    }

    #[test]
    fn fetch_derives_the_documented_example() {
        // Viewer paid 100 shared with one other; the other paid 60 shared
        // with the viewer and a third: owe 20, owed 50, net +30.
        let (mut service, house_id, viewer) = service_with_house();
        let other = Uuid::new_v4();
        let third = Uuid::new_v4();

        service
            .create(house_id, viewer, new_expense("Groceries", Decimal::from(100), &[other]))
            .unwrap();
        {
            let backend = service.backend.lock().unwrap();
            let mut paid_by_other = Expense::new(
                house_id,
                other,
                "Utilities".to_string(),
                Decimal::from(60),
            );
            paid_by_other.shared_with = BTreeSet::from([viewer, third]);
            backend.create_expense(&paid_by_other).unwrap();
        }

        service.fetch(house_id, viewer).unwrap();
        let balance = service.balance().unwrap();
        assert_eq!(balance.you_owe, Decimal::from(20));
        assert_eq!(balance.you_are_owed, Decimal::from(50));
        assert_eq!(balance.net_balance, Decimal::from(30));
    }

    #[test]
    fn create_recomputes_the_balance() {
        let (mut service, house_id, viewer) = service_with_house();
        let other = Uuid::new_v4();

        service
            .create(house_id, viewer, new_expense("Rent", Decimal::from(900), &[other]))
            .unwrap();

        let balance = service.balance().unwrap();
        assert_eq!(balance.you_are_owed, Decimal::from(450));
        assert_eq!(balance.net_balance, Decimal::from(450));
    }

    #[test]
    fn delete_settles_the_balance_back_to_zero() {
        let (mut service, house_id, viewer) = service_with_house();
        let other = Uuid::new_v4();

        let expenses = service
            .create(house_id, viewer, new_expense("Takeout", Decimal::from(30), &[other]))
            .unwrap();

        let expenses = service.delete(house_id, viewer, expenses[0].id).unwrap();
        assert!(expenses.is_empty());
        assert_eq!(service.balance().unwrap(), &BalanceSummary::zero());
    }

    #[test]
    fn update_shifts_the_derived_totals() {
        let (mut service, house_id, viewer) = service_with_house();
        let other = Uuid::new_v4();

        let expenses = service
            .create(house_id, viewer, new_expense("Dinner", Decimal::from(40), &[other]))
            .unwrap();

        let mut edited = expenses[0].clone();
        edited.amount = Decimal::from(80);
        service.update(viewer, &edited).unwrap();

        assert_eq!(
            service.balance().unwrap().you_are_owed,
            Decimal::from(40)
        );
    }

    #[test]
    fn recent_caps_at_five_newest() {
        let (mut service, house_id, viewer) = service_with_house();

        for i in 0..7 {
            service
                .create(
                    house_id,
                    viewer,
                    new_expense(&format!("Expense {i}"), Decimal::from(i + 1), &[]),
                )
                .unwrap();
        }

        assert_eq!(service.expenses().len(), 7);
        assert_eq!(service.recent().len(), RECENT_EXPENSE_LIMIT);
        // Newest first
        assert_eq!(service.recent()[0].title, "Expense 6");
    }

    #[test]
    fn solo_expense_carries_no_debt() {
        let (mut service, house_id, viewer) = service_with_house();

        service
            .create(house_id, viewer, new_expense("Own lunch", Decimal::from(12), &[]))
            .unwrap();

        assert_eq!(service.balance().unwrap(), &BalanceSummary::zero());
    }

    #[test]
    fn categories_match_the_picker() {
        assert_eq!(ExpenseService::<Database>::categories().len(), 7);
        assert!(ExpenseService::<Database>::categories().contains(&"Food"));
    }
}
