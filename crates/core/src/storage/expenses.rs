//! Expense storage operations
//!
//! Amounts are stored as decimal text and parsed back exactly; they never
//! pass through floating point.

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_decimal, parse_uuid, parse_uuid_set};
use crate::error::{Error, Result};
use crate::models::Expense;

pub struct ExpenseStore<'a> {
    conn: &'a Connection,
}

fn row_to_expense(row: &Row<'_>) -> std::result::Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        title: row.get(1)?,
        amount: parse_decimal(&row.get::<_, String>(2)?)?,
        description: row.get(3)?,
        paid_by: parse_uuid(&row.get::<_, String>(4)?)?,
        house_id: parse_uuid(&row.get::<_, String>(5)?)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?)?,
        category: row.get(7)?,
        shared_with: parse_uuid_set(&row.get::<_, String>(8)?)?,
    })
}

impl<'a> ExpenseStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create an expense
    #[instrument(skip(self, expense), fields(expense_id = %expense.id, house_id = %expense.house_id))]
    pub fn create(&self, expense: &Expense) -> Result<()> {
        self.conn.execute(
            "INSERT INTO expenses (id, title, amount, description, paid_by, house_id,
             created_at, category, shared_with)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                expense.id.to_string(),
                expense.title,
                expense.amount.to_string(),
                expense.description,
                expense.paid_by.to_string(),
                expense.house_id.to_string(),
                expense.created_at.to_rfc3339(),
                expense.category,
                serde_json::to_string(&expense.shared_with)?,
            ],
        )?;
        Ok(())
    }

    /// List expenses for a house, newest first
    #[instrument(skip(self))]
    pub fn list_for_house(&self, house_id: Uuid) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, amount, description, paid_by, house_id,
             created_at, category, shared_with
             FROM expenses WHERE house_id = ?1 ORDER BY created_at DESC",
        )?;

        let expenses = stmt
            .query_map(params![house_id.to_string()], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Replace the editable fields of an expense
    ///
    /// paid_by, house_id, and created_at never change after creation.
    #[instrument(skip(self, expense), fields(expense_id = %expense.id))]
    pub fn update(&self, expense: &Expense) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE expenses SET title = ?1, amount = ?2, description = ?3, category = ?4,
             shared_with = ?5 WHERE id = ?6",
            params![
                expense.title,
                expense.amount.to_string(),
                expense.description,
                expense.category,
                serde_json::to_string(&expense.shared_with)?,
                expense.id.to_string(),
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("expense {}", expense.id)));
        }
        Ok(())
    }

    /// Delete an expense
    #[instrument(skip(self))]
    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::Database;
    use crate::models::{Expense, House};
    use rust_decimal::Decimal;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn house_fixture(db: &Database) -> House {
        let house = House::new("Test House".to_string(), Uuid::new_v4());
        db.houses().create(&house).unwrap();
        house
    }

    #[test]
    fn amounts_survive_storage_exactly() {
        let db = Database::open_in_memory().unwrap();
        let house = house_fixture(&db);
        let payer = Uuid::new_v4();
        let sharer = Uuid::new_v4();

        // 10/3 exercises a non-terminating split stored at full precision
        let amount = Decimal::from(10) / Decimal::from(3);
        let expense = Expense::new(house.id, payer, "Thirds".to_string(), amount)
            .with_shared(BTreeSet::from([sharer]));
        db.expenses().create(&expense).unwrap();

        let stored = &db.expenses().list_for_house(house.id).unwrap()[0];
        assert_eq!(stored.amount, amount);
        assert_eq!(stored.paid_by, payer);
        assert_eq!(stored.shared_with, BTreeSet::from([sharer]));
    }

    #[test]
    fn list_is_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let house = house_fixture(&db);
        let payer = Uuid::new_v4();

        for (i, title) in ["oldest", "middle", "newest"].iter().enumerate() {
            let mut expense = Expense::new(
                house.id,
                payer,
                title.to_string(),
                Decimal::from(10),
            );
            expense.created_at = chrono::Utc::now() + chrono::Duration::seconds(i as i64);
            db.expenses().create(&expense).unwrap();
        }

        let titles: Vec<String> = db
            .expenses()
            .list_for_house(house.id)
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn update_rewrites_amount_and_sharers() {
        let db = Database::open_in_memory().unwrap();
        let house = house_fixture(&db);
        let payer = Uuid::new_v4();

        let expense = Expense::new(house.id, payer, "Groceries".to_string(), Decimal::from(40));
        db.expenses().create(&expense).unwrap();

        let mut edited = expense.clone();
        edited.amount = Decimal::new(5250, 2); // 52.50
        edited.shared_with = BTreeSet::from([Uuid::new_v4(), Uuid::new_v4()]);
        db.expenses().update(&edited).unwrap();

        let stored = &db.expenses().list_for_house(house.id).unwrap()[0];
        assert_eq!(stored.amount, Decimal::new(5250, 2));
        assert_eq!(stored.shared_with.len(), 2);
        assert_eq!(stored.paid_by, payer);
    }

    #[test]
    fn delete_removes_the_row() {
        let db = Database::open_in_memory().unwrap();
        let house = house_fixture(&db);

        let expense = Expense::new(
            house.id,
            Uuid::new_v4(),
            "Gone".to_string(),
            Decimal::from(5),
        );
        db.expenses().create(&expense).unwrap();
        db.expenses().delete(expense.id).unwrap();

        assert!(db.expenses().list_for_house(house.id).unwrap().is_empty());
    }
}
