//! Expense service
//!
//! CRUD over the expense collection plus frequent-amount suggestions. Every
//! operation re-reads the whole collection and every mutation writes it back
//! in full.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::config::settings::{LastUsed, FREQUENT_AMOUNT_LIMIT, FREQUENT_AMOUNT_WINDOW_DAYS};
use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, ExpenseFilter, ExpenseId, ExpenseInput, ExpenseUpdate, FrequentAmount};
use crate::storage::{StorageAdapter, StorageKey};

use super::settings::SettingsService;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a StorageAdapter,
    settings: Option<SettingsService<'a>>,
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(storage: &'a StorageAdapter) -> Self {
        Self {
            storage,
            settings: None,
        }
    }

    /// Create a service that also remembers the last-used entry values
    pub fn with_settings(storage: &'a StorageAdapter, settings: SettingsService<'a>) -> Self {
        Self {
            storage,
            settings: Some(settings),
        }
    }

    fn load(&self) -> SpendResult<Vec<Expense>> {
        Ok(self
            .storage
            .get::<Vec<Expense>>(StorageKey::Expenses)?
            .unwrap_or_default())
    }

    fn save(&self, expenses: &[Expense]) -> SpendResult<()> {
        self.storage.set(StorageKey::Expenses, expenses)?;
        Ok(())
    }

    /// Create a new expense
    pub fn create(&self, input: ExpenseInput) -> SpendResult<Expense> {
        let date = input.validate()?;

        let mut expenses = self.load()?;
        let expense = Expense::from_input(input, date);
        expenses.push(expense.clone());
        self.save(&expenses)?;

        tracing::debug!(id = %expense.id, amount = expense.amount, "expense created");

        // Remembering the entry is secondary; a failure here must not undo the create
        if let Some(settings) = &self.settings {
            let last_used = LastUsed {
                category: expense.category,
                subcategory: expense.subcategory.clone(),
                memo: expense.memo.clone().unwrap_or_default(),
            };
            if let Err(e) = settings.update_last_used(last_used) {
                tracing::warn!(error = %e, "failed to remember last-used values");
            }
        }

        Ok(expense)
    }

    /// Apply a partial update to an existing expense
    pub fn update(&self, id: ExpenseId, update: &ExpenseUpdate) -> SpendResult<Expense> {
        let mut expenses = self.load()?;
        let index = expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| SpendError::expense_not_found(id.to_string()))?;

        let updated = expenses[index].merged(update)?;
        expenses[index] = updated.clone();
        self.save(&expenses)?;

        tracing::debug!(id = %id, "expense updated");
        Ok(updated)
    }

    /// Delete an expense, returning the removed record
    pub fn delete(&self, id: ExpenseId) -> SpendResult<Expense> {
        let mut expenses = self.load()?;
        let index = expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| SpendError::expense_not_found(id.to_string()))?;

        let removed = expenses.remove(index);
        self.save(&expenses)?;

        tracing::debug!(id = %id, "expense deleted");
        Ok(removed)
    }

    /// Get an expense by ID
    pub fn get_by_id(&self, id: ExpenseId) -> SpendResult<Expense> {
        self.load()?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| SpendError::expense_not_found(id.to_string()))
    }

    /// List expenses matching `filter`, newest first
    ///
    /// Ordered by date descending, then by creation time descending.
    pub fn list(&self, filter: &ExpenseFilter) -> SpendResult<Vec<Expense>> {
        let mut expenses: Vec<Expense> = self
            .load()?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(expenses)
    }

    /// Count stored expenses
    pub fn count(&self) -> SpendResult<usize> {
        Ok(self.load()?.len())
    }

    /// Most common amounts over the recent window, relative to today
    pub fn get_frequent_amounts(&self) -> SpendResult<Vec<FrequentAmount>> {
        self.get_frequent_amounts_at(chrono::Local::now().date_naive())
    }

    /// Most common amounts among expenses dated within the window ending `today`
    ///
    /// The window covers `today` and the 89 days before it; later dates are
    /// kept. Equal counts keep the order in which amounts were first seen.
    pub fn get_frequent_amounts_at(&self, today: NaiveDate) -> SpendResult<Vec<FrequentAmount>> {
        let window_start = today - Duration::days(FREQUENT_AMOUNT_WINDOW_DAYS as i64 - 1);

        let mut counts: Vec<FrequentAmount> = Vec::new();
        let mut index: HashMap<i64, usize> = HashMap::new();

        for expense in self.load()?.iter().filter(|e| e.date >= window_start) {
            match index.get(&expense.amount) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(expense.amount, counts.len());
                    counts.push(FrequentAmount {
                        amount: expense.amount,
                        count: 1,
                    });
                }
            }
        }

        // Stable sort keeps first-seen order among ties
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(FREQUENT_AMOUNT_LIMIT);
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::error::StorageError;
    use crate::models::Category;
    use crate::storage::MemoryBackend;

    fn input(date: &str, amount: i64) -> ExpenseInput {
        ExpenseInput {
            date: date.into(),
            amount,
            category: Category::Transport,
            subcategory: "train".into(),
            memo: None,
            satisfaction: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_expense() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);

        let mut i = input("2025-01-15", 1200);
        i.memo = Some("airport".into());
        i.satisfaction = Some(4);
        let expense = service.create(i.clone()).unwrap();

        assert_eq!(expense.date, date(2025, 1, 15));
        assert_eq!(expense.amount, 1200);
        assert_eq!(expense.category, Category::Transport);
        assert_eq!(expense.subcategory, "train");
        assert_eq!(expense.memo.as_deref(), Some("airport"));
        assert_eq!(expense.satisfaction, Some(4));
        assert_eq!(expense.created_at, expense.updated_at);

        assert_eq!(service.get_by_id(expense.id).unwrap(), expense);
    }

    #[test]
    fn test_create_reports_first_invalid_field() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);

        let err = service.create(input("", 0)).unwrap_err();
        assert_eq!(err.field(), Some("date"));

        let err = service.create(input("2025-01-15", 0)).unwrap_err();
        assert_eq!(err.field(), Some("amount"));

        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_create_remembers_last_used() {
        let storage = StorageAdapter::in_memory();
        let settings = SettingsService::new(&storage);
        let service = ExpenseService::with_settings(&storage, settings);

        let mut i = input("2025-01-15", 800);
        i.category = Category::Social;
        i.subcategory = "cafe".into();
        i.memo = Some("latte".into());
        service.create(i).unwrap();

        let last = settings.get_last_used().unwrap();
        assert_eq!(last.category, Category::Social);
        assert_eq!(last.subcategory, "cafe");
        assert_eq!(last.memo, "latte");
    }

    #[test]
    fn test_create_succeeds_when_settings_update_fails() {
        let storage = StorageAdapter::in_memory();
        storage.set(StorageKey::Settings, "corrupt").unwrap();
        let service = ExpenseService::with_settings(&storage, SettingsService::new(&storage));

        let expense = service.create(input("2025-01-15", 300)).unwrap();
        assert_eq!(service.get_by_id(expense.id).unwrap().amount, 300);
    }

    #[test]
    fn test_create_without_settings_leaves_settings_alone() {
        let storage = StorageAdapter::in_memory();
        ExpenseService::new(&storage)
            .create(input("2025-01-15", 300))
            .unwrap();
        assert_eq!(storage.get::<Settings>(StorageKey::Settings).unwrap(), None);
    }

    #[test]
    fn test_storage_failure_surfaces() {
        let storage = StorageAdapter::new(MemoryBackend::with_capacity(32));
        let service = ExpenseService::new(&storage);
        let err = service.create(input("2025-01-15", 300)).unwrap_err();
        assert!(matches!(
            err,
            SpendError::Storage(StorageError::QuotaExceeded(_))
        ));
    }

    #[test]
    fn test_update_expense() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);
        let created = service.create(input("2025-01-15", 300)).unwrap();

        let update = ExpenseUpdate {
            amount: Some(450),
            category: Some(Category::Social),
            subcategory: Some("meal".into()),
            satisfaction: Some(Some(5)),
            ..Default::default()
        };
        let updated = service.update(created.id, &update).unwrap();

        assert_eq!(updated.amount, 450);
        assert_eq!(updated.category, Category::Social);
        assert_eq!(updated.satisfaction, Some(5));
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(service.get_by_id(created.id).unwrap(), updated);
    }

    #[test]
    fn test_update_revalidates_merged_record() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);
        let created = service.create(input("2025-01-15", 300)).unwrap();

        let update = ExpenseUpdate {
            amount: Some(0),
            ..Default::default()
        };
        let err = service.update(created.id, &update).unwrap_err();
        assert_eq!(err.field(), Some("amount"));

        let update = ExpenseUpdate {
            category: Some(Category::Social),
            ..Default::default()
        };
        let err = service.update(created.id, &update).unwrap_err();
        assert_eq!(err.field(), Some("subcategory"));

        assert_eq!(service.get_by_id(created.id).unwrap(), created);
    }

    #[test]
    fn test_missing_id_is_not_found() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);
        let id = ExpenseId::new();

        for err in [
            service.update(id, &ExpenseUpdate::default()).unwrap_err(),
            service.delete(id).unwrap_err(),
            service.get_by_id(id).unwrap_err(),
        ] {
            match err {
                SpendError::NotFound { id: missing, .. } => assert_eq!(missing, id.to_string()),
                other => panic!("expected NotFound, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_delete_expense() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);
        let keep = service.create(input("2025-01-15", 100)).unwrap();
        let gone = service.create(input("2025-01-16", 200)).unwrap();

        let removed = service.delete(gone.id).unwrap();
        assert_eq!(removed.id, gone.id);
        assert_eq!(service.count().unwrap(), 1);
        assert!(service.get_by_id(keep.id).is_ok());
    }

    #[test]
    fn test_list_orders_newest_first() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);

        let a = service.create(input("2025-01-10", 100)).unwrap();
        let b = service.create(input("2025-01-20", 200)).unwrap();
        let c = service.create(input("2025-01-10", 300)).unwrap();

        let listed = service.list(&ExpenseFilter::default()).unwrap();
        let ids: Vec<_> = listed.iter().map(|e| e.id).collect();
        // c and a share a date; c was created later
        assert_eq!(ids, vec![b.id, c.id, a.id]);
        assert_eq!(listed[0], b);
    }

    #[test]
    fn test_list_returns_every_created_record() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);

        let mut created = Vec::new();
        for day in 1..=5 {
            let mut i = input(&format!("2025-03-0{}", day), 100 * day);
            if day % 2 == 0 {
                i.category = Category::Social;
                i.subcategory = "cafe".into();
                i.memo = Some(format!("coffee {}", day));
                i.satisfaction = Some(day as u8);
            }
            created.push(service.create(i).unwrap());
        }

        let listed = service.list(&ExpenseFilter::default()).unwrap();
        assert_eq!(listed.len(), 5);
        created.reverse();
        assert_eq!(listed, created);
    }

    #[test]
    fn test_list_filters() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);

        service.create(input("2025-01-01", 100)).unwrap();
        service.create(input("2025-01-15", 200)).unwrap();
        service.create(input("2025-01-31", 300)).unwrap();
        let mut social = input("2025-01-15", 400);
        social.category = Category::Social;
        social.subcategory = "gift".into();
        service.create(social).unwrap();

        let range = service
            .list(&ExpenseFilter::between(date(2025, 1, 1), date(2025, 1, 15)))
            .unwrap();
        assert_eq!(range.len(), 3);

        let filter = ExpenseFilter {
            category: Some(Category::Transport),
            start_date: Some(date(2025, 1, 15)),
            ..Default::default()
        };
        let amounts: Vec<_> = service.list(&filter).unwrap().iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![300, 200]);

        let filter = ExpenseFilter {
            subcategory: Some("gift".into()),
            ..Default::default()
        };
        assert_eq!(service.list(&filter).unwrap().len(), 1);
    }

    #[test]
    fn test_frequent_amounts_window() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);
        let today = date(2025, 6, 30);

        service.create(input("2025-06-01", 1000)).unwrap();
        service.create(input("2025-06-20", 1000)).unwrap();
        service.create(input("2025-05-01", 2000)).unwrap();
        // 100 days before today
        service.create(input("2025-03-22", 5000)).unwrap();

        let frequent = service.get_frequent_amounts_at(today).unwrap();
        assert_eq!(
            frequent,
            vec![
                FrequentAmount { amount: 1000, count: 2 },
                FrequentAmount { amount: 2000, count: 1 },
            ]
        );
    }

    #[test]
    fn test_frequent_amounts_window_edges() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);
        let today = date(2025, 6, 30);

        // 89 days back is inside, 90 days back is outside
        service.create(input("2025-04-02", 111)).unwrap();
        service.create(input("2025-04-01", 222)).unwrap();

        let frequent = service.get_frequent_amounts_at(today).unwrap();
        assert_eq!(frequent, vec![FrequentAmount { amount: 111, count: 1 }]);
    }

    #[test]
    fn test_frequent_amounts_limit_and_tie_order() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);
        let today = date(2025, 6, 30);

        for amount in [600, 500, 400, 300, 200, 100] {
            service.create(input("2025-06-29", amount)).unwrap();
        }

        let frequent = service.get_frequent_amounts_at(today).unwrap();
        assert_eq!(frequent.len(), 5);
        let amounts: Vec<_> = frequent.iter().map(|f| f.amount).collect();
        assert_eq!(amounts, vec![600, 500, 400, 300, 200]);
    }

    #[test]
    fn test_frequent_amounts_empty() {
        let storage = StorageAdapter::in_memory();
        let service = ExpenseService::new(&storage);
        assert!(service.get_frequent_amounts().unwrap().is_empty());
    }
}
