//! Expense CLI commands
//!
//! Implements CLI commands for recording and browsing expenses.

use clap::Subcommand;

use crate::display::{format_expense_details, format_expense_list, format_frequent_amounts};
use crate::error::{SpendError, SpendResult};
use crate::models::{Category, ExpenseFilter, ExpenseId, ExpenseInput, ExpenseUpdate};
use crate::services::{ExpenseService, SettingsService};
use crate::storage::StorageAdapter;

use super::{resolve_id, PeriodArgs};

/// Expense subcommands
#[derive(Subcommand, Debug)]
pub enum ExpenseCommands {
    /// Record a new expense
    Add {
        /// Amount in whole currency units
        amount: i64,
        /// Category (transport or social); defaults to the last one used
        #[arg(short, long)]
        category: Option<Category>,
        /// Subcategory code, e.g. train or cafe
        #[arg(short, long)]
        subcategory: Option<String>,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Memo
        #[arg(short, long)]
        memo: Option<String>,
        /// How worthwhile it felt, 1-5
        #[arg(long)]
        satisfaction: Option<u8>,
    },
    /// List expenses, newest first
    List {
        #[command(flatten)]
        period: PeriodArgs,
        /// List every expense regardless of date
        #[arg(long, conflicts_with_all = ["month", "from", "to"])]
        all: bool,
        /// Filter by category
        #[arg(short, long)]
        category: Option<Category>,
        /// Filter by subcategory code
        #[arg(short, long)]
        subcategory: Option<String>,
        /// Maximum number of rows to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show expense details
    Show {
        /// Expense ID or unique prefix
        id: String,
    },
    /// Edit an expense
    Edit {
        /// Expense ID or unique prefix
        id: String,
        /// New amount
        #[arg(short, long)]
        amount: Option<i64>,
        /// New category
        #[arg(short, long)]
        category: Option<Category>,
        /// New subcategory
        #[arg(short, long)]
        subcategory: Option<String>,
        /// New date
        #[arg(short, long)]
        date: Option<String>,
        /// New memo
        #[arg(short, long, conflicts_with = "clear_memo")]
        memo: Option<String>,
        /// Remove the memo
        #[arg(long)]
        clear_memo: bool,
        /// New satisfaction rating
        #[arg(long, conflicts_with = "clear_satisfaction")]
        satisfaction: Option<u8>,
        /// Remove the satisfaction rating
        #[arg(long)]
        clear_satisfaction: bool,
    },
    /// Delete an expense
    Delete {
        /// Expense ID or unique prefix
        id: String,
    },
    /// Show the most common amounts of the last 90 days
    Frequent,
}

/// Find an expense ID from a full UUID or a unique prefix
fn resolve_expense(service: &ExpenseService, reference: &str) -> SpendResult<ExpenseId> {
    let ids: Vec<ExpenseId> = service
        .list(&ExpenseFilter::default())?
        .iter()
        .map(|e| e.id)
        .collect();
    resolve_id(reference, &ids, SpendError::expense_not_found)
}

/// Pick category and subcategory for a new expense
///
/// Explicit values win. A lone subcategory implies its category; a lone
/// category keeps the last-used subcategory when it fits, else its first one.
fn choose_classification(
    settings: &SettingsService,
    category: Option<Category>,
    subcategory: Option<String>,
) -> SpendResult<(Category, String)> {
    match (category, subcategory) {
        (Some(category), Some(subcategory)) => Ok((category, subcategory)),
        (None, Some(subcategory)) => {
            let category = Category::owning(&subcategory).ok_or_else(|| {
                SpendError::validation(
                    "subcategory",
                    format!("unknown subcategory '{}'", subcategory),
                )
            })?;
            Ok((category, subcategory))
        }
        (Some(category), None) => {
            let last = settings.get_last_used()?;
            if category.allows(&last.subcategory) {
                Ok((category, last.subcategory))
            } else {
                Ok((category, category.default_subcategory().to_string()))
            }
        }
        (None, None) => {
            let last = settings.get_last_used()?;
            Ok((last.category, last.subcategory))
        }
    }
}

/// Handle an expense command
pub fn handle_expense_command(storage: &StorageAdapter, cmd: ExpenseCommands) -> SpendResult<()> {
    let settings = SettingsService::new(storage);
    let service = ExpenseService::with_settings(storage, settings);

    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            subcategory,
            date,
            memo,
            satisfaction,
        } => {
            let (category, subcategory) = choose_classification(&settings, category, subcategory)?;
            let date = match date {
                Some(d) => d,
                None => chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
            };

            let expense = service.create(ExpenseInput {
                date,
                amount,
                category,
                subcategory,
                memo,
                satisfaction,
            })?;

            println!("Recorded expense:");
            print!("{}", format_expense_details(&expense));
        }

        ExpenseCommands::List {
            period,
            all,
            category,
            subcategory,
            limit,
        } => {
            let mut filter = ExpenseFilter {
                category,
                subcategory,
                ..Default::default()
            };
            if !all {
                let period = period.resolve()?;
                filter.start_date = Some(period.start_date);
                filter.end_date = Some(period.end_date);
            }

            let mut expenses = service.list(&filter)?;
            if let Some(limit) = limit {
                expenses.truncate(limit);
            }
            println!("{}", format_expense_list(&expenses));
        }

        ExpenseCommands::Show { id } => {
            let id = resolve_expense(&service, &id)?;
            print!("{}", format_expense_details(&service.get_by_id(id)?));
        }

        ExpenseCommands::Edit {
            id,
            amount,
            category,
            subcategory,
            date,
            memo,
            clear_memo,
            satisfaction,
            clear_satisfaction,
        } => {
            let id = resolve_expense(&service, &id)?;

            let update = ExpenseUpdate {
                date,
                amount,
                category,
                subcategory,
                memo: if clear_memo { Some(None) } else { memo.map(Some) },
                satisfaction: if clear_satisfaction {
                    Some(None)
                } else {
                    satisfaction.map(Some)
                },
            };

            if update.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }

            let updated = service.update(id, &update)?;
            println!("Updated expense:");
            print!("{}", format_expense_details(&updated));
        }

        ExpenseCommands::Delete { id } => {
            let id = resolve_expense(&service, &id)?;
            let removed = service.delete(id)?;
            println!(
                "Deleted expense {} ({} on {})",
                removed.id.short(),
                removed.amount,
                removed.date
            );
        }

        ExpenseCommands::Frequent => {
            let amounts = service.get_frequent_amounts()?;
            println!("{}", format_frequent_amounts(&amounts));
        }
    }

    Ok(())
}
