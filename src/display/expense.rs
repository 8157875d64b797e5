//! Expense display formatting
//!
//! Table view for expense lists and a detail view for a single expense.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{subcategory_label, Expense, FrequentAmount};

use super::{format_amount, truncate};

const MEMO_WIDTH: usize = 30;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Subcategory")]
    subcategory: String,
    #[tabled(rename = "Sat.")]
    satisfaction: String,
    #[tabled(rename = "Memo")]
    memo: String,
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.short(),
            date: expense.date.format("%Y-%m-%d").to_string(),
            amount: format_amount(expense.amount),
            category: expense.category.to_string(),
            subcategory: subcategory_label(&expense.subcategory).to_string(),
            satisfaction: expense
                .satisfaction
                .map(|s| s.to_string())
                .unwrap_or_default(),
            memo: expense
                .memo
                .as_deref()
                .map(|m| truncate(m, MEMO_WIDTH))
                .unwrap_or_default(),
        }
    }
}

/// Format a list of expenses as a table with a total line
pub fn format_expense_list(expenses: &[Expense]) -> String {
    if expenses.is_empty() {
        return "No expenses found.".to_string();
    }

    let rows: Vec<ExpenseRow> = expenses.iter().map(ExpenseRow::from).collect();
    let total = expenses.iter().fold(0i64, |acc, e| acc.saturating_add(e.amount));

    let mut table = Table::new(rows);
    table.with(Style::sharp());

    format!(
        "{}\n{} expense(s), total {}",
        table,
        expenses.len(),
        format_amount(total)
    )
}

/// Format expense details for display
pub fn format_expense_details(expense: &Expense) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:      {}\n", expense.id));
    output.push_str(&format!("Date:         {}\n", expense.date.format("%Y-%m-%d")));
    output.push_str(&format!("Amount:       {}\n", format_amount(expense.amount)));
    output.push_str(&format!(
        "Category:     {} / {}\n",
        expense.category,
        subcategory_label(&expense.subcategory)
    ));

    if let Some(memo) = &expense.memo {
        output.push_str(&format!("Memo:         {}\n", memo));
    }
    if let Some(satisfaction) = expense.satisfaction {
        output.push_str(&format!(
            "Satisfaction: {} {}\n",
            satisfaction,
            "★".repeat(satisfaction as usize)
        ));
    }

    output.push_str(&format!(
        "Created:      {}\n",
        expense.created_at.format("%Y-%m-%d %H:%M")
    ));
    if expense.updated_at != expense.created_at {
        output.push_str(&format!(
            "Updated:      {}\n",
            expense.updated_at.format("%Y-%m-%d %H:%M")
        ));
    }

    output
}

/// Format frequent amounts as a short ranked list
pub fn format_frequent_amounts(amounts: &[FrequentAmount]) -> String {
    if amounts.is_empty() {
        return "No expenses in the last 90 days.".to_string();
    }

    let mut output = String::from("Frequent amounts (last 90 days):\n");
    for (i, entry) in amounts.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {:>10}  x{}\n",
            i + 1,
            format_amount(entry.amount),
            entry.count
        ));
    }
    output
}
