//! Display formatting for terminal output
//!
//! Turns models and report results into text for the CLI. Lists render as
//! `tabled` tables, single records and reports as aligned text.

pub mod expense;
pub mod report;
pub mod template;

pub use expense::{format_expense_details, format_expense_list, format_frequent_amounts};
pub use report::{format_breakdown, format_category_summary, format_insights, format_satisfaction};
pub use template::{format_template_details, format_template_list};

/// Format a whole-unit amount with thousands separators
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Truncate a string to a maximum number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".chars().take(max_len).collect()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
