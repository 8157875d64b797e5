//! Template CLI commands
//!
//! Templates are referenced by name (case-insensitive) or by ID prefix.

use clap::Subcommand;

use crate::display::{format_expense_details, format_template_details, format_template_list};
use crate::error::{SpendError, SpendResult};
use crate::models::{Category, TemplateId, TemplateInput, TemplateUpdate};
use crate::services::{ExpenseService, SettingsService, TemplateService};
use crate::storage::StorageAdapter;

use super::{parse_date, resolve_id};

/// Template subcommands
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Create a template
    Add {
        /// Display name
        name: String,
        /// Category (transport or social)
        #[arg(short, long)]
        category: Category,
        /// Subcategory code; defaults to the category's first
        #[arg(short, long)]
        subcategory: Option<String>,
        /// Preset amount
        #[arg(short, long)]
        amount: Option<i64>,
        /// Preset memo
        #[arg(short, long)]
        memo: Option<String>,
    },
    /// List templates in order
    List,
    /// Show template details
    Show {
        /// Template name or ID
        template: String,
    },
    /// Edit a template
    Edit {
        /// Template name or ID
        template: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<Category>,
        /// New subcategory
        #[arg(short, long)]
        subcategory: Option<String>,
        /// New preset amount
        #[arg(short, long, conflicts_with = "clear_amount")]
        amount: Option<i64>,
        /// Remove the preset amount
        #[arg(long)]
        clear_amount: bool,
        /// New preset memo
        #[arg(short, long, conflicts_with = "clear_memo")]
        memo: Option<String>,
        /// Remove the preset memo
        #[arg(long)]
        clear_memo: bool,
    },
    /// Delete a template
    Delete {
        /// Template name or ID
        template: String,
    },
    /// Set the template order; every template must be listed once
    Reorder {
        /// Template names or IDs, first to last
        #[arg(required = true)]
        templates: Vec<String>,
    },
    /// Record an expense from a template
    Use {
        /// Template name or ID
        template: String,
        /// Amount, required when the template has none
        #[arg(short, long)]
        amount: Option<i64>,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Memo, replacing the template's
        #[arg(short, long)]
        memo: Option<String>,
        /// How worthwhile it felt, 1-5
        #[arg(long)]
        satisfaction: Option<u8>,
    },
}

/// Find a template by exact name (case-insensitive), full ID, or ID prefix
fn resolve_template(service: &TemplateService, reference: &str) -> SpendResult<TemplateId> {
    let templates = service.list()?;

    let wanted = reference.trim().to_lowercase();
    if let Some(t) = templates.iter().find(|t| t.name.to_lowercase() == wanted) {
        return Ok(t.id);
    }

    let ids: Vec<TemplateId> = templates.iter().map(|t| t.id).collect();
    resolve_id(reference, &ids, SpendError::template_not_found)
}

/// Handle a template command
pub fn handle_template_command(storage: &StorageAdapter, cmd: TemplateCommands) -> SpendResult<()> {
    let service = TemplateService::new(storage);

    match cmd {
        TemplateCommands::Add {
            name,
            category,
            subcategory,
            amount,
            memo,
        } => {
            let template = service.create(TemplateInput {
                name,
                category,
                subcategory: subcategory
                    .unwrap_or_else(|| category.default_subcategory().to_string()),
                amount,
                memo_template: memo,
            })?;
            println!("Created template:");
            print!("{}", format_template_details(&template));
        }

        TemplateCommands::List => {
            println!("{}", format_template_list(&service.list()?));
        }

        TemplateCommands::Show { template } => {
            let id = resolve_template(&service, &template)?;
            print!("{}", format_template_details(&service.get_by_id(id)?));
        }

        TemplateCommands::Edit {
            template,
            name,
            category,
            subcategory,
            amount,
            clear_amount,
            memo,
            clear_memo,
        } => {
            let id = resolve_template(&service, &template)?;
            let update = TemplateUpdate {
                name,
                category,
                subcategory,
                amount: if clear_amount { Some(None) } else { amount.map(Some) },
                memo_template: if clear_memo { Some(None) } else { memo.map(Some) },
            };
            let updated = service.update(id, &update)?;
            println!("Updated template:");
            print!("{}", format_template_details(&updated));
        }

        TemplateCommands::Delete { template } => {
            let id = resolve_template(&service, &template)?;
            let removed = service.delete(id)?;
            println!("Deleted template '{}'", removed.name);
        }

        TemplateCommands::Reorder { templates } => {
            let ids = templates
                .iter()
                .map(|t| resolve_template(&service, t))
                .collect::<SpendResult<Vec<_>>>()?;
            let reordered = service.reorder(&ids)?;
            println!("{}", format_template_list(&reordered));
        }

        TemplateCommands::Use {
            template,
            amount,
            date,
            memo,
            satisfaction,
        } => {
            let id = resolve_template(&service, &template)?;
            let template = service.get_by_id(id)?;

            let date = match date {
                Some(d) => parse_date("date", &d)?,
                None => chrono::Local::now().date_naive(),
            };

            let mut input = template.to_expense_input(date);
            if let Some(amount) = amount {
                input.amount = amount;
            }
            if memo.is_some() {
                input.memo = memo;
            }
            input.satisfaction = satisfaction;

            let expenses = ExpenseService::with_settings(storage, SettingsService::new(storage));
            let expense = expenses.create(input)?;
            println!("Recorded expense from '{}':", template.name);
            print!("{}", format_expense_details(&expense));
        }
    }

    Ok(())
}
