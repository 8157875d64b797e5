//! Template display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{subcategory_label, Template};

use super::format_amount;

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "#")]
    order: u32,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Memo")]
    memo: String,
}

/// Format templates in their sort order
pub fn format_template_list(templates: &[Template]) -> String {
    if templates.is_empty() {
        return "No templates found.".to_string();
    }

    let rows: Vec<TemplateRow> = templates
        .iter()
        .map(|t| TemplateRow {
            order: t.sort_order,
            id: t.id.short(),
            name: t.name.clone(),
            category: format!("{} / {}", t.category, subcategory_label(&t.subcategory)),
            amount: t.amount.map(format_amount).unwrap_or_else(|| "-".to_string()),
            memo: t.memo_template.clone().unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

/// Format template details for display
pub fn format_template_details(template: &Template) -> String {
    let mut output = String::new();

    output.push_str(&format!("Template: {}\n", template.id));
    output.push_str(&format!("Name:     {}\n", template.name));
    output.push_str(&format!(
        "Category: {} / {}\n",
        template.category,
        subcategory_label(&template.subcategory)
    ));
    match template.amount {
        Some(amount) => output.push_str(&format!("Amount:   {}\n", format_amount(amount))),
        None => output.push_str("Amount:   (entered on use)\n"),
    }
    if let Some(memo) = &template.memo_template {
        output.push_str(&format!("Memo:     {}\n", memo));
    }
    output.push_str(&format!("Position: {}\n", template.sort_order));

    output
}
