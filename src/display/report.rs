//! Report formatting for terminal output
//!
//! Renders the aggregation results as plain text blocks with simple bars.

use crate::models::{subcategory_label, AggregationPeriod};
use crate::services::{CategorySummary, Insights, SatisfactionStats, SubcategorySummary};

use super::format_amount;

const BAR_WIDTH: usize = 20;
const REPORT_WIDTH: usize = 48;

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if pct < 0.1 && pct > 0.0 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Create a simple bar chart representation
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

fn title(name: &str, period: AggregationPeriod) -> String {
    format!("{} ({})\n{}\n", name, period, separator(REPORT_WIDTH))
}

/// Category totals
pub fn format_category_summary(period: AggregationPeriod, summary: &CategorySummary) -> String {
    let mut output = title("Spending by category", period);
    output.push_str(&format!("{:<12} {:>12}\n", "Transport", format_amount(summary.transport)));
    output.push_str(&format!("{:<12} {:>12}\n", "Social", format_amount(summary.social)));
    output.push_str(&format!("{:<12} {:>12}\n", "", "-".repeat(12)));
    output.push_str(&format!("{:<12} {:>12}\n", "Total", format_amount(summary.total)));
    output
}

/// Subcategory breakdown with bars scaled to the largest group
pub fn format_breakdown(period: AggregationPeriod, breakdown: &[SubcategorySummary]) -> String {
    let mut output = title("Breakdown by subcategory", period);
    if breakdown.is_empty() {
        output.push_str("No expenses in this period.\n");
        return output;
    }

    let max = breakdown.iter().map(|b| b.amount).max().unwrap_or(0) as f64;
    for row in breakdown {
        output.push_str(&format!(
            "{:<16} {:>10} {:>7} {}\n",
            subcategory_label(&row.subcategory),
            format_amount(row.amount),
            format_percentage(row.percentage),
            format_bar(row.amount as f64, max, BAR_WIDTH)
        ));
    }
    output
}

/// Satisfaction average, distribution and daily trend
pub fn format_satisfaction(period: AggregationPeriod, stats: &SatisfactionStats) -> String {
    let mut output = title("Satisfaction", period);

    let Some(average) = stats.average else {
        output.push_str("No rated expenses in this period.\n");
        return output;
    };

    output.push_str(&format!("Average: {:.2} / 5\n\n", average));

    let max = stats.distribution.values().copied().max().unwrap_or(0) as f64;
    for (level, count) in &stats.distribution {
        output.push_str(&format!(
            "  {} {} {}\n",
            level,
            format_bar(*count as f64, max, BAR_WIDTH),
            count
        ));
    }

    output.push_str("\nBy day:\n");
    for day in &stats.trend {
        output.push_str(&format!("  {}  {:.2}\n", day.date, day.average));
    }
    output
}

/// The derived insight metrics
pub fn format_insights(period: AggregationPeriod, insights: &Insights) -> String {
    let mut output = title("Insights", period);

    match insights.taxi_ratio {
        Some(ratio) => output.push_str(&format!(
            "Taxi share of transport: {}\n",
            format_percentage(ratio)
        )),
        None => output.push_str("Taxi share of transport: n/a\n"),
    }

    output.push_str("\nTop social days:\n");
    if insights.top_social_days.is_empty() {
        output.push_str("  (none)\n");
    }
    for (i, day) in insights.top_social_days.iter().enumerate() {
        output.push_str(&format!("  {}. {}  {:>10}\n", i + 1, day.date, format_amount(day.amount)));
    }

    let weekly = &insights.weekly_comparison;
    let sign = if weekly.change > 0 { "+" } else { "" };
    output.push_str(&format!(
        "\nAverage per expense: this week {}, last week {} ({}{})\n",
        format_amount(weekly.this_week),
        format_amount(weekly.last_week),
        sign,
        format_amount(weekly.change)
    ));

    output.push_str("\nWhere the money went:\n");
    if insights.category_bias.is_empty() {
        output.push_str("  (nothing spent)\n");
    }
    for share in &insights.category_bias {
        output.push_str(&format!(
            "  {:<16} {:>7} {}\n",
            subcategory_label(&share.subcategory),
            format_percentage(share.percentage),
            format_bar(share.percentage, 100.0, BAR_WIDTH)
        ));
    }
    output
}
