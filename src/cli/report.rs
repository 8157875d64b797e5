//! Report CLI commands

use clap::Subcommand;
use serde::Serialize;

use crate::display::{
    format_breakdown, format_category_summary, format_insights, format_satisfaction,
};
use crate::error::{SpendError, SpendResult};
use crate::models::Category;
use crate::services::AggregationService;
use crate::storage::StorageAdapter;

use super::PeriodArgs;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Totals per category
    Summary {
        #[command(flatten)]
        period: PeriodArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Spending per subcategory
    Breakdown {
        #[command(flatten)]
        period: PeriodArgs,
        /// Only break down this category
        #[arg(short, long)]
        category: Option<Category>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Satisfaction average, distribution and trend
    Satisfaction {
        #[command(flatten)]
        period: PeriodArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Taxi ratio, busiest social days, weekly comparison, spending bias
    Insights {
        #[command(flatten)]
        period: PeriodArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> SpendResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| SpendError::Export(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

/// Handle a report command
pub fn handle_report_command(storage: &StorageAdapter, cmd: ReportCommands) -> SpendResult<()> {
    let service = AggregationService::new(storage);

    match cmd {
        ReportCommands::Summary { period, json } => {
            let period = period.resolve()?;
            let summary = service.get_category_summary(period)?;
            if json {
                print_json(&summary)?;
            } else {
                print!("{}", format_category_summary(period, &summary));
            }
        }
        ReportCommands::Breakdown {
            period,
            category,
            json,
        } => {
            let period = period.resolve()?;
            let breakdown = service.get_subcategory_breakdown(period, category)?;
            if json {
                print_json(&breakdown)?;
            } else {
                print!("{}", format_breakdown(period, &breakdown));
            }
        }
        ReportCommands::Satisfaction { period, json } => {
            let period = period.resolve()?;
            let stats = service.get_satisfaction_stats(period)?;
            if json {
                print_json(&stats)?;
            } else {
                print!("{}", format_satisfaction(period, &stats));
            }
        }
        ReportCommands::Insights { period, json } => {
            let period = period.resolve()?;
            let insights = service.get_insights(period)?;
            if json {
                print_json(&insights)?;
            } else {
                print!("{}", format_insights(period, &insights));
            }
        }
    }

    Ok(())
}
