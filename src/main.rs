use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spendlog::cli::{
    handle_expense_command, handle_export_command, handle_import, handle_report_command,
    handle_reset, handle_template_command, ExpenseCommands, ExportCommands, ReportCommands,
    TemplateCommands,
};
use spendlog::config::paths::{SpendPaths, DATA_DIR_ENV};
use spendlog::services::{ExpenseService, SettingsService, TemplateService};
use spendlog::storage::StorageAdapter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "SPENDLOG_LOG";

#[derive(Parser)]
#[command(
    name = "spendlog",
    author = "Kaylee Beyene",
    version,
    about = "Track transport and social spending from the terminal",
    long_about = "spendlog records transport and social expenses, remembers your \
                  usual entries as templates, and reports where the money went: \
                  category totals, satisfaction, and week-over-week trends."
)]
struct Cli {
    /// Directory holding spendlog data
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record and browse expenses
    #[command(subcommand, alias = "e")]
    Expense(ExpenseCommands),

    /// Manage quick-entry templates
    #[command(subcommand, alias = "t")]
    Template(TemplateCommands),

    /// Period reports and insights
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export expenses or a full backup
    #[command(subcommand)]
    Export(ExportCommands),

    /// Replace all data with a JSON or YAML backup
    Import {
        /// Backup file to restore
        file: PathBuf,
    },

    /// Delete all data
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show data location and settings
    Config,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => SpendPaths::with_base_dir(dir),
        None => SpendPaths::new()?,
    };
    let storage = StorageAdapter::open(&paths)?;
    tracing::debug!(data_dir = %paths.data_dir().display(), "storage opened");

    match cli.command {
        Some(Commands::Expense(cmd)) => handle_expense_command(&storage, cmd)?,
        Some(Commands::Template(cmd)) => handle_template_command(&storage, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, cmd)?,
        Some(Commands::Import { file }) => handle_import(&storage, &file)?,
        Some(Commands::Reset { yes }) => handle_reset(&storage, yes)?,
        Some(Commands::Config) => {
            let settings = SettingsService::new(&storage).get_settings()?;
            println!("spendlog configuration");
            println!("======================");
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Expenses:         {}", ExpenseService::new(&storage).count()?);
            println!("Templates:        {}", TemplateService::new(&storage).list()?.len());
            println!();
            println!("Settings:");
            println!(
                "  Last used:             {} / {}",
                settings.last_used_category.code(),
                settings.last_used_subcategory
            );
            if !settings.last_used_memo.is_empty() {
                println!("  Last memo:             {}", settings.last_used_memo);
            }
            println!(
                "  Frequent amounts:      top {} over {} days",
                settings.frequent_amount_limit, settings.frequent_amount_window_days
            );
            println!("  Week starts on:        Monday");
            println!("  Schema version:        {}", settings.schema_version);
        }
        None => {
            println!("spendlog - transport and social expense tracker");
            println!();
            println!("Run 'spendlog --help' for usage information.");
            println!("Run 'spendlog expense add <amount>' to record your first expense.");
        }
    }

    Ok(())
}
