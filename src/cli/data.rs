//! CLI commands for export, restore and reset

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::error::{SpendError, SpendResult};
use crate::export;
use crate::storage::StorageAdapter;

use super::PeriodArgs;

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Expenses in a period as CSV
    Csv {
        #[command(flatten)]
        period: PeriodArgs,
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Full backup as JSON
    Json {
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write compact JSON on one line
        #[arg(long)]
        compact: bool,
    },
    /// Full backup as YAML
    Yaml {
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Open the output target, stdout when no path is given
fn open_output(output: &Option<PathBuf>) -> SpendResult<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                SpendError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn report_written(output: &Option<PathBuf>, what: &str) {
    if let Some(path) = output {
        println!("{} exported to: {}", what, path.display());
    }
}

/// Handle export commands
pub fn handle_export_command(storage: &StorageAdapter, cmd: ExportCommands) -> SpendResult<()> {
    match cmd {
        ExportCommands::Csv { period, output } => {
            let period = period.resolve()?;
            let csv = export::export_csv(storage, period)?;
            let mut writer = open_output(&output)?;
            writer.write_all(csv.as_bytes())?;
            writer.flush()?;
            report_written(&output, "Expenses");
        }
        ExportCommands::Json { output, compact } => {
            let mut writer = open_output(&output)?;
            export::write_json(storage, &mut writer, !compact)?;
            writeln!(writer)?;
            writer.flush()?;
            report_written(&output, "Backup");
        }
        ExportCommands::Yaml { output } => {
            let mut writer = open_output(&output)?;
            export::export_yaml(storage, &mut writer)?;
            writer.flush()?;
            report_written(&output, "Backup");
        }
    }
    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref(),
        Some("yaml") | Some("yml")
    )
}

/// Replace all data with the contents of a backup file
pub fn handle_import(storage: &StorageAdapter, file: &Path) -> SpendResult<()> {
    let text = fs::read_to_string(file)
        .map_err(|e| SpendError::Io(format!("Failed to read {}: {}", file.display(), e)))?;

    let backup = if is_yaml(file) {
        export::parse_backup_yaml(storage, &text)?
    } else {
        export::parse_backup(storage, &text)?
    };

    export::import_json(storage, &backup)?;
    println!(
        "Restored {} expense(s) and {} template(s) from {}",
        backup.expenses.len(),
        backup.templates.len(),
        file.display()
    );
    Ok(())
}

/// Delete all data, only when confirmed
pub fn handle_reset(storage: &StorageAdapter, confirmed: bool) -> SpendResult<()> {
    if !confirmed {
        println!("This deletes every expense, template and setting.");
        println!("Run again with --yes to confirm.");
        return Ok(());
    }

    export::delete_all(storage)?;
    println!("All data deleted.");
    Ok(())
}
