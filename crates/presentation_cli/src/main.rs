//! HR meeting planner CLI
//!
//! Plans a contract review and a salary review for every employee listed in
//! the contract files of the input directory and mails the invitations.

#![allow(clippy::print_stdout)]

mod console;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use application::{
    BatchReport, BatchService, ConfirmationPort, ContractSourcePort, InputUnit, PlannedRow,
    UnitOutcome,
};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use domain::{CONTRACT_DATE_FORMAT, RandomSource, ScheduleEngine};
use infrastructure::{
    AppConfig, FilesystemContractSource, IcsCalendarAdapter, SmtpNotificationAdapter,
    StdRandomSource, TemplateEngine,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::{AutoConfirm, ConsoleConfirmation};

/// HR meeting planner
#[derive(Debug, Parser)]
#[command(name = "meeting-planner")]
#[command(author, version, about = "Plans HR contract and salary reviews from contract files", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: config.toml in the working directory)
    #[arg(short, long, global = true, env = "MEETING_PLANNER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Process every unprocessed contract file
    ///
    /// Each file is shown as a table and sent only after confirmation.
    /// Example: meeting-planner run --dir ./files/csv
    Run {
        /// Input directory (overrides the configuration)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Confirm every file without asking
        #[arg(short, long)]
        yes: bool,

        /// Seed for reproducible meeting slots
        #[arg(long)]
        seed: Option<u64>,

        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the meetings that would be planned for one file
    ///
    /// Nothing is sent and the file is not renamed.
    Preview {
        /// Contract file
        file: PathBuf,

        /// Seed for reproducible meeting slots
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Check that the SMTP relay is reachable
    CheckSmtp,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `DD-MM-YYYY HH:MM`
fn format_slot(slot: NaiveDateTime) -> String {
    slot.format(&format!("{CONTRACT_DATE_FORMAT} %H:%M"))
        .to_string()
}

fn describe_outcome(outcome: &UnitOutcome) -> String {
    match outcome {
        UnitOutcome::Processed {
            dispatched,
            skipped: 0,
        } => format!("✅ processed, {dispatched} sent"),
        UnitOutcome::Processed {
            dispatched,
            skipped,
        } => format!("✅ processed, {dispatched} sent, {skipped} row(s) skipped"),
        UnitOutcome::Rejected => "⏸️  rejected, please check the file".to_string(),
        UnitOutcome::Failed { reason } => format!("❌ {reason}"),
    }
}

fn build_service(
    config: &AppConfig,
    source: Arc<dyn ContractSourcePort>,
    confirmation: Arc<dyn ConfirmationPort>,
    seed: Option<u64>,
) -> anyhow::Result<BatchService> {
    let templates =
        TemplateEngine::with_config(config.templates.clone()).context("loading templates")?;
    let notifier = SmtpNotificationAdapter::new(config.smtp.to_smtp_config(), templates)
        .with_subject(&config.meetings.subject);
    let settings = config.meetings.meeting_settings()?;
    let random: Box<dyn RandomSource + Send> = Box::new(StdRandomSource::from_seed(seed));

    Ok(BatchService::new(
        source,
        confirmation,
        Arc::new(IcsCalendarAdapter::new(config.meetings.ics_exporter())),
        Arc::new(notifier),
        random,
    )
    .with_engine(ScheduleEngine::new(config.meetings.schedule_rules()))
    .with_settings(settings))
}

fn print_report(report: &BatchReport) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(["File", "Result"]);
    for unit in &report.units {
        table.add_row([unit.name.clone(), describe_outcome(&unit.outcome)]);
    }

    println!("{table}");
    println!(
        "📬 {} invitation(s) sent, {} file(s) processed, {} file(s) left for a later run",
        report.notifications_sent,
        report.processed(),
        report.pending()
    );
}

fn print_preview(name: &str, rows: &[PlannedRow]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header([
        "Line",
        "Employee",
        "Contract review",
        "Salary review",
    ]);

    for row in rows {
        let (contract, salary) = match &row.schedule {
            Ok(schedule) => (
                format_slot(schedule.contract_meeting),
                format_slot(schedule.salary_meeting),
            ),
            Err(e) => (format!("⚠️  {e}"), String::new()),
        };
        table.add_row([
            row.line.to_string(),
            row.employee_name.clone(),
            contract,
            salary,
        ]);
    }

    println!("📄 {name}");
    println!("{table}");
}

async fn run(
    config: &AppConfig,
    directory: PathBuf,
    yes: bool,
    seed: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let source = Arc::new(FilesystemContractSource::new(
        directory,
        config.input.processed_prefix.clone(),
    ));

    let units = source.discover().await?;
    if units.is_empty() {
        println!("📭 No files to process in {}", source.directory().display());
        return Ok(());
    }

    config
        .smtp
        .to_smtp_config()
        .validate()
        .context("SMTP configuration is incomplete")?;

    let confirmation: Arc<dyn ConfirmationPort> = if yes {
        Arc::new(AutoConfirm)
    } else {
        Arc::new(ConsoleConfirmation)
    };
    let service = build_service(config, source, confirmation, seed)?;
    let report = service.process(units).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

async fn preview(config: &AppConfig, file: &Path, seed: Option<u64>) -> anyhow::Result<()> {
    let name = file
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("not a file: {}", file.display()))?;
    let directory = file.parent().unwrap_or_else(|| Path::new("."));

    let source = Arc::new(FilesystemContractSource::new(
        directory,
        config.input.processed_prefix.clone(),
    ));
    let service = build_service(config, source, Arc::new(AutoConfirm), seed)?;
    let rows = service.preview(&InputUnit::new(name, file)).await?;

    print_preview(name, &rows);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter_from_verbosity(cli.verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    info!(config = ?cli.config, "Configuration ready");

    match cli.command {
        Commands::Run {
            dir,
            yes,
            seed,
            json,
        } => {
            let directory = dir.unwrap_or_else(|| config.input.directory.clone());
            run(&config, directory, yes, seed, json).await?;
        },

        Commands::Preview { file, seed } => {
            preview(&config, &file, seed).await?;
        },

        Commands::CheckSmtp => {
            let source = Arc::new(FilesystemContractSource::new(
                config.input.directory.clone(),
                config.input.processed_prefix.clone(),
            ));
            let service = build_service(&config, source, Arc::new(AutoConfirm), None)?;
            let target = format!("{}:{}", config.smtp.host, config.smtp.port);

            if service.delivery_available().await {
                println!("✅ SMTP relay {target} is reachable");
            } else {
                println!("❌ SMTP relay {target} is not reachable");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
