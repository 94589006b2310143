//! backroll - grandfather-father-son backup rotation.
//!
//! Usage:
//!   backroll                        Roll the current directory
//!   backroll -s /srv/backups -n     Show what a run would do
//!   backroll --weekdays 6 7         Keep Saturdays and Sundays weekly
//!   backroll --monthdays            Disable the monthly tier
//!   backroll --help                 Show help

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use backroll_core::{RollConfig, RollError, retention_count};
use backroll_ops::{Orchestrator, RunReport, TierReport, TracingReporter};
use backroll_policy::Weekdays;
use backroll_scan::LocalFs;

#[derive(Parser)]
#[command(
    name = "backroll",
    version,
    about = "Rotate backups into daily, weekly and monthly tiers",
    long_about = "backroll copies fresh backups from a workspace directory into \
                  daily, weekly and monthly store directories, then deletes \
                  store files that fell out of their retention window.\n\n\
                  A backup belongs to the day of its modification time shifted \
                  by --offset-hours, so a dump written shortly after midnight \
                  still counts for the previous day."
)]
struct Cli {
    /// Workspace directory holding fresh backups
    #[arg(short = 's', long, value_name = "DIR", default_value = ".")]
    workspace_dir: PathBuf,

    /// Daily store directory (defaults to WORKSPACE/daily)
    #[arg(short = 'd', long, value_name = "DIR")]
    daily_dir: Option<PathBuf>,

    /// Weekly store directory (defaults to WORKSPACE/weekly)
    #[arg(short = 'w', long, value_name = "DIR")]
    weekly_dir: Option<PathBuf>,

    /// Monthly store directory (defaults to WORKSPACE/monthly)
    #[arg(short = 'm', long, value_name = "DIR")]
    monthly_dir: Option<PathBuf>,

    /// Days to keep daily backups
    #[arg(
        short = 'D',
        long,
        value_name = "DAYS",
        default_value_t = 30,
        allow_negative_numbers = true
    )]
    daily_retention: i64,

    /// Weeks to keep weekly backups
    #[arg(
        short = 'W',
        long,
        value_name = "WEEKS",
        default_value_t = 12,
        allow_negative_numbers = true
    )]
    weekly_retention: i64,

    /// Months to keep monthly backups
    #[arg(
        short = 'M',
        long,
        value_name = "MONTHS",
        default_value_t = 12,
        allow_negative_numbers = true
    )]
    monthly_retention: i64,

    /// Weekdays kept in the weekly tier, 1 = Monday .. 7 = Sunday (none disables it)
    #[arg(long, value_name = "N", num_args = 0.., default_values_t = [7u32])]
    weekdays: Vec<u32>,

    /// Days of month kept in the monthly tier, negative counts from the end
    /// (none disables it)
    #[arg(
        long,
        value_name = "N",
        num_args = 0..,
        default_values_t = [1i32],
        allow_negative_numbers = true
    )]
    monthdays: Vec<i32>,

    /// Never delete old backups from the store directories
    #[arg(short = 'k', long)]
    keep_old_backups: bool,

    /// Never delete files from the workspace
    #[arg(short = 'K', long)]
    keep_workspace: bool,

    /// Show what would be done without changing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Hours added to modification times before deriving the day
    #[arg(
        short = 'o',
        long,
        value_name = "HOURS",
        default_value_t = 6,
        allow_negative_numbers = true
    )]
    offset_hours: i32,

    /// Log more (-v for actions, -vv for decisions)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,

    /// Summary format
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    fn to_config(&self) -> Result<RollConfig, RollError> {
        let weekdays: Vec<u32> = Weekdays::from_iso(self.weekdays.iter().copied())?
            .iter()
            .collect();

        let mut builder = RollConfig::builder();
        builder
            .workspace_dir(self.workspace_dir.clone())
            .daily_retention(retention_count("daily retention", self.daily_retention)?)
            .weekly_retention(retention_count("weekly retention", self.weekly_retention)?)
            .monthly_retention(retention_count("monthly retention", self.monthly_retention)?)
            .weekdays(weekdays)
            .monthdays(self.monthdays.clone())
            .offset_hours(self.offset_hours)
            .keep_old_backups(self.keep_old_backups)
            .keep_workspace(self.keep_workspace)
            .dry_run(self.dry_run);
        if let Some(dir) = &self.daily_dir {
            builder.daily_dir(dir.clone());
        }
        if let Some(dir) = &self.weekly_dir {
            builder.weekly_dir(dir.clone());
        }
        if let Some(dir) = &self.monthly_dir {
            builder.monthly_dir(dir.clone());
        }
        builder.build()
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.log_level());

    let config = cli.to_config().context("Invalid arguments")?;
    tracing::debug!(?config, "Resolved configuration");
    let orchestrator = Orchestrator::from_config(&config).context("Invalid configuration")?;
    let report = orchestrator
        .run(&LocalFs, &TracingReporter)
        .with_context(|| format!("Backup roll of {} failed", config.workspace_dir.display()))?;

    if cli.quiet {
        return Ok(());
    }
    match cli.format {
        OutputFormat::Text => print_summary(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` takes precedence over the verbosity flags.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn print_summary(report: &RunReport) {
    println!();
    println!("{}", "─".repeat(60));
    println!(
        " {} - {} files, as of {}",
        report.workspace.display(),
        report.workspace_files,
        report.reference_date
    );
    if report.dry_run {
        println!(" Dry run: nothing was changed");
    }
    println!("{}", "─".repeat(60));

    for tier in &report.tiers {
        print_tier(tier, report.dry_run);
    }

    println!();
    if report.workspace_removed.is_empty() {
        println!(" workspace   kept");
    } else {
        println!(
            " workspace   {} {} removed",
            report.workspace_removed.len(),
            plural(report.workspace_removed.len())
        );
        if report.dry_run {
            for path in &report.workspace_removed {
                println!("   - {}", path.display());
            }
        }
    }

    println!();
    println!(
        " {} copied ({}), {} removed",
        report.total_copied(),
        format_size(report.total_bytes_copied()),
        report.total_removed()
    );
}

fn print_tier(tier: &TierReport, dry_run: bool) {
    println!();
    println!(" {:<10}  {}", tier.tier.as_ref(), tier.directory.display());
    println!("   {}", tier.policy);

    let cleanup = if tier.cleanup_skipped {
        "cleanup skipped".to_string()
    } else {
        format!("{} {} removed", tier.removed.len(), plural(tier.removed.len()))
    };
    println!(
        "   {} {} copied ({}) from {} {}, {}",
        tier.copied.len(),
        plural(tier.copied.len()),
        format_size(tier.bytes_copied),
        tier.collected_days.len(),
        if tier.collected_days.len() == 1 { "day" } else { "days" },
        cleanup
    );

    if dry_run {
        for path in &tier.copied {
            println!("   + {}", path.display());
        }
        for path in &tier.removed {
            println!("   - {}", path.display());
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Format bytes as a human-readable size.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
