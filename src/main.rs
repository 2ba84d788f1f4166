use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info};

mod aggregate;
mod config;
mod error;
mod filter;
mod ingest;
mod layout;
mod models;
mod normalize;
mod report;
mod window;

use aggregate::ReportStatus;
use config::{PlatformChoice, ReportConfig, ReportRequest};
use report::IdentityFill;

#[derive(Parser)]
#[command(name = "contest-batch-report")]
#[command(about = "Batch contest reports across Leetcode, Codechef and Codeforces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a batch report, one row per contest
    Report {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        /// How CSV rows under a merged roll number / name cell are filled
        #[arg(long, value_enum, default_value_t = FillArg::Repeat)]
        identity_fill: FillArg,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Count contests per student in the window
    Summary {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Args)]
struct ScopeArgs {
    /// JSON array of students as returned by the all-users endpoint
    #[arg(long)]
    snapshot: PathBuf,
    /// TOML file with report settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    end_date: Option<String>,
    /// Use a window ending today instead of explicit dates
    #[arg(long)]
    since_days: Option<i64>,
    #[arg(long)]
    from_roll: Option<String>,
    #[arg(long)]
    to_roll: Option<String>,
    /// Repeat to select several; choosing all three is the same as `all`
    #[arg(long = "platform", value_enum)]
    platforms: Vec<PlatformChoice>,
    /// Omit roll number and name columns
    #[arg(long)]
    condensed: bool,
}

impl ScopeArgs {
    fn request(&self) -> anyhow::Result<ReportRequest> {
        let file = match &self.config {
            Some(path) => ReportConfig::load_from_file(path)?,
            None => ReportConfig::default(),
        };
        let overrides = ReportConfig {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            since_days: self.since_days,
            from_roll: self.from_roll.clone(),
            to_roll: self.to_roll.clone(),
            platforms: self.platforms.clone(),
            condensed_identity: self.condensed,
        };

        let request = file
            .merge(overrides)
            .into_request(Utc::now().date_naive())
            .context("invalid report parameters")?;
        debug!("resolved report request: {request:?}");
        Ok(request)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Csv,
    Json,
}

impl OutputFormat {
    fn default_path(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "report.md",
            OutputFormat::Csv => "report.csv",
            OutputFormat::Json => "report.json",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FillArg {
    Repeat,
    Blank,
}

impl From<FillArg> for IdentityFill {
    fn from(fill: FillArg) -> Self {
        match fill {
            FillArg::Repeat => IdentityFill::Repeat,
            FillArg::Blank => IdentityFill::Blank,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            scope,
            format,
            identity_fill,
            out,
        } => {
            let request = scope.request()?;
            let students = ingest::load_snapshot(&scope.snapshot).await?;
            info!("loaded {} students from {}", students.len(), scope.snapshot.display());

            let aggregation =
                aggregate::run(&students, &request.rolls, &request.window, &request.filter);
            let grid = layout::layout(
                &aggregation.reports,
                &request.filter,
                request.condensed_identity,
            );

            let out = out.unwrap_or_else(|| PathBuf::from(format.default_path()));
            match format {
                OutputFormat::Markdown => {
                    let report = report::build_report(&request, &aggregation, &grid);
                    std::fs::write(&out, report)?;
                }
                OutputFormat::Csv => {
                    let matrix = report::flatten(&grid, identity_fill.into());
                    report::write_csv(&matrix, create(&out)?)?;
                }
                OutputFormat::Json => {
                    std::fs::write(&out, report::to_json(&grid)?)?;
                }
            }

            match aggregation.status {
                ReportStatus::Generated => println!(
                    "Report generated successfully: {} rows written to {}.",
                    grid.rows.len(),
                    out.display()
                ),
                ReportStatus::NoContestsInRange => println!(
                    "No contests found in the selected range. Headers written to {}.",
                    out.display()
                ),
            }
        }
        Commands::Summary { scope, limit } => {
            let request = scope.request()?;
            let students = ingest::load_snapshot(&scope.snapshot).await?;
            let aggregation =
                aggregate::run(&students, &request.rolls, &request.window, &request.filter);

            if aggregation.status == ReportStatus::NoContestsInRange {
                println!("No contests found in the selected range.");
                return Ok(());
            }

            let tallies = aggregate::summarize(&aggregation.reports, &request.filter);
            println!("Most active students on {}:", request.filter.describe());
            for tally in tallies.iter().take(limit) {
                let breakdown: Vec<String> = tally
                    .per_platform
                    .iter()
                    .map(|(platform, count)| format!("{} {}", platform.label(), count))
                    .collect();
                println!(
                    "- {} ({}) {} contests [{}]",
                    tally.identity.display_name,
                    tally.identity.roll_number,
                    tally.total,
                    breakdown.join(", ")
                );
            }
        }
    }

    Ok(())
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
