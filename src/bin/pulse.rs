//! Pulse CLI - Command-line interface for Cohort Pulse
//!
//! Commands:
//! - analyze: Produce the full course report as JSON
//! - validate: Check a dataset and list rejected actors
//! - thresholds: Print the default thresholds
//! - summary: Print a console summary of a course run

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cohort_pulse::adapter::parse_dataset;
use cohort_pulse::types::{ActorOutcome, CourseDataset, CourseReport};
use cohort_pulse::{CourseMonitor, MonitorError, Thresholds, PULSE_VERSION};

/// Number of priority entries shown by `pulse summary`
const SUMMARY_PRIORITY_COUNT: usize = 10;

/// Pulse - Behavioral risk assessment for course commit activity
#[derive(Parser)]
#[command(name = "pulse")]
#[command(version = PULSE_VERSION)]
#[command(about = "Flag at-risk students and teams from commit activity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a course dataset and write the JSON report
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// JSON file with threshold overrides
        #[arg(long)]
        thresholds: Option<PathBuf>,

        /// Override a single threshold (name=value), repeatable
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<String>,

        /// Pretty-print the report (default when stdout is a terminal)
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a course dataset without analyzing it
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default thresholds as JSON
    Thresholds,

    /// Print a console summary of a course run
    Summary {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// JSON file with threshold overrides
        #[arg(long)]
        thresholds: Option<PathBuf>,

        /// Override a single threshold (name=value), repeatable
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PulseCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            thresholds,
            overrides,
            pretty,
        } => {
            let thresholds = load_thresholds(thresholds.as_deref(), &overrides)?;
            cmd_analyze(&input, &output, thresholds, pretty)
        }

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Thresholds => cmd_thresholds(),

        Commands::Summary {
            input,
            thresholds,
            overrides,
        } => {
            let thresholds = load_thresholds(thresholds.as_deref(), &overrides)?;
            cmd_summary(&input, thresholds)
        }
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    thresholds: Thresholds,
    pretty: bool,
) -> Result<(), PulseCliError> {
    let input_data = read_input(input)?;

    let to_stdout = is_stdio(output);
    let pretty = pretty || (to_stdout && atty::is(atty::Stream::Stdout));

    let report_json = CourseMonitor::with_thresholds(thresholds)
        .pretty(pretty)
        .process_to_json(&input_data)?;

    if to_stdout {
        println!("{}", report_json);
    } else {
        fs::write(output, report_json)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), PulseCliError> {
    let input_data = read_input(input)?;
    let dataset = parse_dataset(&input_data)?;
    let report = validation_report(&dataset);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Course weeks:     {}", report.course_weeks);
        println!("Individual actors: {}", report.individual_projects);
        println!("Team actors:       {}", report.team_projects);
        println!("Rejected actors:   {}", report.rejected.len());

        if !report.rejected.is_empty() {
            println!("\nErrors:");
            for rejected in &report.rejected {
                println!("  - {} ({}): {}", rejected.id, rejected.kind, rejected.error);
            }
        }
    }

    if report.rejected.is_empty() {
        Ok(())
    } else {
        Err(PulseCliError::ValidationFailed(report.rejected.len()))
    }
}

fn cmd_thresholds() -> Result<(), PulseCliError> {
    println!("{}", serde_json::to_string_pretty(&Thresholds::default())?);
    Ok(())
}

fn cmd_summary(input: &Path, thresholds: Thresholds) -> Result<(), PulseCliError> {
    let input_data = read_input(input)?;
    let report = CourseMonitor::with_thresholds(thresholds).process(&input_data)?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &CourseReport) {
    let summary = &report.summary;
    let breakdown = &summary.severity_breakdown;

    println!("Course Summary");
    println!("==============");
    println!(
        "Course:   {} to {} ({} weeks)",
        report.course_info.start_date.format("%Y-%m-%d"),
        report.course_info.end_date.format("%Y-%m-%d"),
        report.course_info.course_weeks()
    );
    println!("Students: {}", summary.total_students);
    println!("Teams:    {}", summary.total_teams);
    println!("Needing attention: {}", summary.students_needing_attention);
    if summary.failed_analyses > 0 {
        println!("Failed analyses:   {}", summary.failed_analyses);
    }

    println!("\nSeverity:");
    println!("  high:   {}", breakdown.high);
    println!("  medium: {}", breakdown.medium);
    println!("  low:    {}", breakdown.low);
    println!("  none:   {}", breakdown.none);

    if !summary.most_common_flags.is_empty() {
        println!("\nMost common flags:");
        for entry in &summary.most_common_flags {
            println!("  {:<24} {}", entry.flag_type.as_str(), entry.count);
        }
    }

    if !report.priority_interventions.is_empty() {
        println!("\nPriority interventions:");
        for p in report
            .priority_interventions
            .iter()
            .take(SUMMARY_PRIORITY_COUNT)
        {
            println!(
                "  {:>2}. {} [{}] {} flag(s), primary concern: {}",
                p.rank,
                p.student_id,
                p.severity.as_str(),
                p.flag_count,
                p.primary_concern.map(|f| f.as_str()).unwrap_or("none")
            );
        }
    }
}

// Helper functions

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn read_input(input: &Path) -> Result<String, PulseCliError> {
    if is_stdio(input) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_thresholds(
    file: Option<&Path>,
    overrides: &[String],
) -> Result<Thresholds, PulseCliError> {
    let mut thresholds = match file {
        Some(path) => Thresholds::from_json(&fs::read_to_string(path)?)?,
        None => Thresholds::default(),
    };
    for assignment in overrides {
        thresholds.apply_assignment(assignment)?;
    }
    Ok(thresholds)
}

fn validation_report(dataset: &CourseDataset) -> ValidationReport {
    fn rejected<T>(outcomes: &[ActorOutcome<T>], kind: &str) -> Vec<RejectedActor> {
        outcomes
            .iter()
            .filter_map(|o| match o {
                ActorOutcome::Failed(f) => Some(RejectedActor {
                    kind: kind.to_string(),
                    id: f.id.clone(),
                    error: f.error.clone(),
                }),
                ActorOutcome::Analyzed(_) => None,
            })
            .collect()
    }

    let mut rejected_actors = rejected(&dataset.individual_projects, "individual");
    rejected_actors.extend(rejected(&dataset.team_projects, "team"));

    ValidationReport {
        course_weeks: dataset.course_info.course_weeks(),
        individual_projects: dataset.individual_projects.len(),
        team_projects: dataset.team_projects.len(),
        rejected: rejected_actors,
    }
}

// Error handling

#[derive(Debug)]
enum PulseCliError {
    Io(io::Error),
    Monitor(MonitorError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for PulseCliError {
    fn from(e: io::Error) -> Self {
        PulseCliError::Io(e)
    }
}

impl From<MonitorError> for PulseCliError {
    fn from(e: MonitorError) -> Self {
        PulseCliError::Monitor(e)
    }
}

impl From<serde_json::Error> for PulseCliError {
    fn from(e: serde_json::Error) -> Self {
        PulseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulseCliError> for CliError {
    fn from(e: PulseCliError) -> Self {
        match e {
            PulseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulseCliError::Monitor(e) => {
                let (code, hint) = match &e {
                    MonitorError::Json(_) => ("JSON_ERROR", "Check JSON syntax"),
                    MonitorError::InvalidCourse(_) => (
                        "INVALID_COURSE",
                        "course_info needs start_date before end_date",
                    ),
                    MonitorError::UnknownThreshold(_) | MonitorError::InvalidThreshold { .. } => (
                        "THRESHOLD_ERROR",
                        "Run 'pulse thresholds' to list valid names and defaults",
                    ),
                    MonitorError::MalformedRecord { .. } => {
                        ("MALFORMED_RECORD", "Run 'pulse validate' for details")
                    }
                    MonitorError::Encoding(_) => ("ENCODING_ERROR", "Report this as a bug"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            PulseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PulseCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} actors failed validation", count),
                hint: Some("Fix the listed records and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    course_weeks: i64,
    individual_projects: usize,
    team_projects: usize,
    rejected: Vec<RejectedActor>,
}

#[derive(serde::Serialize)]
struct RejectedActor {
    kind: String,
    id: String,
    error: String,
}
