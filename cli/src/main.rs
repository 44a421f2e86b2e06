//! CLI for the GitLab migrator.
//!
//! Migrates a GitLab project, or every project in a CSV list, into GitHub
//! while keeping issue and merge request numbers aligned.

use clap::Parser;
use gitlab_migrator::{
    EntityCounters, MigrationSummary, ProcessingResult, RunSummary, Runner, RunnerConfig,
    RunnerError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// GitLab Migrator - Move issues, merge requests, milestones, labels, releases and attachments to GitHub.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the settings file.
    #[arg(long, default_value = "settings.toml")]
    settings: PathBuf,

    /// GitLab Personal Access Token.
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    gitlab_token: Option<String>,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// CSV list of projects to migrate (`gitlabProjectId,gitlabPath,githubPath`).
    #[arg(long)]
    projects: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if summary.aborted() > 0 {
                ExitCode::from(2)
            } else if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let config = RunnerConfig::new(args.settings)
        .with_gitlab_token(args.gitlab_token)
        .with_github_token(args.github_token)
        .with_projects_path(args.projects);
    let runner = Runner::new(config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!("  Projects completed: {}", summary.completed());
    println!("  Projects aborted: {}", summary.aborted());

    for result in &summary.results {
        match result {
            ProcessingResult::Completed(project) => print_project(project),
            ProcessingResult::Aborted {
                project_id,
                repository,
                error,
            } => {
                println!("\n  Project {project_id} -> {repository}: ABORTED");
                println!("    {error}");
            }
        }
    }
}

fn print_project(summary: &MigrationSummary) {
    println!(
        "\n  Project {} -> {}",
        summary.project_id, summary.repository
    );
    println!(
        "    Description: {}",
        if summary.description_transferred {
            "transferred"
        } else {
            "unchanged"
        }
    );
    print_counters("Milestones", &summary.milestones);
    print_counters("Labels", &summary.labels);
    print_counters("Releases", &summary.releases);
    print_counters("Issues", &summary.issues);
    match summary.merge_requests_logged {
        Some(count) => println!("    Merge requests: {count} logged"),
        None => print_counters("Merge requests", &summary.merge_requests),
    }
    println!(
        "    Comments: {} created, {} failed",
        summary.comments, summary.comments_failed
    );
    println!(
        "    Attachments: {}{}",
        summary.attachments,
        if summary.attachments_drained {
            ""
        } else {
            " (some writes did not finish)"
        }
    );
}

fn print_counters(name: &str, counters: &EntityCounters) {
    println!(
        "    {name}: {} created, {} placeholders, {} replacements, {} existing, {} skipped, {} failed",
        counters.created,
        counters.placeholders,
        counters.replacements,
        counters.existing,
        counters.skipped,
        counters.failed
    );
}
