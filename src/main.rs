mod api;
mod form;
mod models;
mod state;
mod tui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use api::{DEFAULT_ENDPOINT, FetchError, HttpJobSource, JobSource};
use state::filter_catalog;

#[derive(Parser)]
#[command(name = "jobsdone")]
#[command(about = "Terminal job board - browse remote openings, save favorites, and apply")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse jobs interactively
    Browse {
        /// Job board API endpoint
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },

    /// Fetch jobs once and print them
    List {
        /// Filter by title or company (case-insensitive substring)
        #[arg(short, long)]
        search: Option<String>,

        /// Job board API endpoint
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Browse { endpoint } => tui::run_browse(&endpoint),
        Commands::List { search, endpoint } => run_list(&endpoint, search.as_deref()),
    }
}

fn run_list(endpoint: &str, search: Option<&str>) -> Result<()> {
    let source = HttpJobSource::new(endpoint);
    let jobs = match source.fetch_jobs() {
        Ok(jobs) => jobs,
        Err(err @ FetchError::MissingJobs) => {
            println!("{}", err.notice());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let jobs = match search {
        Some(term) => filter_catalog(&jobs, term),
        None => jobs,
    };

    if jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    println!(
        "{:<30} {:<20} {:<16} {:<12} {:<10} {:<10}",
        "TITLE", "COMPANY", "CATEGORY", "TYPE", "MODEL", "SENIORITY"
    );
    println!("{}", "-".repeat(102));
    for job in jobs {
        println!(
            "{:<30} {:<20} {:<16} {:<12} {:<10} {:<10}",
            truncate(&job.title, 28),
            truncate(&job.company_name, 18),
            truncate(&job.main_category, 14),
            truncate(&job.job_type, 10),
            truncate(&job.work_model, 8),
            truncate(&job.seniority_level, 8),
        );
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
