//! riskwatch CLI: scores student records against a course catalog.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod loader;

#[derive(Parser)]
#[command(name = "riskwatch", version, about = "Student academic risk scoring")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single student
    Score {
        /// Course catalog JSON
        #[arg(long)]
        catalog: PathBuf,

        /// Student record JSON
        #[arg(long)]
        student: PathBuf,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Score every student_*.json in a directory
    Sweep {
        /// Course catalog JSON
        #[arg(long)]
        catalog: PathBuf,

        /// Directory of student records
        #[arg(long)]
        students: PathBuf,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Check a catalog for prerequisite cycles
    CheckCatalog {
        /// Course catalog JSON
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Show prerequisites for a course
    Prereqs {
        /// Course catalog JSON
        #[arg(long)]
        catalog: PathBuf,

        /// Course code
        #[arg(long)]
        course: String,

        /// Completed course codes (comma-separated)
        #[arg(long)]
        completed: Option<String>,
    },

    /// Autocomplete course codes by prefix
    Autocomplete {
        /// Course catalog JSON
        #[arg(long)]
        catalog: PathBuf,

        /// Code prefix
        #[arg(long)]
        query: String,
    },

    /// Create a starter riskwatch.toml
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("riskwatch=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config;

    let result = match cli.command {
        Commands::Score {
            catalog,
            student,
            today,
            format,
        } => commands::score::execute(catalog, student, today, format, config_path),
        Commands::Sweep {
            catalog,
            students,
            today,
            format,
        } => commands::sweep::execute(catalog, students, today, format, config_path),
        Commands::CheckCatalog { catalog } => commands::check_catalog::execute(catalog),
        Commands::Prereqs {
            catalog,
            course,
            completed,
        } => commands::prereqs::execute(catalog, course, completed),
        Commands::Autocomplete { catalog, query } => {
            commands::autocomplete::execute(catalog, query, config_path)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
