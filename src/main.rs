use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trajectory_visualizer::layout::LayeredLayout;
use trajectory_visualizer::{loader, render, report, Config, LoadOutcome, LoadedStudent, Session};

#[derive(Parser)]
#[command(name = "trajectory-visualizer")]
#[command(about = "Render student interaction histories as trajectory graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML config file
    #[arg(short, long, global = true, env = "TRAJECTORY_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of students displayed at once
    #[arg(long, global = true)]
    capacity: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the metadata panel and trajectory of each student
    Show {
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Write Graphviz DOT for an external layout engine
    Dot {
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "trajectory.dot")]
        out: PathBuf,
    },
    /// Write the laid-out JSON render model
    Model {
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "trajectory.json")]
        out: PathBuf,
    },
    /// Export classified trajectory nodes as CSV
    Export {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "nodes.csv")]
        csv: PathBuf,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::resolve(cli.config.as_deref()).context("failed to load config")?;
    if let Some(capacity) = cli.capacity {
        config.session.capacity = capacity;
        config.validate()?;
    }
    Ok(config)
}

/// Loads each file in order against one session. Roster rejections are
/// skipped; unreadable or malformed files abort.
async fn load_students(files: &[PathBuf], config: &Config) -> anyhow::Result<Vec<LoadedStudent>> {
    let mut session = Session::new(config.session.capacity);
    let mut students = Vec::new();

    for path in files {
        let outcome = loader::load_into(&mut session, path)
            .await
            .with_context(|| format!("failed to load {}", path.display()))?;
        if let LoadOutcome::Displayed(student) = outcome {
            students.push(*student);
        }
    }

    info!(
        loaded = students.len(),
        roster = session.roster().len(),
        capacity = session.capacity(),
        "session ready"
    );
    Ok(students)
}

fn write_output(out: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(out, content).with_context(|| format!("failed to write {}", out.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Show { files } => {
            let students = load_students(&files, &config).await?;
            if students.is_empty() {
                println!("No students to display.");
                return Ok(());
            }
            for (position, student) in students.iter().enumerate() {
                if position > 0 {
                    println!();
                }
                print!("{}", report::build_summary(student, &config));
            }
        }
        Commands::Report { files, out } => {
            let students = load_students(&files, &config).await?;
            let report = report::build_report(&students, &config, chrono::Utc::now());
            write_output(&out, &report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Dot { files, out } => {
            let students = load_students(&files, &config).await?;
            let dot: String = students
                .iter()
                .map(|student| render::to_dot(student, &config))
                .collect::<Vec<_>>()
                .join("\n");
            write_output(&out, &dot)?;
            println!("Wrote {} graph(s) to {}.", students.len(), out.display());
        }
        Commands::Model { files, out } => {
            let students = load_students(&files, &config).await?;
            let layout = LayeredLayout::new(&config.layout);
            let models: Vec<_> = students
                .iter()
                .map(|student| render::student_model(student, &config, &layout))
                .collect();
            let json = serde_json::to_string_pretty(&models)?;
            write_output(&out, &json)?;
            println!("Wrote render model for {} student(s) to {}.", models.len(), out.display());
        }
        Commands::Export { file, csv } => {
            let students = load_students(std::slice::from_ref(&file), &config).await?;
            let output = std::fs::File::create(&csv)
                .with_context(|| format!("failed to create {}", csv.display()))?;
            let mut rows = 0;
            for student in &students {
                rows += render::write_csv(student, &config.colors, &output)?;
            }
            println!("Exported {rows} nodes from {} to {}.", file.display(), csv.display());
        }
    }

    Ok(())
}
