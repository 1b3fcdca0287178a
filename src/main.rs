//! batch-resize CLI - fit a folder of JPEGs into a bounding box

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;

use batch_resize::{init_logging, BatchResizeError, BatchResizer, BatchSummary, Config, Size};

/// batch-resize - shrink every JPEG in a folder to fit a maximum size
#[derive(Parser)]
#[command(
    name = "batch-resize",
    version,
    about = "Resize a folder of JPEG images to fit within WIDTHxHEIGHT"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input folder [default: ./]
    #[arg(long = "in", value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output folder [default: <in>/resized]
    #[arg(long = "out", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Maximal image size [default: 500x500]
    #[arg(long, value_name = "WxH")]
    size: Option<String>,

    /// Number of concurrent workers, 0 = one per CPU [default: 3]
    #[arg(short, long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Configuration file (.toml or .yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List the files that would be resized and exit
    #[arg(long)]
    dry_run: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Generate example configuration file
    ExampleConfig {
        /// Output file path
        #[arg(short, long, default_value = "batch-resize.toml")]
        output: PathBuf,
        /// Use YAML format instead of TOML
        #[arg(long)]
        yaml: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Commands::ExampleConfig { output, yaml }) = &cli.command {
        if let Err(e) = generate_example_config(output, *yaml) {
            fail(&format!("{e:#}"));
        }
        return;
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => fail(&format!("{e:#}")),
    };

    init_logging(&config.logging);

    let resizer = BatchResizer::new(config.batch);

    if cli.dry_run {
        match resizer.plan().await {
            Ok(jobs) => {
                println!("{} files would be resized:", style(jobs.len()).bold());
                for job in &jobs {
                    println!("  {} -> {}", job.input_path.display(), job.output_path.display());
                }
            }
            Err(e) => fail(&e.user_message()),
        }
        return;
    }

    match resizer.run().await {
        Ok(summary) => print_summary(&summary, cli.json),
        Err(BatchResizeError::Batch(report)) => {
            if cli.json {
                print_json(&report);
            }
            eprintln!("{}: {}", style("Error").red().bold(), report);
            process::exit(1);
        }
        Err(e) => fail(&e.user_message()),
    }
}

/// Layer defaults, the optional config file and command-line flags
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(input) = &cli.input {
        config.batch.input_dir = input.clone();
    }
    if let Some(output) = &cli.output {
        config.batch.output_dir = Some(output.clone());
    }
    if let Some(size) = &cli.size {
        config.batch.size = size
            .parse::<Size>()
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }
    if let Some(workers) = cli.workers {
        config.batch.workers = workers;
    }

    if cli.quiet {
        config.logging.level = "error".to_string();
    } else if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate()?;
    Ok(config)
}

/// Generate example configuration file
fn generate_example_config(output: &Path, yaml: bool) -> anyhow::Result<()> {
    let output = if yaml && output.extension().and_then(|e| e.to_str()) == Some("toml") {
        output.with_extension("yaml")
    } else {
        output.to_path_buf()
    };

    Config::default().to_file(&output)?;
    println!(
        "{}: Generated example configuration: {}",
        style("Success").green().bold(),
        output.display()
    );
    Ok(())
}

fn print_summary(summary: &BatchSummary, json_output: bool) {
    if json_output {
        print_json(summary);
        return;
    }

    println!(
        "{}: resized {} of {} files in {:.2}s",
        style("Success").green().bold(),
        summary.succeeded,
        summary.submitted,
        summary.elapsed_ms as f64 / 1000.0
    );
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("{}: could not serialize output: {}", style("Error").red().bold(), e),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}: {}", style("Error").red().bold(), message);
    process::exit(1);
}
