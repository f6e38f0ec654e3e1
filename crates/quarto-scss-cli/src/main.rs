//! quarto-scss CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use quarto_scss::OutputStyle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "quarto-scss")]
#[command(version)]
#[command(about = "Compile SCSS stylesheets to CSS", long_about = None)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every stylesheet in a directory
    Build {
        /// Directory containing .scss/.sass files
        input_dir: PathBuf,

        /// Write compiled files to DIR
        #[arg(short = 'o', long, value_name = "DIR", default_value = "_site")]
        output_dir: PathBuf,

        /// Additional @import search path (input-dir relative, repeatable)
        #[arg(short = 'I', long = "include-path", value_name = "PATH")]
        include_paths: Vec<PathBuf>,

        /// Output style (compact, expanded, compressed, nested)
        #[arg(long)]
        style: Option<OutputStyle>,

        /// Emit a .map file next to each stylesheet when the compiler produces one
        #[arg(long)]
        source_map: bool,

        /// Do not emit source comments
        #[arg(long)]
        no_source_comments: bool,

        /// Number of worker threads (defaults to one per core)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Configuration file (defaults to quarto-scss.toml in the input directory)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "quarto_scss=debug"
    } else if cli.quiet {
        "quarto_scss=warn"
    } else {
        "quarto_scss=info"
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Build {
            input_dir,
            output_dir,
            include_paths,
            style,
            source_map,
            no_source_comments,
            jobs,
            config,
        } => commands::build::execute(commands::build::BuildArgs {
            input_dir,
            output_dir,
            include_paths,
            style,
            source_map,
            no_source_comments,
            jobs,
            config,
        }),
    }
}
