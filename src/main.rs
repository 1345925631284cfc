mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use graph::{GitWalker, HistoryBuilder};
use std::path::PathBuf;
use tracing::{debug, Level};

use config::WorkbenchConfig;

#[derive(Parser)]
#[command(name = "workbench")]
#[command(about = "Browse the commit graph of a Git repository", long_about = None)]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the commit history with its lane layout
    Log {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Number of commits to show
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Emit rows as JSON
        #[arg(long)]
        json: bool,
        /// Include commits reachable only from excluded refs such as the stash
        #[arg(long)]
        all_refs: bool,
        /// Leave out the uncommitted-changes row
        #[arg(long)]
        no_working_directory: bool,
    },
    /// Show the checked-out commit and working directory state
    Status {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = WorkbenchConfig::load_or_default(cli.config.as_deref())?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Log { path, count, json, all_refs, no_working_directory } => {
            let exclude_refs = if all_refs { Vec::new() } else { config.exclude_refs.clone() };

            let mut builder = HistoryBuilder::new(&path)?
                .exclude_refs(exclude_refs)
                .include_working_directory(!no_working_directory)
                .show_clean_working_directory(config.show_clean_working_directory);
            if let Some(count) = count.or(config.max_count) {
                builder = builder.max_count(count);
            }

            let entries = builder.build()?;

            if json {
                println!("{}", output::to_json(&entries)?);
            } else {
                for entry in &entries {
                    println!("{}", output::format_entry(entry));
                }
            }
        }
        Commands::Status { path } => {
            let walker = GitWalker::new(Some(path.as_path()))?;
            walker.ensure_idle()?;

            match walker.get_head()? {
                Some(head) => println!("HEAD at {}", head),
                None => println!("HEAD is unborn"),
            }

            let status = walker.working_directory_status()?;
            if !status.has_content() {
                println!("Working tree clean");
            }
            if !status.staged.is_empty() {
                println!("\nChanges to be committed:");
                for file in &status.staged {
                    println!("{}", output::format_file(file));
                }
            }
            if !status.unstaged.is_empty() {
                println!("\nChanges not staged:");
                for file in &status.unstaged {
                    println!("{}", output::format_file(file));
                }
            }
        }
    }

    Ok(())
}
