use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "stash-plugins")]
#[command(about = "Stash plugins: stash-box favorites sync and the Whisparr bridge")]
#[command(long_about = "Run one Stash plugin invocation. Stash writes the plugin input (server connection plus hook context or task arguments) to stdin; the result is printed to stdout as plugin output. The process always exits 0 so Stash never marks the task failed.")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors and progress
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Also write logs to this file, rotated daily
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Read the plugin input from a file instead of stdin
    #[arg(long, value_name = "PATH", global = true)]
    input: Option<PathBuf>,

    /// Plugin output format
    #[arg(long, global = true, default_value = "json", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync performer/studio favorites with a stash-box
    #[command(long_about = "Handles Performer.Update.Post and Studio.Update.Post hooks by pushing that entity's favorite flag to StashDB, and the favorite_performers_sync / favorite_studios_sync tasks by reconciling every favorite. Task arguments `endpoint` and `api_key` override the configured StashDB credentials.")]
    Favorites,
    /// Add a scene to Whisparr, or refresh it when it already exists
    #[command(long_about = "Handles the Scene.Update.Post hook: looks up the scene's StashDB id and creates the matching Whisparr movie, refreshing the existing one instead when Whisparr reports it already exists.")]
    Whisparr,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet, cli.log_file.clone()) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    let output = output::PluginOutput::new(cli.output);

    let input = match commands::read_plugin_input(cli.input.as_deref()).await {
        Ok(input) => input,
        Err(e) => {
            error!("{:#}", e);
            output.failure(format!("{:#}", e));
            return Ok(());
        }
    };

    let report = match cli.command {
        Commands::Favorites => commands::favorites::run(&input).await,
        Commands::Whisparr => commands::whisparr::run(&input).await,
    };

    // Failures go into the output document; the exit code stays 0
    match report {
        Ok(report) => output.report(&report),
        Err(e) => {
            error!("{:#}", e);
            output.failure(format!("{:#}", e));
        }
    }

    Ok(())
}
