//! CLI tool to generate git commit messages with OpenAI
//!
//! Without a subcommand the staged changes are turned into a commit
//! message; `autocommit set` updates the stored configuration.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use autocommit::{
    app::{App, Overrides, Settings},
    clipboard::SystemClipboard,
    config::FileConfigStore,
    decision::Decision,
    git::GitRepository,
    interact::TerminalPrompter,
    openai::OpenAiClient,
};

/// Command-line arguments
#[derive(Parser)]
#[command(name = "autocommit")]
#[command(
    about = "Generate git commit messages for the staged changes using OpenAI's models",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Model to use for this run only (not saved)
    #[arg(long)]
    model: Option<String>,

    /// Temperature to use for this run only (not saved)
    #[arg(long)]
    temperature: Option<f32>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Set configuration options
    Set(SetArgs),
}

#[derive(ClapArgs)]
struct SetArgs {
    /// OpenAI API key
    #[arg(short = 'k', long = "openai-api-key")]
    openai_api_key: Option<String>,

    /// OpenAI model
    #[arg(short = 'm', long = "openai-model")]
    openai_model: Option<String>,

    /// OpenAI temperature
    #[arg(short = 't', long = "openai-temperature")]
    openai_temperature: Option<f32>,
}

/// Main entry point
///
/// # Process flow
///
/// 1. Parse command-line arguments and set up logging
/// 2. Resolve the configuration, asking for anything missing
/// 3. Get git diff from staging area and generate a commit message
/// 4. Commit, copy, regenerate or exit as the user chooses
///
/// Any error is printed once and the process exits with a non-zero code.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut app = App {
        store: FileConfigStore::default_location()?,
        backend: OpenAiClient::from_env(),
        prompter: TerminalPrompter::new(),
        vcs: GitRepository::new(),
        clipboard: SystemClipboard,
    };

    match args.command {
        Some(Command::Set(set)) => {
            let settings = Settings {
                api_key: set.openai_api_key,
                model: set.openai_model,
                temperature: set.openai_temperature,
            };
            app.set(&settings).await?;
            println!("{}", style("✓ Configuration updated").green());
        }
        None => {
            let overrides = Overrides {
                model: args.model,
                temperature: args.temperature,
            };
            match app.run(&overrides).await? {
                Decision::Commit => println!("{}", style("✓ Changes committed").green()),
                Decision::CopyToClipboard => {
                    println!("{}", style("✓ Commit message copied to clipboard").green())
                }
                Decision::Regenerate | Decision::Exit => {}
            }
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`, `debug` with `--verbose`)
fn init_tracing(verbose: bool) {
    let default = if verbose { "autocommit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
