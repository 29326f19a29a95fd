//! Storyteller command-line application.
//!
//! Reads one message per line and prints the assistant's reply:
//!
//! ```bash
//! cargo run -p storyteller -- --max-revisions 2
//! ```

mod repl;

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use storyteller_core::{StoryConfig, StorySession};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storyteller")]
#[command(about = "Bedtime stories for children aged 5-10, with an appropriateness judge")]
struct Args {
    /// Model to use (overrides STORYTELLER_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Judge rejections revised per turn before giving up (overrides STORYTELLER_MAX_REVISIONS)
    #[arg(long)]
    max_revisions: Option<u32>,

    /// Request timeout in seconds (overrides STORYTELLER_TIMEOUT_SECS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Only log warnings, regardless of DEBUG_AGENT
    #[arg(long, short)]
    quiet: bool,
}

impl Args {
    fn apply(&self, mut config: StoryConfig) -> StoryConfig {
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(max) = self.max_revisions {
            config = config.with_max_revisions(max);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if self.quiet {
            config = config.with_debug(false);
        }
        config
    }
}

fn default_filter(debug: bool) -> &'static str {
    if debug {
        "storyteller=debug,storyteller_core=debug"
    } else {
        "warn"
    }
}

fn init_tracing(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(debug))),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = args.apply(StoryConfig::from_env()?);
    init_tracing(config.debug);

    if std::env::var("ANTHROPIC_API_KEY").is_err() {
        eprintln!("Error: ANTHROPIC_API_KEY environment variable not set.");
        eprintln!("Please set it in .env file or with: export ANTHROPIC_API_KEY=your_key_here");
        std::process::exit(1);
    }

    let mut session = StorySession::from_env(&config)?;
    repl::run(&mut session, std::io::stdin().lock(), std::io::stdout()).await?;
    Ok(())
}
