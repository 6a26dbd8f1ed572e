mod cli;
mod config;
mod gemini;
mod handlers;
mod manuals;
mod printer;
mod roster;

use std::time::Duration;

use anyhow::Result;
use config::Config;
use gemini::GeminiClient;
use handlers::manuals::{ChatOptions, ManualsHandler, DEFAULT_QUESTION};
use handlers::roster::RosterHandler;
use manuals::PollPolicy;
use printer::{status, Tone};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_tracing(args.verbose);

    // Load config
    let cfg = Config::load();
    tracing::debug!(path = %cfg.config_path.display(), "config loaded");

    match args.command {
        cli::Command::Roster(a) => {
            let csv = a.csv.unwrap_or_else(|| cfg.roster_csv());
            RosterHandler::run(&csv, a.out_dir.as_deref())
        }
        cli::Command::Manuals(a) => {
            // Missing key is not fatal here; every remote call reports it instead.
            let client = GeminiClient::from_config(&cfg)?;
            if !client.has_api_key() {
                status(Tone::Warning, "⚠️  GEMINI_API_KEY not found in environment or config.");
            }

            let mut poll = PollPolicy::from_config(&cfg);
            if let Some(secs) = a.poll_interval {
                poll.interval = Duration::from_secs(secs);
            }
            if a.max_polls.is_some() {
                poll.max_attempts = a.max_polls;
            }

            let folder = a.dir.unwrap_or_else(|| cfg.manuals_dir());
            let chat = ChatOptions {
                model: a
                    .model
                    .or_else(|| cfg.get("GEMINI_MODEL"))
                    .unwrap_or_else(|| "gemini-1.5-pro".to_string()),
                system_instruction: cfg
                    .get("SYSTEM_INSTRUCTION")
                    .unwrap_or_else(|| config::DEFAULT_SYSTEM_INSTRUCTION.to_string()),
                question: if a.no_chat {
                    None
                } else {
                    Some(a.question.unwrap_or_else(|| DEFAULT_QUESTION.to_string()))
                },
                markdown: !a.no_md && cfg.get_bool("PRETTIFY_MARKDOWN"),
            };

            ManualsHandler::run(&client, &folder, poll, chat).await
        }
    }
}
