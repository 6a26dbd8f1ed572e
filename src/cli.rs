use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "atsep", about = "Roster normalizer and technical-manual uploader", version)]
pub struct Cli {
    /// Increase diagnostic output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Split a personnel CSV into person and position tables and join them back.
    Roster(RosterArgs),
    /// Upload the PDFs in the manuals folder and ask the model about them.
    Manuals(ManualsArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RosterArgs {
    /// Roster CSV. Defaults to ROSTER_CSV or "Personal CNSE Nacional.csv".
    #[arg(value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Write personal.csv, puestos.csv and personal_puestos.csv into this directory.
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ManualsArgs {
    /// Folder holding the PDF manuals (created when missing).
    #[arg(long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Model used for the chat turn.
    #[arg(long)]
    pub model: Option<String>,

    /// Seconds between processing status checks.
    #[arg(long = "poll-interval", value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Give up on a file after this many status checks (default: wait forever).
    #[arg(long = "max-polls", value_name = "N")]
    pub max_polls: Option<u32>,

    /// Question sent after the manuals are attached.
    #[arg(long)]
    pub question: Option<String>,

    /// Only upload; skip the chat turn.
    #[arg(long = "no-chat")]
    pub no_chat: bool,

    /// Print the reply as plain text instead of rendered Markdown.
    #[arg(long = "no-md")]
    pub no_md: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
