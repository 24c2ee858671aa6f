use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};
use crate::logging;
use crate::query::tweets::TweetOrder;

#[derive(Debug, Parser)]
#[command(
    name = "birdvault",
    version,
    about = "Ingest social archive exports and query the archive store"
)]
struct Cli {
    /// Print the report as JSON.
    #[arg(long, global = true)]
    json: bool,
    /// Debug logging for this crate unless BIRDVAULT_LOG is set.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate an archive (zip or extracted folder) and submit it.
    Upload {
        path: PathBuf,
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Validate an archive without submitting it.
    Validate { path: PathBuf },
    /// Oldest tweets of an account.
    FirstTweets {
        account_id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Most retweeted tweets of an account.
    TopTweets {
        account_id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Profile and tweet count of an account.
    User { account_id: String },
    /// Create the local archive store schema.
    StoreInit,
    Status,
}

fn dispatch(command: Command) -> Result<CommandReport> {
    match command {
        Command::Upload { path, base_url } => {
            commands::upload::run(&commands::upload::UploadCommandOptions {
                input: path,
                base_url,
            })
        }
        Command::Validate { path } => {
            commands::validate::run(&commands::validate::ValidateOptions { input: path })
        }
        Command::FirstTweets { account_id, limit } => {
            commands::tweets::run(&commands::tweets::TweetsOptions {
                account_id,
                limit,
                order: TweetOrder::Chronological,
            })
        }
        Command::TopTweets { account_id, limit } => {
            commands::tweets::run(&commands::tweets::TweetsOptions {
                account_id,
                limit,
                order: TweetOrder::Engagement,
            })
        }
        Command::User { account_id } => {
            commands::user::run(&commands::user::UserOptions { account_id })
        }
        Command::StoreInit => commands::store_init::run(),
        Command::Status => commands::status::run(),
    }
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let state = if report.ok { "ok" } else { "failed" };
    println!("{}: {state}", report.command);
    for line in &report.details {
        println!("  {line}");
    }
    for line in &report.issues {
        println!("  issue: {line}");
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let report = dispatch(cli.command)?;
    print_report(&report, cli.json)?;
    if !report.ok {
        std::process::exit(1);
    }
    Ok(())
}
