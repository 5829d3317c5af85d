//! memebot - repost an unposted meme from the SUCHO meme wall to Mastodon

use std::path::PathBuf;

use clap::Parser;
use libmemebot::logging::{LogFormat, LoggingConfig, Verbosity};
use libmemebot::platforms::mastodon::MastodonClient;
use libmemebot::post::CaptionRules;
use libmemebot::{Config, Credentials, FeedSelector, Ledger, MemebotError, RunOutcome, Runner};

#[derive(Parser, Debug)]
#[command(name = "memebot")]
#[command(version, about = "Repost memes from an RSS feed to Mastodon", long_about = None)]
#[command(after_help = r#"ENVIRONMENT:
    MASTODON_TOKEN      Access token for the posting account (required)
    MASTODON_HOST       Instance URL, overrides [mastodon] instance
    MEMEBOT_CONFIG      Path to a TOML config file
    MEMEBOT_LOG_FORMAT  text, json or pretty

EXIT CODES:
    0 - Posted, or nothing left to post
    1 - Feed, ledger or network failure
    2 - Configuration error
    3 - Malformed feed entry
    * - HTTP status of a rejected publish request (mod 256)
"#)]
struct Cli {
    /// Increase verbosity
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet operation
    #[arg(short, long)]
    quiet: bool,

    /// Path to a TOML config file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log output format (text, json, pretty)
    #[arg(long, value_name = "FORMAT", env = "MEMEBOT_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::new(cli.log_format, Verbosity::from_flags(cli.verbose, cli.quiet)).init();

    if let Err(code) = run(cli).await {
        std::process::exit(code);
    }
}

/// Returns the exit code on failure
async fn run(cli: Cli) -> Result<(), i32> {
    let (config, credentials, client) = load(&cli).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code()
    })?;

    let selector = FeedSelector::new(client.clone(), config.feed.url.clone());
    let publisher = MastodonClient::new(
        client,
        &credentials,
        CaptionRules::from(config.status.clone()),
    );
    let ledger = Ledger::new(config.ledger.expanded_path());

    match Runner::new(&selector, &publisher, &ledger).run().await {
        Ok(RunOutcome::Posted(_)) | Ok(RunOutcome::NothingToPost) => Ok(()),
        Err(failure) => {
            eprintln!("Error: {}", failure);
            Err(failure.exit_code())
        }
    }
}

/// Everything that must be valid before the first request goes out
fn load(cli: &Cli) -> Result<(Config, Credentials, reqwest::Client), MemebotError> {
    let config = Config::load(cli.config.as_deref())?;
    let credentials = Credentials::from_env(&config)?;
    let client = config.http.build_client()?;
    Ok((config, credentials, client))
}
