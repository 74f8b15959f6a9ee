use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod config;
mod duel;
mod error;
mod models;
mod reddit;
mod report;
mod reporter;

use config::Config;
use duel::DuelClient;
use reddit::RedditSession;
use reporter::{ReportOptions, Reporter, RunOutcome};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    if config.dry_run {
        info!("🟡 DRY RUN mode – the report will be printed, not posted");
    } else {
        info!("🔴 LIVE mode – the report WILL be posted to r/{}", config.subreddit);
    }

    let previous_post = match &config.previous_post_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read previous post from {}", path))?,
        ),
        None => None,
    };

    // Authentication failures are fatal.
    let session = match config.credentials() {
        Some(creds) => {
            let session =
                RedditSession::login(&creds, &config.subreddit, config.http_timeout()).await?;
            info!("Session ready for u/{}", session.username());
            Some(session)
        }
        None => None,
    };

    let duel = DuelClient::new(
        &config.duel_api_url,
        &config.duel_site_url,
        config.http_timeout(),
    )?;

    let options = ReportOptions {
        start_rounds: config.start_rounds(),
        contact_line: config.contact_line.clone(),
        dry_run: config.dry_run,
        previous_post,
    };
    let reporter = Reporter::new(
        &duel,
        session.as_ref().map(|s| s as &dyn reddit::PostingPlatform),
        options,
    );

    let today = chrono::Local::now().date_naive();
    match reporter.run(today).await? {
        RunOutcome::Published(post) => println!("{}", post.url),
        RunOutcome::NoUpdate => {
            println!("Sorry, you have requested a match that does not yet exist.")
        }
        RunOutcome::DryRun(post) => println!("{}\n\n{}", post.title, post.body),
        // Logged by the reporter; the next scheduled run retries.
        RunOutcome::PublishFailed(_) => {}
    }

    Ok(())
}
