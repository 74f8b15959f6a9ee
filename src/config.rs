use clap::Parser;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::Arena;
use crate::reddit::RedditCredentials;

/// Mabinogi Duel arena round reporter
#[derive(Parser, Debug, Clone)]
#[command(name = "duel-arena-reporter", version, about)]
pub struct Config {
    /// Log the post instead of submitting it
    #[arg(long, env = "DRY_RUN", default_value = "false")]
    pub dry_run: bool,

    /// Reddit OAuth application client id
    #[arg(long, env = "REDDIT_CLIENT_ID")]
    pub reddit_client_id: Option<String>,

    /// Reddit OAuth application client secret
    #[arg(long, env = "REDDIT_CLIENT_SECRET")]
    pub reddit_client_secret: Option<String>,

    /// Long-lived refresh token granted with the "identity submit history" scopes
    #[arg(long, env = "REDDIT_REFRESH_TOKEN")]
    pub reddit_refresh_token: Option<String>,

    /// User-Agent sent with every Reddit request
    #[arg(
        long,
        env = "REDDIT_USER_AGENT",
        default_value = "Mabinogi Duel Reporter / 1.0a"
    )]
    pub user_agent: String,

    /// Subreddit the report is submitted to
    #[arg(long, env = "REDDIT_SUBREDDIT", default_value = "secondsoulenterprises")]
    pub subreddit: String,

    /// Duel arena match API base URL
    #[arg(
        long,
        env = "DUEL_API_URL",
        default_value = "http://devcat.nexon.com/api-g/duel/arena"
    )]
    pub duel_api_url: String,

    /// Duel website base URL used for match and deck links
    #[arg(long, env = "DUEL_SITE_URL", default_value = "http://devcat.nexon.com")]
    pub duel_site_url: String,

    /// Round to start from when the previous post has no Rookie label
    #[arg(long, env = "START_ROUND_ROOKIE")]
    pub start_round_rookie: Option<u32>,

    /// Round to start from when the previous post has no Random Draft label
    #[arg(long, env = "START_ROUND_RANDOMDRAFT")]
    pub start_round_randomdraft: Option<u32>,

    /// Round to start from when the previous post has no PVP label
    #[arg(long, env = "START_ROUND_PVP")]
    pub start_round_pvp: Option<u32>,

    /// Read the previous post body from this file instead of the account history
    #[arg(long, env = "PREVIOUS_POST_FILE")]
    pub previous_post_file: Option<String>,

    /// Contact line closing every post
    #[arg(
        long,
        env = "CONTACT_LINE",
        default_value = "by u/souldeux - please PM or contact at [souldeux.com](http://souldeux.com/contact) to report problems or request features"
    )]
    pub contact_line: String,

    /// Timeout for each HTTP request in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "10")]
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.dry_run && self.credentials().is_none() {
            anyhow::bail!(
                "REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET and REDDIT_REFRESH_TOKEN are required to post. Use --dry-run to preview."
            );
        }
        if self.subreddit.trim().is_empty() {
            anyhow::bail!("subreddit must not be empty");
        }
        url::Url::parse(&self.duel_api_url)
            .map_err(|e| anyhow::anyhow!("invalid duel_api_url {}: {}", self.duel_api_url, e))?;
        url::Url::parse(&self.duel_site_url)
            .map_err(|e| anyhow::anyhow!("invalid duel_site_url {}: {}", self.duel_site_url, e))?;
        for (arena, round) in self.start_rounds() {
            if round == 0 {
                anyhow::bail!("start round for the {} arena must be at least 1", arena);
            }
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be positive");
        }
        Ok(())
    }

    /// Reddit credentials, when all three parts are configured.
    pub fn credentials(&self) -> Option<RedditCredentials> {
        Some(RedditCredentials {
            client_id: self.reddit_client_id.clone()?,
            client_secret: self.reddit_client_secret.clone()?,
            refresh_token: self.reddit_refresh_token.clone()?,
            user_agent: self.user_agent.clone(),
        })
    }

    /// Configured fallback rounds, keyed by arena.
    pub fn start_rounds(&self) -> BTreeMap<Arena, u32> {
        [
            (Arena::Rookie, self.start_round_rookie),
            (Arena::RandomDraft, self.start_round_randomdraft),
            (Arena::Pvp, self.start_round_pvp),
        ]
        .into_iter()
        .filter_map(|(arena, round)| round.map(|r| (arena, r)))
        .collect()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["duel-arena-reporter"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_live_mode_requires_credentials() {
        let config = parse(&["--reddit-client-id", "id"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dry_run_without_credentials_is_valid() {
        let config = parse(&["--dry-run"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_credentials() {
        let config = parse(&[
            "--reddit-client-id",
            "id",
            "--reddit-client-secret",
            "secret",
            "--reddit-refresh-token",
            "token",
        ]);
        let creds = config.credentials().unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.user_agent, "Mabinogi Duel Reporter / 1.0a");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_contact_line() {
        let config = parse(&["--dry-run"]);
        assert!(config.contact_line.starts_with("by u/souldeux - please PM or contact at"));
        assert!(config.contact_line.contains("[souldeux.com](http://souldeux.com/contact)"));
    }

    #[test]
    fn test_zero_start_round_rejected() {
        let config = parse(&["--dry-run", "--start-round-pvp", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_start_rounds_only_contains_configured() {
        let config = parse(&["--dry-run", "--start-round-rookie", "11"]);
        let seeds = config.start_rounds();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds.get(&Arena::Rookie), Some(&11));
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let config = parse(&["--dry-run", "--duel-api-url", "not a url"]);
        assert!(config.validate().is_err());
    }
}
