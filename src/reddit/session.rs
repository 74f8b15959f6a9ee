use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::platform::PostingPlatform;
use crate::error::ReporterError;
use crate::models::{Post, SubmittedPost};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const OAUTH_API_URL: &str = "https://oauth.reddit.com";

/// Installed-app credentials. The refresh token is obtained once, out of band,
/// with the `identity submit history` scopes.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub user_agent: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Identity {
    name: String,
}

/// A logged-in Reddit account, valid for a single run.
pub struct RedditSession {
    http: Client,
    access_token: String,
    username: String,
    subreddit: String,
}

impl RedditSession {
    /// Trade the refresh token for an access token and look up the account name.
    pub async fn login(
        creds: &RedditCredentials,
        subreddit: &str,
        timeout: Duration,
    ) -> Result<Self, ReporterError> {
        let http = Client::builder()
            .user_agent(creds.user_agent.as_str())
            .timeout(timeout)
            .build()
            .map_err(|e| ReporterError::Auth(format!("failed to build HTTP client: {}", e)))?;

        let resp = http
            .post(TOKEN_URL)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", creds.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ReporterError::Auth(format!("token request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ReporterError::Auth(format!("token response unreadable: {}", e)))?;
        if !status.is_success() {
            return Err(ReporterError::Auth(format!("token endpoint returned {}: {}", status, body)));
        }
        let access_token = parse_token_response(&body)?;

        let identity: Identity = http
            .get(format!("{}/api/v1/me", OAUTH_API_URL))
            .bearer_auth(&access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReporterError::Auth(format!("identity lookup failed: {}", e)))?
            .json()
            .await
            .map_err(|e| ReporterError::Auth(format!("identity response unreadable: {}", e)))?;

        info!("Logged in to Reddit as u/{}", identity.name);
        Ok(RedditSession {
            http,
            access_token,
            username: identity.name,
            subreddit: subreddit.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[async_trait]
impl PostingPlatform for RedditSession {
    fn name(&self) -> &str {
        "reddit"
    }

    async fn latest_self_post(&self) -> Result<Option<String>> {
        let url = format!(
            "{}/user/{}/submitted?sort=new&limit=1&raw_json=1",
            OAUTH_API_URL, self.username
        );
        debug!("Fetching latest submission: {}", url);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Reddit history request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Reddit history error {}: {}", status, body);
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse Reddit history response")?;
        Ok(latest_selftext(&raw))
    }

    async fn submit(&self, post: &Post) -> Result<SubmittedPost> {
        info!("Submitting '{}' to r/{}", post.title, self.subreddit);

        let resp = self
            .http
            .post(format!("{}/api/submit", OAUTH_API_URL))
            .bearer_auth(&self.access_token)
            .form(&[
                ("api_type", "json"),
                ("kind", "self"),
                ("sr", self.subreddit.as_str()),
                ("title", post.title.as_str()),
                ("text", post.body.as_str()),
            ])
            .send()
            .await
            .context("Reddit submit request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ReporterError::Publish(format!("{}: {}", status, body)).into());
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse Reddit submit response")?;
        Ok(parse_submit_response(&raw)?)
    }
}

// ── Parsing helpers ────────────────────────────────────────────────────────────

fn parse_token_response(body: &str) -> Result<String, ReporterError> {
    let token: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ReporterError::Auth(format!("unexpected token response: {}", e)))?;
    if let Some(err) = token.error {
        return Err(ReporterError::Auth(err));
    }
    token
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ReporterError::Auth("token response has no access_token".to_string()))
}

/// `selftext` of the first child of a submission listing.
fn latest_selftext(raw: &serde_json::Value) -> Option<String> {
    raw["data"]["children"]
        .as_array()?
        .first()?
        .get("data")?
        .get("selftext")?
        .as_str()
        .map(str::to_string)
}

/// `{"json": {"errors": [...], "data": {"id", "url", ...}}}`
fn parse_submit_response(raw: &serde_json::Value) -> Result<SubmittedPost, ReporterError> {
    let json = &raw["json"];
    if let Some(errors) = json["errors"].as_array() {
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(ReporterError::Publish(messages.join("; ")));
        }
    }
    serde_json::from_value(json["data"].clone())
        .map_err(|e| ReporterError::Publish(format!("unexpected submit response: {}", e)))
}
