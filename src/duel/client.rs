use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::source::MatchSource;
use crate::error::ReporterError;
use crate::models::{Arena, MatchResult, RoundOutcome};

/// Characters (not bytes) of junk in front of every `sharedDeck` token.
const SHARED_DECK_JUNK_LEN: usize = 2;

/// Client for the Duel arena results API.
///
/// A missing round loads the site's 404 page with status 200, so the
/// JSON API is the only reliable way to tell whether a round exists.
#[derive(Clone)]
pub struct DuelClient {
    http: Client,
    api_url: String,
    site_url: String,
}

impl DuelClient {
    pub fn new(api_url: &str, site_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(DuelClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            site_url: site_url.trim_end_matches('/').to_string(),
        })
    }

    /// `<api>/<arena>.<round>.1?lang=en_US`
    fn round_url(&self, arena: Arena, round: u32) -> Result<Url, ReporterError> {
        let mut url = Url::parse(&format!("{}/{}.{}.1", self.api_url, arena.api_id(), round))?;
        url.query_pairs_mut().append_pair("lang", "en_US");
        Ok(url)
    }
}

#[async_trait]
impl MatchSource for DuelClient {
    fn name(&self) -> &str {
        "devcat"
    }

    async fn fetch_round(&self, arena: Arena, round: u32) -> Result<RoundOutcome> {
        let url = self.round_url(arena, round)?;
        debug!("Fetching {} round {} from {}", arena, round, url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("Duel API request failed")?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(RoundOutcome::NotFound);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Duel API error {}: {}", status, body);
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse Duel API response")?;

        Ok(parse_round_payload(&raw, arena, round, &self.site_url)?)
    }
}

// ── Parsing helpers ────────────────────────────────────────────────────────────

/// Turn an arena API response into a [`RoundOutcome`].
///
/// A body with a non-success `status` field means the round does not exist.
/// Anything else must carry `title`, `round`, `id` and a `description` list
/// ranked by descending score, whose first entry is the winner.
pub fn parse_round_payload(
    raw: &serde_json::Value,
    arena: Arena,
    round: u32,
    site_url: &str,
) -> Result<RoundOutcome, ReporterError> {
    if is_not_found(raw) {
        return Ok(RoundOutcome::NotFound);
    }

    let malformed = |reason: &str| ReporterError::MalformedPayload {
        arena,
        round,
        reason: reason.to_string(),
    };

    let title = raw["title"].as_str().ok_or_else(|| malformed("missing title"))?;
    let round_number = raw["round"]
        .as_u64()
        .or_else(|| raw["round"].as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| malformed("missing round"))?;
    let id = raw["id"].as_str().ok_or_else(|| malformed("missing id"))?;

    let winner = raw["description"]
        .as_array()
        .and_then(|entries| entries.first())
        .ok_or_else(|| malformed("no ranking entries"))?;
    let shared_deck = winner["sharedDeck"]
        .as_str()
        .ok_or_else(|| malformed("winner has no sharedDeck"))?;
    let deck = shared_deck
        .char_indices()
        .nth(SHARED_DECK_JUNK_LEN)
        .map(|(i, _)| &shared_deck[i..])
        .filter(|d| !d.is_empty())
        .ok_or_else(|| malformed("sharedDeck too short"))?;

    let mut match_url = Url::parse(&format!("{}/duel/us/arena/view", site_url))?;
    match_url.set_query(Some(id));
    let mut deck_url = Url::parse(&format!("{}/duel/us/deck", site_url))?;
    deck_url.set_query(Some(deck));

    Ok(RoundOutcome::Found(MatchResult {
        arena,
        description: format!("{} Round {}", title, round_number),
        match_url: match_url.to_string(),
        deck_url: deck_url.to_string(),
    }))
}

fn is_not_found(raw: &serde_json::Value) -> bool {
    match raw.get("status") {
        None | Some(serde_json::Value::Null) => false,
        Some(status) => {
            let success = status.as_u64() == Some(200)
                || status
                    .as_str()
                    .map(|s| matches!(s.to_lowercase().as_str(), "200" | "ok" | "success"))
                    .unwrap_or(false);
            !success
        }
    }
}
