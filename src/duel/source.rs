use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Arena, RoundOutcome};

/// Anything that can answer "has this arena round finished, and who won?".
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Look up a single round. A round that does not exist yet is
    /// `Ok(RoundOutcome::NotFound)`, not an error.
    async fn fetch_round(&self, arena: Arena, round: u32) -> Result<RoundOutcome>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
