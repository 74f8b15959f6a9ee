pub mod client;
pub mod source;

pub use client::DuelClient;
pub use source::MatchSource;

use anyhow::Result;
use tracing::info;

use crate::models::{CounterSet, FetchOutcome, RoundOutcome};

/// Fetch the next round of every arena, all or nothing.
///
/// Arenas are queried one after another in counter order. The first arena
/// whose round does not exist yet ends the batch with
/// [`FetchOutcome::NoUpdate`]; the remaining arenas are not queried.
pub async fn fetch_matches(source: &dyn MatchSource, counters: &CounterSet) -> Result<FetchOutcome> {
    let mut results = Vec::new();

    for (arena, round) in counters.iter() {
        match source.fetch_round(arena, round).await? {
            RoundOutcome::Found(m) => {
                info!("{}: found '{}'", source.name(), m.description);
                results.push(m);
            }
            RoundOutcome::NotFound => {
                info!(
                    "{}: {} round {} has not finished yet",
                    source.name(),
                    arena,
                    round
                );
                return Ok(FetchOutcome::NoUpdate);
            }
        }
    }

    Ok(FetchOutcome::Ready(results))
}
