//! Round counter recovery.
//!
//! The bot keeps no local state: the last published post is the state. Each
//! arena bullet in a post is a markdown link whose label ends in the round
//! number, e.g. `[Random Draft Arena Round 21](...)`. Grammar:
//!
//! * a label is any `[...]` span without a nested `]`;
//! * a label belongs to an arena when it starts with the arena's label prefix
//!   (`PVP`, `Rookie`, `Random Draft`, case-sensitive);
//! * the round is the label's last whitespace-separated token, parsed as an
//!   unsigned integer. Labels without one are ignored;
//! * when an arena has several labels, the highest round wins.
//!
//! The next round to check is that value plus one.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::ReporterError;
use crate::models::{Arena, CounterSet};

lazy_static! {
    static ref LINK_LABEL: Regex = Regex::new(r"\[([^\]]+)\]").unwrap();
}

/// Last round number each arena was reported at in `text`.
pub fn reported_rounds(text: &str) -> BTreeMap<Arena, u32> {
    let mut rounds: BTreeMap<Arena, u32> = BTreeMap::new();
    for cap in LINK_LABEL.captures_iter(text) {
        let label = &cap[1];
        let Some(arena) = Arena::from_label(label) else {
            continue;
        };
        let Some(round) = label
            .split_whitespace()
            .last()
            .and_then(|t| t.parse::<u32>().ok())
        else {
            warn!("Ignoring {} label without a round number: '{}'", arena, label);
            continue;
        };
        let entry = rounds.entry(arena).or_insert(round);
        *entry = (*entry).max(round);
    }
    rounds
}

/// Next round to check for every arena, from the body of the previous post.
///
/// Arenas without a label fall back to `start_rounds`; if an arena has
/// neither, recovery fails with [`ReporterError::MissingRound`].
pub fn recover_counters(
    previous_post: &str,
    start_rounds: &BTreeMap<Arena, u32>,
) -> Result<CounterSet, ReporterError> {
    let reported = reported_rounds(previous_post);
    let next = |arena: Arena| -> Result<u32, ReporterError> {
        match reported.get(&arena) {
            Some(&round) => round
                .checked_add(1)
                .ok_or(ReporterError::RoundOverflow(arena, round)),
            None => {
                let seed = start_rounds
                    .get(&arena)
                    .copied()
                    .ok_or(ReporterError::MissingRound(arena))?;
                debug!("No {} label in previous post, starting at round {}", arena, seed);
                Ok(seed)
            }
        }
    };
    Ok(CounterSet::new(
        next(Arena::Pvp)?,
        next(Arena::Rookie)?,
        next(Arena::RandomDraft)?,
    ))
}

/// Counters when there is no previous post at all: every arena must be seeded.
pub fn seeded_counters(start_rounds: &BTreeMap<Arena, u32>) -> Result<CounterSet, ReporterError> {
    if Arena::ALL.iter().any(|a| !start_rounds.contains_key(a)) {
        return Err(ReporterError::NoPreviousPost);
    }
    recover_counters("", start_rounds)
}
