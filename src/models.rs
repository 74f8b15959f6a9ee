use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// One of the tracked Duel arenas.
///
/// Newbie and veteran arenas exist upstream but are not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Arena {
    Pvp,
    Rookie,
    RandomDraft,
}

impl Arena {
    /// Canonical order used for fetching and for the bullets of a post.
    pub const ALL: [Arena; 3] = [Arena::Pvp, Arena::Rookie, Arena::RandomDraft];

    /// Path segment the match API expects, e.g. `rookie_arena_g`
    pub fn api_id(self) -> &'static str {
        match self {
            Arena::Pvp => "pvp_arena_g",
            Arena::Rookie => "rookie_arena_g",
            Arena::RandomDraft => "randomdraft_arena_g",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Arena::Pvp => "pvp",
            Arena::Rookie => "rookie",
            Arena::RandomDraft => "randomdraft",
        }
    }

    /// Start of the link label this arena's bullet carries in a published post.
    pub fn label_prefix(self) -> &'static str {
        match self {
            Arena::Pvp => "PVP",
            Arena::Rookie => "Rookie",
            Arena::RandomDraft => "Random Draft",
        }
    }

    /// Arena whose label prefix starts `label`, if any.
    pub fn from_label(label: &str) -> Option<Arena> {
        Arena::ALL
            .into_iter()
            .find(|a| label.starts_with(a.label_prefix()))
    }
}

impl fmt::Display for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Next round number to query, per arena. Always covers every tracked arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSet {
    rounds: BTreeMap<Arena, u32>,
}

impl CounterSet {
    pub fn new(pvp: u32, rookie: u32, random_draft: u32) -> Self {
        let rounds = BTreeMap::from([
            (Arena::Pvp, pvp),
            (Arena::Rookie, rookie),
            (Arena::RandomDraft, random_draft),
        ]);
        CounterSet { rounds }
    }

    #[cfg(test)]
    pub fn get(&self, arena: Arena) -> u32 {
        // Every arena is inserted by the constructor.
        self.rounds[&arena]
    }

    /// `(arena, round)` pairs in canonical arena order.
    pub fn iter(&self) -> impl Iterator<Item = (Arena, u32)> + '_ {
        self.rounds.iter().map(|(a, r)| (*a, *r))
    }
}

impl fmt::Display for CounterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(a, r)| format!("{a}={r}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Display data for one completed arena round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub arena: Arena,
    /// "<arena title> Round <n>", also the link label the next run parses
    pub description: String,
    pub match_url: String,
    pub deck_url: String,
}

/// Result of asking the match API for a single round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Found(MatchResult),
    NotFound,
}

/// Result of fetching every tracked arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// One result per arena, in canonical order
    Ready(Vec<MatchResult>),
    /// At least one arena has no new round yet
    NoUpdate,
}

/// A formatted Reddit self post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub body: String,
}

/// A post accepted by the platform
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmittedPost {
    /// Base36 post id, e.g. "3wen1k"
    pub id: String,
    pub url: String,
}
