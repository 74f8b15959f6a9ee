use thiserror::Error;

use crate::models::Arena;

/// Failures the reporter distinguishes. "Round not found" is not one of them;
/// it is a normal [`crate::models::RoundOutcome::NotFound`].
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Reddit authentication failed: {0}")]
    Auth(String),

    #[error("no previous post to recover round counters from, and no start rounds configured")]
    NoPreviousPost,

    #[error(
        "previous post has no round label for the {0} arena; set --start-round-{0} to seed it"
    )]
    MissingRound(Arena),

    #[error("previous post reports {0} round {1}, the last representable round")]
    RoundOverflow(Arena, u32),

    #[error("malformed {arena} round {round} payload: {reason}")]
    MalformedPayload {
        arena: Arena,
        round: u32,
        reason: String,
    },

    #[error("Reddit rejected the post: {0}")]
    Publish(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}
