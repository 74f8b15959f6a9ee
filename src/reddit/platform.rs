use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Post, SubmittedPost};

/// An authenticated account on the site the report is published to.
#[async_trait]
pub trait PostingPlatform: Send + Sync {
    /// Body text of the account's most recent self post, if it has one.
    async fn latest_self_post(&self) -> Result<Option<String>>;

    /// Publish `post` to the configured destination.
    async fn submit(&self, post: &Post) -> Result<SubmittedPost>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
