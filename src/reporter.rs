use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

use crate::duel::{fetch_matches, MatchSource};
use crate::models::{Arena, FetchOutcome, Post, SubmittedPost};
use crate::reddit::PostingPlatform;
use crate::report::{format_post, recover_counters, seeded_counters};

/// Per-run settings taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Fallback rounds for arenas the previous post does not mention
    pub start_rounds: BTreeMap<Arena, u32>,
    pub contact_line: String,
    /// Format the post but never submit it
    pub dry_run: bool,
    /// Previous post body to use instead of the account history
    pub previous_post: Option<String>,
}

/// How a run ended, short of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Published(SubmittedPost),
    /// Some arena has no new round yet; nothing was posted
    NoUpdate,
    /// The post that would have been submitted
    DryRun(Post),
    /// Submission failed; the next scheduled run retries from the same counters
    PublishFailed(String),
}

/// Recover counters, fetch every arena, then format and publish one post.
pub struct Reporter<'a> {
    source: &'a dyn MatchSource,
    platform: Option<&'a dyn PostingPlatform>,
    options: ReportOptions,
}

impl<'a> Reporter<'a> {
    pub fn new(
        source: &'a dyn MatchSource,
        platform: Option<&'a dyn PostingPlatform>,
        options: ReportOptions,
    ) -> Self {
        Reporter {
            source,
            platform,
            options,
        }
    }

    pub async fn run(&self, today: NaiveDate) -> Result<RunOutcome> {
        let previous = self.previous_post().await?;
        let counters = match previous.as_deref() {
            Some(text) => recover_counters(text, &self.options.start_rounds)?,
            None => {
                warn!("No previous post found, using configured start rounds");
                seeded_counters(&self.options.start_rounds)?
            }
        };
        info!("Next rounds to check: {}", counters);

        let results = match fetch_matches(self.source, &counters).await? {
            FetchOutcome::Ready(results) => results,
            FetchOutcome::NoUpdate => return Ok(RunOutcome::NoUpdate),
        };

        let post = format_post(&results, today, &self.options.contact_line);

        let platform = match self.platform {
            Some(p) if !self.options.dry_run => p,
            _ => {
                info!("Dry run, not submitting '{}'", post.title);
                return Ok(RunOutcome::DryRun(post));
            }
        };

        match platform.submit(&post).await {
            Ok(submitted) => {
                info!("Published {} ({})", submitted.id, submitted.url);
                Ok(RunOutcome::Published(submitted))
            }
            Err(e) => {
                error!("Failed to publish to {}: {:#}", platform.name(), e);
                Ok(RunOutcome::PublishFailed(format!("{:#}", e)))
            }
        }
    }

    async fn previous_post(&self) -> Result<Option<String>> {
        if let Some(text) = &self.options.previous_post {
            return Ok(Some(text.clone()));
        }
        match self.platform {
            Some(p) => p.latest_self_post().await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReporterError;
    use crate::models::{MatchResult, RoundOutcome};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Every round up to and including `latest` exists.
    struct StubArena {
        latest: u32,
    }

    #[async_trait]
    impl MatchSource for StubArena {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch_round(&self, arena: Arena, round: u32) -> Result<RoundOutcome> {
            if round > self.latest {
                return Ok(RoundOutcome::NotFound);
            }
            let title = match arena {
                Arena::Pvp => "PVP Arena",
                Arena::Rookie => "Rookie Arena",
                Arena::RandomDraft => "Random Draft Arena",
            };
            Ok(RoundOutcome::Found(MatchResult {
                arena,
                description: format!("{} Round {}", title, round),
                match_url: format!("http://devcat.nexon.com/duel/us/arena/view?{}.{}.1", arena.api_id(), round),
                deck_url: format!("http://devcat.nexon.com/duel/us/deck?{}{}", arena.slug(), round),
            }))
        }
    }

    struct StubPlatform {
        previous: Option<String>,
        fail: bool,
        submitted: Mutex<Vec<Post>>,
    }

    impl StubPlatform {
        fn new(previous: Option<&str>) -> Self {
            StubPlatform {
                previous: previous.map(str::to_string),
                fail: false,
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PostingPlatform for StubPlatform {
        fn name(&self) -> &str {
            "stub"
        }

        async fn latest_self_post(&self) -> Result<Option<String>> {
            Ok(self.previous.clone())
        }

        async fn submit(&self, post: &Post) -> Result<SubmittedPost> {
            if self.fail {
                return Err(ReporterError::Publish("RATELIMIT".to_string()).into());
            }
            self.submitted.lock().unwrap().push(post.clone());
            Ok(SubmittedPost {
                id: "3wen1k".to_string(),
                url: "https://www.reddit.com/r/test/comments/3wen1k/".to_string(),
            })
        }
    }

    const PREVIOUS: &str =
        "* [PVP Arena Round 11](a) - [Champion's Deck](b)\n\n* [Rookie Arena Round 11](c) - [Champion's Deck](d)\n\n* [Random Draft Arena Round 21](e) - [Champion's Deck](f)";

    fn options() -> ReportOptions {
        ReportOptions {
            contact_line: "contact".to_string(),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 12, 13).unwrap()
    }

    #[tokio::test]
    async fn test_publishes_next_rounds() {
        let source = StubArena { latest: 30 };
        let platform = StubPlatform::new(Some(PREVIOUS));
        let reporter = Reporter::new(&source, Some(&platform), options());

        let outcome = reporter.run(today()).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Published(ref p) if p.id == "3wen1k"));

        let submitted = platform.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].title, "Dec 13 2015 Arena TOP 10s");
        assert!(submitted[0].body.contains("[PVP Arena Round 12]"));
        assert!(submitted[0].body.contains("[Rookie Arena Round 12]"));
        assert!(submitted[0].body.contains("[Random Draft Arena Round 22]"));
    }

    #[tokio::test]
    async fn test_no_update_posts_nothing() {
        // Random Draft round 22 does not exist yet
        let source = StubArena { latest: 12 };
        let platform = StubPlatform::new(Some(PREVIOUS));
        let reporter = Reporter::new(&source, Some(&platform), options());

        assert_eq!(reporter.run(today()).await.unwrap(), RunOutcome::NoUpdate);
        assert!(platform.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_is_reported_not_fatal() {
        let source = StubArena { latest: 30 };
        let mut platform = StubPlatform::new(Some(PREVIOUS));
        platform.fail = true;
        let reporter = Reporter::new(&source, Some(&platform), options());

        let outcome = reporter.run(today()).await.unwrap();
        assert!(matches!(outcome, RunOutcome::PublishFailed(ref m) if m.contains("RATELIMIT")));
    }

    #[tokio::test]
    async fn test_dry_run_never_submits() {
        let source = StubArena { latest: 30 };
        let platform = StubPlatform::new(Some(PREVIOUS));
        let mut opts = options();
        opts.dry_run = true;
        let reporter = Reporter::new(&source, Some(&platform), opts);

        let outcome = reporter.run(today()).await.unwrap();
        assert!(matches!(outcome, RunOutcome::DryRun(ref p) if p.body.contains("Round 22")));
        assert!(platform.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_previous_post_override_without_platform() {
        let source = StubArena { latest: 30 };
        let mut opts = options();
        opts.previous_post = Some(PREVIOUS.to_string());
        let reporter = Reporter::new(&source, None, opts);

        let outcome = reporter.run(today()).await.unwrap();
        assert!(matches!(outcome, RunOutcome::DryRun(ref p) if p.body.contains("[PVP Arena Round 12]")));
    }

    #[tokio::test]
    async fn test_no_history_without_seeds_fails() {
        let source = StubArena { latest: 30 };
        let platform = StubPlatform::new(None);
        let reporter = Reporter::new(&source, Some(&platform), options());

        let err = reporter.run(today()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReporterError>(),
            Some(ReporterError::NoPreviousPost)
        ));
    }

    #[tokio::test]
    async fn test_no_history_with_seeds_starts_from_seeds() {
        let source = StubArena { latest: 30 };
        let platform = StubPlatform::new(None);
        let mut opts = options();
        opts.start_rounds =
            BTreeMap::from([(Arena::Pvp, 11), (Arena::Rookie, 11), (Arena::RandomDraft, 21)]);
        let reporter = Reporter::new(&source, Some(&platform), opts);

        reporter.run(today()).await.unwrap();
        let submitted = platform.submitted.lock().unwrap();
        assert!(submitted[0].body.contains("[Random Draft Arena Round 21]"));
    }
}
