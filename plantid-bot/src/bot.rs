use crate::config::{BotConfig, RetryPolicy};
use crate::lemmy::LemmyClient;
use crate::pipeline::{DryRunPublisher, PostPipeline};
use crate::plantnet::PlantNetClient;
use crate::traits::{CommentPublisher, FeedClient};
use crate::types::{BotError, CommentOutcome, ProcessedSet, Result, Session};
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Where the poll loop is. Every `step` moves it along exactly one edge:
///
/// ```text
/// Authenticating -> Polling -> Polling -> ...
///        ^            |
///        |            v
///        +-------- Faulted
/// ```
///
/// Any transient error leads to `Faulted`, which waits and logs in again.
#[derive(Debug)]
pub enum LoopState {
    Authenticating,
    Polling(Session),
    Faulted,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub new: usize,
    pub commented: usize,
    pub skipped: usize,
}

pub struct PlantIdBot {
    config: BotConfig,
    feed: Arc<dyn FeedClient>,
    pipeline: PostPipeline,
    processed: ProcessedSet,
    state: LoopState,
    backoff: ExponentialBackoff,
}

impl PlantIdBot {
    pub fn new(
        config: BotConfig,
        feed: Arc<dyn FeedClient>,
        pipeline: PostPipeline,
        processed: ProcessedSet,
    ) -> Self {
        let backoff = retry_backoff(&config.retry);
        Self {
            config,
            feed,
            pipeline,
            processed,
            state: LoopState::Authenticating,
            backoff,
        }
    }

    /// Loads the processed-post file and wires up the HTTP clients.
    pub fn from_config(config: BotConfig) -> Result<Self> {
        let processed = ProcessedSet::load(&config.processed_file)?;

        let lemmy = Arc::new(LemmyClient::new(&config.instance_url, &config.http)?);
        let plantnet = Arc::new(PlantNetClient::new(
            &config.plantnet_url,
            config.plantnet_api_key.clone(),
            &config.http,
        )?);

        let publisher: Arc<dyn CommentPublisher> = if config.dry_run {
            warn!("Dry run enabled, comments will only be logged");
            Arc::new(DryRunPublisher)
        } else {
            lemmy.clone()
        };

        let pipeline = PostPipeline::new(plantnet, publisher).with_hosted_only(config.hosted_only);
        Ok(Self::new(config, lemmy, pipeline, processed))
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    /// Runs until a fatal error. There is no successful exit.
    pub async fn run(mut self) -> Result<()> {
        info!(
            "Watching {} on {} every {:?}",
            self.config.community, self.config.instance_url, self.config.polling_time
        );
        loop {
            self.step().await?;
        }
    }

    /// Performs one state transition, including any sleep attached to it.
    ///
    /// Transient errors are absorbed into `LoopState::Faulted`; fatal ones
    /// are returned.
    pub async fn step(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, LoopState::Authenticating) {
            LoopState::Authenticating => {
                match self.feed.authenticate(&self.config.credentials).await {
                    Ok(session) => self.state = LoopState::Polling(session),
                    Err(e) => self.fault(e)?,
                }
            }
            LoopState::Polling(session) => match self.poll_once(&session).await {
                Ok(report) => {
                    self.backoff.reset();
                    if report.new > 0 {
                        info!(
                            fetched = report.fetched,
                            commented = report.commented,
                            skipped = report.skipped,
                            "Processed {} new posts",
                            report.new
                        );
                    } else {
                        debug!(fetched = report.fetched, "No new posts");
                    }
                    self.state = LoopState::Polling(session);
                    sleep(self.config.polling_time).await;
                }
                Err(e) => self.fault(e)?,
            },
            LoopState::Faulted => {
                let delay = self
                    .backoff
                    .next_backoff()
                    .unwrap_or(self.config.retry.initial);
                info!("Reconnecting in {:?}", delay);
                sleep(delay).await;
                self.state = LoopState::Authenticating;
            }
        }
        Ok(())
    }

    /// One polling cycle: fetch, then run every unseen post through the
    /// pipeline and record it.
    pub async fn poll_once(&mut self, session: &Session) -> Result<CycleReport> {
        let posts = self
            .feed
            .list_recent_posts(
                session,
                &self.config.community,
                self.config.post_limit,
                self.config.sort,
            )
            .await?;

        let mut report = CycleReport {
            fetched: posts.len(),
            ..Default::default()
        };

        for post in posts {
            if self.processed.contains(post.id) {
                continue;
            }
            report.new += 1;

            match self.pipeline.process(&post, session).await? {
                CommentOutcome::Commented => report.commented += 1,
                CommentOutcome::Skipped(reason) => {
                    debug!("Post {} skipped: {}", post.id, reason);
                    report.skipped += 1;
                }
            }

            // Skipped posts are recorded too, including failed identifications,
            // so they are not retried on every cycle. Only after publish returns.
            self.processed.mark_processed(post.id)?;
        }

        Ok(report)
    }

    fn fault(&mut self, e: BotError) -> Result<()> {
        if e.is_transient() {
            warn!("Cycle aborted: {}", e);
            self.state = LoopState::Faulted;
            Ok(())
        } else {
            error!("Fatal error: {}", e);
            Err(e)
        }
    }
}

fn retry_backoff(policy: &RetryPolicy) -> ExponentialBackoff {
    ExponentialBackoff {
        current_interval: policy.initial,
        initial_interval: policy.initial,
        randomization_factor: 0.0,
        multiplier: policy.multiplier,
        max_interval: policy.max,
        max_elapsed_time: None,
        ..Default::default()
    }
}
