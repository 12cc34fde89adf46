use crate::comment::render_comment;
use crate::traits::{CommentPublisher, Identifier};
use crate::types::{BotError, CommentOutcome, Post, PostId, Result, Session, SkipReason};
use crate::utils::url::{is_hosted_image, is_supported_image};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Turns one post into at most one published comment.
///
/// Nothing in here retries. Transient errors from the identification call or
/// the publish call are returned as-is so the poll loop can abort the cycle.
pub struct PostPipeline {
    identifier: Arc<dyn Identifier>,
    publisher: Arc<dyn CommentPublisher>,
    hosted_only: bool,
}

impl PostPipeline {
    pub fn new(identifier: Arc<dyn Identifier>, publisher: Arc<dyn CommentPublisher>) -> Self {
        Self {
            identifier,
            publisher,
            hosted_only: false,
        }
    }

    /// Only handle images served by the instance's own image host.
    pub fn with_hosted_only(mut self, hosted_only: bool) -> Self {
        self.hosted_only = hosted_only;
        self
    }

    /// The filtering steps, without any network call.
    pub fn screen(&self, post: &Post) -> std::result::Result<String, SkipReason> {
        let url = post.url.as_deref().ok_or(SkipReason::NoImage)?;
        if !is_supported_image(url) {
            return Err(SkipReason::NotAnImage);
        }
        if self.hosted_only && !is_hosted_image(url) {
            return Err(SkipReason::NotHosted);
        }
        Ok(url.to_string())
    }

    pub async fn process(&self, post: &Post, session: &Session) -> Result<CommentOutcome> {
        let image_url = match self.screen(post) {
            Ok(url) => url,
            Err(reason) => {
                debug!("Skipping post {}: {}", post.id, reason);
                return Ok(CommentOutcome::Skipped(reason));
            }
        };

        let result = match self.identifier.identify(&image_url).await {
            Ok(result) => result,
            Err(BotError::IdentificationUnavailable { status_code, message }) => {
                info!(post_id = %post.id, status_code, "No identification for post: {}", message);
                return Ok(CommentOutcome::Skipped(SkipReason::IdentificationFailed));
            }
            Err(e) => return Err(e),
        };

        let text = render_comment(&result);
        self.publisher.publish(session, post.id, &text).await?;

        info!(post_id = %post.id, best_match = %result.best_match, "Commented on post");
        Ok(CommentOutcome::Commented)
    }
}

/// Logs the rendered comment instead of posting it.
pub struct DryRunPublisher;

#[async_trait]
impl CommentPublisher for DryRunPublisher {
    async fn publish(&self, _session: &Session, post_id: PostId, text: &str) -> Result<()> {
        info!("[dry run] would comment on post {}:\n{}", post_id, text);
        Ok(())
    }
}
