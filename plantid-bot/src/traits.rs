use crate::types::{Credentials, IdentificationResult, Post, PostId, Result, Session, SortOrder};
use async_trait::async_trait;

/// Read side of the feed platform.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fails with `BotError::Auth` when the platform rejects the credentials.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session>;

    /// The `limit` most recent posts of `community`, in `sort` order.
    async fn list_recent_posts(
        &self,
        session: &Session,
        community: &str,
        limit: u32,
        sort: SortOrder,
    ) -> Result<Vec<Post>>;
}

#[async_trait]
pub trait Identifier: Send + Sync {
    /// Fails with `BotError::IdentificationUnavailable` when the service
    /// answers with an error payload instead of results.
    async fn identify(&self, image_url: &str) -> Result<IdentificationResult>;
}

/// Posting is not idempotent: every successful call creates a new comment.
#[async_trait]
pub trait CommentPublisher: Send + Sync {
    async fn publish(&self, session: &Session, post_id: PostId, text: &str) -> Result<()>;
}
