pub use interfaces::defs::{
    Candidate, CommentOutcome, Credentials, IdentificationResult, Post, PostId, Session,
    SkipReason, SortOrder,
};
pub use interfaces::state::{ProcessedSet, StoreError};

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "plantid-bot/0.1".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl HttpConfig {
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(std::time::Duration::from_secs(self.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;
        Ok(client)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("identification unavailable (status {status_code}): {message}")]
    IdentificationUnavailable { status_code: u16, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BotError {
    /// Transient errors abort the current cycle and restart it after a delay.
    /// Everything else is either handled per post or ends the process.
    pub fn is_transient(&self) -> bool {
        matches!(self, BotError::Network(_) | BotError::Api { .. })
    }
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        BotError::Network(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
