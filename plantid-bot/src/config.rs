use crate::plantnet::DEFAULT_BASE_URL;
use crate::types::{BotError, Credentials, HttpConfig, Result, SortOrder};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Parser)]
#[command(
    name = "plantid-bot",
    version,
    about = "Identifies plants in new community posts and comments the result",
    args_override_self = true
)]
pub struct BotArgs {
    /// Base URL of the instance, e.g. https://mander.xyz
    #[arg(long, env = "PLANTID_INSTANCE_URL")]
    pub instance_url: String,

    /// Community to watch, e.g. plantid
    #[arg(long, env = "PLANTID_COMMUNITY")]
    pub community: String,

    #[arg(long, env = "PLANTID_USERNAME")]
    pub username: String,

    #[arg(long, env = "PLANTID_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, env = "PLANTNET_API_KEY", hide_env_values = true)]
    pub plantnet_api_key: String,

    #[arg(long, env = "PLANTNET_URL", default_value = DEFAULT_BASE_URL)]
    pub plantnet_url: String,

    /// Seconds to wait between polls
    #[arg(long, env = "PLANTID_POLLING_TIME", default_value_t = 30)]
    pub polling_time: u64,

    /// Seconds to wait after a network fault before logging in again
    #[arg(long, env = "PLANTID_RETRY_TIME", default_value_t = 10)]
    pub retry_time: u64,

    /// Growth factor for the retry delay across consecutive faults
    #[arg(long, env = "PLANTID_RETRY_MULTIPLIER", default_value_t = 1.0)]
    pub retry_multiplier: f64,

    /// Upper bound for the retry delay, in seconds
    #[arg(long, env = "PLANTID_RETRY_MAX", default_value_t = 300)]
    pub retry_max: u64,

    /// Number of newest posts fetched per poll
    #[arg(long, env = "PLANTID_POLLING_POST_LIMIT", default_value_t = 20)]
    pub post_limit: u32,

    #[arg(long, env = "PLANTID_SORT", default_value = "New")]
    pub sort: SortOrder,

    /// File recording already processed post ids
    #[arg(long, env = "PLANTID_PROCESSED_FILE", default_value = "processed.json")]
    pub processed_file: PathBuf,

    #[arg(long, env = "PLANTID_HTTP_TIMEOUT", default_value_t = 30)]
    pub http_timeout: u64,

    #[arg(long, env = "PLANTID_USER_AGENT", default_value = "plantid-bot/0.1")]
    pub user_agent: String,

    /// Only handle images uploaded to the instance's own image host
    #[arg(long, env = "PLANTID_HOSTED_ONLY")]
    pub hosted_only: bool,

    /// Log comments instead of posting them
    #[arg(long, env = "PLANTID_DRY_RUN")]
    pub dry_run: bool,
}

/// Immutable settings for one process lifetime.
#[derive(Debug)]
pub struct BotConfig {
    pub instance_url: String,
    pub community: String,
    pub credentials: Credentials,
    pub plantnet_url: String,
    pub plantnet_api_key: String,
    pub polling_time: Duration,
    pub retry: RetryPolicy,
    pub post_limit: u32,
    pub sort: SortOrder,
    pub processed_file: PathBuf,
    pub http: HttpConfig,
    pub hosted_only: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub initial: Duration,
    pub multiplier: f64,
    pub max: Duration,
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial: delay,
            multiplier: 1.0,
            max: delay,
        }
    }
}

impl BotArgs {
    pub fn into_config(self) -> Result<BotConfig> {
        validate_url("instance-url", &self.instance_url)?;
        validate_url("plantnet-url", &self.plantnet_url)?;

        if self.community.trim().is_empty() {
            return Err(BotError::Config("community must not be empty".to_string()));
        }
        if self.polling_time == 0 || self.retry_time == 0 {
            return Err(BotError::Config(
                "polling-time and retry-time must be at least one second".to_string(),
            ));
        }
        if self.post_limit == 0 {
            return Err(BotError::Config("post-limit must be positive".to_string()));
        }
        if self.retry_multiplier.is_nan() || self.retry_multiplier < 1.0 {
            return Err(BotError::Config("retry-multiplier must be >= 1.0".to_string()));
        }

        let retry_initial = Duration::from_secs(self.retry_time);
        Ok(BotConfig {
            instance_url: self.instance_url,
            community: self.community,
            credentials: Credentials {
                username_or_email: self.username,
                password: self.password,
            },
            plantnet_url: self.plantnet_url,
            plantnet_api_key: self.plantnet_api_key,
            polling_time: Duration::from_secs(self.polling_time),
            retry: RetryPolicy {
                initial: retry_initial,
                multiplier: self.retry_multiplier,
                max: Duration::from_secs(self.retry_max).max(retry_initial),
            },
            post_limit: self.post_limit,
            sort: self.sort,
            processed_file: self.processed_file,
            http: HttpConfig {
                user_agent: self.user_agent,
                timeout_seconds: self.http_timeout,
            },
            hosted_only: self.hosted_only,
            dry_run: self.dry_run,
        })
    }
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| BotError::Config(format!("{name}: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(BotError::Config(format!("{name} must be an http(s) URL")));
    }
    Ok(())
}
