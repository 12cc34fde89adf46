#![allow(dead_code)]

use async_trait::async_trait;
use plantid_bot::{
    BotConfig, BotError, Candidate, CommentPublisher, Credentials, FeedClient, HttpConfig,
    IdentificationResult, Identifier, Post, PostId, Result, RetryPolicy, Session, SortOrder,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub const POLLING_TIME: Duration = Duration::from_secs(30);
pub const RETRY_TIME: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Authenticate,
    ListPosts,
    Identify(String),
    Publish(PostId, String),
}

/// Every fake call, with the (virtual) time it happened.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<(Event, Instant)>>>);

impl EventLog {
    pub fn record(&self, event: Event) {
        self.0.lock().unwrap().push((event, Instant::now()));
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn timed(&self) -> Vec<(Event, Instant)> {
        self.0.lock().unwrap().clone()
    }

    pub fn publishes(&self) -> Vec<(PostId, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Publish(id, text) => Some((id, text)),
                _ => None,
            })
            .collect()
    }
}

pub fn network_error() -> BotError {
    BotError::Network("connection reset by peer".into())
}

pub fn image_post(id: i64) -> Post {
    Post {
        id: PostId(id),
        url: Some(format!("https://mander.xyz/pictrs/image/{id}.jpg")),
    }
}

pub fn rose_result() -> IdentificationResult {
    IdentificationResult {
        best_match: "Rosa rubiginosa".to_string(),
        candidates: vec![Candidate {
            common_name: Some("Sweet-brier".to_string()),
            scientific_name: "Rosa rubiginosa".to_string(),
            score: 0.8532,
        }],
    }
}

/// Scripted feed. Once a script runs dry it logs in fine and returns no posts.
pub struct FakeFeed {
    log: EventLog,
    logins: Mutex<VecDeque<Result<Session>>>,
    pages: Mutex<VecDeque<Result<Vec<Post>>>>,
}

impl FakeFeed {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            logins: Mutex::new(VecDeque::new()),
            pages: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_login(self, result: Result<Session>) -> Self {
        self.logins.lock().unwrap().push_back(result);
        self
    }

    pub fn with_page(self, result: Result<Vec<Post>>) -> Self {
        self.pages.lock().unwrap().push_back(result);
        self
    }
}

#[async_trait]
impl FeedClient for FakeFeed {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<Session> {
        self.log.record(Event::Authenticate);
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Session::new("test-jwt")))
    }

    async fn list_recent_posts(
        &self,
        _session: &Session,
        _community: &str,
        _limit: u32,
        _sort: SortOrder,
    ) -> Result<Vec<Post>> {
        self.log.record(Event::ListPosts);
        self.pages.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Answers with scripted results, then with `rose_result()`.
pub struct FakeIdentifier {
    log: EventLog,
    results: Mutex<VecDeque<Result<IdentificationResult>>>,
}

impl FakeIdentifier {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            results: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_result(self, result: Result<IdentificationResult>) -> Self {
        self.results.lock().unwrap().push_back(result);
        self
    }
}

#[async_trait]
impl Identifier for FakeIdentifier {
    async fn identify(&self, image_url: &str) -> Result<IdentificationResult> {
        self.log.record(Event::Identify(image_url.to_string()));
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(rose_result()))
    }
}

/// Succeeds unless a failure was scripted. Failed calls are still logged.
pub struct FakePublisher {
    log: EventLog,
    outcomes: Mutex<VecDeque<Result<()>>>,
}

impl FakePublisher {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            outcomes: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_outcome(self, outcome: Result<()>) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }
}

#[async_trait]
impl CommentPublisher for FakePublisher {
    async fn publish(&self, _session: &Session, post_id: PostId, text: &str) -> Result<()> {
        self.log.record(Event::Publish(post_id, text.to_string()));
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

pub fn test_config(processed_file: &Path) -> BotConfig {
    BotConfig {
        instance_url: "https://mander.xyz".to_string(),
        community: "plantid".to_string(),
        credentials: Credentials {
            username_or_email: "plantbot".to_string(),
            password: "hunter2".to_string(),
        },
        plantnet_url: "https://my-api.plantnet.org".to_string(),
        plantnet_api_key: "test-key".to_string(),
        polling_time: POLLING_TIME,
        retry: RetryPolicy::fixed(RETRY_TIME),
        post_limit: 20,
        sort: SortOrder::New,
        processed_file: processed_file.to_path_buf(),
        http: HttpConfig::default(),
        hosted_only: false,
        dry_run: false,
    }
}
