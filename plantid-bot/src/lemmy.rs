use crate::traits::{CommentPublisher, FeedClient};
use crate::types::{BotError, Credentials, HttpConfig, Post, PostId, Result, Session, SortOrder};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// HTTP client for the feed platform's v3 API.
pub struct LemmyClient {
    client: Client,
    api_base: String,
}

#[derive(Serialize)]
struct LoginForm<'a> {
    username_or_email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    jwt: Option<String>,
}

#[derive(Deserialize)]
struct PostListResponse {
    posts: Vec<PostView>,
}

#[derive(Deserialize)]
struct PostView {
    post: PostRecord,
}

#[derive(Deserialize)]
struct PostRecord {
    id: i64,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Serialize)]
struct CreateComment<'a> {
    auth: &'a str,
    content: &'a str,
    post_id: PostId,
}

impl LemmyClient {
    pub fn new(instance_url: &str, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: http.build_client()?,
            api_base: format!("{}/api/v3", instance_url.trim_end_matches('/')),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn api_error(response: Response) -> BotError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        BotError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl FeedClient for LemmyClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        debug!("Logging in as {}", credentials.username_or_email);

        let response = self
            .client
            .post(self.endpoint("user/login"))
            .json(&LoginForm {
                username_or_email: &credentials.username_or_email,
                password: &credentials.password,
            })
            .send()
            .await?;

        // Only a rejection of the credentials themselves is fatal. Throttling
        // and timeouts go through the transient path.
        let status = response.status();
        if matches!(status.as_u16(), 400 | 401 | 403) {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Auth(format!("HTTP {}: {}", status.as_u16(), body)));
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        let login: LoginResponse = response.json().await?;
        match login.jwt {
            Some(jwt) if !jwt.is_empty() => {
                info!("Logged in as {}", credentials.username_or_email);
                Ok(Session::new(jwt))
            }
            _ => Err(BotError::Auth(
                "login succeeded but no token was issued (unverified email or pending application?)"
                    .to_string(),
            )),
        }
    }

    async fn list_recent_posts(
        &self,
        session: &Session,
        community: &str,
        limit: u32,
        sort: SortOrder,
    ) -> Result<Vec<Post>> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(self.endpoint("post/list"))
            .bearer_auth(&session.jwt)
            .query(&[
                ("auth", session.jwt.as_str()),
                ("limit", limit.as_str()),
                ("sort", sort.as_str()),
                ("community_name", community),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::api_error(response).await;
            warn!("Listing posts of {} failed: {}", community, err);
            return Err(err);
        }

        let list: PostListResponse = response.json().await?;
        let posts: Vec<Post> = list
            .posts
            .into_iter()
            .map(|view| Post {
                id: PostId(view.post.id),
                url: view.post.url,
            })
            .collect();

        debug!("Fetched {} posts from {}", posts.len(), community);
        Ok(posts)
    }
}

#[async_trait]
impl CommentPublisher for LemmyClient {
    async fn publish(&self, session: &Session, post_id: PostId, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("comment"))
            .bearer_auth(&session.jwt)
            .json(&CreateComment {
                auth: &session.jwt,
                content: text,
                post_id,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::api_error(response).await;
            if let BotError::Api { status, .. } = &err {
                if (400..500).contains(status) {
                    warn!(
                        post_id = %post_id,
                        "Comment rejected with HTTP {}; the post stays unprocessed and will be retried",
                        status
                    );
                }
            }
            return Err(err);
        }

        info!("Posted comment on post {}", post_id);
        Ok(())
    }
}
