use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier the feed platform assigns to a post. Stable and unique.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PostId {
    fn from(id: i64) -> Self {
        PostId(id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// First common name reported by the service, if any.
    pub common_name: Option<String>,
    pub scientific_name: String,
    /// Confidence in `[0, 1]`.
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdentificationResult {
    pub best_match: String,
    /// In the order the service returned them.
    pub candidates: Vec<Candidate>,
}

pub struct Credentials {
    pub username_or_email: String,
    pub password: String,
}

// Keep the password out of Debug output so it never reaches the logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username_or_email", &self.username_or_email)
            .field("password", &"***")
            .finish()
    }
}

/// Authentication token for the feed platform. Lives only in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub jwt: String,
}

impl Session {
    pub fn new(jwt: impl Into<String>) -> Self {
        Self { jwt: jwt.into() }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session(***)")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    New,
    Old,
    Hot,
    Active,
    NewComments,
    MostComments,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::New => "New",
            SortOrder::Old => "Old",
            SortOrder::Hot => "Hot",
            SortOrder::Active => "Active",
            SortOrder::NewComments => "NewComments",
            SortOrder::MostComments => "MostComments",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "new" => Ok(SortOrder::New),
            "old" => Ok(SortOrder::Old),
            "hot" => Ok(SortOrder::Hot),
            "active" => Ok(SortOrder::Active),
            "newcomments" => Ok(SortOrder::NewComments),
            "mostcomments" => Ok(SortOrder::MostComments),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoImage,
    NotAnImage,
    /// The image is not served by the platform's own image host.
    NotHosted,
    IdentificationFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::NoImage => "post has no url",
            SkipReason::NotAnImage => "url is not a supported image",
            SkipReason::NotHosted => "image is not hosted by the instance",
            SkipReason::IdentificationFailed => "identification service returned no result",
        };
        f.write_str(reason)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentOutcome {
    Commented,
    Skipped(SkipReason),
}

// Lifecycle note:
// A Post is consumed by exactly one pipeline run and an IdentificationResult
// never outlives it. Only PostIds are persisted, through ProcessedSet.
