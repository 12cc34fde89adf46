pub mod defs;
pub mod state;

pub use defs::{
    Candidate, CommentOutcome, Credentials, IdentificationResult, Post, PostId, Session, SkipReason,
    SortOrder,
};
pub use state::{ProcessedSet, StoreError};
