pub mod types;
pub mod traits;
pub mod config;
pub mod lemmy;
pub mod plantnet;
pub mod comment;
pub mod utils;
pub mod pipeline;
pub mod bot;

pub use types::*;
pub use config::{BotArgs, BotConfig, RetryPolicy};
pub use traits::{CommentPublisher, FeedClient, Identifier};
pub use lemmy::LemmyClient;
pub use plantnet::PlantNetClient;
pub use pipeline::{DryRunPublisher, PostPipeline};
pub use bot::{CycleReport, LoopState, PlantIdBot};
