//! Hashtag trend tracking for posts from a single region.
//!
//! [`TrendTracker`] keeps every accepted [`Post`] and a running count per
//! hashtag, and answers top-N, trailing-window and hour-over-hour growth
//! queries. [`SharedTracker`] and [`IngestPool`] put it behind a lock and a
//! worker pool for multi-threaded ingestion.

pub mod clock;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod post;
pub mod report;
pub mod shared;
pub mod statistic;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TrackerConfig;
pub use error::{Result, TrendError};
pub use pipeline::IngestPool;
pub use post::Post;
pub use shared::SharedTracker;
pub use statistic::{HashtagCounts, Trend};
pub use tracker::TrendTracker;
