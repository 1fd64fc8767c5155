pub mod aggregator_feed;
pub mod feed_collection;

pub use aggregator_feed::{AggregatorFeed, Download, FeedReport, TransferStatus};
pub use feed_collection::{dedup_sources, FeedCollection, RunOptions, RunPhase, RunSummary};
