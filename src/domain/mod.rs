pub mod item;
pub mod ledger;
pub mod policy;

pub use item::FeedItem;
pub use ledger::{DownloadLedger, SourceHistory};
pub use policy::{RecordPolicy, RunMode};
