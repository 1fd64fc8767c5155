pub mod traits;
pub mod feed_list;
pub mod sqlite;

pub use traits::{FeedListStore, LedgerStore};
pub use feed_list::FileFeedList;
pub use sqlite::{SqliteLedgerStore, SqliteStorage};
