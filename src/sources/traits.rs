use crate::domain::FeedItem;
use crate::errors::SaugResult;

#[cfg_attr(test, mockall::automock)]
pub trait FeedFetcher: Send + Sync {
    /// Fetch a feed and return its items in feed order
    fn fetch_items(&self, source: &str) -> SaugResult<Vec<FeedItem>>;
}
