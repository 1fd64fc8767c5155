use crate::domain::DownloadLedger;
use crate::errors::SaugResult;

#[cfg_attr(test, mockall::automock)]
pub trait FeedListStore: Send + Sync {
    /// Configured source URLs, in configuration order.
    fn load(&self) -> SaugResult<Vec<String>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait LedgerStore: Send + Sync {
    fn load(&self) -> SaugResult<DownloadLedger>;
    /// Replace the stored ledger wholesale. Must never leave a partial write.
    fn save(&self, ledger: &DownloadLedger) -> SaugResult<()>;
}
