use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{FeedItem, RunMode, SourceHistory};
use crate::sources::FeedFetcher;
use crate::transfer::Downloader;

/// Cached parse result for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FetchState {
    Pending,
    Loaded(Vec<FeedItem>),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    Transferred,
    /// Update mode: marked as seen, nothing fetched.
    Updated,
    /// Debug mode: transfer suppressed.
    DryRun,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub identity: String,
    pub destination: Option<PathBuf>,
    pub status: TransferStatus,
    pub recorded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedReport {
    pub source: String,
    pub fetch_failed: bool,
    pub items: usize,
    pub downloads: Vec<Download>,
}

impl FeedReport {
    pub fn selected(&self) -> usize {
        self.downloads.len()
    }

    pub fn count(&self, status: fn(&TransferStatus) -> bool) -> usize {
        self.downloads.iter().filter(|d| status(&d.status)).count()
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, TransferStatus::Failed(_)))
    }

    pub fn recorded(&self) -> usize {
        self.downloads.iter().filter(|d| d.recorded).count()
    }
}

/// One configured source: its lazily fetched items and the identities
/// already downloaded from it.
pub struct AggregatorFeed {
    source: String,
    state: FetchState,
    history: SourceHistory,
    mode: RunMode,
}

impl AggregatorFeed {
    pub fn new(source: impl Into<String>, history: SourceHistory, mode: RunMode) -> Self {
        Self {
            source: source.into(),
            state: FetchState::Pending,
            history,
            mode,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn history(&self) -> &SourceHistory {
        &self.history
    }

    pub fn into_history(self) -> SourceHistory {
        self.history
    }

    /// Fetch the feed unless already cached. `None` if the fetch failed.
    pub fn items<F: FeedFetcher + ?Sized>(&mut self, fetcher: &F) -> Option<&[FeedItem]> {
        if matches!(self.state, FetchState::Pending) {
            self.state = match fetcher.fetch_items(&self.source) {
                Ok(items) => {
                    debug!("{}: {} items", self.source, items.len());
                    FetchState::Loaded(items)
                }
                Err(e) => {
                    warn!("Error fetching {}: {}", self.source, e);
                    FetchState::Failed
                }
            };
        }
        self.cached_items()
    }

    fn cached_items(&self) -> Option<&[FeedItem]> {
        match &self.state {
            FetchState::Loaded(items) => Some(items),
            FetchState::Pending | FetchState::Failed => None,
        }
    }

    /// Whether an item should be downloaded right now.
    ///
    /// It must be published strictly after `min_date` (if any) and, when
    /// `only_new` is set, its identity must not be in this source's history.
    pub fn qualifies(
        &self,
        item: &FeedItem,
        min_date: Option<DateTime<Utc>>,
        only_new: bool,
    ) -> bool {
        let Some(identity) = item.identity() else {
            debug!("{}: skipping item without guid or enclosure", self.source);
            return false;
        };
        if item.enclosure_url.is_none() {
            debug!("{}: skipping {} (no enclosure)", self.source, identity);
            return false;
        }
        if !item.published_after(min_date) {
            return false;
        }
        !(only_new && self.history.contains(identity))
    }

    /// Download every qualifying item, in feed order.
    pub fn download_conditional<F, D>(
        &mut self,
        fetcher: &F,
        downloader: &D,
        directory: &Path,
        min_date: Option<DateTime<Utc>>,
        only_new: bool,
    ) -> FeedReport
    where
        F: FeedFetcher + ?Sized,
        D: Downloader + ?Sized,
    {
        let mut report = FeedReport {
            source: self.source.clone(),
            ..Default::default()
        };

        let Some(items) = self.items(fetcher) else {
            report.fetch_failed = true;
            return report;
        };
        report.items = items.len();

        // Checked item by item so a guid repeated within the feed is only
        // fetched once.
        for item_nr in 0..report.items {
            let selected = self
                .cached_items()
                .and_then(|items| items.get(item_nr))
                .map(|item| self.qualifies(item, min_date, only_new))
                .unwrap_or(false);

            if selected {
                if let Some(download) = self.download(item_nr, downloader, directory) {
                    report.downloads.push(download);
                }
            }
        }

        report
    }

    /// Transfer one cached item and record its identity.
    ///
    /// Returns `None` if the index is out of range or the item cannot be
    /// identified.
    pub fn download<D: Downloader + ?Sized>(
        &mut self,
        item_nr: usize,
        downloader: &D,
        directory: &Path,
    ) -> Option<Download> {
        let item = self.cached_items()?.get(item_nr)?;
        let identity = item.identity()?.to_string();
        let url = item.enclosure_url.clone()?;
        let destination = item.file_name().map(|name| directory.join(name));

        let status = if self.mode.update {
            info!("Updated {}", identity);
            TransferStatus::Updated
        } else if self.mode.debug {
            info!(
                "Would download {} to {}",
                url,
                display_destination(&destination)
            );
            TransferStatus::DryRun
        } else {
            match &destination {
                None => {
                    let reason = "enclosure URL has no file name".to_string();
                    warn!("Failed to download {}: {}", url, reason);
                    TransferStatus::Failed(reason)
                }
                Some(path) => match downloader.transfer(&url, path) {
                    Ok(()) => {
                        info!("Downloaded {} to {}", url, path.display());
                        TransferStatus::Transferred
                    }
                    Err(e) => {
                        warn!("Failed to download {}: {}", url, e);
                        TransferStatus::Failed(e.to_string())
                    }
                },
            }
        };

        let succeeded = !matches!(status, TransferStatus::Failed(_));
        let recorded =
            self.mode.record_policy.should_record(succeeded) && self.history.record(&identity);
        if !succeeded && !recorded {
            debug!("{}: {} left unrecorded for retry", self.source, identity);
        }

        Some(Download {
            identity,
            destination,
            status,
            recorded,
        })
    }
}

fn display_destination(destination: &Option<PathBuf>) -> String {
    destination
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<no file name>".to_string())
}
