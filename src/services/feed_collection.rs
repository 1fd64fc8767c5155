use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{DownloadLedger, RunMode};
use crate::errors::{SaugError, SaugResult};
use crate::services::aggregator_feed::{AggregatorFeed, FeedReport, TransferStatus};
use crate::sources::FeedFetcher;
use crate::storage::traits::{FeedListStore, LedgerStore};
use crate::transfer::Downloader;

/// Where a run stands. Only `Saved` counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Uninitialized,
    ConfigLoaded,
    FeedsBuilt,
    Processed,
    Saved,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub directory: PathBuf,
    pub min_date: Option<DateTime<Utc>>,
    pub only_new: bool,
    pub mode: RunMode,
    pub feed_filter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub phase: RunPhase,
    pub reports: Vec<FeedReport>,
}

impl RunSummary {
    fn tally(&self, status: fn(&TransferStatus) -> bool) -> usize {
        self.reports.iter().map(|r| r.count(status)).sum()
    }

    pub fn transferred(&self) -> usize {
        self.tally(|s| matches!(s, TransferStatus::Transferred))
    }

    pub fn updated(&self) -> usize {
        self.tally(|s| matches!(s, TransferStatus::Updated | TransferStatus::DryRun))
    }

    pub fn failed(&self) -> usize {
        self.tally(|s| matches!(s, TransferStatus::Failed(_)))
    }

    pub fn failed_feeds(&self) -> usize {
        self.reports.iter().filter(|r| r.fetch_failed).count()
    }
}

/// All configured feeds plus the ledger they share.
pub struct FeedCollection<L: FeedListStore, S: LedgerStore, F: FeedFetcher, D: Downloader> {
    feed_list: L,
    ledger_store: S,
    fetcher: F,
    downloader: D,
}

impl<L, S, F, D> FeedCollection<L, S, F, D>
where
    L: FeedListStore,
    S: LedgerStore,
    F: FeedFetcher,
    D: Downloader,
{
    pub fn new(feed_list: L, ledger_store: S, fetcher: F, downloader: D) -> Self {
        Self {
            feed_list,
            ledger_store,
            fetcher,
            downloader,
        }
    }

    /// Configured sources, without touching the ledger or the network.
    pub fn list_feeds(&self) -> SaugResult<Vec<String>> {
        Ok(dedup_sources(self.feed_list.load()?))
    }

    /// Load config and ledger, process every feed, then save the ledger.
    ///
    /// Saving is the single commit point: any error before it leaves the
    /// stored ledger exactly as it was.
    pub fn run(&self, options: &RunOptions) -> SaugResult<RunSummary> {
        let mut phase = RunPhase::Uninitialized;
        debug!("Run phase: {:?}", phase);

        let sources = restrict(self.list_feeds()?, options.feed_filter.as_deref())?;
        let mut ledger = self.ledger_store.load()?;
        phase = advance(phase, RunPhase::ConfigLoaded);

        let mut feeds = build_feeds(&sources, &mut ledger, options.mode);
        phase = advance(phase, RunPhase::FeedsBuilt);

        let reports: Vec<FeedReport> = feeds
            .iter_mut()
            .map(|feed| {
                feed.download_conditional(
                    &self.fetcher,
                    &self.downloader,
                    &options.directory,
                    options.min_date,
                    options.only_new,
                )
            })
            .collect();

        for feed in feeds {
            let source = feed.source().to_string();
            ledger.restore(&source, feed.into_history());
        }
        phase = advance(phase, RunPhase::Processed);

        self.ledger_store.save(&ledger)?;
        phase = advance(phase, RunPhase::Saved);

        let summary = RunSummary { phase, reports };
        info!(
            "Processed {} feeds: {} downloaded, {} updated, {} failed",
            summary.reports.len(),
            summary.transferred(),
            summary.updated(),
            summary.failed()
        );

        Ok(summary)
    }
}

fn advance(from: RunPhase, to: RunPhase) -> RunPhase {
    debug!("Run phase: {:?} -> {:?}", from, to);
    to
}

fn build_feeds(
    sources: &[String],
    ledger: &mut DownloadLedger,
    mode: RunMode,
) -> Vec<AggregatorFeed> {
    sources
        .iter()
        .map(|source| AggregatorFeed::new(source.clone(), ledger.take(source), mode))
        .collect()
}

/// Drop repeated sources, keeping the first occurrence.
pub fn dedup_sources(sources: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Narrow the sources to the one named by `filter`.
///
/// An exact URL wins; otherwise exactly one source must contain the filter
/// (case-insensitive).
fn restrict(sources: Vec<String>, filter: Option<&str>) -> SaugResult<Vec<String>> {
    let Some(filter) = filter else {
        return Ok(sources);
    };

    if let Some(exact) = sources.iter().find(|s| s.as_str() == filter) {
        return Ok(vec![exact.clone()]);
    }

    let needle = filter.to_lowercase();
    let matches: Vec<String> = sources
        .into_iter()
        .filter(|s| s.to_lowercase().contains(&needle))
        .collect();

    match matches.len() {
        0 => Err(SaugError::FeedNotFound(filter.to_string())),
        1 => Ok(matches),
        n => Err(SaugError::InvalidInput(format!(
            "'{}' matches {} feeds: {}",
            filter,
            n,
            matches.join(", ")
        ))),
    }
}
