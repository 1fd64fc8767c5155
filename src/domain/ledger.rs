use std::collections::{BTreeMap, HashSet};

/// Identities already downloaded for one source, in download order.
///
/// Appending is idempotent so an identity never appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceHistory {
    identities: Vec<String>,
    index: HashSet<String>,
}

impl SourceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.index.contains(identity)
    }

    /// Append an identity. Returns false if it was already present.
    pub fn record(&mut self, identity: &str) -> bool {
        if self.index.contains(identity) {
            return false;
        }
        self.index.insert(identity.to_string());
        self.identities.push(identity.to_string());
        true
    }

    pub fn identities(&self) -> &[String] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SourceHistory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut history = SourceHistory::new();
        for identity in iter {
            history.record(identity.as_ref());
        }
        history
    }
}

/// Every download ever recorded, keyed by source URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadLedger {
    sources: BTreeMap<String, SourceHistory>,
}

impl DownloadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slice(&self, source: &str) -> &[String] {
        self.sources
            .get(source)
            .map(|h| h.identities())
            .unwrap_or(&[])
    }

    pub fn contains(&self, source: &str, identity: &str) -> bool {
        self.sources
            .get(source)
            .map(|h| h.contains(identity))
            .unwrap_or(false)
    }

    pub fn record(&mut self, source: &str, identity: &str) -> bool {
        self.sources
            .entry(source.to_string())
            .or_default()
            .record(identity)
    }

    /// Hand a source's history to its feed for the duration of a run.
    pub fn take(&mut self, source: &str) -> SourceHistory {
        self.sources.remove(source).unwrap_or_default()
    }

    /// Put a feed's history back. Empty histories leave no entry behind.
    pub fn restore(&mut self, source: &str, history: SourceHistory) {
        if history.is_empty() {
            self.sources.remove(source);
        } else {
            self.sources.insert(source.to_string(), history);
        }
    }

    pub fn sources(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.sources
            .iter()
            .map(|(source, history)| (source.as_str(), history.identities()))
    }

    pub fn total(&self) -> usize {
        self.sources.values().map(SourceHistory::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
