use std::fs;
use std::path::PathBuf;

use opml::{Outline, OPML};

use crate::errors::{SaugError, SaugResult};
use crate::storage::traits::FeedListStore;

/// Feed list kept in a file: a JSON array, an OPML export or one URL per line.
pub struct FileFeedList {
    path: PathBuf,
}

impl FileFeedList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(content: &str) -> SaugResult<Vec<String>> {
        let trimmed = content.trim_start();

        if trimmed.starts_with('[') {
            let urls: Vec<String> = serde_json::from_str(trimmed)
                .map_err(|e| SaugError::Config(format!("invalid JSON feed list: {}", e)))?;
            return Ok(urls
                .into_iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect());
        }

        if trimmed.starts_with('<') {
            let opml = OPML::from_str(trimmed)
                .map_err(|e| SaugError::OpmlParse(e.to_string()))?;
            return Ok(extract_feed_urls(&opml.body.outlines));
        }

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect())
    }
}

impl FeedListStore for FileFeedList {
    fn load(&self) -> SaugResult<Vec<String>> {
        if !self.path.exists() {
            return Err(SaugError::ConfigNotFound(self.path.display().to_string()));
        }

        let content = fs::read_to_string(&self.path)?;
        match Self::parse(&content) {
            Err(SaugError::OpmlParse(e)) => Err(SaugError::Config(format!(
                "{}: invalid OPML feed list: {}",
                self.path.display(),
                e
            ))),
            other => other,
        }
    }
}

/// Recursively extract feed URLs from OPML outlines
fn extract_feed_urls(outlines: &[Outline]) -> Vec<String> {
    let mut urls = Vec::new();

    for outline in outlines {
        if let Some(url) = &outline.xml_url {
            let url = url.trim();
            if !url.is_empty() {
                urls.push(url.to_string());
            }
        }

        // Recursively process child outlines
        urls.extend(extract_feed_urls(&outline.outlines));
    }

    urls
}
