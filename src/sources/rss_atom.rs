use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::domain::FeedItem;
use crate::errors::{SaugError, SaugResult};
use crate::sources::traits::FeedFetcher;

const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches RSS/Atom feeds over HTTP or from local files and maps their
/// entries to [`FeedItem`]s.
pub struct RssAtomSource {
    client: Client,
}

impl RssAtomSource {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(FEED_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn fetch_bytes(&self, source: &str) -> SaugResult<Vec<u8>> {
        match local_path(source) {
            Some(path) => {
                debug!("Reading feed from {}", path.display());
                Ok(fs::read(path)?)
            }
            None => {
                debug!("Fetching feed {}", source);
                let response = self.client.get(source).send()?.error_for_status()?;
                Ok(response.bytes()?.to_vec())
            }
        }
    }

    pub fn items_from_bytes(bytes: &[u8]) -> SaugResult<Vec<FeedItem>> {
        // Missing guids must stay missing; the default generator would invent one.
        let parsed = parser::Builder::new()
            .id_generator(|_, _, _| String::new())
            .build()
            .parse(bytes)
            .map_err(|e| SaugError::FeedParse(e.to_string()))?;

        Ok(parsed.entries.into_iter().map(item_from_entry).collect())
    }
}

impl Default for RssAtomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedFetcher for RssAtomSource {
    fn fetch_items(&self, source: &str) -> SaugResult<Vec<FeedItem>> {
        let bytes = self.fetch_bytes(source)?;
        Self::items_from_bytes(&bytes)
    }
}

fn item_from_entry(entry: Entry) -> FeedItem {
    let guid = Some(entry.id).filter(|id| !id.is_empty());

    let enclosure_url = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
        .or_else(|| {
            entry
                .links
                .iter()
                .find(|l| l.rel.as_deref() == Some("enclosure"))
                .map(|l| l.href.clone())
        });

    let published = entry.published.or(entry.updated);

    FeedItem::new(guid, enclosure_url).with_published(published)
}

/// Local file for `file://` URLs and plain paths; `None` for remote URLs.
fn local_path(source: &str) -> Option<PathBuf> {
    match Url::parse(source) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => None,
        // Windows drive letters parse as a one-letter scheme
        Ok(url) if url.scheme().len() > 1 => None,
        _ => Some(PathBuf::from(source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SAMPLE_PODCAST: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>EconTalk</title>
    <link>http://www.econtalk.org/</link>
    <description>Conversations for the curious.</description>
    <item>
      <title>Episode Two</title>
      <pubDate>Wed, 10 Jan 2024 00:00:00 +0000</pubDate>
      <guid isPermaLink="false">econtalk-2</guid>
      <enclosure url="http://files.example.com/ep2.mp3" length="1234" type="audio/mpeg"/>
    </item>
    <item>
      <title>Episode One</title>
      <pubDate>Thu, 28 Dec 2023 00:00:00 +0000</pubDate>
      <enclosure url="http://files.example.com/ep1.mp3" length="1234" type="audio/mpeg"/>
    </item>
    <item>
      <title>Show notes only</title>
      <guid isPermaLink="false">notes-1</guid>
    </item>
  </channel>
</rss>"#;

    const SAMPLE_ATOM: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Audio</title>
  <id>https://example.com/feed.atom</id>
  <updated>2024-01-15T12:00:00Z</updated>
  <entry>
    <title>Atom Episode</title>
    <id>urn:example:atom-1</id>
    <updated>2024-01-15T12:00:00Z</updated>
    <link rel="enclosure" type="audio/mpeg" href="https://example.com/audio/atom-1.mp3"/>
  </entry>
</feed>"#;

    #[test]
    fn test_rss_items_keep_feed_order() {
        let items = RssAtomSource::items_from_bytes(SAMPLE_PODCAST).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].guid.as_deref(), Some("econtalk-2"));
        assert_eq!(
            items[0].enclosure_url.as_deref(),
            Some("http://files.example.com/ep2.mp3")
        );
        assert_eq!(
            items[0].published,
            Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_guid_is_not_synthesised() {
        let items = RssAtomSource::items_from_bytes(SAMPLE_PODCAST).unwrap();

        assert_eq!(items[1].guid, None);
        assert_eq!(items[1].identity(), Some("http://files.example.com/ep1.mp3"));
    }

    #[test]
    fn test_item_without_enclosure() {
        let items = RssAtomSource::items_from_bytes(SAMPLE_PODCAST).unwrap();

        assert_eq!(items[2].enclosure_url, None);
        assert_eq!(items[2].published, None);
    }

    #[test]
    fn test_atom_enclosure_link() {
        let items = RssAtomSource::items_from_bytes(SAMPLE_ATOM).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].guid.as_deref(), Some("urn:example:atom-1"));
        assert_eq!(
            items[0].enclosure_url.as_deref(),
            Some("https://example.com/audio/atom-1.mp3")
        );
        // Atom entries without <published> fall back to <updated>
        assert!(items[0].published.is_some());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let result = RssAtomSource::items_from_bytes(b"definitely not xml");
        assert!(matches!(result, Err(SaugError::FeedParse(_))));
    }

    #[test]
    fn test_fetch_from_local_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("feed.xml");
        fs::write(&path, SAMPLE_PODCAST).unwrap();

        let source = RssAtomSource::new();
        let by_path = source.fetch_items(path.to_str().unwrap()).unwrap();
        let file_url = Url::from_file_path(&path).unwrap().to_string();
        let by_url = source.fetch_items(&file_url).unwrap();

        assert_eq!(by_path.len(), 3);
        assert_eq!(by_path, by_url);
    }

    #[test]
    fn test_missing_local_file_is_io_error() {
        let source = RssAtomSource::new();
        let result = source.fetch_items("/nonexistent/saug/feed.xml");
        assert!(matches!(result, Err(SaugError::Io(_))));
    }

    #[test]
    fn test_local_path_detection() {
        assert_eq!(local_path("https://example.com/feed"), None);
        assert_eq!(local_path("http://example.com/feed"), None);
        assert_eq!(
            local_path("/var/feeds/show.xml"),
            Some(PathBuf::from("/var/feeds/show.xml"))
        );
        assert_eq!(
            local_path("file:///var/feeds/show.xml"),
            Some(PathBuf::from("/var/feeds/show.xml"))
        );
    }
}
