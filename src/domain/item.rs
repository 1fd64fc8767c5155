use chrono::{DateTime, Utc};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub guid: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub enclosure_url: Option<String>,
}

impl FeedItem {
    pub fn new(guid: Option<String>, enclosure_url: Option<String>) -> Self {
        Self {
            guid,
            published: None,
            enclosure_url,
        }
    }

    pub fn with_published(mut self, published: Option<DateTime<Utc>>) -> Self {
        self.published = published;
        self
    }

    /// Stable identity used both to check and to record a download.
    ///
    /// A non-empty guid wins; feeds that omit it fall back to the
    /// enclosure URL. Items carrying neither have no identity. Values are
    /// used verbatim so stored identities always compare equal.
    pub fn identity(&self) -> Option<&str> {
        self.guid
            .as_deref()
            .filter(|g| !g.is_empty())
            .or_else(|| self.enclosure_url.as_deref().filter(|u| !u.is_empty()))
    }

    /// Whether the item was published strictly after `cutoff`.
    /// No cutoff admits everything; an undated item never beats a cutoff.
    pub fn published_after(&self, cutoff: Option<DateTime<Utc>>) -> bool {
        match (cutoff, self.published) {
            (None, _) => true,
            (Some(cutoff), Some(published)) => published > cutoff,
            (Some(_), None) => false,
        }
    }

    /// File name for the enclosure: the last segment of its URL path,
    /// percent-decoded.
    pub fn file_name(&self) -> Option<String> {
        let url = self.enclosure_url.as_deref()?;
        let parsed = Url::parse(url).ok()?;
        let segment = parsed.path_segments()?.next_back()?;
        let name = urlencoding::decode(segment).ok()?;

        // Decoding can reintroduce separators or dot segments
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return None;
        }
        Some(name.into_owned())
    }
}
