use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::errors::{SaugError, SaugResult};
use crate::transfer::traits::Downloader;

/// Streams enclosures to disk. Bytes land in `<name>.part` and are renamed
/// into place only once complete.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn write_part(&self, url: &Url, part: &Path) -> SaugResult<u64> {
        if url.scheme() == "file" {
            let source = url
                .to_file_path()
                .map_err(|_| SaugError::InvalidUrl(url.to_string()))?;
            return Ok(fs::copy(source, part)?);
        }

        let mut response = self
            .client
            .get(url.as_str())
            .send()?
            .error_for_status()?;

        let mut file = File::create(part)?;
        let written = response.copy_to(&mut file)?;
        file.flush()?;
        Ok(written)
    }
}

impl Downloader for HttpDownloader {
    fn transfer(&self, url: &str, destination: &Path) -> SaugResult<()> {
        let parsed = Url::parse(url).map_err(|e| SaugError::InvalidUrl(format!("{}: {}", url, e)))?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        let part = part_path(destination);
        match self.write_part(&parsed, &part) {
            Ok(bytes) => {
                fs::rename(&part, destination)?;
                debug!("Wrote {} bytes to {}", bytes, destination.display());
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&part);
                Err(e)
            }
        }
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}
