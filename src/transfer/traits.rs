use std::path::Path;

use crate::errors::SaugResult;

#[cfg_attr(test, mockall::automock)]
pub trait Downloader: Send + Sync {
    /// Copy the bytes behind `url` to `destination`
    fn transfer(&self, url: &str, destination: &Path) -> SaugResult<()>;
}
