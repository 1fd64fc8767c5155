pub mod traits;
pub mod http;

pub use traits::Downloader;
pub use http::HttpDownloader;
