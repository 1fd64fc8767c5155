use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaugError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed list not found: {0}")]
    ConfigNotFound(String),

    // Feed errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Feed not configured: {0}")]
    FeedNotFound(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    #[error("OPML parsing failed: {0}")]
    OpmlParse(String),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Saving download ledger failed: {0}")]
    LedgerSave(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type SaugResult<T> = Result<T, SaugError>;
