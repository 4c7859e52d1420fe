use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Unknown partition: {0}")]
    UnknownPartition(String),

    #[error("Invalid base URL {0}")]
    InvalidBaseUrl(String),

    #[error("Page not available: {0}")]
    PageUnavailable(String),

    #[error("Missing {element} on {url}")]
    MissingElement { element: &'static str, url: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    pub(crate) fn missing(element: &'static str, url: &str) -> Self {
        ScrapeError::MissingElement {
            element,
            url: url.to_owned(),
        }
    }
}
