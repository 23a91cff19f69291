use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZoneGenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repeater source unavailable: {0}")]
    Source(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ZoneGenError>;
