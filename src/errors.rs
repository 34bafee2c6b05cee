use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse JSON configuration in {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration file not found at {path}")]
    NotFound { path: PathBuf },
    #[error("Environment variable {name}='{value}' is invalid: {message}")]
    InvalidEnv {
        name: String,
        value: String,
        message: String,
    },
    #[error("Invalid configuration for '{field}': {message}")]
    Invalid { field: String, message: String },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading feed file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON parsing error in feed: {source}")]
    JsonParseError {
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Provider answered {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Feed from {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: ParseError,
    },
}

impl FetchError {
    /// Whether trying the same request again could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request { .. } => true,
            FetchError::Status { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            FetchError::ClientBuild(_) | FetchError::Decode { .. } => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No samples to export")]
    NoData,
    #[error("IO error writing export {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}
