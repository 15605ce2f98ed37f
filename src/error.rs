use std::result::Result as StdResult;

use thiserror::Error;

pub type Result<T> = StdResult<T, Error>;

/// An enum for describing and handling the various errors encountered while
/// querying commits, building, validating, or writing changelogs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("unrecognized link-style field")]
    LinkStyle,

    #[error("unrecognized provider: {0}")]
    Provider(String),

    #[error("alias {alias:?} is registered under both {first:?} and {second:?}")]
    AliasConflict {
        alias: String,
        first: String,
        second: String,
    },

    #[error("invalid commit filter pattern")]
    Grep(#[from] regex::Error),

    #[error("failed to retrieve commit data: {0}")]
    Retrieval(String),

    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    #[error("fatal I/O error with output")]
    Io(#[from] std::io::Error),

    #[error("failed to convert date/time to string format")]
    TimeStrFormat(#[from] time::error::Format),

    #[error("pull request validation failed: {0}")]
    Validation(String),
}
