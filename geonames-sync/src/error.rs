use std::path::PathBuf;

use thiserror::Error;

/// Terminal errors for a seeding or reconciliation run, tagged by the stage
/// that failed. Parent-resolution gaps and out-of-scope locales are filter
/// conditions counted in reports, not errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("staging failed: {0}")]
    Staging(#[from] StagingError),

    #[error("reading record stream: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    // Callers must filter unresolved parents before mapping; hitting this is
    // a pipeline invariant violation, not bad input data.
    #[error("record {alternate_name_id} reached the mapper with unresolved parent {geoname_id}")]
    UnresolvedParent {
        alternate_name_id: i64,
        geoname_id: i64,
    },

    #[error("storage write failed: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("http client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("archive {path} is unreadable: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive {path} has no {member} member")]
    MissingMember { path: PathBuf, member: String },

    #[error("io error staging {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive extraction task failed: {0}")]
    ExtractTask(#[from] tokio::task::JoinError),
}

/// A malformed line in a staged feed file. Fatal to the run; chunks already
/// committed before the bad line stay committed.
#[derive(Debug, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    pub line: u64,
    pub reason: String,
}
