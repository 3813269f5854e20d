use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::StagingError;

pub mod http;

/// Staging collaborator. Each call returns a local file path that stays
/// valid for the rest of the run; "no update published" surfaces as an
/// empty-but-valid file, never as an error. Staging always completes before
/// any store mutation, so a staging failure cannot corrupt partial state.
#[async_trait]
pub trait DownloadService: Send + Sync {
    /// The full alternate names export, unpacked to a flat text file.
    async fn download_alternate_names(&self) -> Result<PathBuf, StagingError>;

    /// The previous day's modifications feed.
    async fn download_daily_modifications(&self) -> Result<PathBuf, StagingError>;

    /// The previous day's deletions feed.
    async fn download_daily_deletes(&self) -> Result<PathBuf, StagingError>;
}
