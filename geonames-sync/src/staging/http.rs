use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use reqwest::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use zip::ZipArchive;

use super::DownloadService;
use crate::error::StagingError;

const ARCHIVE_NAME: &str = "alternateNamesV2.zip";
const ARCHIVE_MEMBER: &str = "alternateNamesV2.txt";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(3600);

/// Downloads GeoNames export files into a staging directory.
///
/// The full export arrives zipped and is unpacked on arrival; the daily
/// feeds are plain text named for the previous UTC day. Files already
/// staged with content are reused, so re-running a failed cycle does not
/// re-download.
pub struct GeonamesDownloads {
    client: reqwest::Client,
    base_url: String,
    staging_dir: PathBuf,
}

impl GeonamesDownloads {
    pub fn new(
        base_url: impl Into<String>,
        staging_dir: impl Into<PathBuf>,
    ) -> Result<Self, StagingError> {
        let staging_dir = staging_dir.into();
        std::fs::create_dir_all(&staging_dir).map_err(|source| StagingError::Io {
            path: staging_dir.clone(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(StagingError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            staging_dir,
        })
    }

    /// Stream one remote file to disk. With `missing_ok`, a 404 stages an
    /// empty file instead of failing — the upstream simply published no
    /// delta for that day.
    async fn fetch_to(
        &self,
        file_name: &str,
        dest: &Path,
        missing_ok: bool,
    ) -> Result<(), StagingError> {
        let url = format!("{}/{file_name}", self.base_url);
        debug!(%url, "fetching");

        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|source| StagingError::Request {
                    url: url.clone(),
                    source,
                })?;

        if missing_ok && response.status() == StatusCode::NOT_FOUND {
            info!(%url, "no file published, staging an empty one");
            tokio::fs::File::create(dest)
                .await
                .map_err(|source| StagingError::Io {
                    path: dest.to_path_buf(),
                    source,
                })?;
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(StagingError::Status {
                url,
                status: response.status(),
            });
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|source| StagingError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| StagingError::Request {
                url: url.clone(),
                source,
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|source| StagingError::Io {
                    path: dest.to_path_buf(),
                    source,
                })?;
        }
        file.flush().await.map_err(|source| StagingError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    async fn fetch_daily(&self, file_name: String) -> Result<PathBuf, StagingError> {
        let dest = self.staging_dir.join(&file_name);
        if already_staged(&dest) {
            debug!(path = %dest.display(), "reusing staged file");
            return Ok(dest);
        }
        self.fetch_to(&file_name, &dest, true).await?;
        Ok(dest)
    }
}

#[async_trait]
impl DownloadService for GeonamesDownloads {
    async fn download_alternate_names(&self) -> Result<PathBuf, StagingError> {
        let txt = self.staging_dir.join(ARCHIVE_MEMBER);
        if already_staged(&txt) {
            debug!(path = %txt.display(), "reusing staged export");
            return Ok(txt);
        }

        let archive = self.staging_dir.join(ARCHIVE_NAME);
        self.fetch_to(ARCHIVE_NAME, &archive, false).await?;
        unzip_member(archive, ARCHIVE_MEMBER.to_string(), txt.clone()).await?;
        Ok(txt)
    }

    async fn download_daily_modifications(&self) -> Result<PathBuf, StagingError> {
        self.fetch_daily(format!(
            "alternateNamesModifications-{}.txt",
            previous_day()
        ))
        .await
    }

    async fn download_daily_deletes(&self) -> Result<PathBuf, StagingError> {
        self.fetch_daily(format!("alternateNamesDeletes-{}.txt", previous_day()))
            .await
    }
}

// GeoNames publishes each day's delta under the previous day's date.
fn previous_day() -> String {
    (Utc::now() - chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string()
}

fn already_staged(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

async fn unzip_member(
    archive: PathBuf,
    member: String,
    dest: PathBuf,
) -> Result<(), StagingError> {
    tokio::task::spawn_blocking(move || -> Result<(), StagingError> {
        let file = std::fs::File::open(&archive).map_err(|source| StagingError::Io {
            path: archive.clone(),
            source,
        })?;
        let mut zip = ZipArchive::new(file).map_err(|source| StagingError::Archive {
            path: archive.clone(),
            source,
        })?;
        let mut entry = zip
            .by_name(&member)
            .map_err(|_| StagingError::MissingMember {
                path: archive.clone(),
                member: member.clone(),
            })?;
        let mut out = std::fs::File::create(&dest).map_err(|source| StagingError::Io {
            path: dest.clone(),
            source,
        })?;
        std::io::copy(&mut entry, &mut out).map_err(|source| StagingError::Io {
            path: dest.clone(),
            source,
        })?;
        Ok(())
    })
    .await?
}
