#![allow(dead_code)]

use std::{io::Write, path::PathBuf};

use async_trait::async_trait;
use envconfig::Envconfig;
use geonames_sync::{
    config::Config, context::AppContext, error::StagingError, staging::DownloadService,
    target::TranslationTarget,
};
use sqlx::PgPool;
use tempfile::TempDir;

pub fn test_context(db: &PgPool) -> AppContext {
    test_context_with_chunk(db, 1000)
}

pub fn test_context_with_chunk(db: &PgPool, chunk_size: usize) -> AppContext {
    let mut config = Config::init_from_env().unwrap();
    config.chunk_size = chunk_size;
    AppContext::from_pool(config, db.clone())
}

pub fn city_target() -> TranslationTarget {
    TranslationTarget::new("cities", "city_translations", "city_id")
}

pub fn feed_file(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

pub async fn insert_city(db: &PgPool, geoname_id: i64, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO cities (geoname_id, name) VALUES ($1, $2) RETURNING id")
        .bind(geoname_id)
        .bind(name)
        .fetch_one(db)
        .await
        .unwrap()
}

pub async fn insert_city_with_id(db: &PgPool, id: i64, geoname_id: i64, name: &str) {
    sqlx::query("INSERT INTO cities (id, geoname_id, name) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(geoname_id)
        .bind(name)
        .execute(db)
        .await
        .unwrap();
}

/// Everything except the serial id and the processing timestamps, which
/// differ between otherwise identical runs.
pub type RowSnapshot = (
    i64,
    String,
    Option<String>,
    bool,
    bool,
    bool,
    bool,
    i64,
    bool,
);

pub async fn fetch_rows(db: &PgPool) -> Vec<RowSnapshot> {
    sqlx::query_as(
        "SELECT city_id, name, locale, is_preferred, is_short, is_colloquial, is_historic, \
         alternate_name_id, is_synced FROM city_translations ORDER BY alternate_name_id",
    )
    .fetch_all(db)
    .await
    .unwrap()
}

pub async fn sync_keys(db: &PgPool) -> Vec<i64> {
    sqlx::query_scalar("SELECT alternate_name_id FROM city_translations ORDER BY alternate_name_id")
        .fetch_all(db)
        .await
        .unwrap()
}

/// In-test stand-in for the HTTP staging collaborator: serves pre-written
/// fixture files, or empty files for feeds a test does not stage.
pub struct StubDownloads {
    dir: TempDir,
    alternate_names: Option<PathBuf>,
    modifications: Option<PathBuf>,
    deletes: Option<PathBuf>,
}

impl StubDownloads {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            alternate_names: None,
            modifications: None,
            deletes: None,
        }
    }

    pub fn with_alternate_names(mut self, lines: &[&str]) -> Self {
        self.alternate_names = Some(self.stage("alternateNamesV2.txt", lines));
        self
    }

    pub fn with_modifications(mut self, lines: &[&str]) -> Self {
        self.modifications = Some(self.stage("modifications.txt", lines));
        self
    }

    pub fn with_deletes(mut self, lines: &[&str]) -> Self {
        self.deletes = Some(self.stage("deletes.txt", lines));
        self
    }

    fn stage(&self, name: &str, lines: &[&str]) -> PathBuf {
        let path = self.dir.path().join(name);
        let mut content = String::new();
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    fn empty(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if !path.exists() {
            std::fs::write(&path, b"").unwrap();
        }
        path
    }
}

#[async_trait]
impl DownloadService for StubDownloads {
    async fn download_alternate_names(&self) -> Result<PathBuf, StagingError> {
        Ok(self
            .alternate_names
            .clone()
            .unwrap_or_else(|| self.empty("alternateNamesV2.txt")))
    }

    async fn download_daily_modifications(&self) -> Result<PathBuf, StagingError> {
        Ok(self
            .modifications
            .clone()
            .unwrap_or_else(|| self.empty("modifications.txt")))
    }

    async fn download_daily_deletes(&self) -> Result<PathBuf, StagingError> {
        Ok(self
            .deletes
            .clone()
            .unwrap_or_else(|| self.empty("deletes.txt")))
    }
}
