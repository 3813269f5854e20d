use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    context::AppContext,
    error::SyncError,
    locale::LocaleScope,
    map::map_chunk,
    resolve::ParentKeyResolver,
    source::{
        file::{AlternateNameDeleteSource, AlternateNameSource},
        RecordSource,
    },
    staging::DownloadService,
    store::TranslationStore,
};

/// Phases of one reconciler run. Progress is chunk-atomic: a failure mid
/// stream leaves every previously committed chunk in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    Idle,
    Fetching,
    Streaming,
    Done,
    Failed,
}

/// Counters for one combined daily cycle.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct CycleReport {
    pub modifications_read: u64,
    pub rows_upserted: u64,
    pub skipped_unresolved: u64,
    pub skipped_locale: u64,
    pub deletes_read: u64,
    pub rows_deleted: u64,
}

/// Applies the daily modifications feed: each record upserts the row whose
/// sync key matches, limited to the updatable attribute set; unmatched sync
/// keys insert new rows (the feed also carries first-time-seen
/// translations). Unresolved-parent and out-of-scope records filter out
/// exactly as in seeding.
pub struct DailyUpdateReconciler<'a> {
    context: &'a AppContext,
    store: &'a TranslationStore,
    scope: &'a LocaleScope,
    chunk_size: usize,
    phase: ReconcilePhase,
}

impl<'a> DailyUpdateReconciler<'a> {
    pub fn new(context: &'a AppContext, store: &'a TranslationStore, scope: &'a LocaleScope) -> Self {
        Self {
            context,
            store,
            scope,
            chunk_size: context.config.chunk_size,
            phase: ReconcilePhase::Idle,
        }
    }

    pub fn phase(&self) -> ReconcilePhase {
        self.phase
    }

    pub async fn run(
        &mut self,
        downloads: &dyn DownloadService,
        report: &mut CycleReport,
    ) -> Result<(), SyncError> {
        self.phase = ReconcilePhase::Fetching;
        let path = downloads.download_daily_modifications().await?;

        self.phase = ReconcilePhase::Streaming;
        match self.stream(&path, report).await {
            Ok(()) => {
                self.phase = ReconcilePhase::Done;
                Ok(())
            }
            Err(e) => {
                self.phase = ReconcilePhase::Failed;
                Err(e)
            }
        }
    }

    async fn stream(&self, path: &Path, report: &mut CycleReport) -> Result<(), SyncError> {
        let mut source = AlternateNameSource::open(path).await?;
        let resolver = ParentKeyResolver::new(self.context.pool(), self.store.target());

        loop {
            if !self.context.is_running() {
                info!("cancellation requested, stopping at a chunk boundary");
                break;
            }

            let chunk = source.read_chunk(self.chunk_size).await?;
            if chunk.is_empty() {
                break;
            }
            report.modifications_read += chunk.len() as u64;

            let parents = resolver.resolve(&chunk).await?;
            let (rows, skipped) = map_chunk(&chunk, &parents, self.scope, Utc::now())?;
            drop(parents);
            report.skipped_unresolved += skipped.unresolved_parent;
            report.skipped_locale += skipped.out_of_scope;

            let upserted = self.store.upsert_batch(&rows).await?;
            report.rows_upserted += upserted;
            debug!(upserted, "modification chunk committed");
        }
        Ok(())
    }
}

/// Applies the daily deletes feed: rows are removed by sync key, chunk by
/// chunk. Missing rows are not errors; replaying a feed is a no-op.
pub struct DailyDeleteReconciler<'a> {
    context: &'a AppContext,
    store: &'a TranslationStore,
    chunk_size: usize,
    phase: ReconcilePhase,
}

impl<'a> DailyDeleteReconciler<'a> {
    pub fn new(context: &'a AppContext, store: &'a TranslationStore) -> Self {
        Self {
            context,
            store,
            chunk_size: context.config.chunk_size,
            phase: ReconcilePhase::Idle,
        }
    }

    pub fn phase(&self) -> ReconcilePhase {
        self.phase
    }

    pub async fn run(
        &mut self,
        downloads: &dyn DownloadService,
        report: &mut CycleReport,
    ) -> Result<(), SyncError> {
        self.phase = ReconcilePhase::Fetching;
        let path = downloads.download_daily_deletes().await?;

        self.phase = ReconcilePhase::Streaming;
        match self.stream(&path, report).await {
            Ok(()) => {
                self.phase = ReconcilePhase::Done;
                Ok(())
            }
            Err(e) => {
                self.phase = ReconcilePhase::Failed;
                Err(e)
            }
        }
    }

    async fn stream(&self, path: &Path, report: &mut CycleReport) -> Result<(), SyncError> {
        let mut source = AlternateNameDeleteSource::open(path).await?;

        loop {
            if !self.context.is_running() {
                info!("cancellation requested, stopping at a chunk boundary");
                break;
            }

            let chunk = source.read_chunk(self.chunk_size).await?;
            if chunk.is_empty() {
                break;
            }
            report.deletes_read += chunk.len() as u64;

            let keys: Vec<i64> = chunk.iter().map(|entry| entry.alternate_name_id).collect();
            let deleted = self.store.delete_batch(&keys).await?;
            report.rows_deleted += deleted;
            debug!(deleted, "delete chunk committed");
        }
        Ok(())
    }
}

/// One daily reconciliation cycle: modifications first, deletions second.
/// The order is fixed — deletes run last so a modification carrying a key
/// the deletes feed also names cannot resurrect the removed row.
pub async fn run_daily_cycle(
    context: &AppContext,
    store: &TranslationStore,
    scope: &LocaleScope,
    downloads: &dyn DownloadService,
) -> Result<CycleReport, SyncError> {
    let mut report = CycleReport::default();

    DailyUpdateReconciler::new(context, store, scope)
        .run(downloads, &mut report)
        .await?;
    DailyDeleteReconciler::new(context, store)
        .run(downloads, &mut report)
        .await?;

    info!(
        table = %store.target().translation_table,
        modifications = report.modifications_read,
        upserted = report.rows_upserted,
        deletes = report.deletes_read,
        deleted = report.rows_deleted,
        "daily reconciliation cycle finished"
    );
    Ok(report)
}
