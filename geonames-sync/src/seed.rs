use chrono::Utc;
use metrics::counter;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    context::AppContext,
    error::SyncError,
    locale::LocaleScope,
    map::map_chunk,
    metrics_consts::{CHUNKS_COMMITTED, RECORDS_READ},
    resolve::ParentKeyResolver,
    source::RecordSource,
    store::TranslationStore,
    types::AlternateName,
};

/// Counters for one seeding pass.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct SeedReport {
    pub records_read: u64,
    pub rows_inserted: u64,
    pub skipped_unresolved: u64,
    pub skipped_locale: u64,
    pub chunks_committed: u64,
}

/// Bulk-seeding path: source → fixed-size chunks → per-chunk parent key
/// resolution → parent/locale filter → mapping → one bulk insert per chunk.
///
/// Chunks are strictly sequential and the parent key index never outlives
/// the chunk it was built for. A failed chunk leaves prior chunks committed;
/// recovery is truncate-and-reseed, not resumption from an offset.
pub struct SeedPipeline<'a> {
    context: &'a AppContext,
    store: &'a TranslationStore,
    scope: &'a LocaleScope,
    chunk_size: usize,
}

impl<'a> SeedPipeline<'a> {
    pub fn new(context: &'a AppContext, store: &'a TranslationStore, scope: &'a LocaleScope) -> Self {
        Self {
            context,
            store,
            scope,
            chunk_size: context.config.chunk_size,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub async fn seed<S>(&self, source: &mut S) -> Result<SeedReport, SyncError>
    where
        S: RecordSource<Item = AlternateName>,
    {
        let resolver = ParentKeyResolver::new(self.context.pool(), self.store.target());
        let mut report = SeedReport::default();

        loop {
            if !self.context.is_running() {
                info!("cancellation requested, stopping at a chunk boundary");
                break;
            }

            let chunk = source.read_chunk(self.chunk_size).await?;
            if chunk.is_empty() {
                break;
            }
            report.records_read += chunk.len() as u64;
            counter!(RECORDS_READ).increment(chunk.len() as u64);

            let parents = resolver.resolve(&chunk).await?;
            let (rows, skipped) = map_chunk(&chunk, &parents, self.scope, Utc::now())?;
            drop(parents);
            report.skipped_unresolved += skipped.unresolved_parent;
            report.skipped_locale += skipped.out_of_scope;

            report.rows_inserted += self.store.insert_batch(&rows).await?;
            report.chunks_committed += 1;
            counter!(CHUNKS_COMMITTED).increment(1);
            debug!(
                chunk = report.chunks_committed,
                inserted = rows.len(),
                "seed chunk committed"
            );
        }

        info!(
            table = %self.store.target().translation_table,
            read = report.records_read,
            inserted = report.rows_inserted,
            skipped_unresolved = report.skipped_unresolved,
            skipped_locale = report.skipped_locale,
            "seeding finished"
        );
        Ok(report)
    }
}
