use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use tracing::debug;

use crate::{target::TranslationTarget, types::AlternateName};

/// Upstream geoname id → local parent primary key, scoped to one chunk.
///
/// Rebuilt for every chunk and dropped once the chunk is mapped; entries are
/// never carried across chunk boundaries.
#[derive(Debug, Default)]
pub struct ParentKeyIndex {
    keys: HashMap<i64, i64>,
}

impl ParentKeyIndex {
    pub fn get(&self, geoname_id: i64) -> Option<i64> {
        self.keys.get(&geoname_id).copied()
    }

    pub fn contains(&self, geoname_id: i64) -> bool {
        self.keys.contains_key(&geoname_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(i64, i64)> for ParentKeyIndex {
    fn from_iter<I: IntoIterator<Item = (i64, i64)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

pub struct ParentKeyResolver<'a> {
    pool: &'a PgPool,
    target: &'a TranslationTarget,
}

impl<'a> ParentKeyResolver<'a> {
    pub fn new(pool: &'a PgPool, target: &'a TranslationTarget) -> Self {
        Self { pool, target }
    }

    /// One lookup per chunk, covering exactly the distinct parent ids the
    /// chunk references. Ids missing from the result are a filter condition
    /// for the caller, not an error.
    pub async fn resolve(&self, chunk: &[AlternateName]) -> Result<ParentKeyIndex, sqlx::Error> {
        if !self.target.enabled {
            return Ok(ParentKeyIndex::default());
        }

        let ids: Vec<i64> = chunk
            .iter()
            .map(|record| record.geoname_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(ParentKeyIndex::default());
        }

        let sql = format!(
            "SELECT geoname_id, id FROM {} WHERE geoname_id = ANY($1)",
            self.target.parent_table
        );
        let rows: Vec<(i64, i64)> = sqlx::query_as(&sql).bind(&ids).fetch_all(self.pool).await?;

        debug!(
            parent_table = %self.target.parent_table,
            referenced = ids.len(),
            resolved = rows.len(),
            "resolved parent keys for chunk"
        );
        Ok(rows.into_iter().collect())
    }
}
