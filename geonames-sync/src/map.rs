use chrono::{DateTime, Utc};
use metrics::counter;

use crate::{
    error::SyncError,
    locale::LocaleScope,
    metrics_consts::RECORDS_SKIPPED,
    resolve::ParentKeyIndex,
    types::{AlternateName, TranslationRow},
};

/// Records dropped while preparing one chunk, by cause.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkippedCounts {
    pub unresolved_parent: u64,
    pub out_of_scope: u64,
}

/// Coerce an upstream flag token. The export leaves flag columns empty when
/// unset and `1` when set; older feeds also carried a literal `0`.
fn flag(token: Option<&str>) -> bool {
    !matches!(token, None | Some("") | Some("0"))
}

/// Map one accepted record to the target row attributes. Pure given its
/// inputs; both timestamps are the processing time passed in.
///
/// Callers filter unresolved parents out first; `UnresolvedParent` here
/// signals a pipeline invariant violation, not bad input.
pub fn map_translation(
    record: &AlternateName,
    parents: &ParentKeyIndex,
    now: DateTime<Utc>,
) -> Result<TranslationRow, SyncError> {
    let parent_id =
        parents
            .get(record.geoname_id)
            .ok_or(SyncError::UnresolvedParent {
                alternate_name_id: record.alternate_name_id,
                geoname_id: record.geoname_id,
            })?;

    Ok(TranslationRow {
        parent_id,
        name: record.name.clone(),
        locale: record.isolanguage.clone(),
        is_preferred: flag(record.is_preferred_name.as_deref()),
        is_short: flag(record.is_short_name.as_deref()),
        is_colloquial: flag(record.is_colloquial.as_deref()),
        is_historic: flag(record.is_historic.as_deref()),
        alternate_name_id: record.alternate_name_id,
        is_synced: true,
        created_at: now,
        updated_at: now,
    })
}

/// Filter a chunk by parent presence and locale scope, then map the
/// survivors. Input order is preserved.
pub fn map_chunk(
    chunk: &[AlternateName],
    parents: &ParentKeyIndex,
    scope: &LocaleScope,
    now: DateTime<Utc>,
) -> Result<(Vec<TranslationRow>, SkippedCounts), SyncError> {
    let mut rows = Vec::with_capacity(chunk.len());
    let mut skipped = SkippedCounts::default();

    for record in chunk {
        if !parents.contains(record.geoname_id) {
            skipped.unresolved_parent += 1;
            counter!(RECORDS_SKIPPED, "cause" => "unresolved_parent").increment(1);
            continue;
        }
        if !scope.accepts(record.isolanguage.as_deref()) {
            skipped.out_of_scope += 1;
            counter!(RECORDS_SKIPPED, "cause" => "locale").increment(1);
            continue;
        }
        rows.push(map_translation(record, parents, now)?);
    }

    Ok((rows, skipped))
}
