pub const RECORDS_READ: &str = "geonames_sync_records_read";
pub const RECORDS_SKIPPED: &str = "geonames_sync_records_skipped";
pub const ROWS_WRITTEN: &str = "geonames_sync_rows_written";
pub const CHUNKS_COMMITTED: &str = "geonames_sync_chunks_committed";
pub const BATCH_WRITE_ATTEMPT: &str = "geonames_sync_batch_write_attempt";
