use async_trait::async_trait;

use crate::error::SyncError;

pub mod file;

/// A lazy, finite, non-restartable stream of upstream records. A fresh
/// source re-reads its backing file from the start; an exhausted one only
/// ever yields `None`.
#[async_trait]
pub trait RecordSource: Send {
    type Item: Send;

    async fn next_record(&mut self) -> Result<Option<Self::Item>, SyncError>;

    /// Pull up to `n` records. An empty result means the stream is drained.
    async fn read_chunk(&mut self, n: usize) -> Result<Vec<Self::Item>, SyncError> {
        let mut chunk = Vec::with_capacity(n);
        while chunk.len() < n {
            match self.next_record().await? {
                Some(record) => chunk.push(record),
                None => break,
            }
        }
        Ok(chunk)
    }
}
