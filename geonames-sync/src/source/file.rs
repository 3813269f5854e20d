use std::{marker::PhantomData, path::Path};

use async_trait::async_trait;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader, Lines},
};

use super::RecordSource;
use crate::{
    error::SyncError,
    types::{AlternateName, AlternateNameDelete, TsvRecord},
};

/// Line-oriented reader over a staged tab-delimited feed file.
///
/// Blank lines and `#` comment lines are skipped; that covers the wrapper
/// lines the daily delete feed carries between record blocks.
pub struct TsvFileSource<T> {
    lines: Lines<BufReader<File>>,
    line_no: u64,
    _record: PhantomData<T>,
}

impl<T: TsvRecord> TsvFileSource<T> {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
            _record: PhantomData,
        })
    }
}

#[async_trait]
impl<T: TsvRecord> RecordSource for TsvFileSource<T> {
    type Item = T;

    async fn next_record(&mut self) -> Result<Option<T>, SyncError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            let line = line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Ok(Some(T::parse_line(line, self.line_no)?));
        }
        Ok(None)
    }
}

/// Full-record read mode over the alternate names export and the daily
/// modifications feed.
pub type AlternateNameSource = TsvFileSource<AlternateName>;

/// Deletion-only read mode over the daily deletes feed.
pub type AlternateNameDeleteSource = TsvFileSource<AlternateNameDelete>;

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn feed_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[tokio::test]
    async fn skips_comment_and_blank_lines() {
        let file = feed_file(&[
            "# alternate names extract",
            "",
            "100\t1\ten\tLondon",
            "",
            "101\t1\tde\tLondinium",
        ]);
        let mut source = AlternateNameSource::open(file.path()).await.unwrap();

        let chunk = source.read_chunk(10).await.unwrap();
        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk[0].alternate_name_id, 100);
        assert_eq!(chunk[1].alternate_name_id, 101);
    }

    #[tokio::test]
    async fn read_chunk_bounds_each_pull() {
        let file = feed_file(&[
            "100\t1\ten\tLondon",
            "101\t1\tde\tLondinium",
            "102\t1\tfr\tLondres",
        ]);
        let mut source = AlternateNameSource::open(file.path()).await.unwrap();

        assert_eq!(source.read_chunk(2).await.unwrap().len(), 2);
        assert_eq!(source.read_chunk(2).await.unwrap().len(), 1);
        assert!(source.read_chunk(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn parse_errors_carry_the_line_number() {
        let file = feed_file(&["100\t1\ten\tLondon", "not-a-record"]);
        let mut source = AlternateNameSource::open(file.path()).await.unwrap();

        source.next_record().await.unwrap();
        let err = source.next_record().await.unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn delete_source_reads_delete_entries() {
        let file = feed_file(&["# deleted on 2024-01-01", "100\t1\tLondon\tmerged"]);
        let mut source = AlternateNameDeleteSource::open(file.path()).await.unwrap();

        let entry = source.next_record().await.unwrap().unwrap();
        assert_eq!(entry.alternate_name_id, 100);
        assert!(source.next_record().await.unwrap().is_none());
    }
}
