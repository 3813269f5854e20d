use chrono::{DateTime, Utc};

use crate::error::ParseError;

/// A record type parsed from one line of a tab-delimited GeoNames feed.
pub trait TsvRecord: Sized + Send {
    fn parse_line(line: &str, line_no: u64) -> Result<Self, ParseError>;
}

/// One full record from the `alternateNamesV2` export.
///
/// Column order: alternateNameId, geonameid, isolanguage, alternate name,
/// isPreferredName, isShortName, isColloquial, isHistoric, then optional
/// from/to validity dates this pipeline ignores. Flag columns keep their raw
/// upstream tokens; coercion to booleans happens at mapping time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateName {
    pub alternate_name_id: i64,
    pub geoname_id: i64,
    pub isolanguage: Option<String>,
    pub name: String,
    pub is_preferred_name: Option<String>,
    pub is_short_name: Option<String>,
    pub is_colloquial: Option<String>,
    pub is_historic: Option<String>,
}

impl TsvRecord for AlternateName {
    fn parse_line(line: &str, line_no: u64) -> Result<Self, ParseError> {
        let mut fields = line.split('\t');
        Ok(Self {
            alternate_name_id: parse_id(fields.next(), "alternateNameId", line_no)?,
            geoname_id: parse_id(fields.next(), "geonameid", line_no)?,
            isolanguage: non_empty(fields.next()),
            name: fields.next().unwrap_or_default().to_string(),
            is_preferred_name: non_empty(fields.next()),
            is_short_name: non_empty(fields.next()),
            is_colloquial: non_empty(fields.next()),
            is_historic: non_empty(fields.next()),
        })
    }
}

/// One entry from the daily `alternateNamesDeletes` feed. Only the sync key
/// is consumed downstream; the name and comment exist for operator logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateNameDelete {
    pub alternate_name_id: i64,
    pub geoname_id: i64,
    pub name: String,
    pub comment: Option<String>,
}

impl TsvRecord for AlternateNameDelete {
    fn parse_line(line: &str, line_no: u64) -> Result<Self, ParseError> {
        let mut fields = line.split('\t');
        Ok(Self {
            alternate_name_id: parse_id(fields.next(), "alternateNameId", line_no)?,
            geoname_id: parse_id(fields.next(), "geonameid", line_no)?,
            name: fields.next().unwrap_or_default().to_string(),
            comment: non_empty(fields.next()),
        })
    }
}

/// The mapped attribute set for one translation row, ready for a bulk write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRow {
    pub parent_id: i64,
    pub name: String,
    pub locale: Option<String>,
    pub is_preferred: bool,
    pub is_short: bool,
    pub is_colloquial: bool,
    pub is_historic: bool,
    pub alternate_name_id: i64,
    pub is_synced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_id(field: Option<&str>, column: &str, line: u64) -> Result<i64, ParseError> {
    let raw = field.unwrap_or_default();
    raw.parse().map_err(|_| ParseError {
        line,
        reason: format!("bad {column}: {raw:?}"),
    })
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field.filter(|f| !f.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_alternate_name_line() {
        let line = "100\t1\ten\tLondon\t1\t\t\t1";
        let record = AlternateName::parse_line(line, 1).unwrap();
        assert_eq!(record.alternate_name_id, 100);
        assert_eq!(record.geoname_id, 1);
        assert_eq!(record.isolanguage.as_deref(), Some("en"));
        assert_eq!(record.name, "London");
        assert_eq!(record.is_preferred_name.as_deref(), Some("1"));
        assert_eq!(record.is_short_name, None);
        assert_eq!(record.is_colloquial, None);
        assert_eq!(record.is_historic.as_deref(), Some("1"));
    }

    #[test]
    fn parses_short_line_without_flags() {
        let record = AlternateName::parse_line("101\t2\t\tLondres", 1).unwrap();
        assert_eq!(record.isolanguage, None);
        assert_eq!(record.name, "Londres");
        assert_eq!(record.is_preferred_name, None);
    }

    #[test]
    fn ignores_trailing_validity_columns() {
        let line = "102\t3\tde\tLondinium\t\t\t\t1\t1899-01-01\t1950-01-01";
        let record = AlternateName::parse_line(line, 7).unwrap();
        assert_eq!(record.alternate_name_id, 102);
        assert_eq!(record.is_historic.as_deref(), Some("1"));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = AlternateName::parse_line("abc\t1\ten\tLondon", 42).unwrap_err();
        assert_eq!(err.line, 42);
        assert!(err.to_string().contains("alternateNameId"));
    }

    #[test]
    fn parses_delete_entry() {
        let record =
            AlternateNameDelete::parse_line("100\t1\tLondon\tduplicate of 200", 3).unwrap();
        assert_eq!(record.alternate_name_id, 100);
        assert_eq!(record.geoname_id, 1);
        assert_eq!(record.name, "London");
        assert_eq!(record.comment.as_deref(), Some("duplicate of 200"));
    }

    #[test]
    fn parses_delete_entry_without_comment() {
        let record = AlternateNameDelete::parse_line("100\t1\tLondon", 3).unwrap();
        assert_eq!(record.comment, None);
    }
}
