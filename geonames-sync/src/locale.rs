use std::collections::HashSet;

/// Which translation locales are in scope for a run.
///
/// The upstream feed uses an empty language tag for "no language" rows;
/// an explicit scope opts into those by listing the empty string. No
/// fallback-locale substitution happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleScope {
    All,
    Only(HashSet<String>),
}

impl LocaleScope {
    /// Parse a comma-separated scope list. A single `*` keeps everything.
    pub fn parse(raw: &str) -> Self {
        let tags: Vec<&str> = raw.split(',').map(str::trim).collect();
        if tags.len() == 1 && tags[0] == "*" {
            return Self::All;
        }
        Self::Only(tags.into_iter().map(str::to_string).collect())
    }

    /// Exact, case-sensitive membership. An absent tag is the empty-string
    /// tag the upstream uses for "no language".
    pub fn accepts(&self, tag: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(tags) => tags.contains(tag.unwrap_or("")),
        }
    }
}
