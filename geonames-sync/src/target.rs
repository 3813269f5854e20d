/// Parameterizes one translation pipeline: which parent table the
/// translations attach to, which table holds them, and the foreign key
/// column linking the two. One value per concrete pipeline, built from
/// config; identifiers are config-owned constants, never user input.
///
/// A disabled target's parent table may not exist at all; resolution then
/// degrades to "no parents found" instead of touching the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTarget {
    pub parent_table: String,
    pub translation_table: String,
    pub foreign_key: String,
    pub enabled: bool,
}

impl TranslationTarget {
    pub fn new(
        parent_table: impl Into<String>,
        translation_table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            parent_table: parent_table.into(),
            translation_table: translation_table.into(),
            foreign_key: foreign_key.into(),
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
