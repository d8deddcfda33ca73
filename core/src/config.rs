use compact_str::CompactString;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::metadata::check_identifier;

/// Rendering options shared by every wrapper built from one runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinConfig {
    /// Alias of the driving table; joined tables get `{table_alias}{n}`
    pub table_alias: CompactString,
    pub dialect: Dialect,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            table_alias: CompactString::const_new("t"),
            dialect: Dialect::Ansi,
        }
    }
}

impl JoinConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_alias(mut self, alias: impl Into<CompactString>) -> Self {
        self.table_alias = alias.into();
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_identifier(&self.table_alias)
    }
}
