//! Placeholder dialects.
//!
//! Joins, projections and predicates render the same ANSI text for every
//! dialect; only the parameter placeholder differs.

use core::fmt::Write;

/// SQL dialect used when writing parameter placeholders
///
/// # Examples
///
/// ```
/// use joinwise_core::Dialect;
///
/// assert!(Dialect::PostgreSQL.uses_numbered_placeholders());
/// assert!(!Dialect::Ansi.uses_numbered_placeholders());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Positional `?` placeholders
    #[default]
    Ansi,

    /// SQLite - uses `?` positional placeholders
    SQLite,

    /// MySQL - uses `?` positional placeholders
    MySQL,

    /// PostgreSQL - uses `$1, $2, ...` numbered placeholders
    PostgreSQL,
}

impl Dialect {
    /// Returns `true` if this dialect uses numbered placeholders (`$1, $2, ...`)
    #[inline]
    #[must_use]
    pub const fn uses_numbered_placeholders(&self) -> bool {
        matches!(self, Dialect::PostgreSQL)
    }

    /// Parse a dialect from a string (case-insensitive)
    ///
    /// ```
    /// use joinwise_core::Dialect;
    ///
    /// assert_eq!(Dialect::parse("pg"), Some(Dialect::PostgreSQL));
    /// assert_eq!(Dialect::parse("ansi"), Some(Dialect::Ansi));
    /// assert_eq!(Dialect::parse("oracle"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("ansi") {
            Some(Dialect::Ansi)
        } else if s.eq_ignore_ascii_case("sqlite") {
            Some(Dialect::SQLite)
        } else if s.eq_ignore_ascii_case("mysql") {
            Some(Dialect::MySQL)
        } else if s.eq_ignore_ascii_case("postgresql")
            || s.eq_ignore_ascii_case("postgres")
            || s.eq_ignore_ascii_case("pg")
        {
            Some(Dialect::PostgreSQL)
        } else {
            None
        }
    }

    /// Get the dialect name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::Ansi => "ansi",
            Dialect::SQLite => "sqlite",
            Dialect::MySQL => "mysql",
            Dialect::PostgreSQL => "postgresql",
        }
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes the placeholder for the 1-based parameter `index`.
#[inline]
pub(crate) fn write_placeholder(dialect: Dialect, index: usize, buf: &mut impl Write) {
    if dialect.uses_numbered_placeholders() {
        let _ = write!(buf, "${index}");
    } else {
        let _ = buf.write_char('?');
    }
}
