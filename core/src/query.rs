use crate::result::{Record, ResultShape, Row};
use crate::value::Value;

/// A rendered statement: SQL text, its parameters in placeholder order, and
/// the layout needed to fold result rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<Value>,
    pub shape: ResultShape,
}

impl Query {
    /// Folds executor rows into records; see [`ResultShape::fold`].
    pub fn fold<I: IntoIterator<Item = Row>>(&self, rows: I) -> Vec<Record> {
        self.shape.fold(rows)
    }

    /// Folds `rows` and binds every record onto `T`.
    #[cfg(feature = "serde")]
    pub fn bind_all<T, I>(&self, rows: I) -> crate::error::Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
        I: IntoIterator<Item = Row>,
    {
        self.fold(rows).iter().map(|record| record.bind::<T>()).collect()
    }
}

impl core::fmt::Display for Query {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.sql)
    }
}
