use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// The accessor does not name a simple property of its owner type
    #[error("Unresolvable accessor `{member}` on {owner}")]
    UnresolvableAccessor {
        owner: &'static str,
        member: CompactString,
    },

    /// The metadata provider has no column for the entity/property pair
    #[error("Unknown column: {entity} has no mapped property `{property}`")]
    UnknownColumn {
        entity: &'static str,
        property: CompactString,
    },

    /// The entity was never registered with the metadata provider
    #[error("Unknown entity: {0} is not registered")]
    UnknownEntity(&'static str),

    /// The function kind carries no template and is not registered
    #[error("Unsupported function: {0}")]
    UnsupportedFunction(CompactString),

    /// Two projections request the same output name
    #[error("Duplicate alias `{0}` in select list")]
    DuplicateAlias(CompactString),

    /// An ON clause references a table that is not joined yet
    #[error("Forward reference: ON clause for {joined} references {referenced} before it is joined")]
    ForwardReference {
        joined: &'static str,
        referenced: &'static str,
    },

    /// A SELECT, WHERE, GROUP BY or ORDER BY item references a table that is never joined
    #[error("Table for {0} is not part of the query")]
    TableNotJoined(&'static str),

    /// A join was declared without any ON predicate
    #[error("Join of {0} has no ON condition")]
    MissingJoinCondition(&'static str),

    /// A table, column or alias name is not a plain SQL identifier
    #[error("Invalid identifier `{0}`")]
    InvalidIdentifier(CompactString),

    /// A raw SQL template references a missing argument or is malformed
    #[error("Template error: {0}")]
    Template(String),

    /// Process-wide initialization was skipped or repeated
    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    /// A folded record could not be bound onto the target shape
    #[error("Mapping error: {0}")]
    Mapping(String),
}

/// Result type for query construction and rendering
pub type Result<T> = std::result::Result<T, JoinError>;
