//! # joinwise
//!
//! A typed builder for multi-table SELECT statements over entity metadata.
//!
//! Entities are plain structs deriving [`Entity`]; each field becomes a typed
//! accessor const (`User::id`), and the [`Wrapper`] turns accessors into a
//! projection, joins and predicates. Rendering produces a [`Query`] holding
//! the SQL text, its parameters in placeholder order, and the layout needed to
//! fold executor rows back into nested records.
//!
//! ## Quick Start
//!
//! ```rust
//! use joinwise::prelude::*;
//!
//! #[derive(Entity)]
//! #[entity(table = "users")]
//! struct User {
//!     #[column(primary)]
//!     id: i64,
//!     name: String,
//! }
//!
//! #[derive(Entity)]
//! #[entity(table = "orders")]
//! struct Order {
//!     #[column(primary)]
//!     id: i64,
//!     user_id: i64,
//!     total: i64,
//! }
//!
//! # fn main() -> joinwise::Result<()> {
//! let mut registry = Registry::new();
//! registry.register::<User>()?.register::<Order>()?;
//!
//! let query = Wrapper::new::<User>(&registry)?
//!     .select((User::id, User::name))?
//!     .select_sum_as(Order::total, "spent")?
//!     .left_join_on(Order::user_id, User::id)?
//!     .gt(Order::total, 10)?
//!     .group_by((User::id, User::name))?
//!     .render()?;
//!
//! assert_eq!(
//!     query.sql,
//!     "SELECT t.id, t.name, SUM(t1.total) AS spent FROM users t \
//!      LEFT JOIN orders t1 ON t1.user_id = t.id WHERE t1.total > ? GROUP BY t.id, t.name"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Process-wide metadata
//!
//! Register entities once with [`install`], then build wrappers anywhere with
//! [`wrapper`] without passing the registry around.

// =============================================================================
// Root-level exports
// =============================================================================

/// Derive macros
pub use joinwise_macros::{Entity, Shape};

/// Result type for joinwise operations
pub use joinwise_core::error::Result;

/// Error types
pub mod error {
    pub use joinwise_core::error::{JoinError, Result};
}

pub use joinwise_core::{
    Accessor, AccessorCache, Cell, ColumnInfo, ColumnFilter, Columns, CompareOp, Condition, DefaultFunc, Dialect,
    EntityType, Field, FieldFill, FieldRef, FunctionRegistry, IntoAlias, IntoValue, JoinConfig, JoinError,
    JoinKind, MetadataProvider, Operand, PredicateNode, Query, Record, Registry, ResultShape, Row, Runtime,
    SortDirection, SqlFunction, TableInfo, Value, Wrapper, install, install_runtime, install_with, runtime,
};

/// Traits implemented by the derive macros of the same name
pub use joinwise_core::{Entity, Shape};

/// Core building blocks: metadata, accessors, predicates, projection, results.
pub mod core {
    pub use joinwise_core::*;
}

/// A wrapper driven by `E` against the installed runtime.
///
/// Fails with a `Bootstrap` error when [`install`] has not been called.
pub fn wrapper<E: joinwise_core::Entity>() -> Result<Wrapper<'static>> {
    Wrapper::global::<E>()
}

/// Everything needed to declare entities and build queries.
pub mod prelude {
    pub use crate::{
        Dialect, Entity, Field, JoinConfig, JoinError, JoinKind, Query, Record, Registry, Result, Row, Shape,
        SortDirection, Value, Wrapper, install, wrapper,
    };
}
