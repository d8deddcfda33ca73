//! Core of joinwise: metadata, accessor resolution, projection, joins,
//! predicates and rendering of multi-table SELECT statements.

pub mod accessor;
pub mod alias;
pub mod bootstrap;
pub mod config;
pub mod dialect;
pub mod error;
pub mod function;
pub mod join;
pub mod metadata;
pub mod predicate;
pub mod projection;
pub mod query;
pub mod result;
pub mod sql;
pub mod tracing;
pub mod value;
pub mod wrapper;

// Re-export key types and traits
pub use accessor::{Accessor, AccessorCache, Field, FieldRef, Resolver};
pub use alias::AliasTable;
pub use bootstrap::{Runtime, install, install_runtime, install_with, runtime};
pub use config::JoinConfig;
pub use dialect::Dialect;
pub use error::{JoinError, Result};
pub use function::{DefaultFunc, FunctionRegistry, SqlFunction};
pub use join::{JoinClause, JoinKind};
pub use metadata::{
    ColumnInfo, Entity, EntityType, FieldFill, MetadataProvider, Registry, Shape, TableInfo, is_identifier,
};
pub use predicate::{CompareOp, Condition, IntoValue, Operand, OperandKind, PredicateNode, Rhs};
pub use projection::{ColumnExpr, ColumnFilter, FuncArg, Projection};
pub use query::Query;
pub use result::{Cell, CollectionInfo, OutputColumn, Record, ResultShape, Row};
pub use sql::{SqlWriter, Token};
pub use value::Value;
pub use wrapper::{Columns, IntoAlias, SortDirection, Wrapper};
