//! Entity metadata: what the builder needs to know about tables and columns.
//!
//! The `Entity` and `Shape` traits are normally derived with
//! `#[derive(Entity)]` / `#[derive(Shape)]`; the derive output is plain const data
//! so hand-written impls work the same way.

mod registry;

pub use registry::*;

use core::any::TypeId;
use core::hash::{Hash, Hasher};

use crate::error::{JoinError, Result};

/// Identity of a Rust type used as an entity or a result shape.
#[derive(Clone, Copy)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
}

impl EntityType {
    /// The entity type for `E`.
    #[inline]
    pub fn of<E: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: core::any::type_name::<E>(),
        }
    }

    /// Fully qualified Rust type name, for diagnostics.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Debug for EntityType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("EntityType").field(&self.name).finish()
    }
}

/// Automatic fill policy of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldFill {
    #[default]
    Default,
    Insert,
    Update,
    InsertUpdate,
}

/// Mapping of one entity property to one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Rust property name
    pub property: &'static str,
    /// Database column name
    pub column: &'static str,
    /// Rust type of the property, as written in the entity
    pub type_hint: &'static str,
    pub nullable: bool,
    pub primary_key: bool,
    pub fill: FieldFill,
}

impl ColumnInfo {
    pub const fn new(property: &'static str, column: &'static str, type_hint: &'static str) -> Self {
        Self {
            property,
            column,
            type_hint,
            nullable: false,
            primary_key: false,
            fill: FieldFill::Default,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn fill(mut self, fill: FieldFill) -> Self {
        self.fill = fill;
        self
    }

    /// True when the Rust type is a string-like type.
    ///
    /// The hint is compared token by token, so `&'static str` and
    /// `Option< String >` are recognized however they are spaced.
    pub fn is_char_sequence(&self) -> bool {
        let hint = canonical_type(self.type_hint);
        let inner = hint
            .strip_prefix("Option<")
            .and_then(|h| h.strip_suffix('>'))
            .unwrap_or(&hint);
        matches!(
            inner,
            "String" | "str" | "&str" | "&'static str" | "CompactString" | "Cow<str>" | "Cow<'static, str>"
        )
    }
}

/// A type mapped to a table.
pub trait Entity: 'static {
    /// Table name
    const TABLE: &'static str;
    /// Mapped columns in declaration order
    const COLUMNS: &'static [ColumnInfo];

    fn entity_type() -> EntityType {
        EntityType::of::<Self>()
    }

    fn table_info() -> TableInfo {
        TableInfo {
            entity: EntityType::of::<Self>(),
            name: Self::TABLE,
            columns: Self::COLUMNS,
        }
    }
}

/// A result shape: any struct whose property names the builder can inspect.
pub trait Shape: 'static {
    const PROPERTIES: &'static [&'static str];
}

/// Relational metadata of one registered entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInfo {
    pub entity: EntityType,
    pub name: &'static str,
    pub columns: &'static [ColumnInfo],
}

impl TableInfo {
    /// Column mapped to `property`, if any
    pub fn column(&self, property: &str) -> Option<&'static ColumnInfo> {
        self.columns.iter().find(|c| c.property == property)
    }

    /// Primary-key columns in declaration order
    pub fn key_columns(&self) -> impl Iterator<Item = &'static ColumnInfo> {
        self.columns.iter().filter(|c| c.primary_key)
    }
}

/// Source of table and column mappings.
///
/// The builder only reads metadata; schema discovery and registration belong to
/// the implementor.
pub trait MetadataProvider: Send + Sync {
    /// Table metadata for `entity`, or `UnknownEntity`.
    fn table(&self, entity: EntityType) -> Result<&TableInfo>;

    fn table_name(&self, entity: EntityType) -> Result<&'static str> {
        Ok(self.table(entity)?.name)
    }

    /// Mapped columns of `entity` in declaration order.
    fn columns(&self, entity: EntityType) -> Result<&'static [ColumnInfo]> {
        Ok(self.table(entity)?.columns)
    }

    /// Column mapped to `entity.property`: `UnknownEntity` when the entity is not
    /// registered, `UnknownColumn` when the property is not mapped.
    fn column(&self, entity: EntityType, property: &str) -> Result<&'static ColumnInfo> {
        self.table(entity)?
            .column(property)
            .ok_or_else(|| JoinError::UnknownColumn {
                entity: entity.name(),
                property: property.into(),
            })
    }
}

/// Respaces a Rust type the way rustfmt writes it: words are separated by one
/// space, punctuation is not, and a comma is followed by a space.
fn canonical_type(hint: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut out = String::with_capacity(hint.len());
    for token in hint.split_whitespace() {
        let spaced = match (out.chars().last(), token.chars().next()) {
            (Some(','), _) => true,
            (Some(prev), Some(next)) => is_word(prev) && (is_word(next) || next == '\''),
            _ => false,
        };
        if spaced {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

/// Returns true for plain SQL identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn check_identifier(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(JoinError::InvalidIdentifier(name.into()))
    }
}
