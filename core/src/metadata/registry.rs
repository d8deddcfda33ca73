use core::any::TypeId;

use hashbrown::{HashMap, HashSet};

use super::{Entity, EntityType, MetadataProvider, TableInfo, check_identifier};
use crate::error::{JoinError, Result};

/// In-memory metadata provider.
///
/// Entities are registered once during bootstrap; afterwards the registry is
/// read-only and can be shared freely.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    tables: HashMap<TypeId, TableInfo>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `E`, validating its table and column identifiers.
    ///
    /// Registering the same entity twice replaces the earlier metadata.
    pub fn register<E: Entity>(&mut self) -> Result<&mut Self> {
        self.register_table(E::table_info())
    }

    /// Registers hand-built table metadata.
    pub fn register_table(&mut self, table: TableInfo) -> Result<&mut Self> {
        check_identifier(table.name)?;

        let mut seen = HashSet::with_capacity(table.columns.len());
        for column in table.columns {
            check_identifier(column.column)?;
            if !seen.insert(column.property) {
                return Err(JoinError::InvalidIdentifier(
                    format!("{}.{} is declared twice", table.name, column.property).into(),
                ));
            }
        }

        self.tables.insert(table.entity.type_id(), table);
        Ok(self)
    }

    pub fn contains(&self, entity: EntityType) -> bool {
        self.tables.contains_key(&entity.type_id())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Registered tables, in no particular order
    pub fn tables(&self) -> impl Iterator<Item = &TableInfo> {
        self.tables.values()
    }
}

impl MetadataProvider for Registry {
    fn table(&self, entity: EntityType) -> Result<&TableInfo> {
        self.tables
            .get(&entity.type_id())
            .ok_or(JoinError::UnknownEntity(entity.name()))
    }
}
