use compact_str::{CompactString, format_compact};
use smallvec::SmallVec;

use crate::accessor::FieldRef;
use crate::metadata::EntityType;

/// Entities introduced into a query, in introduction order.
///
/// Slot 0 holds the driving entity and renders as the bare prefix (`t`); slot
/// `n` renders as `{prefix}{n}` (`t1`, `t2`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    prefix: CompactString,
    entries: SmallVec<[EntityType; 4]>,
}

impl AliasTable {
    pub fn new(prefix: impl Into<CompactString>, root: EntityType) -> Self {
        let mut entries = SmallVec::new();
        entries.push(root);
        Self {
            prefix: prefix.into(),
            entries,
        }
    }

    pub fn root(&self) -> EntityType {
        self.entries[0]
    }

    /// Introduces `entity` and returns its slot.
    pub fn push(&mut self, entity: EntityType) -> usize {
        self.entries.push(entity);
        self.entries.len() - 1
    }

    pub(crate) fn set_prefix(&mut self, prefix: impl Into<CompactString>) {
        self.prefix = prefix.into();
    }

    /// First slot holding `entity`
    pub fn first(&self, entity: EntityType) -> Option<usize> {
        self.entries.iter().position(|e| *e == entity)
    }

    pub fn contains(&self, entity: EntityType) -> bool {
        self.first(entity).is_some()
    }

    pub fn entity(&self, slot: usize) -> Option<EntityType> {
        self.entries.get(slot).copied()
    }

    pub fn alias(&self, slot: usize) -> CompactString {
        if slot == 0 {
            self.prefix.clone()
        } else {
            format_compact!("{}{}", self.prefix, slot)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, EntityType)> + '_ {
        self.entries.iter().copied().enumerate()
    }
}

/// How entity references map to slots while rendering.
///
/// A field with an explicit slot always reads from that slot. Otherwise, inside
/// a pinned ON clause the joined entity refers to its own slot, and everywhere
/// else an entity refers to the first slot that introduced it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AliasScope<'a> {
    table: &'a AliasTable,
    pinned: Option<(EntityType, usize)>,
}

impl<'a> AliasScope<'a> {
    pub(crate) fn new(table: &'a AliasTable) -> Self {
        Self {
            table,
            pinned: None,
        }
    }

    pub(crate) fn pinned(table: &'a AliasTable, entity: EntityType, slot: usize) -> Self {
        Self {
            table,
            pinned: Some((entity, slot)),
        }
    }

    pub(crate) fn slot(&self, entity: EntityType) -> Option<usize> {
        match self.pinned {
            Some((pinned, slot)) if pinned == entity => Some(slot),
            _ => self.table.first(entity),
        }
    }

    pub(crate) fn alias(&self, entity: EntityType) -> Option<CompactString> {
        self.slot(entity).map(|slot| self.table.alias(slot))
    }

    /// Alias of the table `field` reads from; `None` when its slot does not
    /// hold its owner.
    pub(crate) fn field_alias(&self, field: &FieldRef) -> Option<CompactString> {
        match field.slot() {
            Some(slot) => (self.table.entity(slot) == Some(field.owner())).then(|| self.table.alias(slot)),
            None => self.alias(field.owner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ColumnInfo;

    struct User;
    struct Address;

    #[test]
    fn test_aliases() {
        let user = EntityType::of::<User>();
        let address = EntityType::of::<Address>();

        let mut table = AliasTable::new("t", user);
        assert_eq!(table.push(address), 1);
        assert_eq!(table.push(address), 2);

        assert_eq!(table.alias(0), "t");
        assert_eq!(table.alias(1), "t1");
        assert_eq!(table.alias(2), "t2");
        assert_eq!(table.first(address), Some(1));
        assert_eq!(table.root(), user);

        let scope = AliasScope::pinned(&table, address, 2);
        assert_eq!(scope.alias(address).unwrap(), "t2");
        assert_eq!(scope.alias(user).unwrap(), "t");
        assert_eq!(AliasScope::new(&table).alias(address).unwrap(), "t1");
    }

    #[test]
    fn test_explicit_slot_overrides_scope() {
        static ID: ColumnInfo = ColumnInfo::new("id", "id", "i64");

        let user = EntityType::of::<User>();
        let address = EntityType::of::<Address>();
        let mut table = AliasTable::new("t", user);
        table.push(address);
        table.push(address);

        let field = FieldRef::new(address, &ID);
        let pinned = AliasScope::pinned(&table, address, 2);
        assert_eq!(pinned.field_alias(&field).unwrap(), "t2");
        assert_eq!(pinned.field_alias(&field.at(1)).unwrap(), "t1");
        assert_eq!(AliasScope::new(&table).field_alias(&field.at(2)).unwrap(), "t2");

        // slot 0 holds User; slot 5 does not exist
        assert!(pinned.field_alias(&field.at(0)).is_none());
        assert!(pinned.field_alias(&field.at(5)).is_none());
    }
}
