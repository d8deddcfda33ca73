//! Result rows and their folding onto nested records.
//!
//! The executor hands back flat [`Row`]s labelled the way the SELECT list
//! labelled them. [`ResultShape::fold`] renames labels to properties and folds
//! sub-collection columns of rows sharing the driving key into nested lists.

use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::metadata::EntityType;
use crate::value::Value;

/// One result row as returned by the executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(CompactString, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cell; builder style for executors and tests.
    pub fn with(mut self, label: impl Into<CompactString>, value: impl Into<Value>) -> Self {
        self.push(label, value);
        self
    }

    pub fn push(&mut self, label: impl Into<CompactString>, value: impl Into<Value>) {
        self.cells.push((label.into(), value.into()));
    }

    /// Value of the first cell labelled `label`
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<L: Into<CompactString>, V: Into<Value>> FromIterator<(L, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(label, value)| (label.into(), value.into()))
                .collect(),
        }
    }
}

/// A property of a folded record.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Value(Value),
    Many(Vec<Record>),
}

/// A folded result: properties in SELECT order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(CompactString, Cell)>,
}

impl Record {
    pub fn get(&self, property: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, cell)| cell)
    }

    pub fn value(&self, property: &str) -> Option<&Value> {
        match self.get(property)? {
            Cell::Value(value) => Some(value),
            Cell::Many(_) => None,
        }
    }

    pub fn many(&self, property: &str) -> Option<&[Record]> {
        match self.get(property)? {
            Cell::Many(records) => Some(records),
            Cell::Value(_) => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.fields.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn is_all_null(&self) -> bool {
        self.fields
            .iter()
            .all(|(_, cell)| matches!(cell, Cell::Value(Value::Null)))
    }

    /// Binds this record onto any deserializable shape.
    #[cfg(feature = "serde")]
    pub fn bind<T: serde::de::DeserializeOwned>(&self) -> crate::error::Result<T> {
        let json = serde_json::to_value(self).map_err(|e| crate::error::JoinError::Mapping(e.to_string()))?;
        serde_json::from_value(json).map_err(|e| crate::error::JoinError::Mapping(e.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Cell {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Value(value) => value.serialize(serializer),
            Cell::Many(records) => records.serialize(serializer),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, cell) in &self.fields {
            map.serialize_entry(name.as_str(), cell)?;
        }
        map.end()
    }
}

/// One output column of a rendered SELECT list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    /// Name the database reports for the column
    pub label: CompactString,
    /// Property the value is bound to
    pub property: CompactString,
    /// Owning entity, `None` for functions and raw expressions
    pub entity: Option<EntityType>,
    pub primary_key: bool,
    /// Index into [`ResultShape::collections`] for folded columns
    pub collection: Option<usize>,
}

impl OutputColumn {
    pub(crate) fn computed(label: CompactString) -> Self {
        Self {
            property: label.clone(),
            label,
            entity: None,
            primary_key: false,
            collection: None,
        }
    }
}

/// A sub-collection: columns folded into a list under `property`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub property: &'static str,
    /// Output columns holding the nested primary key
    pub key: SmallVec<[usize; 2]>,
}

impl CollectionInfo {
    pub(crate) fn new(property: &'static str) -> Self {
        Self {
            property,
            key: SmallVec::new(),
        }
    }
}

/// Output layout of a rendered query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultShape {
    columns: Vec<OutputColumn>,
    key: SmallVec<[usize; 2]>,
    collections: Vec<CollectionInfo>,
}

/// Per-parent state while folding.
struct Parent {
    values: Vec<Option<Value>>,
    nested: Vec<Vec<Record>>,
    seen: Vec<HashSet<String>>,
}

impl ResultShape {
    /// Appends an output column.
    ///
    /// Top-level properties stay unique: on a collision the new column is bound
    /// under its label, or, when its label is that property (an explicit alias),
    /// the earlier column moves to its own label instead.
    pub(crate) fn push_column(&mut self, mut column: OutputColumn, root: EntityType) {
        if column.collection.is_none() {
            let taken = self
                .columns
                .iter_mut()
                .find(|c| c.collection.is_none() && c.property == column.property);
            if let Some(earlier) = taken {
                if column.label != column.property {
                    column.property = column.label.clone();
                } else {
                    earlier.property = earlier.label.clone();
                }
            }
        }
        let index = self.columns.len();
        if column.primary_key {
            match column.collection {
                Some(collection) => self.collections[collection].key.push(index),
                None if column.entity == Some(root) => self.key.push(index),
                None => {}
            }
        }
        self.columns.push(column);
    }

    pub(crate) fn push_collection(&mut self, collection: CollectionInfo) -> usize {
        self.collections.push(collection);
        self.collections.len() - 1
    }

    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    pub fn collections(&self) -> &[CollectionInfo] {
        &self.collections
    }

    /// Labels of the driving entity's primary key
    pub fn key_labels(&self) -> impl Iterator<Item = &str> {
        self.key.iter().map(|&i| self.columns[i].label.as_str())
    }

    /// Folds flat rows into records.
    ///
    /// Without sub-collections every row becomes one record. Otherwise rows
    /// sharing the driving key (or, without a key, all top-level values) fold
    /// into one record whose collection properties list the nested rows in
    /// source order; all-NULL nested rows are dropped and duplicates kept once.
    pub fn fold<I: IntoIterator<Item = Row>>(&self, rows: I) -> Vec<Record> {
        if self.collections.is_empty() {
            return rows
                .into_iter()
                .map(|row| Record {
                    fields: self
                        .columns
                        .iter()
                        .map(|c| (c.property.clone(), Cell::Value(cell(&row, c))))
                        .collect(),
                })
                .collect();
        }

        let top: Vec<usize> = (0..self.columns.len())
            .filter(|&i| self.columns[i].collection.is_none())
            .collect();
        let key: &[usize] = if self.key.is_empty() { &top } else { &self.key };

        let mut order: Vec<Parent> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for row in rows {
            let parent_key = fingerprint(key.iter().map(|&i| cell(&row, &self.columns[i])));
            let slot = *index.entry(parent_key).or_insert_with(|| {
                order.push(Parent {
                    values: self
                        .columns
                        .iter()
                        .map(|c| c.collection.is_none().then(|| cell(&row, c)))
                        .collect(),
                    nested: vec![Vec::new(); self.collections.len()],
                    seen: vec![HashSet::new(); self.collections.len()],
                });
                order.len() - 1
            });
            let parent = &mut order[slot];

            for (c, collection) in self.collections.iter().enumerate() {
                let nested = Record {
                    fields: self
                        .columns
                        .iter()
                        .filter(|col| col.collection == Some(c))
                        .map(|col| (col.property.clone(), Cell::Value(cell(&row, col))))
                        .collect(),
                };
                if nested.is_all_null() {
                    continue;
                }
                let nested_key = if collection.key.is_empty() {
                    fingerprint(nested.fields.iter().map(|(_, cell)| match cell {
                        Cell::Value(value) => value.clone(),
                        Cell::Many(_) => Value::Null,
                    }))
                } else {
                    fingerprint(collection.key.iter().map(|&i| cell(&row, &self.columns[i])))
                };
                if parent.seen[c].insert(nested_key) {
                    parent.nested[c].push(nested);
                }
            }
        }

        order
            .into_iter()
            .map(|parent| self.assemble(parent))
            .collect()
    }

    fn assemble(&self, parent: Parent) -> Record {
        let Parent { values, nested, .. } = parent;
        let mut nested: Vec<Option<Vec<Record>>> = nested.into_iter().map(Some).collect();
        let mut fields = Vec::with_capacity(values.len());

        for (column, value) in self.columns.iter().zip(values) {
            match (column.collection, value) {
                (None, Some(value)) => fields.push((column.property.clone(), Cell::Value(value))),
                (Some(c), _) => {
                    if let Some(records) = nested[c].take() {
                        fields.push((self.collections[c].property.into(), Cell::Many(records)));
                    }
                }
                (None, None) => {}
            }
        }
        Record { fields }
    }
}

fn cell(row: &Row, column: &OutputColumn) -> Value {
    row.get(&column.label).cloned().unwrap_or_default()
}

fn fingerprint<I: IntoIterator<Item = Value>>(values: I) -> String {
    use core::fmt::Write;

    let mut out = String::new();
    for value in values {
        let _ = write!(out, "{value:?}\u{1f}");
    }
    out
}
