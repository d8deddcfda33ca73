//! The SELECT list.
//!
//! Items are stored as declared and expanded only at render time, so entity
//! expansions always reflect the provider's current column order. Rendering
//! also produces the [`ResultShape`] that maps output labels back to
//! properties.

use std::sync::Arc;

use compact_str::{CompactString, ToCompactString, format_compact};
use hashbrown::HashSet;

use crate::accessor::FieldRef;
use crate::alias::AliasScope;
use crate::error::{JoinError, Result};
use crate::function::apply_template;
use crate::metadata::{ColumnInfo, EntityType, MetadataProvider, check_identifier};
use crate::result::{CollectionInfo, OutputColumn, ResultShape};
use crate::sql::{SqlWriter, Token};

/// Keeps a column of an expanded entity when it returns true.
pub type ColumnFilter = Arc<dyn Fn(&ColumnInfo) -> bool + Send + Sync>;

/// Argument of a projected function call.
#[derive(Debug, Clone, PartialEq)]
pub enum FuncArg {
    Column(FieldRef),
    Raw(CompactString),
}

/// One declared SELECT item.
#[derive(Clone)]
pub enum ColumnExpr {
    Column {
        field: FieldRef,
        alias: Option<CompactString>,
    },
    Function {
        template: CompactString,
        arg: FuncArg,
        alias: CompactString,
    },
    Raw {
        sql: CompactString,
    },
    /// Every mapped column of `entity`, primary keys always included
    Expansion {
        entity: EntityType,
        filter: Option<ColumnFilter>,
    },
    /// Columns of `source` whose property also exists in `properties`
    Subset {
        source: EntityType,
        properties: &'static [&'static str],
    },
    /// Columns of `source` folded into a list under `property`
    Collection {
        source: EntityType,
        property: &'static str,
    },
}

impl core::fmt::Debug for ColumnExpr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ColumnExpr::Column { field, alias } => f
                .debug_struct("Column")
                .field("field", field)
                .field("alias", alias)
                .finish(),
            ColumnExpr::Function { template, arg, alias } => f
                .debug_struct("Function")
                .field("template", template)
                .field("arg", arg)
                .field("alias", alias)
                .finish(),
            ColumnExpr::Raw { sql } => f.debug_struct("Raw").field("sql", sql).finish(),
            ColumnExpr::Expansion { entity, filter } => f
                .debug_struct("Expansion")
                .field("entity", entity)
                .field("filtered", &filter.is_some())
                .finish(),
            ColumnExpr::Subset { source, properties } => f
                .debug_struct("Subset")
                .field("source", source)
                .field("properties", properties)
                .finish(),
            ColumnExpr::Collection { source, property } => f
                .debug_struct("Collection")
                .field("source", source)
                .field("property", property)
                .finish(),
        }
    }
}

/// Accumulated SELECT items in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    items: Vec<ColumnExpr>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ColumnExpr] {
        &self.items
    }

    pub fn add_column(&mut self, field: FieldRef, alias: Option<CompactString>) -> Result<()> {
        if let Some(alias) = &alias {
            check_identifier(alias)?;
        }
        self.items.push(ColumnExpr::Column { field, alias });
        Ok(())
    }

    pub fn add_function(&mut self, template: CompactString, arg: FuncArg, alias: CompactString) -> Result<()> {
        check_identifier(&alias)?;
        self.items.push(ColumnExpr::Function { template, arg, alias });
        Ok(())
    }

    pub fn add_raw(&mut self, sql: impl Into<CompactString>) {
        self.items.push(ColumnExpr::Raw { sql: sql.into() });
    }

    pub fn add_expansion(&mut self, entity: EntityType, filter: Option<ColumnFilter>) {
        self.items.push(ColumnExpr::Expansion { entity, filter });
    }

    pub fn add_subset(&mut self, source: EntityType, properties: &'static [&'static str]) {
        self.items.push(ColumnExpr::Subset { source, properties });
    }

    pub fn add_collection(&mut self, source: EntityType, property: &'static str) {
        self.items.push(ColumnExpr::Collection { source, property });
    }

    /// Writes the comma-separated SELECT list and describes its output.
    ///
    /// An empty projection renders every column of `root`.
    pub(crate) fn render(
        &self,
        w: &mut SqlWriter,
        scope: &AliasScope<'_>,
        metadata: &dyn MetadataProvider,
        root: EntityType,
    ) -> Result<ResultShape> {
        let fallback = [ColumnExpr::Expansion {
            entity: root,
            filter: None,
        }];
        let items = if self.items.is_empty() {
            &fallback[..]
        } else {
            &self.items[..]
        };

        let mut labels = Labels::new(items)?;
        let mut shape = ResultShape::default();
        let mut first = true;

        for item in items {
            match item {
                ColumnExpr::Column { field, alias } => {
                    let table = field_table(scope, field)?;
                    let label = match alias {
                        Some(alias) => alias.clone(),
                        None => labels.implicit(&table, field.column()),
                    };
                    separator(w, &mut first);
                    w.column(&table, field.column());
                    if label != field.column() {
                        w.token(Token::AS).raw(&label);
                    }
                    let property = match alias {
                        Some(alias) => alias.clone(),
                        None => field.property().into(),
                    };
                    shape.push_column(OutputColumn {
                        label,
                        property,
                        entity: Some(field.owner()),
                        primary_key: field.info().primary_key,
                        collection: None,
                    }, root);
                }
                ColumnExpr::Function { template, arg, alias } => {
                    let arg_sql = match arg {
                        FuncArg::Column(field) => {
                            format_compact!("{}.{}", field_table(scope, field)?, field.column())
                        }
                        FuncArg::Raw(sql) => sql.clone(),
                    };
                    separator(w, &mut first);
                    w.raw(&apply_template(template, &arg_sql))
                        .token(Token::AS)
                        .raw(alias);
                    shape.push_column(OutputColumn::computed(alias.clone()), root);
                }
                ColumnExpr::Raw { sql } => {
                    separator(w, &mut first);
                    w.raw(sql);
                    shape.push_column(OutputColumn::computed(raw_label(sql)), root);
                }
                ColumnExpr::Expansion { entity, filter } => {
                    let columns = metadata.columns(*entity)?;
                    let keep = |column: &ColumnInfo| {
                        column.primary_key || filter.as_ref().is_none_or(|filter| filter(column))
                    };
                    for column in columns.iter().filter(|c| keep(c)) {
                        expand(w, scope, &mut labels, &mut shape, &mut first, *entity, column, None, root)?;
                    }
                }
                ColumnExpr::Subset { source, properties } => {
                    let table = metadata.table(*source)?;
                    for property in properties.iter() {
                        if table.column(property).is_none() {
                            crate::joinwise_trace_skip!(source.name(), *property);
                        }
                    }
                    for column in table.columns.iter().filter(|c| properties.contains(&c.property)) {
                        expand(w, scope, &mut labels, &mut shape, &mut first, *source, column, None, root)?;
                    }
                }
                ColumnExpr::Collection { source, property } => {
                    let columns = metadata.columns(*source)?;
                    let index = shape.push_collection(CollectionInfo::new(*property));
                    for column in columns {
                        expand(w, scope, &mut labels, &mut shape, &mut first, *source, column, Some(index), root)?;
                    }
                }
            }
        }

        Ok(shape)
    }
}

#[allow(clippy::too_many_arguments)]
fn expand(
    w: &mut SqlWriter,
    scope: &AliasScope<'_>,
    labels: &mut Labels,
    shape: &mut ResultShape,
    first: &mut bool,
    entity: EntityType,
    column: &'static ColumnInfo,
    collection: Option<usize>,
    root: EntityType,
) -> Result<()> {
    let table = scope
        .alias(entity)
        .ok_or(JoinError::TableNotJoined(entity.name()))?;
    let label = labels.implicit(&table, column.column);

    separator(w, first);
    w.column(&table, column.column);
    if label != column.column {
        w.token(Token::AS).raw(&label);
    }
    shape.push_column(
        OutputColumn {
            label,
            property: column.property.into(),
            entity: Some(entity),
            primary_key: column.primary_key,
            collection,
        },
        root,
    );
    Ok(())
}

fn field_table(scope: &AliasScope<'_>, field: &FieldRef) -> Result<CompactString> {
    scope
        .field_alias(field)
        .ok_or(JoinError::TableNotJoined(field.owner().name()))
}

fn separator(w: &mut SqlWriter, first: &mut bool) {
    if !core::mem::take(first) {
        w.token(Token::COMMA);
    }
}

/// Output name of a raw SELECT item: the text after a trailing `AS`, or the
/// whole expression.
fn raw_label(sql: &str) -> CompactString {
    let trimmed = sql.trim();
    let upper = trimmed.to_ascii_uppercase();
    match upper.rfind(" AS ") {
        Some(pos) => trimmed[pos + 4..].trim().to_compact_string(),
        None => trimmed.to_compact_string(),
    }
}

/// Output labels handed out so far.
struct Labels {
    taken: HashSet<CompactString>,
}

impl Labels {
    /// Reserves every explicit alias and raw item label, failing on the first
    /// duplicate.
    fn new(items: &[ColumnExpr]) -> Result<Self> {
        let mut taken = HashSet::new();
        for item in items {
            let label = match item {
                ColumnExpr::Column { alias: Some(alias), .. } => alias.clone(),
                ColumnExpr::Function { alias, .. } => alias.clone(),
                ColumnExpr::Raw { sql } => raw_label(sql),
                _ => continue,
            };
            if taken.contains(&label) {
                return Err(JoinError::DuplicateAlias(label));
            }
            taken.insert(label);
        }
        Ok(Self { taken })
    }

    /// The column name, or `{table}_{column}[_{n}]` when it is already taken.
    fn implicit(&mut self, table: &str, column: &str) -> CompactString {
        if self.taken.insert(column.into()) {
            return column.into();
        }

        let base = format_compact!("{table}_{column}");
        let mut label = base.clone();
        let mut n = 2;
        while !self.taken.insert(label.clone()) {
            label = format_compact!("{base}_{n}");
            n += 1;
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{AccessorCache, Field, Resolver};
    use crate::alias::AliasTable;
    use crate::dialect::Dialect;
    use crate::metadata::{Entity, Registry};

    struct Author;
    struct Book;

    impl Entity for Author {
        const TABLE: &'static str = "author";
        const COLUMNS: &'static [ColumnInfo] = &[
            ColumnInfo::new("id", "id", "i64").primary_key(),
            ColumnInfo::new("name", "name", "String"),
            ColumnInfo::new("bio", "biography", "Option<String>").nullable(),
        ];
    }

    impl Entity for Book {
        const TABLE: &'static str = "book";
        const COLUMNS: &'static [ColumnInfo] = &[
            ColumnInfo::new("id", "id", "i64").primary_key(),
            ColumnInfo::new("author_id", "author_id", "i64"),
            ColumnInfo::new("name", "name", "String"),
        ];
    }

    struct Fixture {
        registry: Registry,
        cache: AccessorCache,
        aliases: AliasTable,
    }

    impl Fixture {
        fn new() -> Self {
            let mut registry = Registry::new();
            registry.register::<Author>().unwrap();
            registry.register::<Book>().unwrap();
            let mut aliases = AliasTable::new("t", EntityType::of::<Author>());
            aliases.push(EntityType::of::<Book>());
            Self {
                registry,
                cache: AccessorCache::new(),
                aliases,
            }
        }

        fn field<E: 'static>(&self, name: &'static str) -> FieldRef {
            Resolver::new(&self.registry, &self.cache)
                .resolve(&Field::<E, ()>::new(name))
                .unwrap()
        }

        fn render(&self, projection: &Projection) -> Result<(String, ResultShape)> {
            let mut w = SqlWriter::new(Dialect::Ansi);
            let shape = projection.render(
                &mut w,
                &AliasScope::new(&self.aliases),
                &self.registry,
                EntityType::of::<Author>(),
            )?;
            Ok((w.finish().0, shape))
        }
    }

    #[test]
    fn test_empty_projection_expands_root() {
        let fx = Fixture::new();
        let (sql, shape) = fx.render(&Projection::new()).unwrap();
        assert_eq!(sql, "t.id, t.name, t.biography");
        assert_eq!(shape.key_labels().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn test_implicit_collisions_are_aliased() {
        let fx = Fixture::new();
        let mut p = Projection::new();
        p.add_column(fx.field::<Author>("id"), None).unwrap();
        p.add_column(fx.field::<Book>("id"), None).unwrap();
        p.add_column(fx.field::<Book>("name"), Some("name".into())).unwrap();
        p.add_column(fx.field::<Author>("name"), None).unwrap();

        let (sql, shape) = fx.render(&p).unwrap();
        assert_eq!(sql, "t.id, t1.id AS t1_id, t1.name, t.name AS t_name");

        // top-level properties stay unique: a later collision takes its label
        let properties: Vec<_> = shape.columns().iter().map(|c| c.property.as_str()).collect();
        assert_eq!(properties, ["id", "t1_id", "name", "t_name"]);
    }

    #[test]
    fn test_raw_labels_are_reserved() {
        let fx = Fixture::new();
        let mut p = Projection::new();
        p.add_raw("1 AS id");
        p.add_column(fx.field::<Author>("id"), None).unwrap();

        let (sql, shape) = fx.render(&p).unwrap();
        assert_eq!(sql, "1 AS id, t.id AS t_id");
        let labels: Vec<_> = shape.columns().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["id", "t_id"]);

        p.add_column(fx.field::<Book>("name"), Some("id".into())).unwrap();
        assert_eq!(fx.render(&p).unwrap_err(), JoinError::DuplicateAlias("id".into()));

        let mut p = Projection::new();
        p.add_raw("COUNT(*) AS n");
        p.add_raw("MAX(1) as n");
        assert_eq!(fx.render(&p).unwrap_err(), JoinError::DuplicateAlias("n".into()));
    }

    #[test]
    fn test_explicit_slot() {
        let mut fx = Fixture::new();
        fx.aliases.push(EntityType::of::<Book>());
        let mut p = Projection::new();
        p.add_column(fx.field::<Book>("name"), None).unwrap();
        p.add_column(fx.field::<Book>("name").at(2), None).unwrap();
        p.add_function("MAX(%s)".into(), FuncArg::Column(fx.field::<Book>("id").at(2)), "top".into())
            .unwrap();

        let (sql, _) = fx.render(&p).unwrap();
        assert_eq!(sql, "t1.name, t2.name AS t2_name, MAX(t2.id) AS top");

        p.add_column(fx.field::<Book>("id").at(0), None).unwrap();
        assert!(matches!(fx.render(&p), Err(JoinError::TableNotJoined(_))));
    }

    #[test]
    fn test_duplicate_explicit_alias() {
        let fx = Fixture::new();
        let mut p = Projection::new();
        p.add_column(fx.field::<Author>("name"), Some("v".into())).unwrap();
        p.add_function("MAX(%s)".into(), FuncArg::Column(fx.field::<Book>("id")), "v".into())
            .unwrap();

        assert_eq!(fx.render(&p).unwrap_err(), JoinError::DuplicateAlias("v".into()));
    }

    #[test]
    fn test_filtered_expansion_keeps_keys() {
        let fx = Fixture::new();
        let mut p = Projection::new();
        p.add_expansion(
            EntityType::of::<Author>(),
            Some(Arc::new(|c: &ColumnInfo| !c.is_char_sequence())),
        );

        let (sql, _) = fx.render(&p).unwrap();
        assert_eq!(sql, "t.id");
    }

    #[test]
    fn test_subset_and_collection() {
        let fx = Fixture::new();
        let mut p = Projection::new();
        p.add_subset(EntityType::of::<Author>(), &["id", "name", "age"]);
        p.add_collection(EntityType::of::<Book>(), "books");
        p.add_raw("1 AS one");

        let (sql, shape) = fx.render(&p).unwrap();
        assert_eq!(
            sql,
            "t.id, t.name, t1.id AS t1_id, t1.author_id, t1.name AS t1_name, 1 AS one"
        );
        assert_eq!(shape.collections().len(), 1);
        assert_eq!(shape.columns()[5].label, "one");
    }

    #[test]
    fn test_invalid_alias() {
        let fx = Fixture::new();
        let mut p = Projection::new();
        let err = p
            .add_column(fx.field::<Author>("id"), Some("x; --".into()))
            .unwrap_err();
        assert!(matches!(err, JoinError::InvalidIdentifier(_)));
        assert!(p.is_empty());
    }
}
