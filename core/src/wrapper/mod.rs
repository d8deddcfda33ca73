//! The query wrapper: one fluent builder per SELECT statement.
//!
//! ```ignore
//! let query = Wrapper::new::<User>(&registry)?
//!     .select((User::id, User::name))?
//!     .select_sum_as(Order::total, "spent")?
//!     .left_join_on(Order::user_id, User::id)?
//!     .eq(User::active, true)?
//!     .group_by((User::id, User::name))?
//!     .render()?;
//! ```

#[macro_use]
mod macros;
mod columns;

pub use columns::*;

use std::sync::Arc;

use compact_str::CompactString;

use crate::accessor::{AccessorCache, Field, FieldRef, Resolver};
use crate::alias::{AliasScope, AliasTable};
use crate::config::JoinConfig;
use crate::error::{JoinError, Result};
use crate::function::{DefaultFunc, FunctionRegistry, SqlFunction};
use crate::join::{JoinClause, JoinKind, check_references};
use crate::metadata::{ColumnInfo, Entity, EntityType, MetadataProvider, Shape};
use crate::predicate::{Condition, IntoValue, Operand, write_column};
use crate::projection::{FuncArg, Projection};
use crate::query::Query;
use crate::sql::{SqlWriter, Token};
use crate::value::Value;

/// Sort direction of an ORDER BY item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn token(&self) -> Token {
        match self {
            SortDirection::Asc => Token::ASC,
            SortDirection::Desc => Token::DESC,
        }
    }
}

/// Accumulates projection, joins and predicates for one SELECT statement.
///
/// Mutators may be called in any order; order only affects the output column
/// order and the parameter order. [`Wrapper::render`] does not mutate and can
/// be called repeatedly.
#[derive(Debug, Clone)]
pub struct Wrapper<'m> {
    resolver: Resolver<'m>,
    functions: &'m FunctionRegistry,
    config: JoinConfig,
    aliases: AliasTable,
    projection: Projection,
    joins: Vec<JoinClause>,
    filter: Condition<'m>,
    group_by: Vec<FieldRef>,
    order_by: Vec<(FieldRef, SortDirection)>,
    distinct: bool,
}

impl<'m> Wrapper<'m> {
    /// A wrapper driven by `E`, using the process-wide accessor cache and
    /// function registry.
    pub fn new<E: Entity>(metadata: &'m dyn MetadataProvider) -> Result<Self> {
        let root = EntityType::of::<E>();
        metadata.table(root)?;

        let config = JoinConfig::default();
        let resolver = Resolver::new(metadata, AccessorCache::global());
        Ok(Self {
            resolver,
            functions: FunctionRegistry::global(),
            aliases: AliasTable::new(config.table_alias.clone(), root),
            config,
            projection: Projection::new(),
            joins: Vec::new(),
            filter: Condition::new(resolver),
            group_by: Vec::new(),
            order_by: Vec::new(),
            distinct: false,
        })
    }

    pub fn with_cache(mut self, cache: &'m AccessorCache) -> Self {
        self.resolver = Resolver::new(self.resolver.metadata(), cache);
        self.filter.set_resolver(self.resolver);
        self
    }

    pub fn with_functions(mut self, functions: &'m FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_config(mut self, config: JoinConfig) -> Result<Self> {
        config.validate()?;
        self.aliases.set_prefix(config.table_alias.clone());
        self.config = config;
        Ok(self)
    }

    pub fn root(&self) -> EntityType {
        self.aliases.root()
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    fn require<E: Entity>(&self) -> Result<EntityType> {
        let entity = EntityType::of::<E>();
        self.resolver.metadata().table(entity)?;
        Ok(entity)
    }

    //------------------------------------------------------------------------------
    // Projection
    //------------------------------------------------------------------------------

    /// Selects one column or a tuple of columns.
    pub fn select<C: Columns>(&mut self, columns: C) -> Result<&mut Self> {
        for field in resolve_columns(&self.resolver, columns)? {
            self.projection.add_column(field, None)?;
        }
        Ok(self)
    }

    /// Selects `field` under `alias`.
    pub fn select_as<E: 'static, T>(&mut self, field: Field<E, T>, alias: impl IntoAlias) -> Result<&mut Self> {
        let field = self.resolver.resolve(&field)?;
        self.projection.add_column(field, Some(alias.into_alias()))?;
        Ok(self)
    }

    /// Selects `kind(field) AS alias`.
    pub fn select_func<E: 'static, T>(
        &mut self,
        kind: impl SqlFunction,
        field: Field<E, T>,
        alias: impl IntoAlias,
    ) -> Result<&mut Self> {
        let template = self.functions.template(&kind)?;
        let field = self.resolver.resolve(&field)?;
        self.projection
            .add_function(template, FuncArg::Column(field), alias.into_alias())?;
        Ok(self)
    }

    /// Selects `kind(field)` aliased as the field's property name.
    pub fn select_func_default<E: 'static, T>(&mut self, kind: impl SqlFunction, field: Field<E, T>) -> Result<&mut Self> {
        let alias = field.name();
        self.select_func(kind, field, alias)
    }

    /// Selects `kind(sql) AS alias` over a raw argument.
    pub fn select_func_raw(&mut self, kind: impl SqlFunction, sql: &str, alias: impl IntoAlias) -> Result<&mut Self> {
        let template = self.functions.template(&kind)?;
        self.projection
            .add_function(template, FuncArg::Raw(sql.into()), alias.into_alias())?;
        Ok(self)
    }

    wrapper_func_impl!();

    /// `COUNT(sql) AS alias`, e.g. `select_count_raw("*", "n")`.
    pub fn select_count_raw(&mut self, sql: &str, alias: impl IntoAlias) -> Result<&mut Self> {
        self.select_func_raw(DefaultFunc::Count, sql, alias)
    }

    /// Selects every mapped column of `E`.
    pub fn select_all<E: Entity>(&mut self) -> Result<&mut Self> {
        let entity = self.require::<E>()?;
        self.projection.add_expansion(entity, None);
        Ok(self)
    }

    /// Selects the columns of `E` accepted by `filter`; primary keys are always kept.
    pub fn select_filtered<E, F>(&mut self, filter: F) -> Result<&mut Self>
    where
        E: Entity,
        F: Fn(&ColumnInfo) -> bool + Send + Sync + 'static,
    {
        let entity = self.require::<E>()?;
        self.projection.add_expansion(entity, Some(Arc::new(filter)));
        Ok(self)
    }

    /// Selects the columns of `S` whose property also exists on shape `T`.
    pub fn select_as_class<S: Entity, T: Shape>(&mut self) -> Result<&mut Self> {
        let source = self.require::<S>()?;
        self.projection.add_subset(source, T::PROPERTIES);
        Ok(self)
    }

    /// Selects every column of `S`, folded into a list under `target` when the
    /// result is folded.
    pub fn select_collection<S: Entity, D, C>(&mut self, target: Field<D, C>) -> Result<&mut Self> {
        let source = self.require::<S>()?;
        self.projection.add_collection(source, target.name());
        Ok(self)
    }

    /// Appends a raw SELECT item verbatim.
    pub fn select_raw(&mut self, sql: impl Into<CompactString>) -> &mut Self {
        self.projection.add_raw(sql);
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    //------------------------------------------------------------------------------
    // Joins
    //------------------------------------------------------------------------------

    /// Alias slot the next join will take; fields of that join can be pinned
    /// with [`Field::at`].
    pub fn next_slot(&self) -> usize {
        self.aliases.len()
    }

    /// Adds a join of `J`.
    ///
    /// The ON clause may reference the driving table, earlier joins and `J`
    /// itself; inside it an unqualified `J` field refers to this join's alias.
    /// Use [`Field::at`] to reach an earlier copy of `J`, as in a self-join. On
    /// error the wrapper is left unchanged.
    pub fn join<J, F>(&mut self, kind: JoinKind, build: F) -> Result<&mut Self>
    where
        J: Entity,
        F: for<'c> FnOnce(&'c mut Condition<'m>) -> Result<&'c mut Condition<'m>>,
    {
        let entity = self.require::<J>()?;

        let mut on = Condition::new(self.resolver);
        build(&mut on)?;
        self.push_join(kind, entity, on, true)
    }

    /// Adds a join of the owner of `left` on `left = right`.
    ///
    /// Only `left` is read from the new join; `right` resolves like any other
    /// field, so `left_join_on(Category::parent_id, Category::id)` joins a child
    /// category to the driving one.
    pub fn join_on<J, T, R>(&mut self, kind: JoinKind, left: Field<J, T>, right: R) -> Result<&mut Self>
    where
        J: Entity,
        R: Operand<T>,
    {
        let entity = self.require::<J>()?;
        let slot = self.next_slot();

        let mut on = Condition::new(self.resolver);
        on.eq(left.at(slot), right)?;
        self.push_join(kind, entity, on, false)
    }

    fn push_join(&mut self, kind: JoinKind, entity: EntityType, on: Condition<'m>, pinned: bool) -> Result<&mut Self> {
        let on = on
            .into_node()
            .ok_or(JoinError::MissingJoinCondition(entity.name()))?;
        check_references(&on, entity, self.next_slot(), &self.aliases)?;

        let slot = self.aliases.push(entity);
        self.joins.push(JoinClause {
            kind,
            entity,
            slot,
            on,
            pinned,
        });
        Ok(self)
    }

    wrapper_join_impl!();

    //------------------------------------------------------------------------------
    // WHERE
    //------------------------------------------------------------------------------

    wrapper_compare_impl!(eq, ne, gt, ge, lt, le);
    wrapper_pattern_impl!(like, not_like, like_left, like_right);

    pub fn in_list<E, T, I, V>(&mut self, field: Field<E, T>, values: I) -> Result<&mut Self>
    where
        E: 'static,
        I: IntoIterator<Item = V>,
        V: IntoValue<T>,
    {
        self.filter.in_list(field, values)?;
        Ok(self)
    }

    pub fn not_in<E, T, I, V>(&mut self, field: Field<E, T>, values: I) -> Result<&mut Self>
    where
        E: 'static,
        I: IntoIterator<Item = V>,
        V: IntoValue<T>,
    {
        self.filter.not_in(field, values)?;
        Ok(self)
    }

    pub fn between<E, T, L, H>(&mut self, field: Field<E, T>, low: L, high: H) -> Result<&mut Self>
    where
        E: 'static,
        L: IntoValue<T>,
        H: IntoValue<T>,
    {
        self.filter.between(field, low, high)?;
        Ok(self)
    }

    pub fn not_between<E, T, L, H>(&mut self, field: Field<E, T>, low: L, high: H) -> Result<&mut Self>
    where
        E: 'static,
        L: IntoValue<T>,
        H: IntoValue<T>,
    {
        self.filter.not_between(field, low, high)?;
        Ok(self)
    }

    pub fn is_null<E: 'static, T>(&mut self, field: Field<E, T>) -> Result<&mut Self> {
        self.filter.is_null(field)?;
        Ok(self)
    }

    pub fn is_not_null<E: 'static, T>(&mut self, field: Field<E, T>) -> Result<&mut Self> {
        self.filter.is_not_null(field)?;
        Ok(self)
    }

    /// Raw predicate; `{0}`, `{1}`, ... bind `args` in order.
    pub fn apply<I, V>(&mut self, template: &str, args: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter.apply(template, args)?;
        Ok(self)
    }

    /// Nested group: `... AND ( ... )`.
    pub fn and<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: for<'c> FnOnce(&'c mut Condition<'m>) -> Result<&'c mut Condition<'m>>,
    {
        self.filter.and(build)?;
        Ok(self)
    }

    /// Nested group: `... OR ( ... )`.
    pub fn or_nested<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: for<'c> FnOnce(&'c mut Condition<'m>) -> Result<&'c mut Condition<'m>>,
    {
        self.filter.or_nested(build)?;
        Ok(self)
    }

    /// Combines the next predicate with the previous one by OR.
    pub fn or(&mut self) -> &mut Self {
        self.filter.or();
        self
    }

    //------------------------------------------------------------------------------
    // GROUP BY / ORDER BY
    //------------------------------------------------------------------------------

    pub fn group_by<C: Columns>(&mut self, columns: C) -> Result<&mut Self> {
        let fields = resolve_columns(&self.resolver, columns)?;
        self.group_by.extend(fields);
        Ok(self)
    }

    pub fn order_by_asc<C: Columns>(&mut self, columns: C) -> Result<&mut Self> {
        self.order_by(columns, SortDirection::Asc)
    }

    pub fn order_by_desc<C: Columns>(&mut self, columns: C) -> Result<&mut Self> {
        self.order_by(columns, SortDirection::Desc)
    }

    pub fn order_by<C: Columns>(&mut self, columns: C, direction: SortDirection) -> Result<&mut Self> {
        let fields = resolve_columns(&self.resolver, columns)?;
        self.order_by
            .extend(fields.into_iter().map(|field| (field, direction)));
        Ok(self)
    }

    //------------------------------------------------------------------------------
    // Rendering
    //------------------------------------------------------------------------------

    /// The SELECT list alone, without the `SELECT` keyword.
    pub fn sql_select(&self) -> Result<String> {
        let mut w = SqlWriter::new(self.config.dialect);
        self.projection.render(
            &mut w,
            &AliasScope::new(&self.aliases),
            self.resolver.metadata(),
            self.aliases.root(),
        )?;
        Ok(w.finish().0)
    }

    /// Renders the full statement.
    pub fn render(&self) -> Result<Query> {
        let metadata = self.resolver.metadata();
        let scope = AliasScope::new(&self.aliases);
        let mut w = SqlWriter::new(self.config.dialect);

        w.token(Token::SELECT);
        if self.distinct {
            w.token(Token::DISTINCT);
        }
        let shape = self
            .projection
            .render(&mut w, &scope, metadata, self.aliases.root())?;

        w.token(Token::FROM)
            .raw(metadata.table_name(self.aliases.root())?)
            .raw(&self.aliases.alias(0));

        for join in &self.joins {
            join.render(&mut w, &self.aliases, metadata)?;
        }

        if !self.filter.is_empty() {
            w.token(Token::WHERE);
            self.filter.render(&mut w, &scope)?;
        }

        if !self.group_by.is_empty() {
            w.token(Token::GROUP_BY);
            write_list(&mut w, &scope, self.group_by.iter().map(|field| (field, None)))?;
        }

        if !self.order_by.is_empty() {
            w.token(Token::ORDER_BY);
            write_list(
                &mut w,
                &scope,
                self.order_by
                    .iter()
                    .map(|(field, direction)| (field, Some(*direction))),
            )?;
        }

        let (sql, params) = w.finish();
        crate::joinwise_trace_render!(sql, params.len());
        Ok(Query { sql, params, shape })
    }
}

fn write_list<'f>(
    w: &mut SqlWriter,
    scope: &AliasScope<'_>,
    items: impl Iterator<Item = (&'f FieldRef, Option<SortDirection>)>,
) -> Result<()> {
    for (i, (field, direction)) in items.enumerate() {
        if i > 0 {
            w.token(Token::COMMA);
        }
        write_column(w, scope, field)?;
        if let Some(direction) = direction {
            w.token(direction.token());
        }
    }
    Ok(())
}
