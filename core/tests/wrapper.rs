#![allow(non_upper_case_globals)]

use std::sync::atomic::{AtomicUsize, Ordering};

use joinwise_core::{
    AccessorCache, ColumnInfo, Entity, EntityType, Field, JoinError, JoinKind, MetadataProvider, Registry, Result,
    TableInfo, Value, Wrapper,
};

struct Account;

impl Account {
    const id: Field<Account, i64> = Field::new("id");
    const owner: Field<Account, String> = Field::new("owner");
    const closed_at: Field<Account, Option<i64>> = Field::new("closed_at");
}

impl Entity for Account {
    const TABLE: &'static str = "account";
    const COLUMNS: &'static [ColumnInfo] = &[
        ColumnInfo::new("id", "id", "i64").primary_key(),
        ColumnInfo::new("owner", "owner_name", "String"),
        ColumnInfo::new("closed_at", "closed_at", "Option<i64>").nullable(),
    ];
}

struct Entry;

impl Entry {
    const id: Field<Entry, i64> = Field::new("id");
    const account_id: Field<Entry, i64> = Field::new("account_id");
    const amount: Field<Entry, i64> = Field::new("amount");
}

impl Entity for Entry {
    const TABLE: &'static str = "ledger_entry";
    const COLUMNS: &'static [ColumnInfo] = &[
        ColumnInfo::new("id", "id", "i64").primary_key(),
        ColumnInfo::new("account_id", "account_id", "i64"),
        ColumnInfo::new("amount", "amount", "i64"),
    ];
}

struct Unregistered;

impl Entity for Unregistered {
    const TABLE: &'static str = "unregistered";
    const COLUMNS: &'static [ColumnInfo] = &[];
}

/// Provider over a fixed table list that counts column lookups.
struct CountingProvider {
    tables: Vec<TableInfo>,
    lookups: AtomicUsize,
}

impl CountingProvider {
    fn new() -> Self {
        Self {
            tables: vec![Account::table_info(), Entry::table_info()],
            lookups: AtomicUsize::new(0),
        }
    }
}

impl MetadataProvider for CountingProvider {
    fn table(&self, entity: EntityType) -> Result<&TableInfo> {
        self.tables
            .iter()
            .find(|t| t.entity == entity)
            .ok_or(JoinError::UnknownEntity(entity.name()))
    }

    fn column(&self, entity: EntityType, property: &str) -> Result<&'static ColumnInfo> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.table(entity)?
            .column(property)
            .ok_or_else(|| JoinError::UnknownColumn {
                entity: entity.name(),
                property: property.into(),
            })
    }
}

#[test]
fn test_custom_provider_and_private_cache() -> Result<()> {
    let provider = CountingProvider::new();
    let cache = AccessorCache::new();

    let query = Wrapper::new::<Account>(&provider)?
        .with_cache(&cache)
        .select((Account::id, Account::owner))?
        .select_sum_as(Entry::amount, "balance")?
        .join::<Entry, _>(JoinKind::Right, |on| on.eq(Entry::account_id, Account::id))?
        .is_null(Account::closed_at)?
        .group_by((Account::id, Account::owner))?
        .render()?;

    assert_eq!(
        query.sql,
        "SELECT t.id, t.owner_name, SUM(t1.amount) AS balance FROM account t \
         RIGHT JOIN ledger_entry t1 ON t1.account_id = t.id \
         WHERE t.closed_at IS NULL GROUP BY t.id, t.owner_name"
    );
    assert!(query.params.is_empty());

    // id, owner, amount, account_id, closed_at; Account::id hit the cache twice
    assert_eq!(provider.lookups.load(Ordering::Relaxed), 5);
    assert_eq!(cache.len(), 5);

    Wrapper::new::<Account>(&provider)?
        .with_cache(&cache)
        .select((Account::id, Account::owner))?;
    assert_eq!(provider.lookups.load(Ordering::Relaxed), 5);
    Ok(())
}

#[test]
fn test_empty_sets() -> Result<()> {
    let mut registry = Registry::new();
    registry.register::<Account>()?;

    let query = Wrapper::new::<Account>(&registry)?
        .select(Account::id)?
        .in_list(Account::id, Vec::<i64>::new())?
        .not_in(Account::id, Vec::<i64>::new())?
        .ne(Account::owner, "root")?
        .render()?;

    assert_eq!(
        query.sql,
        "SELECT t.id FROM account t WHERE t.id IN (NULL) AND 1 = 1 AND t.owner_name <> ?"
    );
    assert_eq!(query.params, vec![Value::from("root")]);
    Ok(())
}

#[test]
fn test_nullable_comparisons() -> Result<()> {
    let mut registry = Registry::new();
    registry.register::<Account>()?;

    let query = Wrapper::new::<Account>(&registry)?
        .select(Account::id)?
        .gt(Account::closed_at, 5)?
        .or()
        .eq(Account::closed_at, None::<i64>)?
        .render()?;

    assert_eq!(
        query.sql,
        "SELECT t.id FROM account t WHERE t.closed_at > ? OR t.closed_at = ?"
    );
    assert_eq!(query.params, vec![Value::from(5), Value::Null]);
    Ok(())
}

#[test]
fn test_resolution_errors() -> Result<()> {
    let mut registry = Registry::new();
    registry.register::<Account>()?.register::<Entry>()?;
    let mut wrapper = Wrapper::new::<Account>(&registry)?;

    let missing: Field<Account, i64> = Field::new("missing");
    assert!(matches!(
        wrapper.select(missing),
        Err(JoinError::UnknownColumn { property, .. }) if property == "missing"
    ));

    let malformed: Field<Account, i64> = Field::new("not an identifier");
    assert!(matches!(
        wrapper.select(malformed),
        Err(JoinError::UnresolvableAccessor { .. })
    ));

    assert!(matches!(
        wrapper.select_all::<Unregistered>(),
        Err(JoinError::UnknownEntity(_))
    ));
    assert!(matches!(
        Wrapper::new::<Unregistered>(&registry),
        Err(JoinError::UnknownEntity(_))
    ));

    assert!(matches!(
        wrapper.left_join::<Entry, _>(|on| Ok(on)),
        Err(JoinError::MissingJoinCondition(_))
    ));
    assert!(wrapper.joins().is_empty());

    // the wrapper is still usable after failures
    let query = wrapper.select(Account::id)?.render()?;
    assert_eq!(query.sql, "SELECT t.id FROM account t");
    Ok(())
}

#[test]
fn test_registry_validates_identifiers() {
    struct BadTable;
    impl Entity for BadTable {
        const TABLE: &'static str = "bad table";
        const COLUMNS: &'static [ColumnInfo] = &[];
    }

    struct BadColumn;
    impl Entity for BadColumn {
        const TABLE: &'static str = "bad_column";
        const COLUMNS: &'static [ColumnInfo] = &[ColumnInfo::new("name", "name; DROP", "String")];
    }

    let mut registry = Registry::new();
    assert!(matches!(
        registry.register::<BadTable>(),
        Err(JoinError::InvalidIdentifier(_))
    ));
    assert!(matches!(
        registry.register::<BadColumn>(),
        Err(JoinError::InvalidIdentifier(_))
    ));
    assert!(registry.is_empty());
}

#[test]
fn test_concurrent_wrappers_share_cache() {
    let provider = CountingProvider::new();
    let cache = AccessorCache::new();

    let rendered: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    Wrapper::new::<Account>(&provider)
                        .and_then(|w| {
                            w.with_cache(&cache)
                                .select((Account::id, Account::owner))?
                                .render()
                        })
                        .map(|q| q.sql)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked").expect("render"))
            .collect()
    });

    assert!(rendered.iter().all(|sql| sql == "SELECT t.id, t.owner_name FROM account t"));
    assert_eq!(cache.len(), 2);
}
