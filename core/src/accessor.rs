//! Typed field accessors and their resolution to columns.
//!
//! A [`Field`] names a member of an entity without holding a value. The derive
//! macros generate one associated const per struct field, so `User::id` is a
//! `Field<User, i64>`. Resolution goes through the process-wide
//! [`AccessorCache`]: the first lookup of an `(owner, member)` pair asks the
//! metadata provider, every later one is a map hit.

use core::any::TypeId;
use core::marker::PhantomData;
use std::sync::LazyLock;

use dashmap::DashMap;

use crate::error::{JoinError, Result};
use crate::metadata::{ColumnInfo, EntityType, MetadataProvider, is_identifier};

/// Typed reference to property `name` of entity `E`, whose value type is `T`.
pub struct Field<E, T> {
    name: &'static str,
    slot: Option<usize>,
    _marker: PhantomData<fn(&E) -> T>,
}

impl<E, T> Field<E, T> {
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: None,
            _marker: PhantomData,
        }
    }

    /// The same field read from alias slot `slot`: `0` is the driving table,
    /// `n` is the n-th join in declaration order.
    ///
    /// Unqualified fields resolve to the first slot holding `E`, so this is only
    /// needed when `E` appears more than once in a query.
    #[inline]
    pub const fn at(self, slot: usize) -> Self {
        Self {
            name: self.name,
            slot: Some(slot),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn slot(&self) -> Option<usize> {
        self.slot
    }
}

impl<E, T> Clone for Field<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> Copy for Field<E, T> {}

impl<E, T> core::fmt::Debug for Field<E, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Field({}::{}", core::any::type_name::<E>(), self.name)?;
        match self.slot {
            Some(slot) => write!(f, " @{slot})"),
            None => f.write_str(")"),
        }
    }
}

/// Anything that names one member of one owner type.
pub trait Accessor {
    type Owner: 'static;

    fn member(&self) -> &'static str;

    fn owner(&self) -> EntityType {
        EntityType::of::<Self::Owner>()
    }

    /// Explicit alias slot, `None` for the entity's default slot
    fn slot(&self) -> Option<usize> {
        None
    }
}

impl<E: 'static, T> Accessor for Field<E, T> {
    type Owner = E;

    #[inline]
    fn member(&self) -> &'static str {
        self.name
    }

    #[inline]
    fn slot(&self) -> Option<usize> {
        self.slot
    }
}

/// A resolved, verified reference to one mapped column.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef {
    owner: EntityType,
    info: &'static ColumnInfo,
    slot: Option<usize>,
}

impl FieldRef {
    pub(crate) const fn new(owner: EntityType, info: &'static ColumnInfo) -> Self {
        Self {
            owner,
            info,
            slot: None,
        }
    }

    /// The same column pinned to alias slot `slot`.
    #[inline]
    pub const fn at(self, slot: usize) -> Self {
        self.with_slot(Some(slot))
    }

    #[inline]
    pub(crate) const fn with_slot(mut self, slot: Option<usize>) -> Self {
        self.slot = slot;
        self
    }

    /// Explicit alias slot, if any
    #[inline]
    pub const fn slot(&self) -> Option<usize> {
        self.slot
    }

    #[inline]
    pub const fn owner(&self) -> EntityType {
        self.owner
    }

    #[inline]
    pub const fn property(&self) -> &'static str {
        self.info.property
    }

    #[inline]
    pub const fn column(&self) -> &'static str {
        self.info.column
    }

    #[inline]
    pub const fn info(&self) -> &'static ColumnInfo {
        self.info
    }
}

impl PartialEq for FieldRef {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.info.property == other.info.property && self.slot == other.slot
    }
}

impl Eq for FieldRef {}

impl core::hash::Hash for FieldRef {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.info.property.hash(state);
        self.slot.hash(state);
    }
}

/// Concurrent memo of accessor resolutions keyed by `(owner type, member name)`.
#[derive(Debug, Default)]
pub struct AccessorCache {
    entries: DashMap<(TypeId, &'static str), FieldRef>,
}

static GLOBAL_CACHE: LazyLock<AccessorCache> = LazyLock::new(AccessorCache::new);

impl AccessorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> &'static AccessorCache {
        &GLOBAL_CACHE
    }

    /// Resolves `accessor` against `metadata`.
    ///
    /// Hits return the cached reference without touching `metadata`. On a miss the
    /// provider is consulted outside any map lock; concurrent misses on the same
    /// key converge on whichever entry is inserted first. Failures are not cached.
    /// The accessor's alias slot is carried onto the result, not into the cache.
    pub fn resolve<A: Accessor + ?Sized>(
        &self,
        metadata: &dyn MetadataProvider,
        accessor: &A,
    ) -> Result<FieldRef> {
        let resolved = self.resolve_member(metadata, accessor.owner(), accessor.member())?;
        Ok(resolved.with_slot(accessor.slot()))
    }

    pub fn resolve_member(
        &self,
        metadata: &dyn MetadataProvider,
        owner: EntityType,
        member: &'static str,
    ) -> Result<FieldRef> {
        let key = (owner.type_id(), member);
        if let Some(hit) = self.entries.get(&key) {
            return Ok(*hit);
        }

        if !is_identifier(member) {
            return Err(JoinError::UnresolvableAccessor {
                owner: owner.name(),
                member: member.into(),
            });
        }

        crate::joinwise_trace_cache!(owner.name(), member);
        let info = metadata.column(owner, member)?;
        let resolved = FieldRef::new(owner, info);

        Ok(*self.entries.entry(key).or_insert(resolved))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// A metadata provider paired with the cache used to resolve accessors against it.
#[derive(Clone, Copy)]
pub struct Resolver<'m> {
    metadata: &'m dyn MetadataProvider,
    cache: &'m AccessorCache,
}

impl<'m> Resolver<'m> {
    pub fn new(metadata: &'m dyn MetadataProvider, cache: &'m AccessorCache) -> Self {
        Self { metadata, cache }
    }

    #[inline]
    pub fn resolve<A: Accessor + ?Sized>(&self, accessor: &A) -> Result<FieldRef> {
        self.cache.resolve(self.metadata, accessor)
    }

    #[inline]
    pub fn resolve_member(&self, owner: EntityType, member: &'static str) -> Result<FieldRef> {
        self.cache.resolve_member(self.metadata, owner, member)
    }

    #[inline]
    pub fn metadata(&self) -> &'m dyn MetadataProvider {
        self.metadata
    }
}

impl core::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resolver").field("cache", &self.cache.len()).finish()
    }
}
