use compact_str::CompactString;
use smallvec::SmallVec;

use crate::accessor::{Field, FieldRef, Resolver};
use crate::error::Result;

/// One column or a tuple of columns, as taken by `select`, `group_by` and
/// `order_by_*`.
pub trait Columns {
    fn resolve_into(self, resolver: &Resolver<'_>, out: &mut SmallVec<[FieldRef; 4]>) -> Result<()>;
}

impl<E: 'static, T> Columns for Field<E, T> {
    fn resolve_into(self, resolver: &Resolver<'_>, out: &mut SmallVec<[FieldRef; 4]>) -> Result<()> {
        out.push(resolver.resolve(&self)?);
        Ok(())
    }
}

impl Columns for FieldRef {
    fn resolve_into(self, _resolver: &Resolver<'_>, out: &mut SmallVec<[FieldRef; 4]>) -> Result<()> {
        out.push(self);
        Ok(())
    }
}

macro_rules! impl_columns_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: Columns),+> Columns for ($($name,)+) {
            #[allow(non_snake_case)]
            fn resolve_into(self, resolver: &Resolver<'_>, out: &mut SmallVec<[FieldRef; 4]>) -> Result<()> {
                let ($($name,)+) = self;
                $($name.resolve_into(resolver, out)?;)+
                Ok(())
            }
        }
    };
}

impl_columns_for_tuple!(A);
impl_columns_for_tuple!(A, B);
impl_columns_for_tuple!(A, B, C);
impl_columns_for_tuple!(A, B, C, D);
impl_columns_for_tuple!(A, B, C, D, F);
impl_columns_for_tuple!(A, B, C, D, F, G);
impl_columns_for_tuple!(A, B, C, D, F, G, H);
impl_columns_for_tuple!(A, B, C, D, F, G, H, I);

pub(crate) fn resolve_columns<C: Columns>(resolver: &Resolver<'_>, columns: C) -> Result<SmallVec<[FieldRef; 4]>> {
    let mut out = SmallVec::new();
    columns.resolve_into(resolver, &mut out)?;
    Ok(out)
}

/// An output alias: a string, or a field of the target shape whose name is used.
pub trait IntoAlias {
    fn into_alias(self) -> CompactString;
}

impl IntoAlias for &str {
    fn into_alias(self) -> CompactString {
        self.into()
    }
}

impl IntoAlias for String {
    fn into_alias(self) -> CompactString {
        self.into()
    }
}

impl IntoAlias for CompactString {
    fn into_alias(self) -> CompactString {
        self
    }
}

impl<E, T> IntoAlias for Field<E, T> {
    fn into_alias(self) -> CompactString {
        self.name().into()
    }
}
