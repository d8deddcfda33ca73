extern crate proc_macro;

mod common;
mod entity;
mod paths;
mod shape;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Maps a struct onto a table.
///
/// Generates `Entity` (table name and ordered column metadata), `Shape`, and
/// one `Field` accessor const per struct field, so `User::id` can be passed to
/// the query builder.
///
/// # Attributes
///
/// - `#[entity(table = "users")]` sets the table name; it defaults to the
///   snake_case struct name.
/// - `#[column(name = "user_name")]` sets the column name; it defaults to the
///   field name.
/// - `#[column(primary)]` marks a primary-key column.
/// - `#[column(fill = "insert" | "update" | "insert_update")]` records the fill
///   policy.
/// - `#[column(skip)]` keeps the accessor but maps no column, e.g. for a
///   collection property filled by result folding.
///
/// `Option<T>` fields are nullable.
///
/// # Example
///
/// ```ignore
/// #[derive(Entity)]
/// #[entity(table = "users")]
/// struct User {
///     #[column(primary)]
///     id: i64,
///     name: String,
///     email: Option<String>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(entity, column))]
pub fn entity_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match entity::generate_entity_impl(input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

/// Describes a result shape: its property names plus one `Field` accessor const
/// per field. Entities already get this from `#[derive(Entity)]`.
#[proc_macro_derive(Shape)]
pub fn shape_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match shape::generate_shape_impl(input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}
