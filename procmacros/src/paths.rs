//! Fully-qualified paths used by generated code.
//!
//! Paths use the `joinwise::` prefix without a leading `::` so that tests
//! inside the workspace can provide a `joinwise` shim module.

use proc_macro2::TokenStream;
use quote::quote;

pub fn entity() -> TokenStream {
    quote!(joinwise::Entity)
}

pub fn shape() -> TokenStream {
    quote!(joinwise::Shape)
}

pub fn field() -> TokenStream {
    quote!(joinwise::Field)
}

pub fn column_info() -> TokenStream {
    quote!(joinwise::ColumnInfo)
}

pub fn field_fill() -> TokenStream {
    quote!(joinwise::FieldFill)
}
