use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::common::{field_consts, named_fields};
use crate::paths;

pub(crate) fn generate_shape_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let fields = named_fields(&input, "Shape")?;
    let shape = paths::shape();

    let properties = fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .map(|ident| ident.to_string());
    let consts = field_consts(fields.iter());

    Ok(quote! {
        impl #shape for #struct_name {
            const PROPERTIES: &'static [&'static str] = &[#(#properties),*];
        }

        impl #struct_name {
            #(#consts)*
        }
    })
}
