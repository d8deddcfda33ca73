use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Error, Field, LitStr, Result};

use crate::common::{field_consts, named_fields, option_inner, type_hint};
use crate::paths;

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    primary: bool,
    fill: Option<TokenStream>,
    skip: bool,
}

/// Parses `#[entity(table = "...")]`.
fn parse_table_name(input: &DeriveInput) -> Result<String> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                table = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `table = \"...\"`"))
            }
        })?;
    }
    Ok(table.unwrap_or_else(|| input.ident.to_string().to_snake_case()))
}

/// Parses `#[column(name = "...", primary, fill = "...", skip)]`.
fn parse_column_attrs(field: &Field) -> Result<ColumnAttrs> {
    let mut attrs = ColumnAttrs::default();
    let fill_path = paths::field_fill();
    for attr in &field.attrs {
        if !attr.path().is_ident("column") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.name = Some(value.value());
            } else if meta.path.is_ident("primary") {
                attrs.primary = true;
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else if meta.path.is_ident("fill") {
                let value: LitStr = meta.value()?.parse()?;
                let variant = match value.value().as_str() {
                    "default" => quote!(Default),
                    "insert" => quote!(Insert),
                    "update" => quote!(Update),
                    "insert_update" => quote!(InsertUpdate),
                    _ => {
                        return Err(Error::new_spanned(
                            &value,
                            "expected one of `default`, `insert`, `update`, `insert_update`",
                        ));
                    }
                };
                attrs.fill = Some(quote!(#fill_path::#variant));
            } else {
                return Err(meta.error("unknown column attribute"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

pub(crate) fn generate_entity_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let fields = named_fields(&input, "Entity")?;
    let table = parse_table_name(&input)?;

    let entity = paths::entity();
    let shape = paths::shape();
    let column_info = paths::column_info();

    let mut columns = Vec::new();
    let mut properties = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_column_attrs(field)?;
        let property = ident.to_string();
        properties.push(property.clone());
        if attrs.skip {
            continue;
        }

        let column = attrs.name.unwrap_or_else(|| property.clone());
        let hint = type_hint(&field.ty);
        let mut info = quote!(#column_info::new(#property, #column, #hint));
        if option_inner(&field.ty).is_some() {
            info = quote!(#info.nullable());
        }
        if attrs.primary {
            info = quote!(#info.primary_key());
        }
        if let Some(fill) = attrs.fill {
            info = quote!(#info.fill(#fill));
        }
        columns.push(info);
    }

    let consts = field_consts(fields.iter());

    Ok(quote! {
        impl #entity for #struct_name {
            const TABLE: &'static str = #table;
            const COLUMNS: &'static [#column_info] = &[#(#columns),*];
        }

        impl #shape for #struct_name {
            const PROPERTIES: &'static [&'static str] = &[#(#properties),*];
        }

        impl #struct_name {
            #(#consts)*
        }
    })
}
