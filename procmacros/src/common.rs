use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Data, DeriveInput, Error, Field, Fields, GenericArgument, PathArguments, Result, Type};

use crate::paths;

/// Named fields of a non-generic struct.
pub(crate) fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> Result<&'a Punctuated<Field, Comma>> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            format!("{derive} cannot be derived for generic structs"),
        ));
    }
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(Error::new_spanned(
                name,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(Error::new_spanned(name, format!("{derive} can only be derived for structs"))),
    }
}

/// Inner type of `Option<T>`, if `ty` is an option.
pub(crate) fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    if last.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// The type as written, spaced the way rustfmt spells it: `Option<String>`,
/// `&'static str`, `Cow<'static, str>`.
pub(crate) fn type_hint(ty: &Type) -> String {
    let tokens = ty.to_token_stream().to_string();
    let mut out = String::with_capacity(tokens.len());
    for token in tokens.split_whitespace() {
        let spaced = match (out.chars().last(), token.chars().next()) {
            (Some(','), _) => true,
            (Some(prev), Some(next)) => is_word(prev) && (is_word(next) || next == '\''),
            _ => false,
        };
        if spaced {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `pub const <field>: Field<Self, <ty>> = Field::new("<field>");` for every field.
pub(crate) fn field_consts<'a>(fields: impl Iterator<Item = &'a Field>) -> Vec<TokenStream> {
    let field = paths::field();
    fields
        .filter_map(|f| {
            let ident = f.ident.as_ref()?;
            let ty = &f.ty;
            let vis = &f.vis;
            let name = ident.to_string();
            let doc = format!("Accessor for `{name}`.");
            Some(quote! {
                #[doc = #doc]
                #[allow(non_upper_case_globals)]
                #vis const #ident: #field<Self, #ty> = #field::new(#name);
            })
        })
        .collect()
}
