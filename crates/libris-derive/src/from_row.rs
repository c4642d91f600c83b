//! FromRow derive macro implementation

use crate::attrs::{FieldInfo, StructAttrs, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let attrs = StructAttrs::parse(&input)?;
    let field_extracts = named_fields(&input, "FromRow")?
        .iter()
        .map(|f| {
            let info = FieldInfo::parse(f, attrs.rename_all)?;
            let ident = info.ident;
            let col = &info.column;
            Ok(if info.skip {
                quote! { #ident: ::core::default::Default::default() }
            } else {
                quote! { #ident: row.try_get(#col)? }
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics ::libris::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &::libris::Row) -> ::libris::LibResult<Self> {
                ::core::result::Result::Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}
