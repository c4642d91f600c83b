//! Record derive macro implementation

use crate::attrs::{FieldInfo, StructAttrs, named_fields, option_inner};
use heck::ToShoutySnakeCase;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let attrs = StructAttrs::parse(&input)?;
    let table = attrs.table.clone().ok_or_else(|| {
        syn::Error::new_spanned(
            &input,
            "Record requires #[record(table = \"table_name\")] attribute",
        )
    })?;

    let fields = named_fields(&input, "Record")?
        .iter()
        .map(|f| FieldInfo::parse(f, attrs.rename_all))
        .collect::<Result<Vec<_>>>()?;
    let fields: Vec<_> = fields.into_iter().filter(|f| !f.skip).collect();

    let mut ids = fields.iter().filter(|f| f.id);
    let id_column = match (ids.next(), ids.next()) {
        (None, _) => quote! { None },
        (Some(f), None) => {
            let col = &f.column;
            quote! { Some(#col) }
        }
        (Some(_), Some(second)) => {
            return Err(syn::Error::new_spanned(
                second.field,
                "only one field may be marked #[record(id)]",
            ));
        }
    };

    let columns: Vec<&String> = fields.iter().map(|f| &f.column).collect();
    let capacity = fields.len();

    let col_consts = fields.iter().map(|f| {
        let col = &f.column;
        let const_name = format_ident!(
            "COL_{}",
            f.ident.unraw().to_string().to_shouty_snake_case()
        );
        quote! {
            pub const #const_name: ::libris::Column<Self> = ::libris::Column::new(#col);
        }
    });

    let pushes = fields.iter().map(|f| {
        let ident = f.ident;
        let col = &f.column;
        if attrs.partial && option_inner(&f.field.ty).is_some() {
            quote! {
                if let ::core::option::Option::Some(value) = &self.#ident {
                    row.push(#col, ::libris::Value::from(::core::clone::Clone::clone(value)));
                }
            }
        } else {
            quote! {
                row.push(#col, ::libris::Value::from(::core::clone::Clone::clone(&self.#ident)));
            }
        }
    });

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            #(#col_consts)*
        }

        impl #impl_generics ::libris::Record for #name #ty_generics #where_clause {
            const TABLE: &'static str = #table;
            const COLUMNS: &'static [&'static str] = &[#(#columns),*];
            const ID_COLUMN: ::core::option::Option<&'static str> = #id_column;

            fn to_row(&self) -> ::libris::Row {
                let mut row = ::libris::Row::with_capacity(#capacity);
                #(#pushes)*
                row
            }
        }
    })
}
