//! Parsing of `#[record(...)]` attributes.

use crate::sql_ident::{check_column, check_table};
use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use syn::ext::IdentExt;
use syn::{DeriveInput, Field, LitStr, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenameRule {
    Snake,
    Camel,
    Pascal,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "snake_case" => Ok(Self::Snake),
            "camelCase" => Ok(Self::Camel),
            "PascalCase" => Ok(Self::Pascal),
            other => Err(syn::Error::new(
                lit.span(),
                format!(
                    "unknown rename_all rule '{other}' (expected snake_case, camelCase or PascalCase)"
                ),
            )),
        }
    }

    fn apply(self, name: &str) -> String {
        match self {
            Self::Snake => name.to_snake_case(),
            Self::Camel => name.to_lower_camel_case(),
            Self::Pascal => name.to_upper_camel_case(),
        }
    }
}

/// Struct-level attributes.
#[derive(Debug, Default)]
pub(crate) struct StructAttrs {
    pub table: Option<String>,
    pub rename_all: Option<RenameRule>,
    /// `Option` fields only contribute to `to_row` when `Some`.
    pub partial: bool,
}

impl StructAttrs {
    pub fn parse(input: &DeriveInput) -> Result<Self> {
        let mut out = Self::default();
        for attr in input.attrs.iter().filter(|a| a.path().is_ident("record")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.table = Some(check_table(&lit.value(), lit.span())?);
                } else if meta.path.is_ident("rename_all") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename_all = Some(RenameRule::parse(&lit)?);
                } else if meta.path.is_ident("partial") {
                    out.partial = true;
                } else {
                    return Err(meta.error("unsupported record attribute"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

/// A named field with its resolved column.
pub(crate) struct FieldInfo<'a> {
    pub field: &'a Field,
    pub ident: &'a syn::Ident,
    pub column: String,
    pub id: bool,
    pub skip: bool,
}

impl<'a> FieldInfo<'a> {
    pub fn parse(field: &'a Field, rename_all: Option<RenameRule>) -> Result<Self> {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let mut column = None;
        let mut id = false;
        let mut skip = false;

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("record")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") {
                    let lit: LitStr = meta.value()?.parse()?;
                    column = Some(check_column(&lit.value(), lit.span())?);
                } else if meta.path.is_ident("id") {
                    id = true;
                } else if meta.path.is_ident("skip") {
                    skip = true;
                } else {
                    return Err(meta.error("unsupported record field attribute"));
                }
                Ok(())
            })?;
        }

        let column = match column {
            Some(c) => c,
            None => {
                let name = ident.unraw().to_string();
                let renamed = rename_all.map_or(name.clone(), |r| r.apply(&name));
                check_column(&renamed, ident.span())?
            }
        };

        Ok(Self {
            field,
            ident,
            column,
            id,
            skip,
        })
    }
}

/// Named fields of a struct, or an error for anything else.
pub(crate) fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> Result<&'a syn::punctuated::Punctuated<Field, syn::Token![,]>> {
    match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}

/// Extract the inner type T from `Option<T>`, or return None if not an Option type.
pub(crate) fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}
