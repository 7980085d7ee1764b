//! Derive macro binding URL query parameters onto plain structs.
//!
//! `#[derive(QueryParams)]` implements `crate::api::request::FromQueryParams`
//! for a struct with named fields. The generated code refers to items under
//! `crate::api::request`, so the derive is only usable inside the crate that
//! provides that module.
//!
//! Field attributes:
//! - `#[query(rename = "key")]` reads `key` instead of the field name
//! - `#[query(flatten)]` populates a nested struct from the same parameters
//! - `#[query(skip)]` leaves the field untouched
//!
//! Without `query(rename)` a `#[serde(rename = "key")]` on the field is honoured.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, Data, DeriveInput, Field, Fields,
    GenericArgument, Lit, PathArguments, Token, Type,
};

#[derive(Default)]
struct FieldArgs {
    rename: Option<String>,
    flatten: bool,
    skip: bool,
}

impl Parse for FieldArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = FieldArgs::default();
        let mut rename_span = None;

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;

            match ident.to_string().as_str() {
                "rename" => {
                    input.parse::<Token![=]>()?;
                    let lit: Lit = input.parse()?;
                    if let Lit::Str(s) = lit {
                        rename_span = Some(s.span());
                        args.rename = Some(s.value());
                    } else {
                        return Err(syn::Error::new(lit.span(), "rename must be a string literal"));
                    }
                }
                "flatten" => args.flatten = true,
                "skip" => args.skip = true,
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!(
                            "unknown attribute `{}`, expected `rename`, `flatten`, or `skip`",
                            other
                        ),
                    ));
                }
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        if let (true, Some(span)) = (args.flatten, rename_span) {
            return Err(syn::Error::new(span, "`flatten` cannot be combined with `rename`"));
        }

        Ok(args)
    }
}

/// Leaf conversion applied to a raw string.
enum Leaf {
    Text,
    Int(Type),
    Timestamp,
}

enum FieldKind {
    Leaf(Leaf),
    Optional(Leaf),
    Unsupported(String),
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path.path.segments.last(),
        _ => None,
    }
}

fn type_name(ty: &Type) -> String {
    quote!(#ty).to_string().replace(' ', "")
}

/// Only `Timestamp` and `jiff::Timestamp` are treated as jiff timestamps.
fn is_jiff_timestamp(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    let segments = &type_path.path.segments;
    if type_path.qself.is_some() || segments.iter().any(|s| !s.arguments.is_none()) {
        return false;
    }
    let idents: Vec<String> = segments.iter().map(|s| s.ident.to_string()).collect();
    idents == ["Timestamp"] || idents == ["jiff", "Timestamp"]
}

fn leaf(ty: &Type) -> Option<Leaf> {
    if is_jiff_timestamp(ty) {
        return Some(Leaf::Timestamp);
    }
    let segment = last_segment(ty)?;
    match segment.ident.to_string().as_str() {
        "String" => Some(Leaf::Text),
        "i8" | "i16" | "i32" | "i64" | "isize" => Some(Leaf::Int(ty.clone())),
        _ => None,
    }
}

fn option_inner(ty: &Type) -> Option<&Type> {
    let segment = last_segment(ty)?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    }
}

fn classify(ty: &Type) -> FieldKind {
    if let Some(leaf) = leaf(ty) {
        return FieldKind::Leaf(leaf);
    }
    match option_inner(ty).and_then(leaf) {
        Some(leaf) => FieldKind::Optional(leaf),
        None => FieldKind::Unsupported(type_name(ty)),
    }
}

fn serde_rename(field: &Field) -> syn::Result<Option<String>> {
    let mut rename = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("serde")) {
        // Other serde options are skipped, not interpreted
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                let lit: syn::LitStr = meta.value()?.parse()?;
                rename = Some(lit.value());
            } else if meta.input.peek(Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            } else if meta.input.peek(syn::token::Paren) {
                let content;
                syn::parenthesized!(content in meta.input);
                let _: TokenStream2 = content.parse()?;
            }
            Ok(())
        })?;
    }
    Ok(rename)
}

fn query_args(field: &Field) -> syn::Result<FieldArgs> {
    match field.attrs.iter().find(|a| a.path().is_ident("query")) {
        Some(attr) => attr.parse_args::<FieldArgs>(),
        None => Ok(FieldArgs::default()),
    }
}

fn convert(leaf: &Leaf, name: &str) -> TokenStream2 {
    match leaf {
        Leaf::Text => quote! { raw.to_string() },
        Leaf::Int(ty) => quote! { crate::api::request::parse_int::<#ty>(#name, raw)? },
        Leaf::Timestamp => quote! { crate::api::request::parse_timestamp(#name, raw)? },
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "QueryParams requires a struct with named fields",
                ));
            }
        },
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                ident,
                "expected a struct but got an enum",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                ident,
                "expected a struct but got a union",
            ));
        }
    };

    let mut statements = Vec::with_capacity(fields.len());
    for field in fields {
        let args = query_args(field)?;
        if args.skip {
            continue;
        }

        let Some(field_ident) = &field.ident else {
            continue;
        };

        if args.flatten {
            statements.push(quote! {
                crate::api::request::FromQueryParams::populate_from(&mut self.#field_ident, params)?;
            });
            continue;
        }

        let name = field_ident.to_string();
        let key = match args.rename {
            Some(rename) => rename,
            None => serde_rename(field)?.unwrap_or_else(|| name.clone()),
        };
        let statement = match classify(&field.ty) {
            FieldKind::Unsupported(kind) => quote! {
                if params.get(#key).is_some() {
                    return ::std::result::Result::Err(
                        crate::api::request::QueryBindError::UnsupportedFieldType {
                            field: #name.to_string(),
                            kind: #kind.to_string(),
                        },
                    );
                }
            },
            FieldKind::Leaf(leaf) => {
                let value = convert(&leaf, &name);
                quote! {
                    if let ::std::option::Option::Some(raw) = params.get(#key) {
                        self.#field_ident = #value;
                    }
                }
            }
            FieldKind::Optional(leaf) => {
                let value = convert(&leaf, &name);
                quote! {
                    if let ::std::option::Option::Some(raw) = params.get(#key) {
                        self.#field_ident = ::std::option::Option::Some(#value);
                    }
                }
            }
        };
        statements.push(statement);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics crate::api::request::FromQueryParams for #ident #ty_generics #where_clause {
            fn populate_from(
                &mut self,
                params: &crate::api::request::QueryValues,
            ) -> ::std::result::Result<(), crate::api::request::QueryBindError> {
                #(#statements)*
                ::std::result::Result::Ok(())
            }
        }
    })
}

/// Derives `FromQueryParams` for a struct.
///
/// Supported leaf types are `String`, the signed integers, `Timestamp` and
/// `Option` of those. A field of any other type fails at runtime with
/// `UnsupportedFieldType` when its key carries a value.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, QueryParams)]
/// struct UserFilter {
///     email: String,
///     #[query(rename = "created_at")]
///     since: Option<Timestamp>,
///     #[query(flatten)]
///     pagination: Pagination,
/// }
/// ```
#[proc_macro_derive(QueryParams, attributes(query))]
pub fn derive_query_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
