//! `#[derive(Message)]`: expands a struct's `#[wire(...)]`-annotated fields
//! into a hand-written-shaped `impl wirepb::Message for TheStruct`.
//!
//! This crate does not invent new wire semantics; every expression it emits
//! is a direct call into `wirepb::field`/`wirepb::map`/`wirepb::embedded`,
//! the same functions a message author would call by hand. The macro's only
//! job is to read field shape and attributes once, at compile time, and
//! save the caller from writing that dispatch by hand.
//!
//! The annotated struct must also derive `Default` (the decode loop folds
//! into `Self::default()`) and `Clone` (the `Reflect` impl clones a field's
//! current value out into an owned `FieldValue`).

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Data, DeriveInput, Expr, Fields, Lit, Meta, Token};

#[proc_macro_derive(Message, attributes(wire))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input).unwrap_or_else(syn::Error::into_compile_error).into()
}

/// Cardinality inferred from a field's Rust type, not declared separately.
enum Shape {
    Singular,
    Repeated { packed: bool },
    Map,
}

struct ParsedField {
    ident: syn::Ident,
    /// The field's declared Rust type (`Option<V>`, `Vec<V>`, or
    /// `HashMap<K, V>`), spliced verbatim as the `Value` type of the
    /// generated `FieldByTag`/`FieldByName` impls.
    ty: syn::Type,
    tag: u32,
    kind: String,
    /// Comma-separated coder type tokens: one type for a scalar/message/enum
    /// field, `KeyCoder, ValueCoder` for a map field (so splicing `#coder`
    /// into a `<M, #coder>` turbofish works for both shapes uniformly).
    coder: TokenStream2,
    wire_type: TokenStream2,
    shape: Shape,
}

/// Wire kinds whose coder is length-delimited. A packed array shares one
/// length prefix across all its elements, so an element coder that is
/// itself length-delimited (and would need its own length prefix) can never
/// be packed — matching `Array<C>`'s doc comment and the upstream protobuf
/// specification.
fn is_length_delimited_kind(kind: &str) -> bool {
    matches!(kind, "string" | "bytes" | "message")
}

struct WireAttr {
    tag: u32,
    kind: String,
    key_kind: Option<String>,
    value_kind: Option<String>,
    packed: bool,
}

impl syn::parse::Parse for WireAttr {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut tag = None;
        let mut kind = None;
        let mut key_kind = None;
        let mut value_kind = None;
        let mut packed = false;

        let metas = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;
        for meta in metas {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("tag") => tag = Some(expr_to_u32(&nv.value)?),
                Meta::NameValue(nv) if nv.path.is_ident("kind") => kind = Some(expr_to_string(&nv.value)?),
                Meta::NameValue(nv) if nv.path.is_ident("key_kind") => key_kind = Some(expr_to_string(&nv.value)?),
                Meta::NameValue(nv) if nv.path.is_ident("value_kind") => {
                    value_kind = Some(expr_to_string(&nv.value)?)
                }
                Meta::Path(p) if p.is_ident("packed") => packed = true,
                other => return Err(syn::Error::new_spanned(other, "unrecognized key in `#[wire(...)]`")),
            }
        }

        Ok(WireAttr {
            tag: tag.ok_or_else(|| input.error("`#[wire(...)]` is missing `tag = N`"))?,
            kind: kind.ok_or_else(|| input.error("`#[wire(...)]` is missing `kind = \"...\"`"))?,
            key_kind,
            value_kind,
            packed,
        })
    }
}

fn expr_to_u32(expr: &Expr) -> syn::Result<u32> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Int(n) => n.base10_parse(),
            other => Err(syn::Error::new_spanned(other, "expected an integer literal")),
        },
        other => Err(syn::Error::new_spanned(other, "expected an integer literal")),
    }
}

fn expr_to_string(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Ok(s.value()),
            other => Err(syn::Error::new_spanned(other, "expected a string literal")),
        },
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn find_wire_attr(field: &syn::Field) -> syn::Result<WireAttr> {
    for attr in &field.attrs {
        if attr.path().is_ident("wire") {
            return attr.parse_args::<WireAttr>();
        }
    }
    Err(syn::Error::new_spanned(field, "field is missing a `#[wire(tag = N, kind = \"...\")]` attribute"))
}

/// If `ty` is `wrapper<Args...>`, returns its generic arguments.
fn generic_args_of<'a>(ty: &'a syn::Type, wrapper: &str) -> Option<Vec<&'a syn::Type>> {
    let syn::Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else { return None };
    Some(
        args.args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(t) => Some(t),
                _ => None,
            })
            .collect(),
    )
}

/// The coder type and protobuf wire type token a `kind` string names. `elem`
/// is the field's element type, needed for the `message`/`enum` kinds whose
/// coder is generic over the concrete Rust type.
fn coder_for(kind: &str, elem: &syn::Type) -> syn::Result<(TokenStream2, TokenStream2)> {
    let wirepb_coder = quote!(::wirepb::coder);
    Ok(match kind {
        "int32" => (quote!(#wirepb_coder::Int32), quote!(::wirepb::wire::WireType::Varint)),
        "int64" => (quote!(#wirepb_coder::Int64), quote!(::wirepb::wire::WireType::Varint)),
        "uint32" => (quote!(#wirepb_coder::Uint32), quote!(::wirepb::wire::WireType::Varint)),
        "uint64" => (quote!(#wirepb_coder::Uint64), quote!(::wirepb::wire::WireType::Varint)),
        "sint32" => (quote!(#wirepb_coder::Sint32), quote!(::wirepb::wire::WireType::Varint)),
        "sint64" => (quote!(#wirepb_coder::Sint64), quote!(::wirepb::wire::WireType::Varint)),
        "bool" => (quote!(#wirepb_coder::Bool), quote!(::wirepb::wire::WireType::Varint)),
        "fixed32" => (quote!(#wirepb_coder::Fixed32), quote!(::wirepb::wire::WireType::Fixed32)),
        "sfixed32" => (quote!(#wirepb_coder::Sfixed32), quote!(::wirepb::wire::WireType::Fixed32)),
        "float" => (quote!(#wirepb_coder::Float), quote!(::wirepb::wire::WireType::Fixed32)),
        "fixed64" => (quote!(#wirepb_coder::Fixed64), quote!(::wirepb::wire::WireType::Fixed64)),
        "sfixed64" => (quote!(#wirepb_coder::Sfixed64), quote!(::wirepb::wire::WireType::Fixed64)),
        "double" => (quote!(#wirepb_coder::Double), quote!(::wirepb::wire::WireType::Fixed64)),
        "string" => (quote!(#wirepb_coder::Str), quote!(::wirepb::wire::WireType::LengthDelimited)),
        "bytes" => (quote!(#wirepb_coder::Bytes), quote!(::wirepb::wire::WireType::LengthDelimited)),
        "enum" => (quote!(#wirepb_coder::EnumCoder::<#elem>), quote!(::wirepb::wire::WireType::Varint)),
        "message" => {
            (quote!(::wirepb::embedded::Embedded::<#elem>), quote!(::wirepb::wire::WireType::LengthDelimited))
        }
        other => {
            return Err(syn::Error::new_spanned(
                elem,
                format!(
                    "unknown `kind = \"{other}\"`; expected one of int32/int64/uint32/uint64/sint32/sint64/\
                     bool/fixed32/sfixed32/float/fixed64/sfixed64/double/string/bytes/enum/message"
                ),
            ))
        }
    })
}

fn parse_field(field: &syn::Field) -> syn::Result<ParsedField> {
    let ident = field.ident.clone().expect("Message can only be derived for structs with named fields");
    let attr = find_wire_attr(field)?;

    if attr.kind == "map" {
        let Some(args) = generic_args_of(&field.ty, "HashMap") else {
            return Err(syn::Error::new_spanned(&field.ty, "a `kind = \"map\"` field must be a `HashMap<K, V>`"));
        };
        let [key_ty, value_ty] = args[..] else {
            return Err(syn::Error::new_spanned(&field.ty, "`HashMap` must have exactly two type arguments"));
        };
        let key_kind = attr.key_kind.ok_or_else(|| {
            syn::Error::new_spanned(&field.ty, "a `kind = \"map\"` field needs `key_kind = \"...\"`")
        })?;
        let value_kind = attr.value_kind.ok_or_else(|| {
            syn::Error::new_spanned(&field.ty, "a `kind = \"map\"` field needs `value_kind = \"...\"`")
        })?;
        let (key_coder, _) = coder_for(&key_kind, key_ty)?;
        let (value_coder, _) = coder_for(&value_kind, value_ty)?;
        return Ok(ParsedField {
            ident,
            ty: field.ty.clone(),
            tag: attr.tag,
            kind: "map".to_owned(),
            coder: quote!(#key_coder, #value_coder),
            wire_type: quote!(::wirepb::wire::WireType::LengthDelimited),
            shape: Shape::Map,
        });
    }

    if let Some(args) = generic_args_of(&field.ty, "Option") {
        let elem = args[0];
        let (coder, wire_type) = coder_for(&attr.kind, elem)?;
        return Ok(ParsedField {
            ident,
            ty: field.ty.clone(),
            tag: attr.tag,
            kind: attr.kind,
            coder,
            wire_type,
            shape: Shape::Singular,
        });
    }

    if let Some(args) = generic_args_of(&field.ty, "Vec") {
        let elem = args[0];
        let (coder, wire_type) = coder_for(&attr.kind, elem)?;
        if attr.packed && is_length_delimited_kind(&attr.kind) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                format!(
                    "`kind = \"{}\"` is length-delimited and cannot be `packed`; packed arrays share one \
                     length prefix across elements, which only works for a fixed-width or varint element coder",
                    attr.kind
                ),
            ));
        }
        return Ok(ParsedField {
            ident,
            ty: field.ty.clone(),
            tag: attr.tag,
            kind: attr.kind,
            coder,
            wire_type,
            shape: Shape::Repeated { packed: attr.packed },
        });
    }

    Err(syn::Error::new_spanned(
        &field.ty,
        "a `#[wire(...)]` field must be `Option<V>` (singular), `Vec<V>` (repeated), or `HashMap<K, V>` (map)",
    ))
}

/// The `FieldValue` constructor a scalar `kind` maps to, if any. `enum` and
/// `message` kinds are deliberately not reflectable through this path: an
/// enum's wire representation is an opaque discriminant with no single
/// `FieldValue` variant to own it, and a nested message would need its own
/// `Reflect` impl to be meaningfully inspected rather than just re-encoded.
fn field_value_ctor(kind: &str) -> Option<TokenStream2> {
    match kind {
        "int32" | "sint32" | "sfixed32" => Some(quote!(::wirepb::reflect::FieldValue::I32)),
        "int64" | "sint64" | "sfixed64" => Some(quote!(::wirepb::reflect::FieldValue::I64)),
        "uint32" | "fixed32" => Some(quote!(::wirepb::reflect::FieldValue::U32)),
        "uint64" | "fixed64" => Some(quote!(::wirepb::reflect::FieldValue::U64)),
        "float" => Some(quote!(::wirepb::reflect::FieldValue::F32)),
        "double" => Some(quote!(::wirepb::reflect::FieldValue::F64)),
        "bool" => Some(quote!(::wirepb::reflect::FieldValue::Bool)),
        "string" => Some(quote!(::wirepb::reflect::FieldValue::Str)),
        "bytes" => Some(quote!(::wirepb::reflect::FieldValue::Bytes)),
        _ => None,
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(&input, "`Message` can only be derived for structs"));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(&input, "`Message` can only be derived for structs with named fields"));
    };

    let fields = named.named.iter().map(parse_field).collect::<syn::Result<Vec<_>>>()?;

    let field_meta = fields.iter().map(|f| {
        let name_str = f.ident.to_string();
        let tag = f.tag;
        let wire_type = &f.wire_type;
        let cardinality = match f.shape {
            Shape::Singular => quote!(::wirepb::field::Cardinality::Singular),
            Shape::Repeated { packed: true } => quote!(::wirepb::field::Cardinality::Packed),
            Shape::Repeated { packed: false } => quote!(::wirepb::field::Cardinality::Repeated),
            Shape::Map => quote!(::wirepb::field::Cardinality::Map),
        };
        quote! {
            ::wirepb::field::FieldMeta {
                name: #name_str,
                tag: #tag,
                wire_type: #wire_type,
                cardinality: #cardinality,
            }
        }
    });

    // `?` doesn't compose against an opaque `Mode::Result<T>` (it's a bare
    // `T` under `Unsafe`, not a `Result`/`Option`); every step is threaded
    // through `M::and_then` instead, built up right-to-left so each field's
    // output region feeds the next field's input.
    let encode_body = fields.iter().rev().fold(quote! { M::ok(region) }, |acc, f| {
        let ident = &f.ident;
        let tag = f.tag;
        let coder = &f.coder;
        let call = match &f.shape {
            Shape::Singular => quote!(::wirepb::field::encode_singular::<M, #coder>(region, #tag, &self.#ident)),
            Shape::Repeated { packed: false } => {
                quote!(::wirepb::field::encode_repeated::<M, #coder>(region, #tag, &self.#ident))
            }
            Shape::Repeated { packed: true } => {
                quote!(::wirepb::field::encode_packed::<M, #coder>(region, #tag, &self.#ident))
            }
            Shape::Map => quote!(::wirepb::map::encode_field::<M, #coder>(region, #tag, &self.#ident)),
        };
        quote! { M::and_then(#call, |region| #acc) }
    });

    let decode_arms = fields.iter().map(|f| {
        let ident = &f.ident;
        let tag = f.tag;
        let coder = &f.coder;
        match &f.shape {
            Shape::Singular => quote! {
                #tag => M::and_then(<#coder as ::wirepb::coder::Coder>::decode::<M>(rest), move |(v, rest)| {
                    acc.#ident = Some(v);
                    M::ok((acc, rest))
                }),
            },
            Shape::Repeated { packed: false } => quote! {
                #tag => M::and_then(<#coder as ::wirepb::coder::Coder>::decode::<M>(rest), move |(v, rest)| {
                    acc.#ident.push(v);
                    M::ok((acc, rest))
                }),
            },
            Shape::Repeated { packed: true } => quote! {
                #tag => M::and_then(::wirepb::array::Array::<#coder>::decode::<M>(rest), move |(mut v, rest)| {
                    acc.#ident.append(&mut v);
                    M::ok((acc, rest))
                }),
            },
            Shape::Map => quote! {
                #tag => M::and_then(
                    ::wirepb::map::decode_field::<M, #coder>(rest, ::core::mem::take(&mut acc.#ident)),
                    move |(m, rest)| {
                        acc.#ident = m;
                        M::ok((acc, rest))
                    },
                ),
            },
        }
    });

    let merge_stmts = fields.iter().map(|f| {
        let ident = &f.ident;
        match &f.shape {
            Shape::Singular => quote! { ::wirepb::field::merge_singular(&mut self.#ident, &other.#ident); },
            Shape::Repeated { .. } => quote! { ::wirepb::field::merge_repeated(&mut self.#ident, &other.#ident); },
            Shape::Map => quote! { ::wirepb::field::merge_map(&mut self.#ident, &other.#ident); },
        }
    });

    let len_terms = fields.iter().map(|f| {
        let ident = &f.ident;
        let tag = f.tag;
        let coder = &f.coder;
        match &f.shape {
            Shape::Singular => quote!(::wirepb::field::singular_len::<#coder>(#tag, &self.#ident)),
            Shape::Repeated { packed: false } => quote!(::wirepb::field::repeated_len::<#coder>(#tag, &self.#ident)),
            Shape::Repeated { packed: true } => quote!(::wirepb::field::packed_len::<#coder>(#tag, &self.#ident)),
            Shape::Map => quote!(::wirepb::map::encoded_len::<#coder>(#tag, &self.#ident)),
        }
    });

    let mut by_tag_arms = Vec::new();
    let mut by_name_arms = Vec::new();
    for f in &fields {
        let Some(ctor) = field_value_ctor(&f.kind) else { continue };
        let ident = &f.ident;
        let tag = f.tag;
        let name_str = ident.to_string();
        let value_expr = match &f.shape {
            Shape::Singular => quote!(self.#ident.clone().map(#ctor)),
            Shape::Repeated { .. } => quote! {
                Some(::wirepb::reflect::FieldValue::Repeated(
                    self.#ident.iter().cloned().map(#ctor).collect(),
                ))
            },
            Shape::Map => continue,
        };
        by_tag_arms.push(quote! { #tag => #value_expr, });
        by_name_arms.push(quote! { #name_str => #value_expr, });
    }

    // `for_each` visits every field, unlike `Reflect`'s tag/name lookup above:
    // a field kind with no `FieldValue` variant still gets a callback, with
    // `None` standing in for the value the reflection layer can't represent.
    let for_each_stmts = fields.iter().enumerate().map(|(i, f)| {
        let ident = &f.ident;
        let value_expr = match (field_value_ctor(&f.kind), &f.shape) {
            (Some(ctor), Shape::Singular) => quote!(self.#ident.clone().map(#ctor)),
            (Some(ctor), Shape::Repeated { .. }) => quote! {
                Some(::wirepb::reflect::FieldValue::Repeated(
                    self.#ident.iter().cloned().map(#ctor).collect(),
                ))
            },
            _ => quote!(None),
        };
        quote! { f(Self::FIELDS[#i], #value_expr); }
    });

    // One marker type per field, for the compile-time `FieldByName` lookup;
    // `FieldByTag`'s const-generic key needs no such type, since a `u32` tag
    // is already usable directly as a const generic argument.
    let fields_mod = format_ident!("__wirepb_fields_{}", name);
    let field_marker_idents: Vec<_> = fields.iter().map(|f| &f.ident).collect();
    let field_by_tag_impls = fields.iter().map(|f| {
        let tag = f.tag;
        let ty = &f.ty;
        let ident = &f.ident;
        quote! {
            impl ::wirepb::field::FieldByTag<#tag> for #name {
                type Value = #ty;
                fn field(&self) -> &Self::Value {
                    &self.#ident
                }
            }
        }
    });
    let field_by_name_impls = fields.iter().map(|f| {
        let ty = &f.ty;
        let ident = &f.ident;
        quote! {
            impl ::wirepb::field::FieldByName<#fields_mod::#ident> for #name {
                type Value = #ty;
                fn field(&self) -> &Self::Value {
                    &self.#ident
                }
            }
        }
    });

    let struct_name = name;
    let field_meta_vec: Vec<_> = field_meta.collect();
    let decode_arms_vec: Vec<_> = decode_arms.collect();
    let merge_stmts_vec: Vec<_> = merge_stmts.collect();
    let len_terms_vec: Vec<_> = len_terms.collect();
    let for_each_stmts_vec: Vec<_> = for_each_stmts.collect();
    let field_by_tag_impls_vec: Vec<_> = field_by_tag_impls.collect();
    let field_by_name_impls_vec: Vec<_> = field_by_name_impls.collect();

    let duplicate_tag_check_ident = format_ident!("__WIREPB_DUPLICATE_TAG_CHECK_{}", struct_name);

    Ok(quote! {
        #[allow(non_upper_case_globals)]
        const #duplicate_tag_check_ident: () = assert!(
            !::wirepb::field::has_duplicate_tags(<#struct_name as ::wirepb::Message>::FIELDS),
            "two fields of this message declare the same wire tag",
        );

        impl ::wirepb::Message for #struct_name {
            const FIELDS: &'static [::wirepb::field::FieldMeta] = &[ #(#field_meta_vec),* ];

            fn encode<M: ::wirepb::Mode>(&self, region: ::wirepb::WriteRegion) -> M::Result<::wirepb::WriteRegion> {
                #encode_body
            }

            fn decode<'a, M: ::wirepb::Mode>(
                region: ::wirepb::ReadRegion<'a>,
            ) -> M::Result<(Self, ::wirepb::ReadRegion<'a>)> {
                ::wirepb::field::decode_loop::<M, Self, _>(region, Self::default(), |tag, wire_type, rest, mut acc| {
                    match tag {
                        #(#decode_arms_vec)*
                        _ => M::and_then(::wirepb::skip::skip_value::<M>(rest, wire_type), move |rest| {
                            M::ok((acc, rest))
                        }),
                    }
                })
            }

            fn encoded_len(&self) -> usize {
                0 #(+ #len_terms_vec)*
            }

            fn merge(&mut self, other: Self) {
                #(#merge_stmts_vec)*
            }

            fn for_each<F: FnMut(::wirepb::field::FieldMeta, Option<::wirepb::reflect::FieldValue>)>(
                &self,
                mut f: F,
            ) {
                #(#for_each_stmts_vec)*
            }
        }

        impl ::wirepb::reflect::Reflect for #struct_name {
            fn field_by_tag(&self, tag: u32) -> Option<::wirepb::reflect::FieldValue> {
                match tag {
                    #(#by_tag_arms)*
                    _ => None,
                }
            }

            fn field_by_name(&self, name: &str) -> Option<::wirepb::reflect::FieldValue> {
                match name {
                    #(#by_name_arms)*
                    _ => None,
                }
            }
        }

        #[allow(non_snake_case, non_camel_case_types)]
        pub mod #fields_mod {
            #(pub struct #field_marker_idents;)*
        }

        #(#field_by_tag_impls_vec)*
        #(#field_by_name_impls_vec)*
    })
}
