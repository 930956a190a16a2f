//! Derive macro implementation for envdoc

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, GenericArgument, PathArguments, Type};

mod attrs;

use attrs::{FieldAttrs, Presence, StructAttrs};

/// Extract the inner type of `Wrapper<T>` when the last path segment is
/// `wrapper`.
fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn last_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string()),
        _ => None,
    }
}

/// Parser for a scalar type, plus the bit size a narrower integer or float
/// is read with.
fn scalar_parser(ty: &Type) -> Option<(TokenStream2, Option<u32>)> {
    let parser = |name: &str| -> TokenStream2 {
        let ident = syn::Ident::new(name, proc_macro2::Span::call_site());
        quote!(::envdoc::parser::#ident)
    };
    let found = match last_ident(ty)?.as_str() {
        "bool" => (parser("BoolParser"), None),
        "i64" => (parser("IntParser"), None),
        "i32" => (parser("IntParser"), Some(32)),
        "i16" => (parser("IntParser"), Some(16)),
        "i8" => (parser("IntParser"), Some(8)),
        "u64" => (parser("UintParser"), None),
        "u32" => (parser("UintParser"), Some(32)),
        "u16" => (parser("UintParser"), Some(16)),
        "u8" => (parser("UintParser"), Some(8)),
        "f64" => (parser("FloatParser"), None),
        "f32" => (parser("FloatParser"), Some(32)),
        "String" => (parser("StringParser"), None),
        "Duration" => (parser("DurationParser"), None),
        "DateTime" => (parser("TimeParser"), None),
        "IpAddr" => (parser("IpParser"), None),
        _ => return None,
    };
    Some(found)
}

/// How a field's parser output becomes the field value.
struct Plan {
    parser: TokenStream2,
    bit_size: Option<u32>,
    /// Narrow scalar type the parser output is cast to
    cast: Option<Type>,
    slice: bool,
    /// Parser output has no zero value to fall back to
    no_default: bool,
}

fn plan(ty: &Type) -> Option<Plan> {
    if let Some(elem) = generic_inner(ty, "Vec") {
        let (parser, bit_size) = scalar_parser(elem)?;
        return Some(Plan {
            parser: quote!(::envdoc::parser::SliceParser<#parser>),
            bit_size,
            cast: bit_size.map(|_| elem.clone()),
            slice: true,
            no_default: false,
        });
    }
    let (parser, bit_size) = scalar_parser(ty)?;
    Some(Plan {
        parser,
        bit_size,
        cast: bit_size.map(|_| ty.clone()),
        slice: false,
        no_default: last_ident(ty).as_deref() == Some("IpAddr"),
    })
}

impl Plan {
    /// Turn an expression of the parser's output type into the field type.
    fn convert(&self, value: TokenStream2) -> TokenStream2 {
        match (&self.cast, self.slice) {
            (None, _) => value,
            (Some(cast), false) => quote!((#value as #cast)),
            (Some(cast), true) => quote! {
                #value.into_iter().map(|__v| __v as #cast).collect::<::std::vec::Vec<#cast>>()
            },
        }
    }
}

/// `Configurable` derive macro
///
/// Implements `envdoc::Configurable` and adds `from_env()` and `describe()`
/// to the struct. Every field is read from one environment variable whose
/// declaration is assembled from the field's attributes, with the field's
/// doc comment as the declaration comment.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[env(prefix = "PREFIX_")]`: Add prefix to all variable names
///
/// **Field-level**:
/// - `#[env(name = "CUSTOM_NAME")]`: Custom variable name
/// - `#[env(default = "value")]`: Textual default, parsed like `default=`
/// - `#[env(optional)]`: Missing variable is not an error
/// - `#[env(decl = "base=16 bit_size=32")]`: Extra declaration fields
/// - `#[env(parser = "path::Parser")]`: Use a custom `envdoc::Parser`
/// - `#[env(has)]` / `#[env(has_not)]`: `bool` field reporting presence
///
/// # Field Types
///
/// `bool`, `i8`..`i64`, `u8`..`u64`, `f32`, `f64`, `String`,
/// `std::time::Duration`, `chrono::DateTime<FixedOffset>`, `Vec` of any of
/// these, and `Option` of any of the above. `std::net::IpAddr` only as
/// `Option<IpAddr>` or `Vec<IpAddr>`. `Option<T>` fields are optional
/// and `None` when unset.
///
/// # Example
///
/// See the `envdoc` crate documentation for usage examples.
#[proc_macro_derive(Configurable, attributes(env))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let struct_attrs = StructAttrs::from_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Configurable only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Configurable only supports structs",
            ));
        }
    };

    let mut field_initializers = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;
        let attrs = FieldAttrs::from_field(field)?;

        let base_name = attrs
            .name
            .clone()
            .unwrap_or_else(|| field_name.to_string().to_uppercase());
        let decl = attrs.declaration(&format!("{}{}", struct_attrs.prefix, base_name));

        let expr = field_expr(field, field_type, &attrs, &decl)?;
        field_initializers.push(quote! { #field_name: #expr });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::envdoc::Configurable for #struct_name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn configure<__C: ::envdoc::Configurer>(__c: &mut __C) -> Self {
                Self {
                    #(#field_initializers),*
                }
            }
        }

        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// Load configuration from environment variables
            ///
            /// # Errors
            ///
            /// - Required environment variables are not set
            /// - Environment variable values cannot be parsed into target types
            /// - A declaration or its default is invalid
            pub fn from_env() -> ::envdoc::anyhow::Result<Self> {
                Ok(::envdoc::load::<Self>()?)
            }

            /// Describe every environment variable this struct reads
            ///
            /// # Errors
            ///
            /// A declaration or its default is invalid
            pub fn describe() -> ::envdoc::anyhow::Result<::std::vec::Vec<::envdoc::Description>> {
                Ok(::envdoc::describe::<Self>()?)
            }
        }
    })
}

fn field_expr(
    field: &syn::Field,
    field_type: &Type,
    attrs: &FieldAttrs,
    decl: &str,
) -> syn::Result<TokenStream2> {
    let option_inner = generic_inner(field_type, "Option");

    if attrs.presence != Presence::Value {
        if last_ident(field_type).as_deref() != Some("bool") {
            return Err(syn::Error::new_spanned(
                field,
                "has and has_not require a bool field",
            ));
        }
        if attrs.default.is_some() || attrs.parser.is_some() || attrs.decl.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "has and has_not cannot be combined with default, decl or parser",
            ));
        }
        return Ok(match attrs.presence {
            Presence::HasNot => quote!(__c.has_not(#decl)),
            _ => quote!(__c.has(#decl)),
        });
    }

    if option_inner.is_some() && attrs.default.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "Option<T> fields cannot have default attribute (they default to None automatically)",
        ));
    }

    let target = option_inner.unwrap_or(field_type);

    let no_default = attrs.parser.is_none() && plan(target).is_some_and(|plan| plan.no_default);
    if option_inner.is_none() && no_default {
        return Err(syn::Error::new_spanned(
            field,
            "IpAddr has no zero value; use Option<IpAddr>",
        ));
    }

    let (parser, bit_size, plan) = match &attrs.parser {
        Some(path) => (quote!(#path), None, None),
        None => {
            let Some(plan) = plan(target) else {
                return Err(syn::Error::new_spanned(
                    target,
                    "unsupported field type; use #[env(parser = \"...\")] with a custom parser",
                ));
            };
            (plan.parser.clone(), plan.bit_size, Some(plan))
        }
    };

    let mut opts = Vec::new();
    if let Some(bits) = bit_size {
        opts.push(quote!(::envdoc::Opt::bit_size(#bits)));
    }

    let convert = |value: TokenStream2| match &plan {
        Some(plan) => plan.convert(value),
        None => value,
    };

    Ok(if option_inner.is_some() {
        opts.insert(0, quote!(::envdoc::Opt::optional()));
        let value = convert(quote!(__v));
        quote! {
            __c.var::<#parser>(#decl, &[#(#opts),*]).map(|__v| #value)
        }
    } else {
        convert(quote! {
            __c.value::<#parser>(#decl, &[#(#opts),*])
        })
    })
}
