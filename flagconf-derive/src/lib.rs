//! Derive macro implementation for flagconf

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

mod attrs;

use attrs::{is_supported_type, FieldAttrs};

/// `FlagConf` derive macro
///
/// Implements `flagconf::Record` for a struct with named fields, listing every
/// field in declaration order.
///
/// # Supported Attributes
///
/// **Field-level**:
/// - `#[conf(default = "value")]`: Textual default when the env var is unset
/// - `#[conf(env = "NAME")]`: Custom environment variable name
/// - `#[conf(help = "text")]`: Help text for the flag
/// - `#[conf(flag = "name")]`: Reserved, accepted but not applied
///
/// Fields of a type outside the supported set compile, but make setup fail
/// at runtime with `SetupError::UnsupportedFieldType`.
///
/// # Example
///
/// See the `flagconf` crate documentation for usage examples.
#[proc_macro_derive(FlagConf, attributes(conf))]
pub fn derive_flagconf(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "FlagConf only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "FlagConf only supports structs with named fields",
            ));
        }
    };

    let field_entries = fields
        .iter()
        .map(|field| {
            let attrs = FieldAttrs::from_field(field)?;
            let Some(field_name) = field.ident.as_ref() else {
                return Err(syn::Error::new_spanned(field, "expected a named field"));
            };
            let ident = field_name.unraw().to_string();
            let field_type = &field.ty;

            let target = if is_supported_type(field_type) {
                quote! { ::flagconf::Target::from(&mut self.#field_name) }
            } else {
                quote! { ::flagconf::Target::unsupported::<#field_type>() }
            };

            let mut tags = quote! { ::flagconf::Tags::new() };
            if let Some(default) = &attrs.default {
                tags = quote! { #tags.with_default(#default) };
            }
            if let Some(env) = &attrs.env {
                tags = quote! { #tags.with_env(#env) };
            }
            if let Some(flag) = &attrs.flag {
                tags = quote! { #tags.with_flag(#flag) };
            }
            if let Some(help) = &attrs.help {
                tags = quote! { #tags.with_help(#help) };
            }

            Ok(quote! {
                ::flagconf::Field::new(#ident, #target).with_tags(#tags)
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics ::flagconf::Record for #struct_name #ty_generics #where_clause {
            fn fields(&mut self) -> ::std::vec::Vec<::flagconf::Field<'_>> {
                ::std::vec![
                    #(#field_entries),*
                ]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_to_string(input: DeriveInput) -> String {
        expand(&input).unwrap().to_string()
    }

    #[test]
    fn test_expand_lists_fields_in_order() {
        let out = expand_to_string(parse_quote! {
            struct Basics {
                one: String,
                #[conf(default = "true")]
                two: bool,
                #[conf(default = "4")]
                third_field: isize,
            }
        });

        let one = out.find("\"one\"").unwrap();
        let two = out.find("\"two\"").unwrap();
        let third = out.find("\"third_field\"").unwrap();
        assert!(one < two && two < third);
        assert!(out.contains("with_default"));
        assert!(out.contains("\"4\""));
        assert!(out.contains("Record for Basics"));
    }

    #[test]
    fn test_expand_marks_unsupported_types() {
        let out = expand_to_string(parse_quote! {
            struct Nested {
                inner: Vec<String>,
            }
        });

        assert!(out.contains("unsupported"));
        assert!(!out.contains("self . inner"));
    }

    #[test]
    fn test_expand_strips_raw_identifiers() {
        let out = expand_to_string(parse_quote! {
            struct Raw {
                r#type: String,
            }
        });

        assert!(out.contains("\"type\""));
        assert!(!out.contains("\"r#type\""));
    }

    #[test]
    fn test_expand_keeps_generics() {
        let out = expand_to_string(parse_quote! {
            struct Scoped<'a> {
                name: String,
                label: &'a str,
            }
        });

        assert!(out.contains("Record for Scoped"));
        assert!(out.contains("unsupported"));
    }

    #[test]
    fn test_expand_rejects_non_records() {
        let inputs: [DeriveInput; 3] = [
            parse_quote! { enum Mode { A, B } },
            parse_quote! { struct Pair(String, bool); },
            parse_quote! { struct Unit; },
        ];

        for input in &inputs {
            let err = expand(input).unwrap_err();
            assert!(err.to_string().contains("named fields"));
        }
    }

    #[test]
    fn test_expand_reports_attribute_errors() {
        let input: DeriveInput = parse_quote! {
            struct Bad {
                #[conf(deafult = "x")]
                one: String,
            }
        };

        assert!(expand(&input).is_err());
    }
}
