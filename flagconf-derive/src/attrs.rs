//! Attribute parsing for `#[conf(...)]` annotations.
//!
//! This module extracts and validates configuration attributes from struct fields
//! during macro expansion.

use syn::{Field, Lit, Type};

/// Field types the runtime knows how to bind, by last path segment.
const SUPPORTED_TYPES: &[&str] = &[
    "bool", "Duration", "f64", "isize", "i64", "usize", "u64", "String",
];

/// Parsed `#[conf(...)]` attributes from a struct field.
///
/// Every value is kept as text; the runtime decides how to interpret it.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Textual default value.
    pub default: Option<String>,

    /// Environment variable name override.
    ///
    /// Read as written, then scoped by the base prefix. If `None`, the name is
    /// derived from the base prefix and the flag name.
    pub env: Option<String>,

    /// Flag name override. Reserved: carried to the runtime but not applied.
    pub flag: Option<String>,

    /// Help text for the flag.
    pub help: Option<String>,
}

impl FieldAttrs {
    /// Extract and parse `#[conf(...)]` attributes from a struct field.
    ///
    /// Attributes other than `conf` are left for other macros.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("conf") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                // default = "..." | 42 | 1.5 | true
                if meta.path.is_ident("default") {
                    let value = meta.value()?;
                    let negative = value.parse::<Option<syn::Token![-]>>()?.is_some();
                    let lit: Lit = value.parse()?;
                    let text = literal_text(&lit, negative)
                        .ok_or_else(|| syn::Error::new_spanned(&lit, "expected a string, number or bool literal"))?;
                    attrs.default = Some(text);
                    return Ok(());
                }

                // env = "..."
                if meta.path.is_ident("env") {
                    attrs.env = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                    return Ok(());
                }

                // flag = "..."
                if meta.path.is_ident("flag") {
                    attrs.flag = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                    return Ok(());
                }

                // help = "..."
                if meta.path.is_ident("help") {
                    attrs.help = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                    return Ok(());
                }

                Err(meta.error("unsupported conf attribute, expected one of `default`, `env`, `flag`, `help`"))
            })?;
        }

        Ok(attrs)
    }
}

fn literal_text(lit: &Lit, negative: bool) -> Option<String> {
    let text = match lit {
        Lit::Str(s) if !negative => return Some(s.value()),
        Lit::Bool(b) if !negative => return Some(b.value.to_string()),
        Lit::Int(i) => i.base10_digits().to_owned(),
        Lit::Float(f) => f.base10_digits().to_owned(),
        _ => return None,
    };
    Some(if negative { format!("-{text}") } else { text })
}

/// Whether `ty` names one of the bindable field types.
///
/// Only the last path segment is inspected, so `std::time::Duration` and
/// `Duration` are both recognized. Anything generic is unsupported.
pub fn is_supported_type(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    if type_path.qself.is_some() {
        return false;
    }
    type_path.path.segments.last().is_some_and(|seg| {
        seg.arguments.is_none() && SUPPORTED_TYPES.iter().any(|name| seg.ident == *name)
    })
}
