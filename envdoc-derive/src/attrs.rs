//! Attribute parsing for `#[env(...)]` annotations.
//!
//! This module extracts configuration attributes from the struct and its
//! fields and assembles the declaration string each field is read with.

use syn::{Attribute, Expr, Field, Lit, LitStr, Meta};

/// Parsed struct-level `#[env(...)]` attributes.
#[derive(Debug, Default)]
pub struct StructAttrs {
    /// Prepended to every variable name.
    pub prefix: String,
}

impl StructAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("prefix") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.prefix = lit.value();
                    return Ok(());
                }

                Err(meta.error("unsupported struct-level env attribute"))
            })?;
        }

        Ok(out)
    }
}

/// How a field is read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Parse the value.
    #[default]
    Value,
    /// `true` when the variable is set.
    Has,
    /// `true` when the variable is unset.
    HasNot,
}

/// Parsed `#[env(...)]` attributes and doc comments of a struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Variable name override.
    ///
    /// If `None`, the field name is converted to UPPER_SNAKE_CASE.
    pub name: Option<String>,

    /// Textual default, written as `default=...` in the declaration.
    pub default: Option<String>,

    pub optional: bool,

    /// Extra declaration fields, e.g. `"base=16 bit_size=32"`.
    pub decl: Option<String>,

    /// Parser type path overriding the one inferred from the field type.
    pub parser: Option<syn::Path>,

    pub presence: Presence,

    /// Doc comment lines, used as the declaration comment.
    pub doc: Vec<String>,
}

impl FieldAttrs {
    /// Extract `#[env(...)]` attributes and doc comments from a struct field.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if attr.path().is_ident("doc") {
                if let Meta::NameValue(nv) = &attr.meta {
                    if let Expr::Lit(expr) = &nv.value {
                        if let Lit::Str(s) = &expr.lit {
                            attrs.doc.push(s.value().trim().to_string());
                        }
                    }
                }
                continue;
            }

            if !attr.path().is_ident("env") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                // name = "..."
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.name = Some(lit.value());
                    return Ok(());
                }

                // default = "..."
                if meta.path.is_ident("default") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.default = Some(lit.value());
                    return Ok(());
                }

                if meta.path.is_ident("optional") {
                    attrs.optional = true;
                    return Ok(());
                }

                // decl = "key=value ..."
                if meta.path.is_ident("decl") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.decl = Some(lit.value());
                    return Ok(());
                }

                // parser = "path::to::Parser"
                if meta.path.is_ident("parser") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.parser = Some(lit.parse()?);
                    return Ok(());
                }

                if meta.path.is_ident("has") {
                    attrs.presence = Presence::Has;
                    return Ok(());
                }

                if meta.path.is_ident("has_not") {
                    attrs.presence = Presence::HasNot;
                    return Ok(());
                }

                Err(meta.error("unsupported env attribute"))
            })?;
        }

        Ok(attrs)
    }

    /// Render the declaration string for variable `name`.
    pub fn declaration(&self, name: &str) -> String {
        let mut out = name.to_string();
        if self.optional {
            out.push_str(" optional");
        }
        if let Some(decl) = &self.decl {
            let decl = decl.trim();
            if !decl.is_empty() {
                out.push(' ');
                out.push_str(decl);
            }
        }
        if let Some(default) = &self.default {
            out.push_str(" default=");
            out.push_str(&quote_value(default));
        }

        let comment = self
            .doc
            .iter()
            .filter(|line| !line.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        if !comment.is_empty() {
            out.push_str(" | ");
            out.push_str(&comment);
        }
        out
    }
}

/// Quote a declaration value when it would not survive as a bare token.
fn quote_value(value: &str) -> String {
    if !value.is_empty() && !value.starts_with('"') && !value.contains(char::is_whitespace) {
        return value.to_string();
    }
    let mut quoted = String::from("\"");
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
