//! The per-variable spec and its serializable description.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::grammar::{self, Declaration};
use crate::option::{Opt, Setting};
use crate::parser::{Params, Parser};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags: u8 {
        /// A missing value is not an error
        const OPTIONAL = 1 << 0;
        /// A default value is present
        const HAS_DEFAULT = 1 << 1;
        /// The default was given as text and parsed by the spec's parser
        const HAS_DEFAULT_AS_STRING = 1 << 2;
    }
}

/// Everything known about one declared variable.
///
/// A spec is built fresh for every accessor call and handed to the
/// evaluation engine, which either evaluates it against a source or only
/// records its [`Description`].
#[derive(Debug, Clone)]
pub struct Spec<P: Parser> {
    pub(crate) name: String,
    pub(crate) type_name: String,
    pub(crate) flags: Flags,
    pub(crate) default: Option<P::Output>,
    pub(crate) default_raw: Option<String>,
    pub(crate) comment: String,
    pub(crate) parser: P,
}

impl<P: Parser> Spec<P> {
    /// An empty spec with a default-configured parser.
    pub fn new(name: impl Into<String>) -> Self {
        let parser = P::default();
        Self {
            name: name.into(),
            type_name: parser.type_name(),
            flags: Flags::empty(),
            default: None,
            default_raw: None,
            comment: String::new(),
            parser,
        }
    }

    /// Build a spec from a declaration string and programmatic options.
    ///
    /// Declaration fields are applied in order, then `opts` in order. A
    /// textual default is parsed last, with the parser fully configured.
    ///
    /// # Errors
    ///
    /// Grammar errors, option errors and an unparsable default.
    pub fn build(decl: &str, opts: &[Opt<P>]) -> Result<Self, Error> {
        let Declaration {
            name,
            fields,
            comment,
        } = grammar::parse(decl)?;

        let mut spec = Self::new(name);
        spec.comment = comment;

        for field in fields {
            tracing::trace!(name = %spec.name, key = %field.key, "applying field");
            let applied = Setting::resolve(&field.key, &field.value)
                .and_then(|setting| setting.apply(&mut spec));
            if let Err(source) = applied {
                return Err(Error::option(spec.name, source));
            }
        }

        for opt in opts {
            if let Err(source) = opt.clone().apply(&mut spec) {
                return Err(Error::option(spec.name, source));
            }
        }

        spec.resolve_default()?;
        tracing::debug!(name = %spec.name, type_name = %spec.type_name, "built variable spec");
        Ok(spec)
    }

    fn resolve_default(&mut self) -> Result<(), Error> {
        if !self.flags.contains(Flags::HAS_DEFAULT_AS_STRING) {
            return Ok(());
        }
        let raw = self.default_raw.clone().unwrap_or_default();
        match self.parser.parse(&raw) {
            Ok(value) => {
                self.default = Some(value);
                Ok(())
            }
            Err(source) => Err(Error::InvalidDefault {
                name: self.name.clone(),
                raw,
                source,
            }),
        }
    }

    pub(crate) fn set_default(&mut self, value: P::Output) {
        self.default = Some(value);
        self.default_raw = None;
        self.flags.insert(Flags::HAS_DEFAULT);
        self.flags.remove(Flags::HAS_DEFAULT_AS_STRING);
    }

    pub(crate) fn set_default_raw(&mut self, raw: String) {
        self.default = None;
        self.default_raw = Some(raw);
        self.flags
            .insert(Flags::HAS_DEFAULT | Flags::HAS_DEFAULT_AS_STRING);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn is_optional(&self) -> bool {
        self.flags.contains(Flags::OPTIONAL)
    }

    pub fn default_value(&self) -> Option<&P::Output> {
        self.default.as_ref()
    }

    /// The textual default, if the default was given as text.
    pub fn default_raw(&self) -> Option<&str> {
        self.default_raw.as_deref()
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// The side-effect-free summary both engines record.
    pub fn describe(&self) -> Description {
        Description {
            name: self.name.clone(),
            type_name: self.type_name.clone(),
            optional: self.is_optional(),
            default: self.default.as_ref().map(|value| self.parser.render(value)),
            params: self.parser.params(),
            comment: self.comment.clone(),
        }
    }

    /// Evaluate against `lookup`.
    ///
    /// Returns `Ok(None)` only for an optional variable without default that
    /// is not set.
    pub fn evaluate(self, lookup: &dyn Fn(&str) -> Option<String>) -> Result<Option<P::Output>, Error> {
        match lookup(&self.name) {
            Some(raw) => self
                .parser
                .parse(&raw)
                .map(Some)
                .map_err(|source| Error::parse(self.name, source)),
            None if self.default.is_some() => {
                tracing::debug!(name = %self.name, "variable not set, using default");
                Ok(self.default)
            }
            None if self.is_optional() => Ok(None),
            None => {
                tracing::debug!(name = %self.name, "required variable not set");
                Err(Error::missing(self.name))
            }
        }
    }
}

/// Serializable documentation for one variable.
///
/// ```json
/// {
///     "name": "EXAMPLE_HEX_INT",
///     "type": "int64",
///     "optional": false,
///     "default": 31,
///     "params": { "base": 16 },
///     "comment": "A hex int configuration value"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl Description {
    /// Render back into a declaration string that rebuilds an equivalent
    /// spec: same parameters, optional flag, default and comment.
    ///
    /// Integer defaults are written in the declared base so they parse back
    /// to the same value.
    pub fn to_declaration(&self) -> String {
        let mut out = self.name.clone();
        if self.optional {
            out.push_str(" optional");
        }
        for (key, value) in &self.params {
            out.push(' ');
            out.push_str(key);
            out.push('=');
            out.push_str(&quote_field(&scalar_text(value, 0)));
        }
        if let Some(default) = &self.default {
            let base = self
                .params
                .get("base")
                .and_then(Value::as_u64)
                .and_then(|base| u32::try_from(base).ok())
                .unwrap_or(0);
            let text = match default {
                Value::Array(items) => {
                    let comma = self
                        .params
                        .get("comma")
                        .and_then(Value::as_str)
                        .and_then(|comma| comma.chars().next())
                        .unwrap_or(',');
                    join_record(items, comma, base)
                }
                scalar => scalar_text(scalar, base),
            };
            out.push_str(" default=");
            out.push_str(&quote_field(&text));
        }
        if !self.comment.is_empty() {
            out.push_str(" | ");
            out.push_str(&self.comment);
        }
        out
    }
}

fn scalar_text(value: &Value, base: u32) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if (2..=36).contains(&base) && base != 10 => {
            if let Some(u) = n.as_u64() {
                to_radix(u, base)
            } else if let Some(i) = n.as_i64() {
                format!("-{}", to_radix(i.unsigned_abs(), base))
            } else {
                n.to_string()
            }
        }
        other => other.to_string(),
    }
}

fn to_radix(mut value: u64, base: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        let digit = (value % u64::from(base)) as u32;
        digits.extend(char::from_digit(digit, base));
        value /= u64::from(base);
    }
    digits.iter().rev().collect()
}

fn join_record(items: &[Value], comma: char, base: u32) -> String {
    items
        .iter()
        .map(|item| {
            let text = scalar_text(item, base);
            if text.contains([comma, '"', '\n', '\r']) {
                format!("\"{}\"", text.replace('"', "\"\""))
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join(&comma.to_string())
}

fn quote_field(text: &str) -> String {
    if !text.is_empty() && !text.starts_with('"') && !text.contains(char::is_whitespace) {
        return text.to_string();
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
