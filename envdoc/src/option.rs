//! Field resolution and strongly-typed programmatic options.
//!
//! Both declaration fields and [`Opt`] values end up as a [`Setting`] applied
//! to a pending [`Spec`], so `base=16` in a declaration and `Opt::base(16)` go
//! through exactly the same code.

use std::fmt;
use std::marker::PhantomData;

use crate::error::OptionError;
use crate::parser::{Parser, SetBase, SetBitSize, SetComma, SetEncoding, SetLayout};
use crate::spec::{Flags, Spec};

/// A resolved declaration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    /// `optional`
    Optional,
    /// `default=...`, parsed once every other setting is in place
    Default(String),
    /// `base=N`
    Base(u32),
    /// `bit_size=N`
    BitSize(u32),
    /// `comma=C`
    Comma(char),
    /// `layout=...`
    Layout(String),
    /// `padding=C`
    Padding(char),
    /// `no_padding` or `no_padding=BOOL`
    NoPadding(bool),
    /// `url_safe` or `url_safe=BOOL`
    UrlSafe(bool),
}

impl Setting {
    /// Resolve a `key=value` field. Keys are case-insensitive.
    pub fn resolve(key: &str, value: &str) -> Result<Self, OptionError> {
        match key.to_ascii_lowercase().as_str() {
            "optional" if value.is_empty() => Ok(Self::Optional),
            "optional" => Err(OptionError::OptionalTakesNoValue),
            "default" => Ok(Self::Default(value.to_string())),
            "base" => value
                .parse()
                .map(Self::Base)
                .map_err(OptionError::InvalidBase),
            "bit_size" => value
                .parse()
                .map(Self::BitSize)
                .map_err(OptionError::InvalidBitSize),
            "comma" => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(comma), None) => check_comma(comma).map(Self::Comma),
                    _ => Err(OptionError::InvalidComma),
                }
            }
            "layout" => Ok(Self::Layout(value.to_string())),
            "padding" => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(padding), None) => Ok(Self::Padding(padding)),
                    _ => Err(OptionError::InvalidPadding),
                }
            }
            "no_padding" => switch("no_padding", value).map(Self::NoPadding),
            "url_safe" => switch("url_safe", value).map(Self::UrlSafe),
            _ => Err(OptionError::Unknown(key.to_string())),
        }
    }

    /// Apply to a spec, probing the parser for type-specific capabilities.
    pub fn apply<P: Parser>(self, spec: &mut Spec<P>) -> Result<(), OptionError> {
        match self {
            Self::Optional => spec.flags.insert(Flags::OPTIONAL),
            Self::Default(raw) => spec.set_default_raw(raw),
            Self::Base(base) => spec
                .parser
                .base_mut()
                .ok_or(OptionError::Unsupported("base"))?
                .set_base(base),
            Self::BitSize(bit_size) => spec
                .parser
                .bit_size_mut()
                .ok_or(OptionError::Unsupported("bit_size"))?
                .set_bit_size(bit_size),
            Self::Comma(comma) => spec
                .parser
                .comma_mut()
                .ok_or(OptionError::Unsupported("comma"))?
                .set_comma(check_comma(comma)?),
            Self::Layout(layout) => spec
                .parser
                .layout_mut()
                .ok_or(OptionError::Unsupported("layout"))?
                .set_layout(layout),
            Self::Padding(padding) => encoding(spec, "padding")?.set_padding(padding),
            Self::NoPadding(on) => encoding(spec, "no_padding")?.set_no_padding(on),
            Self::UrlSafe(on) => encoding(spec, "url_safe")?.set_url_safe(on),
        }
        Ok(())
    }
}

/// A bare key switches on; otherwise the value must be a bool.
fn switch(key: &'static str, value: &str) -> Result<bool, OptionError> {
    if value.is_empty() {
        return Ok(true);
    }
    value.parse().map_err(|_| OptionError::InvalidSwitch {
        key,
        value: value.to_string(),
    })
}

fn encoding<'a, P: Parser>(
    spec: &'a mut Spec<P>,
    key: &'static str,
) -> Result<&'a mut dyn SetEncoding, OptionError> {
    spec.parser
        .encoding_mut()
        .ok_or(OptionError::Unsupported(key))
}

/// Quotes and line breaks already mean something inside a record.
fn check_comma(comma: char) -> Result<char, OptionError> {
    match comma {
        '"' | '\n' | '\r' => Err(OptionError::ReservedComma(comma)),
        _ => Ok(comma),
    }
}

/// A programmatic option for a variable parsed by `P`.
///
/// Options are applied after the declaration's own fields, in the order
/// given, so they win over the declaration for the same parameter.
/// Type-specific constructors only exist where `P` supports them:
///
/// ```rust
/// use envdoc::{Cfg, Configurer, Opt};
///
/// let mut cfg = Cfg::from_map([("COLOR", "ff8800")]);
/// let color = cfg.int("COLOR | RGB color", &[Opt::base(16), Opt::default(0)]);
/// assert_eq!(color, 0xff8800);
/// ```
///
/// Options a parser cannot take are rejected at compile time:
///
/// ```compile_fail
/// use envdoc::{Configurer, Describer, Opt};
///
/// let mut describer = Describer::new();
/// describer.string("NAME", &[Opt::base(16)]);
/// ```
pub struct Opt<P: Parser> {
    kind: OptKind<P::Output>,
    _parser: PhantomData<fn() -> P>,
}

enum OptKind<T> {
    Setting(Setting),
    Default(T),
    Comment(String),
}

impl<P: Parser> Opt<P> {
    fn new(kind: OptKind<P::Output>) -> Self {
        Self {
            kind,
            _parser: PhantomData,
        }
    }

    fn setting(setting: Setting) -> Self {
        Self::new(OptKind::Setting(setting))
    }

    /// Missing values are not an error.
    pub fn optional() -> Self {
        Self::setting(Setting::Optional)
    }

    /// Typed default value, replacing any `default=` from the declaration.
    pub fn default(value: P::Output) -> Self {
        Self::new(OptKind::Default(value))
    }

    /// Textual default, parsed like `default=` once all options are applied.
    pub fn default_str(raw: impl Into<String>) -> Self {
        Self::setting(Setting::Default(raw.into()))
    }

    /// Replace the declaration's comment.
    pub fn comment(comment: impl Into<String>) -> Self {
        Self::new(OptKind::Comment(comment.into()))
    }

    pub(crate) fn apply(self, spec: &mut Spec<P>) -> Result<(), OptionError> {
        match self.kind {
            OptKind::Setting(setting) => setting.apply(spec)?,
            OptKind::Default(value) => spec.set_default(value),
            OptKind::Comment(comment) => spec.comment = comment,
        }
        Ok(())
    }
}

impl<P: Parser + SetBase> Opt<P> {
    pub fn base(base: u32) -> Self {
        Self::setting(Setting::Base(base))
    }
}

impl<P: Parser + SetBitSize> Opt<P> {
    pub fn bit_size(bit_size: u32) -> Self {
        Self::setting(Setting::BitSize(bit_size))
    }
}

impl<P: Parser + SetComma> Opt<P> {
    pub fn comma(comma: char) -> Self {
        Self::setting(Setting::Comma(comma))
    }
}

impl<P: Parser + SetLayout> Opt<P> {
    pub fn layout(layout: impl Into<String>) -> Self {
        Self::setting(Setting::Layout(layout.into()))
    }
}

impl<P: Parser + SetEncoding> Opt<P> {
    pub fn padding(padding: char) -> Self {
        Self::setting(Setting::Padding(padding))
    }

    pub fn no_padding() -> Self {
        Self::setting(Setting::NoPadding(true))
    }

    pub fn url_safe() -> Self {
        Self::setting(Setting::UrlSafe(true))
    }
}

impl<P: Parser> Clone for Opt<P> {
    fn clone(&self) -> Self {
        Self::new(match &self.kind {
            OptKind::Setting(setting) => OptKind::Setting(setting.clone()),
            OptKind::Default(value) => OptKind::Default(value.clone()),
            OptKind::Comment(comment) => OptKind::Comment(comment.clone()),
        })
    }
}

impl<P: Parser> fmt::Debug for Opt<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OptKind::Setting(setting) => f.debug_tuple("Opt").field(setting).finish(),
            OptKind::Default(_) => f.write_str("Opt(Default(..))"),
            OptKind::Comment(comment) => write!(f, "Opt(Comment({comment:?}))"),
        }
    }
}
