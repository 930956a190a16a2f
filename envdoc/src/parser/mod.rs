//! Type parsers and the capability traits options are applied through.
//!
//! A [`Parser`] turns raw text into a typed value and reports its own
//! non-default parameters for documentation. Parameters such as `base` or
//! `layout` are not part of the trait itself: each parser implements only the
//! setter traits that make sense for it ([`SetBase`], [`SetBitSize`],
//! [`SetComma`], [`SetLayout`], [`SetEncoding`]) and exposes them through the matching probe
//! method. The option resolver asks the probe and reports "not supported"
//! when it answers `None`, so a new parser never requires touching the
//! resolver.

mod bytes;
mod duration;
mod int;
mod ip;
mod scalar;
mod slice;
mod time;

pub use bytes::BytesParser;
pub use duration::{format_duration, parse_duration, DurationParser};
pub use int::{IntParser, UintParser};
pub use ip::IpParser;
pub use scalar::{BoolParser, FloatParser, StringParser};
pub use slice::{
    FloatSliceParser, IntSliceParser, SliceParser, StringSliceParser, UintSliceParser,
};
pub use time::TimeParser;

use crate::error::ParseError;

/// Non-default parser parameters, keyed by their declaration name.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Parses raw text into `Output` and documents its own configuration.
pub trait Parser: Default {
    /// The typed value. Accessors fall back to its `Default`, where it has
    /// one, when a variable is absent.
    type Output: Clone + std::fmt::Debug;

    /// Documentation tag, e.g. `int64` or `[]string`.
    fn type_name(&self) -> String;

    fn parse(&self, raw: &str) -> Result<Self::Output, ParseError>;

    /// Parameters that differ from their zero value.
    fn params(&self) -> Params {
        Params::new()
    }

    /// How a default value appears in a description.
    fn render(&self, value: &Self::Output) -> serde_json::Value;

    fn base_mut(&mut self) -> Option<&mut dyn SetBase> {
        None
    }

    fn bit_size_mut(&mut self) -> Option<&mut dyn SetBitSize> {
        None
    }

    fn comma_mut(&mut self) -> Option<&mut dyn SetComma> {
        None
    }

    fn layout_mut(&mut self) -> Option<&mut dyn SetLayout> {
        None
    }

    fn encoding_mut(&mut self) -> Option<&mut dyn SetEncoding> {
        None
    }
}

/// Integer radix; 0 infers it from the value's prefix.
pub trait SetBase {
    fn set_base(&mut self, base: u32);
}

/// Bit width; 0 means 64.
pub trait SetBitSize {
    fn set_bit_size(&mut self, bit_size: u32);
}

/// Element delimiter for slice values.
pub trait SetComma {
    fn set_comma(&mut self, comma: char);
}

/// strftime-style layout for timestamps; empty means RFC 3339.
pub trait SetLayout {
    fn set_layout(&mut self, layout: String);
}

/// base64 flavor for byte values.
pub trait SetEncoding {
    fn set_padding(&mut self, padding: char);
    fn set_no_padding(&mut self, no_padding: bool);
    fn set_url_safe(&mut self, url_safe: bool);
}

fn insert_nonzero(params: &mut Params, key: &str, value: u32) {
    if value != 0 {
        params.insert(key.to_string(), value.into());
    }
}
