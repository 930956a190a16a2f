use super::{insert_nonzero, Params, Parser, SetBase, SetBitSize};
use crate::error::ParseError;

/// Signed integers, `int64` in descriptions.
///
/// `base` 0 infers the radix from the prefix (`0x`, `0o`, `0b`, or a leading
/// `0` for octal). `bit_size` 0 means 64; narrower sizes reject values that
/// do not fit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntParser {
    base: u32,
    bit_size: u32,
}

/// Unsigned integers, `uint64` in descriptions. Same parameters as
/// [`IntParser`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UintParser {
    base: u32,
    bit_size: u32,
}

impl Parser for IntParser {
    type Output = i64;

    fn type_name(&self) -> String {
        "int64".to_string()
    }

    fn parse(&self, raw: &str) -> Result<i64, ParseError> {
        parse_int(raw, self.base, self.bit_size)
    }

    fn params(&self) -> Params {
        int_params(self.base, self.bit_size)
    }

    fn render(&self, value: &i64) -> serde_json::Value {
        (*value).into()
    }

    fn base_mut(&mut self) -> Option<&mut dyn SetBase> {
        Some(self)
    }

    fn bit_size_mut(&mut self) -> Option<&mut dyn SetBitSize> {
        Some(self)
    }
}

impl Parser for UintParser {
    type Output = u64;

    fn type_name(&self) -> String {
        "uint64".to_string()
    }

    fn parse(&self, raw: &str) -> Result<u64, ParseError> {
        parse_uint(raw, self.base, self.bit_size)
    }

    fn params(&self) -> Params {
        int_params(self.base, self.bit_size)
    }

    fn render(&self, value: &u64) -> serde_json::Value {
        (*value).into()
    }

    fn base_mut(&mut self) -> Option<&mut dyn SetBase> {
        Some(self)
    }

    fn bit_size_mut(&mut self) -> Option<&mut dyn SetBitSize> {
        Some(self)
    }
}

impl SetBase for IntParser {
    fn set_base(&mut self, base: u32) {
        self.base = base;
    }
}

impl SetBitSize for IntParser {
    fn set_bit_size(&mut self, bit_size: u32) {
        self.bit_size = bit_size;
    }
}

impl SetBase for UintParser {
    fn set_base(&mut self, base: u32) {
        self.base = base;
    }
}

impl SetBitSize for UintParser {
    fn set_bit_size(&mut self, bit_size: u32) {
        self.bit_size = bit_size;
    }
}

fn int_params(base: u32, bit_size: u32) -> Params {
    let mut params = Params::new();
    insert_nonzero(&mut params, "base", base);
    insert_nonzero(&mut params, "bit_size", bit_size);
    params
}

fn effective_bits(bit_size: u32) -> Result<u32, ParseError> {
    match bit_size {
        0 => Ok(64),
        1..=64 => Ok(bit_size),
        other => Err(ParseError::UnsupportedBitSize(other)),
    }
}

/// Strip a radix prefix when `base` is 0.
fn radix_digits(raw: &str, base: u32) -> Result<(&str, u32), ParseError> {
    match base {
        0 => {
            let prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
                .into_iter()
                .find_map(|(prefix, radix)| raw.strip_prefix(prefix).map(|rest| (rest, radix)));
            Ok(match prefixed {
                Some(found) => found,
                None if raw.len() > 1 && raw.starts_with('0') => (&raw[1..], 8),
                None => (raw, 10),
            })
        }
        2..=36 => Ok((raw, base)),
        other => Err(ParseError::UnsupportedBase(other)),
    }
}

fn magnitude(raw: &str, digits: &str, radix: u32) -> Result<u64, ParseError> {
    // from_str_radix takes its own `+`, which would allow a second sign
    if digits.starts_with(['+', '-']) {
        return Err(ParseError::MisplacedSign(raw.to_string()));
    }
    u64::from_str_radix(digits, radix).map_err(|source| ParseError::Int {
        raw: raw.to_string(),
        source,
    })
}

pub(crate) fn parse_int(raw: &str, base: u32, bit_size: u32) -> Result<i64, ParseError> {
    let bits = effective_bits(bit_size)?;
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let (digits, radix) = radix_digits(unsigned, base)?;
    let value = magnitude(raw, digits, radix)?;

    let limit = 1u64 << (bits - 1);
    let out_of_range = if negative {
        value > limit
    } else {
        value >= limit
    };
    if out_of_range {
        return Err(ParseError::OutOfRange {
            raw: raw.to_string(),
            bits,
        });
    }

    Ok(if negative {
        0u64.wrapping_sub(value) as i64
    } else {
        value as i64
    })
}

pub(crate) fn parse_uint(raw: &str, base: u32, bit_size: u32) -> Result<u64, ParseError> {
    let bits = effective_bits(bit_size)?;
    let (digits, radix) = radix_digits(raw, base)?;
    let value = magnitude(raw, digits, radix)?;
    if bits < 64 && value >> bits != 0 {
        return Err(ParseError::OutOfRange {
            raw: raw.to_string(),
            bits,
        });
    }
    Ok(value)
}
