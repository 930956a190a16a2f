use super::{insert_nonzero, Params, Parser, SetBitSize};
use crate::error::ParseError;

/// `true` or `false`, nothing else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolParser;

impl Parser for BoolParser {
    type Output = bool;

    fn type_name(&self) -> String {
        "bool".to_string()
    }

    fn parse(&self, raw: &str) -> Result<bool, ParseError> {
        raw.parse()
            .map_err(|_| ParseError::Bool(raw.to_string()))
    }

    fn render(&self, value: &bool) -> serde_json::Value {
        (*value).into()
    }
}

/// Floating point values, `float64` in descriptions.
///
/// With `bit_size=32` the value is parsed at single precision and widened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloatParser {
    bit_size: u32,
}

impl Parser for FloatParser {
    type Output = f64;

    fn type_name(&self) -> String {
        "float64".to_string()
    }

    fn parse(&self, raw: &str) -> Result<f64, ParseError> {
        let invalid = |source| ParseError::Float {
            raw: raw.to_string(),
            source,
        };
        match self.bit_size {
            0 | 64 => raw.parse::<f64>().map_err(invalid),
            32 => raw.parse::<f32>().map(f64::from).map_err(invalid),
            other => Err(ParseError::UnsupportedBitSize(other)),
        }
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        insert_nonzero(&mut params, "bit_size", self.bit_size);
        params
    }

    /// JSON has no NaN or infinity, so those render as the text they parse
    /// from.
    fn render(&self, value: &f64) -> serde_json::Value {
        if value.is_finite() {
            (*value).into()
        } else {
            value.to_string().into()
        }
    }

    fn bit_size_mut(&mut self) -> Option<&mut dyn SetBitSize> {
        Some(self)
    }
}

impl SetBitSize for FloatParser {
    fn set_bit_size(&mut self, bit_size: u32) {
        self.bit_size = bit_size;
    }
}

/// The raw text, unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringParser;

impl Parser for StringParser {
    type Output = String;

    fn type_name(&self) -> String {
        "string".to_string()
    }

    fn parse(&self, raw: &str) -> Result<String, ParseError> {
        Ok(raw.to_string())
    }

    fn render(&self, value: &String) -> serde_json::Value {
        value.as_str().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_is_strict() {
        assert!(BoolParser.parse("true").unwrap());
        assert!(!BoolParser.parse("false").unwrap());
        assert_eq!(
            BoolParser.parse("yes").unwrap_err(),
            ParseError::Bool("yes".to_string())
        );
        assert!(BoolParser.parse("TRUE").is_err());
    }

    #[test]
    fn test_float_bit_size() {
        let mut parser = FloatParser::default();
        assert_eq!(parser.parse(".1234").unwrap(), 0.1234);

        parser.set_bit_size(32);
        assert_eq!(parser.parse(".1234").unwrap(), f64::from(0.1234f32));
        assert_eq!(parser.params().get("bit_size"), Some(&serde_json::json!(32)));

        parser.set_bit_size(16);
        assert_eq!(
            parser.parse("1").unwrap_err(),
            ParseError::UnsupportedBitSize(16)
        );
    }

    #[test]
    fn test_float_rejects_garbage() {
        assert!(FloatParser::default().parse("one").is_err());
    }

    #[test]
    fn test_float_non_finite_renders_as_text() {
        let parser = FloatParser::default();
        assert_eq!(parser.render(&parser.parse("NaN").unwrap()), serde_json::json!("NaN"));
        assert_eq!(parser.render(&parser.parse("inf").unwrap()), serde_json::json!("inf"));
        assert_eq!(parser.render(&f64::NEG_INFINITY), serde_json::json!("-inf"));
        assert_eq!(parser.render(&1.5), serde_json::json!(1.5));
    }

    #[test]
    fn test_string_identity() {
        assert_eq!(StringParser.parse(" a b ").unwrap(), " a b ");
        assert_eq!(StringParser.render(&"x".to_string()), serde_json::json!("x"));
    }
}
