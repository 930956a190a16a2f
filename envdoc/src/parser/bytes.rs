use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{DecodeError, Engine};

use super::{Params, Parser, SetEncoding};
use crate::error::ParseError;

/// Base64-encoded bytes, `[]byte` in descriptions.
///
/// The standard alphabet with `=` padding unless configured otherwise.
/// `padding` swaps the padding character, `no_padding` drops padding and wins
/// over `padding`, and `url_safe` selects the URL and filename safe alphabet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BytesParser {
    padding: Option<char>,
    no_padding: bool,
    url_safe: bool,
}

impl BytesParser {
    fn engine(&self) -> GeneralPurpose {
        let alphabet = if self.url_safe {
            &alphabet::URL_SAFE
        } else {
            &alphabet::STANDARD
        };
        let mode = if self.no_padding {
            DecodePaddingMode::RequireNone
        } else {
            DecodePaddingMode::RequireCanonical
        };
        let config = GeneralPurposeConfig::new()
            .with_encode_padding(!self.no_padding)
            .with_decode_padding_mode(mode)
            .with_decode_allow_trailing_bits(true);
        GeneralPurpose::new(alphabet, config)
    }

    /// A padding character other than `=`, if one is in effect.
    fn custom_padding(&self) -> Result<Option<char>, ParseError> {
        match self.padding {
            _ if self.no_padding => Ok(None),
            None | Some('=') => Ok(None),
            Some(pad) if is_valid_padding(pad) => Ok(Some(pad)),
            Some(pad) => Err(ParseError::InvalidPadding(pad)),
        }
    }
}

/// Printable ASCII outside both alphabets.
fn is_valid_padding(pad: char) -> bool {
    (pad.is_ascii_graphic() || pad == ' ')
        && !pad.is_ascii_alphanumeric()
        && !matches!(pad, '+' | '/' | '-' | '_')
}

impl Parser for BytesParser {
    type Output = Vec<u8>;

    fn type_name(&self) -> String {
        "[]byte".to_string()
    }

    fn parse(&self, raw: &str) -> Result<Vec<u8>, ParseError> {
        let invalid = |source| ParseError::Bytes {
            raw: raw.to_string(),
            source,
        };
        let Some(pad) = self.custom_padding()? else {
            return self.engine().decode(raw).map_err(invalid);
        };

        if let Some(index) = raw.find('=') {
            return Err(invalid(DecodeError::InvalidByte(index, b'=')));
        }
        let body = raw.trim_end_matches(pad);
        let padded = format!("{body}{}", "=".repeat(raw.len() - body.len()));
        self.engine().decode(padded).map_err(invalid)
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        if let Some(padding) = self.padding {
            params.insert("padding".to_string(), padding.to_string().into());
        }
        if self.no_padding {
            params.insert("no_padding".to_string(), true.into());
        }
        if self.url_safe {
            params.insert("url_safe".to_string(), true.into());
        }
        params
    }

    /// Encoded the same way values are decoded.
    fn render(&self, value: &Vec<u8>) -> serde_json::Value {
        let encoded = self.engine().encode(value);
        match self.custom_padding() {
            Ok(Some(pad)) => {
                let body = encoded.trim_end_matches('=');
                let padding = pad.to_string().repeat(encoded.len() - body.len());
                format!("{body}{padding}").into()
            }
            _ => encoded.into(),
        }
    }

    fn encoding_mut(&mut self) -> Option<&mut dyn SetEncoding> {
        Some(self)
    }
}

impl SetEncoding for BytesParser {
    fn set_padding(&mut self, padding: char) {
        self.padding = Some(padding);
    }

    fn set_no_padding(&mut self, no_padding: bool) {
        self.no_padding = no_padding;
    }

    fn set_url_safe(&mut self, url_safe: bool) {
        self.url_safe = url_safe;
    }
}
