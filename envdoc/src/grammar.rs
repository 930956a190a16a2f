//! Tokenizer for declaration strings.
//!
//! A declaration has the form `NAME [field ...] [(--- | "|") comment]` where
//! each field is `key` or `key=value`. Values may be double-quoted, in which
//! case they can span whitespace and newlines and use `\"` and `\\` escapes.
//! A `"` never closed is an ordinary one-character value when it ends the
//! token, and an error otherwise.
//!
//! A token starting with `=` has no key. Scanning stops there and the rest of
//! the input, `=` included, becomes the comment.
//!
//! Scanning also stops when a token equals the variable's own name. The name
//! is kept as the first word of the comment, so `PORT PORT sets the port`
//! yields the comment `PORT sets the port`. This is easy to trip over when a
//! comment happens to start with the name without a delimiter.

use crate::error::Error;

/// A declaration split into its parts, before any option is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub fields: Vec<Field>,
    pub comment: String,
}

/// One `key` or `key=value` token. Bare keys carry an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: String,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A bare key such as `optional`.
    pub fn flag(key: impl Into<String>) -> Self {
        Self::new(key, "")
    }
}

/// Split a declaration string into name, fields and comment.
///
/// # Errors
///
/// - [`Error::MissingName`] if the input is empty or whitespace only
/// - [`Error::UnterminatedQuote`] if a quoted value is never closed
pub fn parse(decl: &str) -> Result<Declaration, Error> {
    let rest = decl.trim_start();
    let name_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    if name_len == 0 {
        return Err(Error::MissingName);
    }
    let name = &rest[..name_len];
    let mut rest = &rest[name_len..];
    let mut fields = Vec::new();

    loop {
        let token = rest.trim_start();
        let key_len = token
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(token.len());
        if key_len == 0 {
            // end of input, or a stray `=` that cannot start a field
            rest = token;
            break;
        }

        let key = &token[..key_len];
        if key == "---" || key == "|" {
            rest = &token[key_len..];
            break;
        }
        if key == name {
            rest = token;
            break;
        }

        let after_key = &token[key_len..];
        let (value, remainder) = match after_key.strip_prefix('=') {
            Some(raw) => scan_value(raw).ok_or_else(|| Error::UnterminatedQuote {
                name: name.to_string(),
                key: key.to_string(),
            })?,
            None => (String::new(), after_key),
        };

        fields.push(Field::new(key, value));
        rest = remainder;
    }

    Ok(Declaration {
        name: name.to_string(),
        fields,
        comment: rest.trim().to_string(),
    })
}

/// Scan a value starting right after `=`; returns the value and the rest of
/// the input, or `None` for an unterminated quote.
fn scan_value(raw: &str) -> Option<(String, &str)> {
    let Some(quoted) = raw.strip_prefix('"') else {
        let len = raw.find(char::is_whitespace).unwrap_or(raw.len());
        return Some((raw[..len].to_string(), &raw[len..]));
    };

    let mut value = String::new();
    let mut chars = quoted.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, &quoted[i + 1..])),
            '\\' => match quoted[i + 1..].chars().next() {
                Some(next @ ('"' | '\\')) => {
                    value.push(next);
                    chars.next();
                }
                _ => value.push('\\'),
            },
            _ => value.push(c),
        }
    }

    // unclosed: only a lone `"` is a value
    if quoted.is_empty() || quoted.starts_with(char::is_whitespace) {
        return Some(("\"".to_string(), quoted));
    }
    None
}
