//! Error types for declarations, options and variable evaluation

use std::fmt;

/// Errors reported for a single declared variable.
///
/// Grammar and option errors are raised while a declaration is being turned
/// into a [`Spec`](crate::Spec) and abort that accessor call regardless of the
/// evaluation engine. `Missing` and `Parse` are only ever produced by real
/// evaluation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The declaration string is empty or whitespace only.
    #[error("declaration must contain a name")]
    MissingName,

    /// A quoted field value has no closing quote.
    #[error("{name}: unterminated quoted value for `{key}`")]
    UnterminatedQuote {
        /// Variable name
        name: String,
        /// Key whose value was left open
        key: String,
    },

    /// A field or programmatic option could not be applied.
    #[error("{name}: {source}")]
    Option {
        /// Variable name
        name: String,
        /// What was wrong with the option
        source: OptionError,
    },

    /// A string default did not parse with the fully configured parser.
    #[error("{name}: invalid default {raw:?}: {source}")]
    InvalidDefault {
        /// Variable name
        name: String,
        /// The raw default text
        raw: String,
        /// Parser failure
        source: ParseError,
    },

    /// Required variable is not set and has no default.
    #[error("{name}: variable is required")]
    Missing {
        /// Variable name
        name: String,
    },

    /// The variable is set but its value does not parse.
    #[error("{name}: {source}")]
    Parse {
        /// Variable name
        name: String,
        /// Parser failure
        source: ParseError,
    },
}

impl Error {
    /// Whether the error was raised while building the spec rather than while
    /// evaluating it.
    pub fn is_construction(&self) -> bool {
        !matches!(self, Self::Missing { .. } | Self::Parse { .. })
    }

    /// Name of the variable the error belongs to, if it got that far.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::MissingName => None,
            Self::UnterminatedQuote { name, .. }
            | Self::Option { name, .. }
            | Self::InvalidDefault { name, .. }
            | Self::Missing { name }
            | Self::Parse { name, .. } => Some(name),
        }
    }

    pub(crate) fn option(name: impl Into<String>, source: OptionError) -> Self {
        Self::Option {
            name: name.into(),
            source,
        }
    }

    pub(crate) fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }

    pub(crate) fn parse(name: impl Into<String>, source: ParseError) -> Self {
        Self::Parse {
            name: name.into(),
            source,
        }
    }
}

/// Problems with a declaration field or a programmatic option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("unknown option `{0}`")]
    Unknown(String),

    #[error("optional does not take a value")]
    OptionalTakesNoValue,

    #[error("invalid base: {0}")]
    InvalidBase(std::num::ParseIntError),

    #[error("invalid bit size: {0}")]
    InvalidBitSize(std::num::ParseIntError),

    #[error("comma must be only one character")]
    InvalidComma,

    #[error("comma cannot be {0:?}")]
    ReservedComma(char),

    #[error("padding must be only one character")]
    InvalidPadding,

    #[error("{key} must be true or false, got {value:?}")]
    InvalidSwitch { key: &'static str, value: String },

    /// The attached parser lacks the capability the option targets.
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

/// Failures turning raw text into a typed value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid boolean {0:?}")]
    Bool(String),

    #[error("invalid integer {raw:?}: {source}")]
    Int {
        raw: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid integer {0:?}: misplaced sign")]
    MisplacedSign(String),

    #[error("{raw:?} is out of range for {bits}-bit integers")]
    OutOfRange { raw: String, bits: u32 },

    #[error("unsupported base {0}")]
    UnsupportedBase(u32),

    #[error("unsupported bit size {0}")]
    UnsupportedBitSize(u32),

    #[error("invalid float {raw:?}: {source}")]
    Float {
        raw: String,
        source: std::num::ParseFloatError,
    },

    #[error("invalid duration {raw:?}: {reason}")]
    Duration { raw: String, reason: &'static str },

    #[error("invalid base64 {raw:?}: {source}")]
    Bytes {
        raw: String,
        source: base64::DecodeError,
    },

    #[error("invalid padding character {0:?}")]
    InvalidPadding(char),

    #[error("invalid IP {raw:?}: {source}")]
    Ip {
        raw: String,
        source: std::net::AddrParseError,
    },

    #[error("invalid time {raw:?}: {source}")]
    Time {
        raw: String,
        source: chrono::ParseError,
    },

    #[error("at most one line is supported")]
    MultiLine,

    #[error("unterminated quoted element")]
    UnterminatedQuote,

    #[error("unexpected text after closing quote")]
    TextAfterQuote,

    /// A slice element failed; `index` is zero-based.
    #[error("index {index}: {source}")]
    Element {
        index: usize,
        source: Box<ParseError>,
    },
}

/// Every error collected during one configuration session.
///
/// Displays one error per line, so a single error renders exactly as the
/// underlying [`Error`].
#[derive(Debug, Clone)]
pub struct Errors(Vec<Error>);

impl Errors {
    pub(crate) fn new(errors: Vec<Error>) -> Self {
        Self(errors)
    }

    /// The collected errors in the order they were reported.
    pub fn as_slice(&self) -> &[Error] {
        &self.0
    }

    /// Consume into the collected errors.
    pub fn into_vec(self) -> Vec<Error> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0
            .first()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl IntoIterator for Errors {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
