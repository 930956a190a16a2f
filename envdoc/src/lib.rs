//! Environment variable configuration that documents itself
//!
//! `envdoc` reads typed values from environment variables using one-line
//! **declarations**, and produces machine-readable documentation of every
//! variable from the very same declarations.
//!
//! ```text
//! NAME [key=value | flag ...] [(--- | "|") comment]
//! ```
//!
//! The declaration carries the variable name, its options and a free-form
//! comment. The type comes from the accessor that reads it.
//!
//! # Features
//!
//! - **One source of truth**: the declaration that parses a variable also
//!   describes it
//! - **Two engines**: [`Cfg`] reads and parses, [`Describer`] only documents
//! - **Typed options**: [`Opt::base`] and friends only exist for types that
//!   support them
//! - **All errors at once**: a session collects every failure instead of
//!   stopping at the first
//! - **Declarative**: `#[derive(Configurable)]` for structs
//!
//! # Example
//!
//! ```rust
//! use envdoc::{Cfg, Configurer};
//! use std::time::Duration;
//!
//! let mut cfg = Cfg::from_map([("TIMEOUT", "1m30s"), ("COLOR", "ff8800")]);
//!
//! let timeout = cfg.duration("TIMEOUT default=30s | request timeout", &[]);
//! let color = cfg.int("COLOR base=16 bit_size=32 | RGB color", &[]);
//! let tags = cfg.string_slice("TAGS optional comma=; | extra tags", &[]);
//!
//! assert_eq!(timeout, Duration::from_secs(90));
//! assert_eq!(color, 0xff8800);
//! assert!(tags.is_empty());
//!
//! let descriptions = cfg.finish().unwrap();
//! assert_eq!(descriptions[1].params["base"], 16);
//! ```
//!
//! # Declaration fields
//!
//! | Field | Applies to | Meaning |
//! |-------|------------|---------|
//! | `optional` | all | a missing variable is not an error |
//! | `default=V` | all | value used when the variable is missing |
//! | `base=N` | integers | radix; 0 infers it from a `0x`/`0o`/`0b` prefix |
//! | `bit_size=N` | integers, floats | width the value must fit |
//! | `comma=C` | slices | element delimiter, `,` by default |
//! | `layout=L` | times | strftime layout, RFC 3339 by default |
//! | `padding=C` | bytes | base64 padding character, `=` by default |
//! | `no_padding` | bytes | base64 without padding |
//! | `url_safe` | bytes | URL and filename safe base64 alphabet |
//!
//! Keys are case-insensitive. Values containing whitespace are written in
//! double quotes, with `\"` and `\\` escapes. A `default` is parsed after
//! every other option, so `default=ff base=16` works.
//!
//! # Documentation
//!
//! Run the same code against a [`Describer`] to get the documentation
//! without reading anything:
//!
//! ```rust
//! use envdoc::{Configurer, Describer};
//!
//! let mut describer = Describer::new();
//! describer.uint("PORT bit_size=16 default=8080 | port to listen on", &[]);
//!
//! let json = serde_json::to_value(describer.descriptions()).unwrap();
//! assert_eq!(
//!     json,
//!     serde_json::json!([{
//!         "name": "PORT",
//!         "type": "uint64",
//!         "optional": false,
//!         "default": 8080,
//!         "params": {"bit_size": 16},
//!         "comment": "port to listen on"
//!     }])
//! );
//! ```
//!
//! # Derive
//!
//! ```rust
//! use envdoc::Configurable;
//! use std::time::Duration;
//!
//! #[derive(Debug, Configurable)]
//! #[env(prefix = "APP_")]
//! struct Config {
//!     /// Port to listen on
//!     #[env(default = "8080")]
//!     port: u16,
//!
//!     /// How long to wait for upstream responses
//!     #[env(default = "30s")]
//!     timeout: Duration,
//!
//!     /// Allowed hosts
//!     hosts: Option<Vec<String>>,
//! }
//!
//! let descriptions = Config::describe().unwrap();
//! assert_eq!(descriptions[0].name, "APP_PORT");
//! assert_eq!(descriptions[2].type_name, "[]string");
//! ```
//!
//! `Option<T>` fields are `None` when unset, so they cannot take a default:
//!
//! ```compile_fail
//! #[derive(envdoc::Configurable)]
//! struct Config {
//!     #[env(default = "8080")]
//!     port: Option<u16>,
//! }
//! ```

mod engine;
mod error;
pub mod grammar;
mod option;
pub mod parser;
mod spec;

pub use engine::{
    describe, load, load_from, Cfg, CfgBuilder, Configurable, Configurer, Describer,
    ErrorPolicy,
};
pub use envdoc_derive::Configurable;
pub use error::{Error, Errors, OptionError, ParseError};
pub use option::{Opt, Setting};
pub use parser::Parser;
pub use spec::{Description, Flags, Spec};

pub use chrono;

// Re-export for macro-generated code
#[doc(hidden)]
pub use anyhow;
