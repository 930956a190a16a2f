//! Evaluation engines.
//!
//! Every accessor runs the same pipeline: build a [`Spec`] from the
//! declaration and options, then hand it to the engine. [`Cfg`] looks the
//! variable up and parses it; [`Describer`] only records what it would have
//! read. Both record the identical [`Description`].

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};

use crate::error::{Error, Errors};
use crate::option::Opt;
use crate::parser::{
    BoolParser, BytesParser, DurationParser, FloatParser, FloatSliceParser, IntParser,
    IntSliceParser, IpParser, Parser, StringParser, StringSliceParser, TimeParser, UintParser,
    UintSliceParser,
};
use crate::spec::{Description, Spec};

type Lookup = Box<dyn Fn(&str) -> Option<String>>;

/// An evaluation engine.
///
/// Implementors decide what happens to a finished [`Spec`]; the provided
/// accessors take care of building it.
pub trait Configurer {
    /// Consume a finished spec. `None` means no value: the variable is
    /// absent, failed, or the engine does not evaluate at all.
    fn evaluate<P: Parser>(&mut self, spec: Spec<P>) -> Option<P::Output>;

    /// Report an error that aborted an accessor call.
    fn reject(&mut self, err: Error);

    /// Record a presence check and report whether the variable is set, or
    /// `None` if the engine does not look anything up.
    fn presence(&mut self, spec: Spec<BoolParser>) -> Option<bool>;

    /// Build the spec for `decl` and evaluate it.
    fn var<P: Parser>(&mut self, decl: &str, opts: &[Opt<P>]) -> Option<P::Output> {
        match Spec::build(decl, opts) {
            Ok(spec) => self.evaluate(spec),
            Err(err) => {
                self.reject(err);
                None
            }
        }
    }

    /// Like [`var`](Configurer::var), falling back to the zero value.
    fn value<P: Parser>(&mut self, decl: &str, opts: &[Opt<P>]) -> P::Output
    where
        P::Output: Default,
    {
        self.var(decl, opts).unwrap_or_default()
    }

    fn bool(&mut self, decl: &str, opts: &[Opt<BoolParser>]) -> bool {
        self.value(decl, opts)
    }

    fn int(&mut self, decl: &str, opts: &[Opt<IntParser>]) -> i64 {
        self.value(decl, opts)
    }

    fn uint(&mut self, decl: &str, opts: &[Opt<UintParser>]) -> u64 {
        self.value(decl, opts)
    }

    fn float(&mut self, decl: &str, opts: &[Opt<FloatParser>]) -> f64 {
        self.value(decl, opts)
    }

    fn duration(&mut self, decl: &str, opts: &[Opt<DurationParser>]) -> Duration {
        self.value(decl, opts)
    }

    fn time(&mut self, decl: &str, opts: &[Opt<TimeParser>]) -> DateTime<FixedOffset> {
        self.value(decl, opts)
    }

    fn string(&mut self, decl: &str, opts: &[Opt<StringParser>]) -> String {
        self.value(decl, opts)
    }

    /// Base64-decoded bytes.
    fn bytes(&mut self, decl: &str, opts: &[Opt<BytesParser>]) -> Vec<u8> {
        self.value(decl, opts)
    }

    /// `None` when the address is absent or invalid, since there is no zero
    /// address to fall back to.
    fn ip(&mut self, decl: &str, opts: &[Opt<IpParser>]) -> Option<IpAddr> {
        self.var(decl, opts)
    }

    fn int_slice(&mut self, decl: &str, opts: &[Opt<IntSliceParser>]) -> Vec<i64> {
        self.value(decl, opts)
    }

    fn uint_slice(&mut self, decl: &str, opts: &[Opt<UintSliceParser>]) -> Vec<u64> {
        self.value(decl, opts)
    }

    fn float_slice(&mut self, decl: &str, opts: &[Opt<FloatSliceParser>]) -> Vec<f64> {
        self.value(decl, opts)
    }

    fn string_slice(&mut self, decl: &str, opts: &[Opt<StringSliceParser>]) -> Vec<String> {
        self.value(decl, opts)
    }

    /// Whether the variable is set at all, regardless of its value.
    ///
    /// Documented as an optional `bool` defaulting to `false`.
    fn has(&mut self, decl: &str) -> bool {
        self.presence_of(decl, false).unwrap_or(false)
    }

    /// Whether the variable is unset.
    ///
    /// Documented as an optional `bool` defaulting to `true`.
    fn has_not(&mut self, decl: &str) -> bool {
        self.presence_of(decl, true).is_some_and(|present| !present)
    }

    #[doc(hidden)]
    fn presence_of(&mut self, decl: &str, default: bool) -> Option<bool> {
        match Spec::build(decl, &[Opt::optional(), Opt::default(default)]) {
            Ok(spec) => self.presence(spec),
            Err(err) => {
                self.reject(err);
                None
            }
        }
    }
}

/// What [`Cfg`] does with an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Keep going and report everything at the end.
    #[default]
    Collect,
    /// Panic on the first error.
    Panic,
}

/// Evaluates declarations against a key/value source, by default the process
/// environment.
///
/// ```rust
/// use envdoc::{Cfg, Configurer};
///
/// let mut cfg = Cfg::from_map([("PORT", "8080")]);
/// let port = cfg.uint("PORT bit_size=16 | port to listen on", &[]);
/// let host = cfg.string("HOST default=localhost", &[]);
///
/// let descriptions = cfg.finish().unwrap();
/// assert_eq!((port, host.as_str()), (8080, "localhost"));
/// assert_eq!(descriptions.len(), 2);
/// ```
pub struct Cfg {
    lookup: Lookup,
    policy: ErrorPolicy,
    descriptions: Vec<Description>,
    errors: Vec<Error>,
}

impl Cfg {
    /// Read from the process environment, collecting errors.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> CfgBuilder {
        CfgBuilder::default()
    }

    /// Read from a fixed set of variables instead of the environment.
    pub fn from_map<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::builder().vars(vars).build()
    }

    /// Descriptions recorded so far, in accessor call order.
    pub fn descriptions(&self) -> &[Description] {
        &self.descriptions
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// The combined error, if anything failed so far.
    pub fn err(&self) -> Option<Errors> {
        if self.errors.is_empty() {
            None
        } else {
            Some(Errors::new(self.errors.clone()))
        }
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Every error collected during the session.
    pub fn finish(self) -> Result<Vec<Description>, Errors> {
        let (descriptions, errors) = self.into_parts();
        if errors.is_empty() {
            Ok(descriptions)
        } else {
            Err(Errors::new(errors))
        }
    }

    /// Both session lists, whether or not anything failed.
    pub fn into_parts(self) -> (Vec<Description>, Vec<Error>) {
        (self.descriptions, self.errors)
    }
}

impl Default for Cfg {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cfg")
            .field("policy", &self.policy)
            .field("descriptions", &self.descriptions)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl Configurer for Cfg {
    fn evaluate<P: Parser>(&mut self, spec: Spec<P>) -> Option<P::Output> {
        self.descriptions.push(spec.describe());
        match spec.evaluate(&*self.lookup) {
            Ok(value) => value,
            Err(err) => {
                self.reject(err);
                None
            }
        }
    }

    fn reject(&mut self, err: Error) {
        tracing::debug!(error = %err, "configuration error");
        if self.policy == ErrorPolicy::Panic {
            panic!("{err}");
        }
        self.errors.push(err);
    }

    fn presence(&mut self, spec: Spec<BoolParser>) -> Option<bool> {
        self.descriptions.push(spec.describe());
        Some((self.lookup)(spec.name()).is_some())
    }
}

/// Builder for [`Cfg`].
pub struct CfgBuilder {
    lookup: Lookup,
    policy: ErrorPolicy,
}

impl CfgBuilder {
    /// Use `lookup` as the variable source.
    pub fn lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        self.lookup = Box::new(lookup);
        self
    }

    /// Use a fixed set of variables as the source.
    pub fn vars<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.lookup(move |name| vars.get(name).cloned())
    }

    pub fn policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Cfg {
        Cfg {
            lookup: self.lookup,
            policy: self.policy,
            descriptions: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl Default for CfgBuilder {
    fn default() -> Self {
        Self {
            lookup: Box::new(|name| std::env::var(name).ok()),
            policy: ErrorPolicy::default(),
        }
    }
}

impl fmt::Debug for CfgBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CfgBuilder")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Records descriptions without reading anything.
///
/// Every accessor returns the zero value. Only construction errors can
/// occur, since nothing is evaluated.
#[derive(Debug, Default)]
pub struct Describer {
    descriptions: Vec<Description>,
    errors: Vec<Error>,
}

impl Describer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptions(&self) -> &[Description] {
        &self.descriptions
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// # Errors
    ///
    /// Every construction error seen during the session.
    pub fn finish(self) -> Result<Vec<Description>, Errors> {
        if self.errors.is_empty() {
            Ok(self.descriptions)
        } else {
            Err(Errors::new(self.errors))
        }
    }
}

impl Configurer for Describer {
    fn evaluate<P: Parser>(&mut self, spec: Spec<P>) -> Option<P::Output> {
        self.descriptions.push(spec.describe());
        None
    }

    fn reject(&mut self, err: Error) {
        self.errors.push(err);
    }

    fn presence(&mut self, spec: Spec<BoolParser>) -> Option<bool> {
        self.descriptions.push(spec.describe());
        None
    }
}

/// A type that reads itself through any [`Configurer`].
///
/// Usually derived with `#[derive(Configurable)]`, but hand-written
/// implementations work the same way:
///
/// ```rust
/// use envdoc::{Configurable, Configurer};
///
/// struct Server {
///     port: u64,
///     debug: bool,
/// }
///
/// impl Configurable for Server {
///     fn configure<C: Configurer>(c: &mut C) -> Self {
///         Self {
///             port: c.uint("PORT default=8080 | port to listen on", &[]),
///             debug: c.has("DEBUG | enable debug output"),
///         }
///     }
/// }
///
/// let descriptions = envdoc::describe::<Server>().unwrap();
/// assert_eq!(descriptions[0].name, "PORT");
/// assert_eq!(descriptions[1].type_name, "bool");
/// ```
pub trait Configurable: Sized {
    fn configure<C: Configurer>(c: &mut C) -> Self;
}

/// Descriptions of every variable `T` reads, without reading any.
///
/// # Errors
///
/// Construction errors in `T`'s declarations.
pub fn describe<T: Configurable>() -> Result<Vec<Description>, Errors> {
    let mut describer = Describer::new();
    T::configure(&mut describer);
    describer.finish()
}

/// Load `T` from the process environment.
///
/// # Errors
///
/// Every error collected while reading `T`.
pub fn load<T: Configurable>() -> Result<T, Errors> {
    load_from(Cfg::new())
}

/// Load `T` through an existing session.
///
/// # Errors
///
/// Every error collected while reading `T`, including ones recorded on `cfg`
/// before the call.
pub fn load_from<T: Configurable>(mut cfg: Cfg) -> Result<T, Errors> {
    let value = T::configure(&mut cfg);
    cfg.finish().map(|_| value)
}
