//! Option descriptors: how a single configuration value is obtained.
//!
//! A descriptor is built once, at schema-definition time, with [`string`],
//! [`number`] or [`boolean`] and then reused for any number of resolutions.
//!
//! ```
//! use envresolve::{number, string, Environment, ResolveOptions, Schema};
//!
//! let schema = Schema::new()
//!     .field("port", number().env("PORT").default(8080))
//!     .field("logLevel", string().default("info"));
//!
//! let env = Environment::from([("PORT", "3000")]);
//! let config = ResolveOptions::new().resolve(&schema, &env)?;
//!
//! assert_eq!(config.get_i64("port"), Some(3000));
//! assert_eq!(config.get_str("logLevel"), Some("info"));
//! # Ok::<(), envresolve::ConfigError>(())
//! ```

use std::marker::PhantomData;

use toml::Value;

use super::builder::ResolveOptions;
use super::env::Environment;
use super::naming::derive_env_key;
use super::FieldError;

/// The scalar type a descriptor produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Boolean,
}

/// Type-level marker tying a descriptor builder to its value type.
pub trait Kind {
    /// The Rust type accepted as a default for this kind.
    type Native;

    const KIND: ValueKind;

    /// Parses a raw environment value. The error is the reason appended to
    /// the key in the field error, e.g. `"is not a number"`.
    fn parse(raw: &str) -> Result<Value, String>;

    fn to_value(native: Self::Native) -> Value;
}

#[derive(Debug, Clone, Copy)]
pub enum Text {}

#[derive(Debug, Clone, Copy)]
pub enum Number {}

#[derive(Debug, Clone, Copy)]
pub enum Flag {}

impl Kind for Text {
    type Native = String;
    const KIND: ValueKind = ValueKind::String;

    fn parse(raw: &str) -> Result<Value, String> {
        Ok(Value::String(raw.to_string()))
    }

    fn to_value(native: String) -> Value {
        Value::String(native)
    }
}

impl Kind for Number {
    type Native = f64;
    const KIND: ValueKind = ValueKind::Number;

    /// Words such as `inf` or `NaN` are rejected: a number needs a digit.
    fn parse(raw: &str) -> Result<Value, String> {
        let raw = raw.trim();
        if !raw.bytes().any(|b| b.is_ascii_digit()) {
            return Err("is not a number".to_string());
        }
        match raw.parse::<f64>() {
            Ok(n) if !n.is_nan() => Ok(Self::to_value(n)),
            _ => Err("is not a number".to_string()),
        }
    }

    /// Whole numbers are stored as integers so they deserialize into both
    /// integer and float fields.
    fn to_value(n: f64) -> Value {
        const I64_BOUND: f64 = 9_223_372_036_854_775_808.0; // 2^63
        if n.is_finite() && n.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&n) {
            Value::Integer(n as i64)
        } else {
            Value::Float(n)
        }
    }
}

impl Kind for Flag {
    type Native = bool;
    const KIND: ValueKind = ValueKind::Boolean;

    /// Only the exact literal `true` is true. Never fails.
    fn parse(raw: &str) -> Result<Value, String> {
        Ok(Value::Boolean(raw == "true"))
    }

    fn to_value(native: bool) -> Value {
        Value::Boolean(native)
    }
}

/// A resolution rule for one configuration field, independent of its value
/// type. Immutable once built; holds no reference to any environment.
#[derive(Debug, Clone)]
pub struct OptionDescriptor {
    key: Option<String>,
    kind: ValueKind,
    default: Option<Value>,
    optional: bool,
    suppressed_in: Vec<String>,
}

impl OptionDescriptor {
    fn new<K: Kind>() -> Self {
        Self {
            key: None,
            kind: K::KIND,
            default: None,
            optional: false,
            suppressed_in: Vec::new(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    fn parse(&self, raw: &str) -> Result<Value, String> {
        match self.kind {
            ValueKind::String => Text::parse(raw),
            ValueKind::Number => Number::parse(raw),
            ValueKind::Boolean => Flag::parse(raw),
        }
    }

    /// The environment variable consulted for `field_name`: the explicit key
    /// if one was configured, otherwise one derived from the field name.
    pub fn lookup_key(&self, field_name: &str) -> String {
        match &self.key {
            Some(key) => key.clone(),
            None => derive_env_key(field_name),
        }
    }

    /// Resolves this field against `env`.
    ///
    /// Returns `Ok(None)` when the variable is unset and that is acceptable:
    /// the field is optional, or its absence is suppressed in the active
    /// context. A configured default always wins over both.
    pub fn resolve(
        &self,
        field_name: &str,
        env: &Environment,
        options: &ResolveOptions,
    ) -> Result<Option<Value>, FieldError> {
        let key = self.lookup_key(field_name);

        if let Some(raw) = env.value(&key) {
            return match self.parse(raw) {
                Ok(value) => {
                    tracing::trace!(field = field_name, key = %key, "resolved from environment");
                    Ok(Some(value))
                }
                Err(reason) => Err(FieldError::Invalid { key, reason }),
            };
        }

        if let Some(default) = &self.default {
            tracing::trace!(field = field_name, key = %key, "using default value");
            return Ok(Some(default.clone()));
        }

        if self.optional {
            tracing::trace!(field = field_name, key = %key, "optional and unset");
            return Ok(None);
        }

        if let Some(context) = options.context() {
            if self.suppressed_in.iter().any(|c| c == context) {
                tracing::trace!(field = field_name, key = %key, context, "unset value suppressed");
                return Ok(None);
            }
        }

        Err(FieldError::NotSet { key })
    }
}

/// Typed builder for an [`OptionDescriptor`].
///
/// The type parameter only constrains what [`default`](Self::default)
/// accepts; it converts into a schema entry with `Into`.
#[derive(Debug, Clone)]
#[must_use]
pub struct Descriptor<K> {
    inner: OptionDescriptor,
    kind: PhantomData<K>,
}

/// A string field. The raw value is used unchanged.
pub fn string() -> Descriptor<Text> {
    Descriptor::new()
}

/// A numeric field. Accepts anything that parses as a floating-point number.
pub fn number() -> Descriptor<Number> {
    Descriptor::new()
}

/// A boolean field. Only the literal `true` is true.
pub fn boolean() -> Descriptor<Flag> {
    Descriptor::new()
}

impl<K: Kind> Descriptor<K> {
    fn new() -> Self {
        Self {
            inner: OptionDescriptor::new::<K>(),
            kind: PhantomData,
        }
    }

    /// Reads the value from `key` instead of deriving it from the field name.
    pub fn env(mut self, key: impl Into<String>) -> Self {
        self.inner.key = Some(key.into());
        self
    }

    /// Value used when the variable is unset.
    pub fn default(mut self, value: impl Into<K::Native>) -> Self {
        self.inner.default = Some(K::to_value(value.into()));
        self
    }

    /// Allows the variable to be unset; the field is then left out.
    pub fn optional(mut self) -> Self {
        self.inner.optional = true;
        self
    }

    /// Tolerates the variable being unset when resolving under any of the
    /// given contexts (for example `"test"` or `"development"`).
    pub fn suppress_in<I, S>(mut self, contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.suppressed_in.extend(contexts.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> OptionDescriptor {
        self.inner
    }
}

impl<K: Kind> From<Descriptor<K>> for OptionDescriptor {
    fn from(descriptor: Descriptor<K>) -> Self {
        descriptor.inner
    }
}
