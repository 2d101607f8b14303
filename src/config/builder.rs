use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::env::Environment;
use super::resolve::{resolve_schema, Resolved};
use super::schema::Schema;
use super::sink::{DiagnosticSink, TracingSink};
use super::ConfigError;

/// Options for a single resolution call.
///
/// By default a resolution with failing fields reports the aggregate message
/// to the sink and returns [`ConfigError::Unresolved`]. Setting
/// [`ignore_errors`](Self::ignore_errors) returns the partial result instead.
///
/// ## Example
///
/// ```
/// use envresolve::{number, string, Environment, ResolveOptions, Schema};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct AppConfig {
///     port: u16,
///     database_url: String,
///     sentry_dsn: Option<String>,
/// }
///
/// let schema = Schema::new()
///     .field("port", number().default(8080))
///     .field("database_url", string().env("DATABASE_URL"))
///     .field("sentry_dsn", string().env("SENTRY_DSN").suppress_in(["test"]));
///
/// let env = Environment::from([("DATABASE_URL", "postgres://localhost/app")]);
/// let config: AppConfig = ResolveOptions::new()
///     .active_context("test")
///     .build(&schema, &env)?;
///
/// assert_eq!(config.port, 8080);
/// assert!(config.sentry_dsn.is_none());
/// # Ok::<(), envresolve::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
#[must_use = "options do nothing until .resolve() or .build() is called"]
pub struct ResolveOptions {
    ignore_errors: bool,
    do_not_log_errors: bool,
    active_context: Option<String>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            ignore_errors: false,
            do_not_log_errors: false,
            active_context: None,
            sink: Arc::new(TracingSink),
        }
    }
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a partial result instead of an error when fields fail.
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    /// Stops the aggregate error message from reaching the sink.
    pub fn do_not_log_errors(mut self, quiet: bool) -> Self {
        self.do_not_log_errors = quiet;
        self
    }

    /// Sets the context label matched against each field's suppression list.
    pub fn active_context(mut self, context: impl Into<String>) -> Self {
        self.active_context = Some(context.into());
        self
    }

    /// Takes the active context from the variable `key` in `env`, if it is
    /// set. Leaves the current context alone otherwise.
    pub fn active_context_from(mut self, env: &Environment, key: &str) -> Self {
        if let Some(context) = env.value(key) {
            self.active_context = Some(context.to_string());
        }
        self
    }

    /// Sends diagnostics to `sink` instead of [`tracing`].
    pub fn sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn shared_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn is_ignoring_errors(&self) -> bool {
        self.ignore_errors
    }

    pub fn is_logging_errors(&self) -> bool {
        !self.do_not_log_errors
    }

    pub fn context(&self) -> Option<&str> {
        self.active_context.as_deref()
    }

    pub(crate) fn diagnostics(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }

    /// Resolves `schema` against `env`.
    pub fn resolve(&self, schema: &Schema, env: &Environment) -> Result<Resolved, ConfigError> {
        resolve_schema(schema, env, self)
    }

    /// Resolves `schema` against `env` and deserializes the result into `T`.
    ///
    /// Unset optional fields deserialize as `None` into `Option` fields.
    pub fn build<T: DeserializeOwned>(
        &self,
        schema: &Schema,
        env: &Environment,
    ) -> Result<T, ConfigError> {
        self.resolve(schema, env)?.deserialize()
    }
}
