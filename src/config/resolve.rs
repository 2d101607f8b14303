//! Schema resolution against an environment snapshot.
//!
//! Every field is attempted. Failures are collected instead of stopping at the
//! first one, so a single error lists everything that needs fixing.

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use super::builder::ResolveOptions;
use super::env::Environment;
use super::schema::{Entry, Schema};
use super::{ConfigError, FieldErrors};

/// A resolved configuration.
///
/// Mirrors the schema it came from: descriptors become values, nested schemas
/// become sub-tables and literals are copied. Fields that resolved to nothing
/// (unset optionals, or failures under `ignore_errors`) are absent.
///
/// There is no way to modify a `Resolved` once it has been returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    table: Table,
}

impl Resolved {
    /// Looks up a value by dotted path, e.g. `"database.port"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.table.get(parts.next()?)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    /// Returns a number field as an integer if it has no fractional part.
    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path)?.as_integer()
    }

    /// Returns a number field as a float, whichever way it is stored.
    pub fn get_f64(&self, path: &str) -> Option<f64> {
        match self.get(path)? {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn as_table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    /// Converts into a typed configuration struct.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, ConfigError> {
        Value::Table(self.table)
            .try_into()
            .map_err(ConfigError::Deserialize)
    }
}

/// Resolves every entry of `schema` against `env`.
///
/// On failure the aggregate message is sent to the options' sink (unless
/// logging is disabled): at error level when an error is returned, at info
/// level when `ignore_errors` turns it into a partial result.
pub fn resolve_schema(
    schema: &Schema,
    env: &Environment,
    options: &ResolveOptions,
) -> Result<Resolved, ConfigError> {
    let mut errors = FieldErrors::new();
    let table = resolve_entries(schema, env, options, &mut errors);

    if errors.is_empty() {
        return Ok(Resolved { table });
    }

    let message = errors.to_string();
    if options.is_ignoring_errors() {
        if options.is_logging_errors() {
            options.diagnostics().info(&message);
        }
        Ok(Resolved { table })
    } else {
        if options.is_logging_errors() {
            options.diagnostics().error(&message);
        }
        Err(ConfigError::Unresolved(errors))
    }
}

/// Walks one schema level, recursing into nested schemas. Errors from every
/// level land in `errors` in encounter order.
fn resolve_entries(
    schema: &Schema,
    env: &Environment,
    options: &ResolveOptions,
    errors: &mut FieldErrors,
) -> Table {
    let mut table = Table::new();

    for (name, entry) in schema.iter() {
        match entry {
            Entry::Descriptor(descriptor) => match descriptor.resolve(name, env, options) {
                Ok(Some(value)) => {
                    table.insert(name.to_string(), value);
                }
                Ok(None) => {}
                Err(e) => errors.push(e),
            },
            Entry::Nested(nested) => {
                let sub = resolve_entries(nested, env, options, errors);
                table.insert(name.to_string(), Value::Table(sub));
            }
            Entry::Literal(value) => {
                table.insert(name.to_string(), value.clone());
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::sink::DiagnosticSink;
    use crate::{boolean, number, string};

    #[derive(Debug, Default)]
    struct RecordingSink {
        lines: Mutex<Vec<(&'static str, String)>>,
    }

    impl RecordingSink {
        fn lines(&self) -> Vec<(&'static str, String)> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl DiagnosticSink for RecordingSink {
        fn info(&self, message: &str) {
            self.lines.lock().unwrap().push(("info", message.to_string()));
        }

        fn warn(&self, message: &str) {
            self.lines.lock().unwrap().push(("warn", message.to_string()));
        }

        fn error(&self, message: &str) {
            self.lines.lock().unwrap().push(("error", message.to_string()));
        }
    }

    fn recording() -> (Arc<RecordingSink>, ResolveOptions) {
        let sink = Arc::new(RecordingSink::default());
        let options = ResolveOptions::new().shared_sink(sink.clone());
        (sink, options)
    }

    #[test]
    fn test_all_fields_resolve() {
        let schema = Schema::new()
            .field("host", string())
            .field("port", number())
            .field("verbose", boolean());
        let env = Environment::from([("HOST", "example.com"), ("PORT", "8080"), ("VERBOSE", "true")]);

        let config = resolve_schema(&schema, &env, &ResolveOptions::new()).unwrap();
        assert_eq!(config.get_str("host"), Some("example.com"));
        assert_eq!(config.get_i64("port"), Some(8080));
        assert_eq!(config.get_f64("port"), Some(8080.0));
        assert_eq!(config.get_bool("verbose"), Some(true));
    }

    #[test]
    fn test_missing_fields_are_aggregated_in_order() {
        let schema = Schema::new()
            .field("first", string())
            .field("second", number())
            .field("third", string());
        let (sink, options) = recording();

        let err = resolve_schema(&schema, &Environment::new(), &options).unwrap_err();
        let message = "FIRST is not set, SECOND is not set, THIRD is not set";
        assert_eq!(err.to_string(), message);
        assert_eq!(sink.lines(), vec![("error", message.to_string())]);
    }

    #[test]
    fn test_mixed_failures() {
        let schema = Schema::new()
            .field("port", number().env("PORT"))
            .field("name", string().env("NAME"));
        let env = Environment::from([("PORT", "abc")]);

        let err = resolve_schema(&schema, &env, &ResolveOptions::new().do_not_log_errors(true))
            .unwrap_err();
        assert_eq!(err.to_string(), "PORT is not a number, NAME is not set");
        assert_eq!(err.field_errors().map(FieldErrors::len), Some(2));
    }

    #[test]
    fn test_do_not_log_errors_silences_sink() {
        let schema = Schema::new().field("port", number());
        let (sink, options) = recording();

        let result = resolve_schema(&schema, &Environment::new(), &options.do_not_log_errors(true));
        assert!(result.is_err());
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_ignore_errors_returns_partial_result() {
        let schema = Schema::new()
            .field("host", string().default("localhost"))
            .field("port", number());
        let (sink, options) = recording();

        let config = resolve_schema(&schema, &Environment::new(), &options.ignore_errors(true)).unwrap();
        assert_eq!(config.get_str("host"), Some("localhost"));
        assert!(!config.contains("port"));
        assert_eq!(sink.lines(), vec![("info", "PORT is not set".to_string())]);
    }

    #[test]
    fn test_ignore_errors_quietly() {
        let schema = Schema::new().field("port", number());
        let (sink, options) = recording();

        let options = options.ignore_errors(true).do_not_log_errors(true);
        let config = resolve_schema(&schema, &Environment::new(), &options).unwrap();
        assert!(!config.contains("port"));
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_success_emits_nothing() {
        let schema = Schema::new().field("port", number().default(1));
        let (sink, options) = recording();

        resolve_schema(&schema, &Environment::new(), &options).unwrap();
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_nested_schema_resolves_under_parent_key() {
        let kafka = Schema::new()
            .field("brokers", string().env("KAFKA_BROKERS"))
            .field("timeoutMs", number().default(500));
        let schema = Schema::new()
            .field("databaseUrl", string())
            .nested("kafka", kafka);
        let env = Environment::from([
            ("DATABASE_URL", "postgres://postgres@postgres/postgres"),
            ("KAFKA_BROKERS", "kafka:29092"),
        ]);

        let config = resolve_schema(&schema, &env, &ResolveOptions::new()).unwrap();
        assert_eq!(config.get_str("kafka.brokers"), Some("kafka:29092"));
        assert_eq!(config.get_i64("kafka.timeoutMs"), Some(500));
        assert!(config.get("kafka").unwrap().is_table());
    }

    #[test]
    fn test_nested_errors_merge_depth_first() {
        let schema = Schema::new()
            .field("a", string())
            .nested(
                "inner",
                Schema::new()
                    .field("b", string())
                    .nested("deeper", Schema::new().field("c", string())),
            )
            .field("d", string());

        let err = resolve_schema(&schema, &Environment::new(), &ResolveOptions::new().do_not_log_errors(true))
            .unwrap_err();
        assert_eq!(err.to_string(), "A is not set, B is not set, C is not set, D is not set");
    }

    #[test]
    fn test_literals_pass_through() {
        let schema = Schema::new()
            .literal("service", "billing")
            .literal("replicas", 3)
            .field("port", number().default(80));

        let config = resolve_schema(&schema, &Environment::new(), &ResolveOptions::new()).unwrap();
        assert_eq!(config.get_str("service"), Some("billing"));
        assert_eq!(config.get_i64("replicas"), Some(3));
    }

    #[test]
    fn test_optional_and_suppressed_fields_are_absent() {
        let schema = Schema::new()
            .field("sentryDsn", string().optional())
            .field("apiKey", string().suppress_in(["test"]));
        let options = ResolveOptions::new().active_context("test");

        let config = resolve_schema(&schema, &Environment::new(), &options).unwrap();
        assert!(config.as_table().is_empty());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let schema = Schema::new()
            .field("port", number())
            .nested("db", Schema::new().field("url", string().env("DB_URL")));
        let env = Environment::from([("PORT", "1.5"), ("DB_URL", "sqlite::memory:")]);
        let options = ResolveOptions::new();

        let first = resolve_schema(&schema, &env, &options).unwrap();
        let second = resolve_schema(&schema, &env, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_get_with_bad_paths() {
        let schema = Schema::new().field("port", number().default(1));
        let config = resolve_schema(&schema, &Environment::new(), &ResolveOptions::new()).unwrap();

        assert_eq!(config.get("missing"), None);
        assert_eq!(config.get("port.nested"), None);
        assert_eq!(config.get_str("port"), None);
    }
}
