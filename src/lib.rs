//! Resolves environment variables into validated configuration, reporting
//! every missing or malformed field in one error.

pub mod config;

pub use config::{
    boolean, number, resolve_schema, string, ConfigError, DiagnosticSink, Environment,
    FieldError, FieldErrors, ResolveOptions, Resolved, Schema, TracingSink,
};
pub use toml::Value;
