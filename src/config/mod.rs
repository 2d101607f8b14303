//! Schema-driven configuration resolution from environment variables.

mod builder;
mod descriptor;
mod env;
mod error;
mod naming;
mod resolve;
mod schema;
mod sink;

pub use builder::ResolveOptions;
pub use descriptor::{
    boolean, number, string, Descriptor, Flag, Kind, Number, OptionDescriptor, Text, ValueKind,
};
pub use env::Environment;
pub use error::{ConfigError, FieldError, FieldErrors};
pub use naming::derive_env_key;
pub use resolve::{resolve_schema, Resolved};
pub use schema::{Entry, Schema};
pub use sink::{DiagnosticSink, TracingSink};
