//! Field-name to environment-variable-name conversion.

/// Derives the environment variable name for a schema field.
///
/// Names that already contain an underscore, or that have no lowercase
/// letters, are assumed to be in the target convention and returned as-is.
/// Everything else is treated as camelCase and converted to
/// SCREAMING_SNAKE_CASE: `databaseUrl` becomes `DATABASE_URL`.
///
/// An `_` goes before every uppercase letter except the first character, so
/// a leading capital gets no separator: `LogLevel` becomes `LOG_LEVEL`.
pub fn derive_env_key(field_name: &str) -> String {
    if field_name.contains('_') || !field_name.chars().any(char::is_lowercase) {
        return field_name.to_string();
    }

    let mut result = String::with_capacity(field_name.len() + 4);
    for (i, ch) in field_name.chars().enumerate() {
        if ch.is_uppercase() && i > 0 {
            result.push('_');
        }
        result.extend(ch.to_uppercase());
    }
    result
}
