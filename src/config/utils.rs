use std::env;
use std::str::FromStr;

/// Read and parse an environment variable
///
/// Returns `Ok(None)` when the variable is unset or blank, and an error naming
/// the variable when it is set but does not parse.
pub fn parse_env_var<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid {name} environment variable: {e}")),
        _ => Ok(None),
    }
}

/// Treat empty or whitespace-only strings as absent
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
