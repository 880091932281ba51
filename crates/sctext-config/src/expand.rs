//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use std::convert::Infallible;

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    // Fast path: no expansion needed
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded = shellexpand::env_with_context(value, |var| -> Result<Option<String>, Infallible> {
        Ok(std::env::var(var).ok())
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} could not be read", e.var_name),
    })?;

    // Unset variables without a default are left in place.
    if let Some(name) = unexpanded_var(&expanded) {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{name}}} not set"),
        });
    }

    Ok(expanded)
}

/// Name of the first `${VAR}` reference left in `value`.
fn unexpanded_var(value: &str) -> Option<&str> {
    let start = value.find("${")? + 2;
    let rest = &value[start..];
    let end = rest.find('}')?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SCTEXT_TEST_SIMPLE", "/srv/pages");
        }
        let result = expand_env("${SCTEXT_TEST_SIMPLE}", "store.root").unwrap();
        assert_eq!(result, "/srv/pages");
        unsafe {
            std::env::remove_var("SCTEXT_TEST_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SCTEXT_TEST_UNSET_DEFAULT");
        }
        let result = expand_env("${SCTEXT_TEST_UNSET_DEFAULT:-pages}", "store.root").unwrap();
        assert_eq!(result, "pages");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SCTEXT_TEST_MISSING");
        }
        let err = expand_env("${SCTEXT_TEST_MISSING}/pages", "store.root").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("SCTEXT_TEST_MISSING"));
        assert!(err.to_string().contains("store.root"));
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SCTEXT_TEST_HOME", "/home/site");
        }
        let result = expand_env("${SCTEXT_TEST_HOME}/content", "store.root").unwrap();
        assert_eq!(result, "/home/site/content");
        unsafe {
            std::env::remove_var("SCTEXT_TEST_HOME");
        }
    }

    #[test]
    fn test_expand_literal_unchanged() {
        assert_eq!(expand_env("pages", "store.root").unwrap(), "pages");
        assert_eq!(expand_env("$VAR", "store.root").unwrap(), "$VAR");
    }
}
