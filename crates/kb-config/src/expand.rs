//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Lookup checks the process environment first, then the variables
//! sourced from `.env` files (see [`load_env_dir`]).

use crate::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Variables sourced from `.env` files, keyed by name.
pub(crate) type EnvVars = HashMap<String, String>;

/// Expand environment variable references in a string.
///
/// Supports:
/// - `${VAR}` - expands to the value of VAR, errors if unset
/// - `${VAR:-default}` - expands to VAR if set, otherwise uses default
///
/// Process environment variables take precedence over `env_vars` entries,
/// matching dotenv semantics.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(
    value: &str,
    field: &str,
    env_vars: &EnvVars,
) -> Result<String, ConfigError> {
    // Fast path: no expansion needed
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => match env_vars.get(var) {
                Some(val) => Ok(Some(val.clone())),
                None => Err(LookupError {
                    var_name: var.to_owned(),
                }),
            },
        }
    })
    .map(|cow| cow.into_owned())
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

/// Load variables from `.env` and `.env.local` in the given directory.
///
/// `.env.local` entries override `.env` entries. Missing files are fine;
/// a configured env directory that does not exist is an error.
pub(crate) fn load_env_dir(dir: &Path) -> Result<EnvVars, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::Validation(format!(
            "env.dir is not a directory: {}",
            dir.display()
        )));
    }

    let mut vars = EnvVars::new();
    for name in [".env", ".env.local"] {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        let content = std::fs::read_to_string(&path)?;
        parse_env_file(&content, &mut vars);
    }
    Ok(vars)
}

/// Parse `KEY=VALUE` lines into `vars`, overriding existing entries.
///
/// Blank lines and `#` comments are skipped, as are lines without `=`.
/// An optional `export ` prefix and surrounding single or double quotes
/// on the value are stripped.
fn parse_env_file(content: &str, vars: &mut EnvVars) {
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_owned(), unquote(value.trim()).to_owned());
    }
}

/// Strip matching surrounding quotes from a value.
fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        if (bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\'')
        {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_vars() -> EnvVars {
        EnvVars::new()
    }

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("KB_TEST_VAR_SIMPLE", "hello");
        }
        let result = expand_env("${KB_TEST_VAR_SIMPLE}", "test.field", &no_vars()).unwrap();
        assert_eq!(result, "hello");
        unsafe {
            std::env::remove_var("KB_TEST_VAR_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_value() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("KB_TEST_VAR_DEFAULT", "hello");
        }
        let result = expand_env("${KB_TEST_VAR_DEFAULT:-world}", "test.field", &no_vars()).unwrap();
        assert_eq!(result, "hello");
        unsafe {
            std::env::remove_var("KB_TEST_VAR_DEFAULT");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("KB_UNSET_VAR_TEST");
        }
        let result = expand_env("${KB_UNSET_VAR_TEST:-default}", "test.field", &no_vars()).unwrap();
        assert_eq!(result, "default");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("KB_MISSING_VAR_TEST");
        }
        let result = expand_env("${KB_MISSING_VAR_TEST}", "test.field", &no_vars());
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("KB_MISSING_VAR_TEST"));
        assert!(err.to_string().contains("test.field"));
    }

    #[test]
    fn test_expand_from_env_file_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("KB_FILE_VAR_TEST");
        }
        let mut vars = EnvVars::new();
        vars.insert("KB_FILE_VAR_TEST".to_owned(), "from-file".to_owned());
        let result = expand_env("${KB_FILE_VAR_TEST}", "test.field", &vars).unwrap();
        assert_eq!(result, "from-file");
    }

    #[test]
    fn test_expand_process_env_wins_over_file() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("KB_PRECEDENCE_TEST", "from-process");
        }
        let mut vars = EnvVars::new();
        vars.insert("KB_PRECEDENCE_TEST".to_owned(), "from-file".to_owned());
        let result = expand_env("${KB_PRECEDENCE_TEST}", "test.field", &vars).unwrap();
        assert_eq!(result, "from-process");
        unsafe {
            std::env::remove_var("KB_PRECEDENCE_TEST");
        }
    }

    #[test]
    fn test_expand_literal_unchanged() {
        let result = expand_env("literal string", "test.field", &no_vars()).unwrap();
        assert_eq!(result, "literal string");
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("KB_HOST_TEST", "example.com");
        }
        let result = expand_env("https://${KB_HOST_TEST}/api", "test.url", &no_vars()).unwrap();
        assert_eq!(result, "https://example.com/api");
        unsafe {
            std::env::remove_var("KB_HOST_TEST");
        }
    }

    #[test]
    fn test_expand_multiple_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("KB_USER_TEST", "admin");
            std::env::set_var("KB_PASS_TEST", "secret");
        }
        let result = expand_env("${KB_USER_TEST}:${KB_PASS_TEST}", "test.creds", &no_vars()).unwrap();
        assert_eq!(result, "admin:secret");
        unsafe {
            std::env::remove_var("KB_USER_TEST");
            std::env::remove_var("KB_PASS_TEST");
        }
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        // $VAR without braces should not be expanded
        let result = expand_env("$VAR", "test.field", &no_vars()).unwrap();
        assert_eq!(result, "$VAR");
    }

    #[test]
    fn test_url_with_dollar_not_expanded() {
        // URLs with dollar signs should work unchanged
        let result = expand_env("https://example.com/$path", "test.url", &no_vars()).unwrap();
        assert_eq!(result, "https://example.com/$path");
    }

    #[test]
    fn test_parse_env_file_basics() {
        let mut vars = EnvVars::new();
        parse_env_file(
            "# comment\nKB_A=1\n\nexport KB_B=two\nKB_C=\"quoted value\"\nKB_D='single'\nbroken line\n",
            &mut vars,
        );
        assert_eq!(vars.get("KB_A").map(String::as_str), Some("1"));
        assert_eq!(vars.get("KB_B").map(String::as_str), Some("two"));
        assert_eq!(vars.get("KB_C").map(String::as_str), Some("quoted value"));
        assert_eq!(vars.get("KB_D").map(String::as_str), Some("single"));
        assert_eq!(vars.len(), 4);
    }

    #[test]
    fn test_parse_env_file_later_overrides() {
        let mut vars = EnvVars::new();
        parse_env_file("KB_X=first", &mut vars);
        parse_env_file("KB_X=second", &mut vars);
        assert_eq!(vars.get("KB_X").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_load_env_dir_missing_files_ok() {
        let dir = tempfile::tempdir().unwrap();
        let vars = load_env_dir(dir.path()).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_load_env_dir_local_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "KB_E=base\nKB_F=keep").unwrap();
        std::fs::write(dir.path().join(".env.local"), "KB_E=local").unwrap();
        let vars = load_env_dir(dir.path()).unwrap();
        assert_eq!(vars.get("KB_E").map(String::as_str), Some("local"));
        assert_eq!(vars.get("KB_F").map(String::as_str), Some("keep"));
    }

    #[test]
    fn test_load_env_dir_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_env_dir(&dir.path().join("nope"));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
