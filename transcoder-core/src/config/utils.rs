//! Environment override helpers.
//!
//! Helpers for reading overrides from environment variables. Each helper takes
//! the variable lookup as a parameter so callers (and tests) can supply
//! something other than the process environment.

use std::path::PathBuf;
use std::str::FromStr;

/// Source of environment-style variables.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads a variable from the process environment.
pub fn system_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Path from `key`, or `default` when unset.
pub fn get_env_path(env: EnvLookup<'_>, key: &str, default: PathBuf) -> PathBuf {
    env(key).map(PathBuf::from).unwrap_or(default)
}

/// `true`/`1` (any case) from `key`; anything else set is false, unset is `default`.
pub fn get_env_bool(env: EnvLookup<'_>, key: &str, default: bool) -> bool {
    match env(key) {
        Some(val) => val.eq_ignore_ascii_case("true") || val == "1",
        None => default,
    }
}

/// Get a parsed value from an environment variable or use the default.
///
/// Unparseable values fall back to the default.
pub fn get_env_parsed<T: FromStr>(env: EnvLookup<'_>, key: &str, default: T) -> T {
    match env(key) {
        Some(val) => val.trim().parse().unwrap_or(default),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(key: &str) -> Option<String> {
        match key {
            "FLAG_ON" => Some("TRUE".to_string()),
            "FLAG_ONE" => Some("1".to_string()),
            "NUMBER" => Some(" 42 ".to_string()),
            "GARBAGE" => Some("forty-two".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_bool_parsing() {
        assert!(get_env_bool(&lookup, "FLAG_ON", false));
        assert!(get_env_bool(&lookup, "FLAG_ONE", false));
        assert!(!get_env_bool(&lookup, "GARBAGE", true));
        assert!(get_env_bool(&lookup, "MISSING", true));
    }

    #[test]
    fn test_parsed_values_fall_back_to_default() {
        assert_eq!(get_env_parsed(&lookup, "NUMBER", 7_u64), 42);
        assert_eq!(get_env_parsed(&lookup, "GARBAGE", 7_u64), 7);
        assert_eq!(get_env_parsed(&lookup, "MISSING", 7_usize), 7);
    }
}
