//! Locating and reading courses.toml

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;

pub const CONFIG_FILENAME: &str = "courses.toml";

/// Names a config file directly, bypassing the directory search
pub const CONFIG_ENV_VAR: &str = "COURSES_CONFIG";

/// Load the config named by `COURSES_CONFIG`, or the nearest courses.toml
/// at or above the working directory
pub fn load_config() -> Result<Config> {
    let cwd = env::current_dir()?;
    let path = locate_config(env::var_os(CONFIG_ENV_VAR).map(PathBuf::from), &cwd)?;
    load_config_from_path(&path)
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let config = toml::from_str(&expand_placeholders(&raw))?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// An explicit override must exist; without one, walk up from `start`
fn locate_config(override_path: Option<PathBuf>, start: &Path) -> Result<PathBuf> {
    match override_path {
        Some(path) if path.is_file() => Ok(path),
        Some(path) => Err(Error::Config(format!(
            "{} points at {}, which does not exist",
            CONFIG_ENV_VAR,
            path.display()
        ))),
        None => find_in_ancestors(start).ok_or(Error::ConfigNotFound),
    }
}

fn find_in_ancestors(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").expect("placeholder pattern is valid")
    })
}

/// Expand `${NAME}` and `${NAME:-fallback}` from the process environment.
/// An unset variable with no fallback becomes an empty string.
fn expand_placeholders(raw: &str) -> String {
    placeholder_pattern()
        .replace_all(raw, |caps: &Captures| {
            let name = &caps[1];
            match (env::var(name), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(fallback)) => fallback.as_str().to_string(),
                (Err(_), None) => {
                    tracing::warn!("{} is not set and has no fallback", name);
                    String::new()
                }
            }
        })
        .into_owned()
}

/// Contents written by `courses-api init`
pub fn default_config_content() -> &'static str {
    r#"# courses-api configuration

[server]
host = "0.0.0.0"
port = 5000

[database]
# "memory" keeps everything in-process and is lost on restart
backend = "memory"
# backend = "postgres"
url = "host=localhost port=5432 user=postgres password=${PGPASSWORD:-postgres} dbname=courses"

[auth]
bcrypt_cost = 12
realm = "courses-api"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;

    #[test]
    fn test_expand_set_variable() {
        env::set_var("COURSES_TEST_VAR", "hello");
        let result = expand_placeholders("value = \"${COURSES_TEST_VAR:-ignored}\"");
        assert_eq!(result, "value = \"hello\"");
        env::remove_var("COURSES_TEST_VAR");
    }

    #[test]
    fn test_expand_fallback_and_unset() {
        let result = expand_placeholders(
            "a = \"${COURSES_NONEXISTENT_VAR:-fallback}\"\nb = \"${COURSES_NONEXISTENT_VAR}\"",
        );
        assert_eq!(result, "a = \"fallback\"\nb = \"\"");
    }

    #[test]
    fn test_default_content_parses() {
        let config: Config = toml::from_str(&expand_placeholders(default_config_content()))
            .expect("default config should parse");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.auth.bcrypt_cost, 12);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from_path(&dir.path().join(CONFIG_FILENAME));
        assert!(matches!(result, Err(Error::ConfigNotFound)));
    }

    #[test]
    fn test_search_walks_up_to_nearest_file() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("api").join("src");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.path().join(CONFIG_FILENAME), "[server]\nport = 8080\n").unwrap();

        let found = locate_config(None, &nested).unwrap();
        assert_eq!(found, root.path().join(CONFIG_FILENAME));
        assert_eq!(load_config_from_path(&found).unwrap().server.port, 8080);

        fs::write(nested.join(CONFIG_FILENAME), "[server]\nport = 9090\n").unwrap();
        assert_eq!(locate_config(None, &nested).unwrap(), nested.join(CONFIG_FILENAME));
    }

    #[test]
    fn test_override_path() {
        let dir = tempfile::tempdir().unwrap();
        let named = dir.path().join("staging.toml");
        fs::write(&named, "[database]\nbackend = \"postgres\"\n").unwrap();

        let found = locate_config(Some(named.clone()), Path::new("/")).unwrap();
        assert_eq!(found, named);
        assert_eq!(
            load_config_from_path(&found).unwrap().database.backend,
            StoreBackend::Postgres
        );

        let missing = locate_config(Some(dir.path().join("absent.toml")), dir.path());
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
