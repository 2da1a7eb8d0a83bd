//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `TASKBOARD_API_URL` is set, build the config from the environment
//! 2. Otherwise look for a config file (JSON or TOML)
//! 3. Fall back to built-in defaults when no file exists
//!
//! ## Environment Variables
//! - `TASKBOARD_API_URL`: Backend base URL (selects the environment source)
//! - `TASKBOARD_API_TIMEOUT`: Per-request timeout in seconds
//! - `TASKBOARD_TASK_LIST`: Remote task list id
//! - `TASKBOARD_SESSION_TOKEN`: Bearer session id
//! - `TASKBOARD_SYNC_INTERVAL`: Sync interval in seconds
//! - `TASKBOARD_SYNC_INCLUDE_COMPLETED`: Fetch completed tasks (true/false)
//! - `TASKBOARD_IN_PROGRESS_POLICY`: `preserve` or `clear`
//! - `TASKBOARD_CALENDAR_EVENTS`: Show calendar events (true/false)
//! - `TASKBOARD_SNAPSHOT_PATH`: SQLite file for board snapshots
//! - `TASKBOARD_SNAPSHOT_KEY`: Snapshot key inside that file
//!
//! ## File Locations
//! `taskboard.{json,toml}` then `config.{json,toml}` in the working
//! directory, its parent and grandparent, then next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use taskboard_domain::{Config, InProgressPolicy, Result, TaskboardError};

const FILE_STEMS: [&str; 2] = ["taskboard", "config"];
const FILE_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `TaskboardError::Config` if the chosen source is malformed or the
/// resulting configuration fails validation.
pub fn load() -> Result<Config> {
    if std::env::var_os("TASKBOARD_API_URL").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    match find_config_file() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No config file found, using defaults");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Load configuration from environment variables
///
/// `TASKBOARD_API_URL` is required; every other variable falls back to its
/// default.
///
/// # Errors
/// Returns `TaskboardError::Config` if the URL is missing or a value does
/// not parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.api.base_url = env_var("TASKBOARD_API_URL")?;
    if let Some(timeout) = env_parse::<u64>("TASKBOARD_API_TIMEOUT")? {
        config.api.timeout_seconds = timeout;
    }
    if let Some(list) = env_optional("TASKBOARD_TASK_LIST") {
        config.api.task_list_id = list;
    }
    config.api.session_token = env_optional("TASKBOARD_SESSION_TOKEN");

    if let Some(interval) = env_parse::<u64>("TASKBOARD_SYNC_INTERVAL")? {
        config.sync.interval_seconds = interval;
    }
    config.sync.include_completed =
        env_bool("TASKBOARD_SYNC_INCLUDE_COMPLETED", config.sync.include_completed);
    if let Some(raw) = env_optional("TASKBOARD_IN_PROGRESS_POLICY") {
        config.sync.in_progress_policy =
            InProgressPolicy::from_str(&raw).map_err(TaskboardError::Config)?;
    }
    config.sync.include_calendar_events =
        env_bool("TASKBOARD_CALENDAR_EVENTS", config.sync.include_calendar_events);

    config.storage.snapshot_path = env_optional("TASKBOARD_SNAPSHOT_PATH");
    if let Some(key) = env_optional("TASKBOARD_SNAPSHOT_KEY") {
        config.storage.snapshot_key = key;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations. Format is detected
/// by extension.
///
/// # Errors
/// Returns `TaskboardError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TaskboardError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            TaskboardError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TaskboardError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TaskboardError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TaskboardError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(TaskboardError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
        roots.push(cwd.join("../.."));
    }

    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    candidates(&roots).into_iter().find(|path| path.exists())
}

fn candidates(roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| {
            FILE_STEMS.iter().flat_map(move |stem| {
                FILE_EXTENSIONS.iter().map(move |ext| root.join(format!("{stem}.{ext}")))
            })
        })
        .collect()
}

fn env_var(key: &str) -> Result<String> {
    env_optional(key).ok_or_else(|| {
        TaskboardError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Set and non-blank.
fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_optional(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| TaskboardError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 10] = [
        "TASKBOARD_API_URL",
        "TASKBOARD_API_TIMEOUT",
        "TASKBOARD_TASK_LIST",
        "TASKBOARD_SESSION_TOKEN",
        "TASKBOARD_SYNC_INTERVAL",
        "TASKBOARD_SYNC_INCLUDE_COMPLETED",
        "TASKBOARD_IN_PROGRESS_POLICY",
        "TASKBOARD_CALENDAR_EVENTS",
        "TASKBOARD_SNAPSHOT_PATH",
        "TASKBOARD_SNAPSHOT_KEY",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for (value, expected) in
            [("1", true), ("TRUE", true), ("yes", true), ("on", true), ("0", false), ("off", false)]
        {
            std::env::set_var("TASKBOARD_TEST_BOOL", value);
            assert_eq!(env_bool("TASKBOARD_TEST_BOOL", !expected), expected, "value {value}");
        }

        std::env::remove_var("TASKBOARD_TEST_BOOL");
        assert!(env_bool("TASKBOARD_TEST_BOOL", true));
        assert!(!env_bool("TASKBOARD_TEST_BOOL", false));
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("TASKBOARD_API_URL", "https://board.example.com");
        std::env::set_var("TASKBOARD_API_TIMEOUT", "10");
        std::env::set_var("TASKBOARD_TASK_LIST", "work");
        std::env::set_var("TASKBOARD_SESSION_TOKEN", "sess-123");
        std::env::set_var("TASKBOARD_SYNC_INTERVAL", "120");
        std::env::set_var("TASKBOARD_SYNC_INCLUDE_COMPLETED", "false");
        std::env::set_var("TASKBOARD_IN_PROGRESS_POLICY", "Clear");
        std::env::set_var("TASKBOARD_CALENDAR_EVENTS", "yes");
        std::env::set_var("TASKBOARD_SNAPSHOT_PATH", "/tmp/board.db");
        std::env::set_var("TASKBOARD_SNAPSHOT_KEY", "board");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.api.base_url, "https://board.example.com");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.api.task_list_id, "work");
        assert_eq!(config.api.session_token.as_deref(), Some("sess-123"));
        assert_eq!(config.sync.interval_seconds, 120);
        assert!(!config.sync.include_completed);
        assert_eq!(config.sync.in_progress_policy, InProgressPolicy::Clear);
        assert!(config.sync.include_calendar_events);
        assert_eq!(config.storage.snapshot_path.as_deref(), Some("/tmp/board.db"));
        assert_eq!(config.storage.snapshot_key, "board");
    }

    #[test]
    fn test_load_from_env_defaults_for_optional_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("TASKBOARD_API_URL", "http://localhost:9000");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.api.task_list_id, "@default");
        assert_eq!(config.sync.interval_seconds, 300);
        assert!(config.api.session_token.is_none());
        assert!(config.storage.snapshot_path.is_none());
    }

    #[test]
    fn test_load_from_env_missing_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, TaskboardError::Config(_)));
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for (key, value) in [
            ("TASKBOARD_SYNC_INTERVAL", "soon"),
            ("TASKBOARD_SYNC_INTERVAL", "0"),
            ("TASKBOARD_IN_PROGRESS_POLICY", "shuffle"),
        ] {
            clear_env();
            std::env::set_var("TASKBOARD_API_URL", "http://localhost:8000");
            std::env::set_var(key, value);

            let result = load_from_env();
            assert!(matches!(result, Err(TaskboardError::Config(_))), "{key}={value}");
        }
        clear_env();
    }

    #[test]
    fn test_load_from_file_json() {
        let path = temp_config(
            r#"{
                "api": { "base_url": "http://api.local", "task_list_id": "home" },
                "sync": { "interval_seconds": 60, "in_progress_policy": "clear" }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("json config");
        std::fs::remove_file(path).ok();

        assert_eq!(config.api.base_url, "http://api.local");
        assert_eq!(config.api.task_list_id, "home");
        assert_eq!(config.sync.interval_seconds, 60);
        assert_eq!(config.sync.in_progress_policy, InProgressPolicy::Clear);
        assert_eq!(config.storage.snapshot_key, "kanban_board_data");
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = temp_config(
            r#"
[sync]
include_calendar_events = true

[storage]
snapshot_path = "board.db"
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("toml config");
        std::fs::remove_file(path).ok();

        assert!(config.sync.include_calendar_events);
        assert_eq!(config.storage.snapshot_path.as_deref(), Some("board.db"));
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/taskboard.json")));
        assert!(matches!(result, Err(TaskboardError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = temp_config(r#"{ "api": "#, "json");

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        assert!(matches!(result, Err(TaskboardError::Config(_))));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("api: {}", &PathBuf::from("taskboard.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_candidates_prefer_taskboard_over_config() {
        let roots = [PathBuf::from("/a"), PathBuf::from("/b")];
        let paths = candidates(&roots);

        assert_eq!(paths.len(), 8);
        assert_eq!(paths[0], PathBuf::from("/a/taskboard.json"));
        assert_eq!(paths[3], PathBuf::from("/a/config.toml"));
        assert_eq!(paths[4], PathBuf::from("/b/taskboard.json"));
    }
}
