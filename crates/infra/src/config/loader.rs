//! Configuration loader
//!
//! Builds the run configuration from up to three layers, later layers winning:
//!
//! 1. A settings file: the explicit `--config` path, otherwise the first of
//!    `appsettings.{toml,json}` / `calsync.{toml,json}` found by
//!    [`probe_config_paths`]. A missing file is not an error; every field has
//!    a default and required values are validated when the pipeline is built.
//! 2. An `appsecrets.{toml,json}` file next to the settings file, deep-merged
//!    over it. Keep passwords and connection strings here or in the
//!    environment.
//! 3. Environment variables named `CALSYNC_<SECTION>_<KEY>`, e.g.
//!    `CALSYNC_GRAPH_PASSWORD` or `CALSYNC_DATABASE_CONNECTION_STRING`.
//!
//! ## File Locations
//! The loader probes the following directories (in order): the current
//! working directory, its parent, its grandparent, then the directory of the
//! executable.

use std::path::{Path, PathBuf};

use calsync_domain::{Config, Result, SyncError};
use serde_json::{Map, Value};

const ENV_PREFIX: &str = "CALSYNC_";
const SETTINGS_NAMES: [&str; 4] =
    ["appsettings.toml", "appsettings.json", "calsync.toml", "calsync.json"];
const SECRETS_NAMES: [&str; 2] = ["appsecrets.toml", "appsecrets.json"];
const SECTIONS: [&str; 5] = ["graph", "calendar", "database", "http", "debug"];
const LEGACY_CONNECTION_STRINGS: &str = "connection_strings";
const LEGACY_CONNECTION_NAME: &str = "sql_server";

/// Load configuration from files and the process environment.
///
/// # Errors
/// Returns `SyncError::Config` if:
/// - An explicit `path` does not exist
/// - A file cannot be read or parsed
/// - An environment override has an invalid value
pub fn load(path: Option<PathBuf>) -> Result<Config> {
    load_with_env(path, std::env::vars())
}

fn load_with_env(
    path: Option<PathBuf>,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<Config> {
    let settings_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SyncError::Config(format!("Config file not found: {}", p.display())));
            }
            Some(p)
        }
        None => probe_config_paths(),
    };

    let mut value = match &settings_path {
        Some(p) => read_layer(p)?,
        None => {
            tracing::warn!("No config file found; using defaults and environment");
            Value::Object(Map::new())
        }
    };

    let secrets_dir = match &settings_path {
        Some(p) => p.parent().map(Path::to_path_buf),
        None => std::env::current_dir().ok(),
    };
    if let Some(secrets) = secrets_dir.as_deref().and_then(find_secrets_file) {
        tracing::info!(path = %secrets.display(), "Merging secrets file");
        merge(&mut value, read_layer(&secrets)?);
    }

    let applied = apply_env_overrides(&mut value, vars)?;
    if applied > 0 {
        tracing::info!(count = applied, "Applied environment overrides");
    }

    into_config(value)
}

/// Load configuration from one file, without the secrets overlay or
/// environment overrides.
///
/// # Errors
/// Returns `SyncError::Config` if the file is missing or invalid.
pub fn load_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(SyncError::Config(format!("Config file not found: {}", path.display())));
    }
    into_config(read_layer(path)?)
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first settings file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| SETTINGS_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

fn find_secrets_file(dir: &Path) -> Option<PathBuf> {
    SECRETS_NAMES.iter().map(|name| dir.join(name)).find(|path| path.is_file())
}

fn read_layer(path: &Path) -> Result<Value> {
    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path).map_err(|e| {
        SyncError::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    parse_layer(&contents, path)
}

/// Parse one layer, detecting the format by extension (`.json` or `.toml`).
fn parse_layer(contents: &str, path: &Path) -> Result<Value> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let value: Value = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid TOML format: {}", e)))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid JSON format: {}", e)))?,
        _ => {
            return Err(SyncError::Config(format!("Unsupported config format: {}", extension)))
        }
    };

    if !value.is_object() {
        return Err(SyncError::Config(format!("{} must contain a table", path.display())));
    }
    let mut value = normalise_keys(value);
    adopt_connection_strings(&mut value);
    warn_unknown_sections(&value, path);
    Ok(value)
}

/// Move a .NET-style `ConnectionStrings:SqlServer` entry into
/// `database.connection_string` unless the layer already sets that key.
fn adopt_connection_strings(value: &mut Value) {
    let Some(root) = value.as_object_mut() else {
        return;
    };
    let Some(Value::Object(mut legacy)) = root.remove(LEGACY_CONNECTION_STRINGS) else {
        return;
    };
    let Some(connection_string) = legacy.remove(LEGACY_CONNECTION_NAME) else {
        tracing::warn!(
            names = ?legacy.keys().collect::<Vec<_>>(),
            "ConnectionStrings section has no SqlServer entry; ignoring it"
        );
        return;
    };

    let database = root.entry("database").or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(database) = database {
        if database.contains_key("connection_string") {
            tracing::warn!(
                "both ConnectionStrings:SqlServer and database.connection_string are set; \
                 keeping database.connection_string"
            );
        } else {
            tracing::info!("using ConnectionStrings:SqlServer as database.connection_string");
            database.insert("connection_string".into(), connection_string);
        }
    }
}

fn warn_unknown_sections(value: &Value, path: &Path) {
    let Some(root) = value.as_object() else {
        return;
    };
    for key in root.keys().filter(|k| !SECTIONS.contains(&k.as_str())) {
        tracing::warn!(
            section = %key,
            path = %path.display(),
            "ignoring unknown configuration section"
        );
    }
}

/// Accept `SharedCalendarEmail`-style keys as well as `shared_calendar_email`.
fn normalise_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter().map(|(key, value)| (snake_case(&key), normalise_keys(value))).collect(),
        ),
        other => other,
    }
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}

/// Recursively merge `overlay` into `base`; tables merge, everything else
/// replaces.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Apply `CALSYNC_<SECTION>_<KEY>` variables. Values are typed after the
/// field's default so `"true"` becomes a bool and `"30"` a number.
fn apply_env_overrides(
    value: &mut Value,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<usize> {
    let defaults = serde_json::to_value(Config::default())
        .map_err(|e| SyncError::Config(format!("Failed to describe defaults: {e}")))?;
    let Value::Object(sections) = &defaults else {
        return Ok(0);
    };

    let mut applied = 0;
    for (name, raw) in vars {
        let Some(rest) = name.strip_prefix(ENV_PREFIX) else { continue };
        let rest = rest.to_ascii_lowercase();

        let Some((section, key, default)) = sections.iter().find_map(|(section, fields)| {
            let key = rest.strip_prefix(section.as_str())?.strip_prefix('_')?;
            fields.get(key).map(|default| (section.clone(), key.to_string(), default))
        }) else {
            continue;
        };

        let typed = typed_env_value(&name, &raw, default)?;
        let root = value
            .as_object_mut()
            .ok_or_else(|| SyncError::Config("configuration root must be a table".into()))?;
        let table = root.entry(section).or_insert_with(|| Value::Object(Map::new()));
        match table.as_object_mut() {
            Some(table) => {
                table.insert(key, typed);
            }
            None => *table = Value::Object(Map::from_iter([(key, typed)])),
        }
        applied += 1;
    }

    Ok(applied)
}

fn typed_env_value(name: &str, raw: &str, default: &Value) -> Result<Value> {
    match default {
        Value::Bool(_) => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| SyncError::Config(format!("{name} must be a boolean, got '{raw}'"))),
        Value::Number(_) => raw
            .trim()
            .parse::<u64>()
            .map(Value::from)
            .map_err(|e| SyncError::Config(format!("{name} must be a number: {e}"))),
        _ => Ok(Value::String(raw.to_string())),
    }
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn into_config(value: Value) -> Result<Config> {
    serde_json::from_value(value)
        .map_err(|e| SyncError::Config(format!("Invalid configuration: {e}")))
}
