//! Configuration loading from `~/.persona/config.toml` with defaults.
//!
//! A config file may list sibling files under `include = [...]`. Those are
//! merged first, in order, and the including file's own keys win.

use persona_types::config::{persona_home_dir, PersonaConfig};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Deepest chain of nested includes followed before giving up.
const MAX_INCLUDE_DEPTH: u32 = 10;

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("include '{0}' must be a relative path inside the config directory")]
    IncludeOutsideDir(String),
    #[error("include '{0}' forms a cycle")]
    IncludeCycle(String),
    #[error("includes nested deeper than {MAX_INCLUDE_DEPTH} levels")]
    IncludeTooDeep,
    #[error("invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),
}

/// Where the effective configuration came from.
#[derive(Debug)]
pub enum ConfigSource {
    /// Parsed from this file.
    File(PathBuf),
    /// No file at this path, so defaults apply.
    Missing(PathBuf),
    /// The file exists but could not be loaded, so defaults apply.
    Invalid {
        path: PathBuf,
        error: ConfigLoadError,
    },
}

impl ConfigSource {
    /// The config file path that was consulted.
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::File(path)
            | ConfigSource::Missing(path)
            | ConfigSource::Invalid { path, .. } => path,
        }
    }

    /// Log how the configuration was obtained.
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => {
                info!(path = %path.display(), "Loaded configuration");
            }
            ConfigSource::Missing(path) => {
                info!(path = %path.display(), "Config file not found, using defaults");
            }
            ConfigSource::Invalid { path, error } => {
                warn!(
                    error = %error,
                    path = %path.display(),
                    "Failed to load config, using defaults"
                );
            }
        }
    }
}

/// Resolve the effective configuration without logging.
///
/// Callers that install their subscriber from `log_level` use this, then
/// call [`ConfigSource::log`] once tracing is up.
pub fn resolve_config(path: Option<&Path>) -> (PersonaConfig, ConfigSource) {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if !config_path.exists() {
        return (PersonaConfig::default(), ConfigSource::Missing(config_path));
    }

    match try_load_config(&config_path) {
        Ok(config) => (config, ConfigSource::File(config_path)),
        Err(error) => (
            PersonaConfig::default(),
            ConfigSource::Invalid {
                path: config_path,
                error,
            },
        ),
    }
}

/// Load configuration, falling back to defaults on any problem.
///
/// A missing file is normal on first run. An unreadable, unparsable, or
/// badly-included file is logged and ignored.
pub fn load_config(path: Option<&Path>) -> PersonaConfig {
    let (config, source) = resolve_config(path);
    source.log();
    config
}

/// Load configuration from an existing file, reporting the first problem.
pub fn try_load_config(config_path: &Path) -> Result<PersonaConfig, ConfigLoadError> {
    let mut visited = HashSet::new();
    visited.insert(canonical_or_self(config_path));
    let merged = read_with_includes(config_path, &mut visited, 0)?;
    Ok(merged.try_into::<PersonaConfig>()?)
}

/// Read one file and fold its includes underneath it.
fn read_with_includes(
    path: &Path,
    visited: &mut HashSet<PathBuf>,
    depth: u32,
) -> Result<toml::Value, ConfigLoadError> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(ConfigLoadError::IncludeTooDeep);
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut value: toml::Value =
        toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let includes = take_includes(&mut value);
    if includes.is_empty() {
        return Ok(value);
    }

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut merged = toml::Value::Table(toml::map::Map::new());
    for include in &includes {
        let resolved = resolve_include(dir, include)?;
        if !visited.insert(resolved.clone()) {
            return Err(ConfigLoadError::IncludeCycle(include.clone()));
        }
        debug!(include = %include, "Loading config include");
        let included = read_with_includes(&resolved, visited, depth + 1)?;
        deep_merge_toml(&mut merged, &included);
    }
    deep_merge_toml(&mut merged, &value);
    Ok(merged)
}

/// Remove and return the `include` list from a parsed config table.
fn take_includes(value: &mut toml::Value) -> Vec<String> {
    let Some(table) = value.as_table_mut() else {
        return Vec::new();
    };
    match table.remove("include") {
        Some(toml::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Some(toml::Value::String(single)) => vec![single],
        _ => Vec::new(),
    }
}

/// Resolve `include` against `dir`, refusing anything that leaves it.
fn resolve_include(dir: &Path, include: &str) -> Result<PathBuf, ConfigLoadError> {
    let relative = Path::new(include);
    let escapes = relative.is_absolute()
        || relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if escapes {
        return Err(ConfigLoadError::IncludeOutsideDir(include.to_string()));
    }

    let joined = dir.join(relative);
    let resolved = std::fs::canonicalize(&joined).map_err(|source| ConfigLoadError::Read {
        path: joined.clone(),
        source,
    })?;
    // Symlinks may still point elsewhere.
    if !resolved.starts_with(canonical_or_self(dir)) {
        return Err(ConfigLoadError::IncludeOutsideDir(include.to_string()));
    }
    Ok(resolved)
}

fn canonical_or_self(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Merge `overlay` into `base`. Tables merge key by key; any other value in
/// `overlay` replaces the one in `base`.
pub fn deep_merge_toml(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, overlay_val) in overlay_tbl {
                match base_tbl.get_mut(key) {
                    Some(base_val) => deep_merge_toml(base_val, overlay_val),
                    None => {
                        base_tbl.insert(key.clone(), overlay_val.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// `~/.persona/config.toml`.
pub fn default_config_path() -> PathBuf {
    persona_home_dir().join("config.toml")
}
