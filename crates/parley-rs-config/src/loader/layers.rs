//! Reading, locating and stacking JSON5 config layers.

use super::{ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, schema};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read one layer and check it against the schema before merging.
pub(super) fn read_layer(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<(ConfigLayer, Value), ConfigError> {
    debug!(
        "reading config layer (source={}, path={})",
        source.label(),
        path.display()
    );
    let value = read_json5(path)?;
    schema::validate_layer_schema(&value, &format!("{}({})", source.label(), path.display()))?;
    let layer = ConfigLayer {
        source,
        path: path.to_path_buf(),
    };
    Ok((layer, value))
}

/// Read and parse a JSON5 file without any schema checks.
pub(super) fn read_json5(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    json5::from_str(&contents).map_err(|source| ConfigError::ParseFailed {
        origin: path.display().to_string(),
        source,
    })
}

/// Stack `layer` on top of `base`. Objects merge key by key; any other
/// value replaces what was below it.
pub(super) fn overlay(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base_map), Value::Object(layer_map)) => {
            for (key, value) in layer_map {
                match base_map.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// `~/.parley/parley.json5`, when a home directory is known.
pub(super) fn user_config_path() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    Some(
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE),
    )
}

/// Canonical form of `dir`; a directory that does not exist yet is kept as given.
pub(super) fn resolve_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    match dir.canonicalize() {
        Ok(resolved) => Ok(resolved),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(dir.to_path_buf()),
        Err(source) => Err(ConfigError::ReadFailed {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Key used to load each physical file at most once.
pub(super) fn layer_identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
