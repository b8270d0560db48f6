//! Project configuration stored in `.canvas/config.json`.

use canvas_graph::BuildOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_DIR: &str = ".canvas";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Dataset files and build switches for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Inputs {
    /// Application group exports.
    pub structure: Vec<PathBuf>,
    /// Consumer/producer exports.
    pub dependencies: Vec<PathBuf>,
    /// Integration and service API usage exports.
    pub integration: Vec<PathBuf>,
    /// Module detail exports.
    pub details: Vec<PathBuf>,
    #[serde(flatten)]
    pub options: BuildOptions,
}

/// Contents of `.canvas/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: String,
    #[serde(flatten)]
    pub inputs: Inputs,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            inputs: Inputs::default(),
        }
    }
}

impl Config {
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Loads the project config. A missing file is not an error.
    pub fn load(root: &Path) -> Result<Option<Self>, ConfigError> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = serde_json::from_str(&json)
            .map_err(|source| ConfigError::Parse { path, source })?;
        Ok(Some(config))
    }

    pub fn save(&self, root: &Path) -> Result<PathBuf, ConfigError> {
        let path = Self::path(root);
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.clone(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(write_err)?;
        Ok(path)
    }

    /// Combines the config with command-line flags.
    ///
    /// Config file paths are relative to `root`. File lists are
    /// concatenated, config first. Switches set on the command line win;
    /// a domain filter given on the command line replaces the configured one.
    pub fn merge(self, root: &Path, flags: Inputs) -> Inputs {
        let resolve = |files: Vec<PathBuf>| -> Vec<PathBuf> {
            files.into_iter().map(|f| root.join(f)).collect()
        };
        let concat = |mut configured: Vec<PathBuf>, given: Vec<PathBuf>| {
            configured.extend(given);
            configured
        };
        let configured = self.inputs;

        Inputs {
            structure: concat(resolve(configured.structure), flags.structure),
            dependencies: concat(resolve(configured.dependencies), flags.dependencies),
            integration: concat(resolve(configured.integration), flags.integration),
            details: concat(resolve(configured.details), flags.details),
            options: BuildOptions {
                include_layer_tier: flags.options.include_layer_tier
                    || configured.options.include_layer_tier,
                anonymize: flags.options.anonymize || configured.options.anonymize,
                domain_filter: if flags.options.domain_filter.is_empty() {
                    configured.options.domain_filter
                } else {
                    flags.options.domain_filter
                },
            },
        }
    }
}

/// Loads the project config, if any, and merges the flags into it.
pub fn resolve_inputs(root: &Path, flags: Inputs) -> Result<Inputs, ConfigError> {
    match Config::load(root)? {
        Some(config) => {
            tracing::debug!("Using config {}", Config::path(root).display());
            Ok(config.merge(root, flags))
        }
        None => Ok(flags),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), None);

        let flags = Inputs {
            structure: vec![PathBuf::from("groups.json")],
            ..Inputs::default()
        };
        assert_eq!(resolve_inputs(dir.path(), flags.clone()).unwrap(), flags);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.inputs.dependencies = vec![PathBuf::from("data/cp.json")];
        config.inputs.options.include_layer_tier = true;

        let path = config.save(dir.path()).unwrap();
        assert!(path.ends_with(".canvas/config.json"));

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"includeLayerTier\": true"));
        assert_eq!(Config::load(dir.path()).unwrap(), Some(config));
    }

    #[test]
    fn test_flags_win() {
        let root = Path::new("/project");
        let mut config = Config::default();
        config.inputs.structure = vec![PathBuf::from("groups.json")];
        config.inputs.options.domain_filter = vec!["Sales".to_string()];
        config.inputs.options.anonymize = true;

        let flags = Inputs {
            structure: vec![PathBuf::from("/tmp/extra.json")],
            options: BuildOptions {
                include_layer_tier: true,
                domain_filter: vec!["Ops".to_string()],
                ..BuildOptions::default()
            },
            ..Inputs::default()
        };
        let merged = config.merge(root, flags);

        assert_eq!(
            merged.structure,
            vec![
                PathBuf::from("/project/groups.json"),
                PathBuf::from("/tmp/extra.json")
            ]
        );
        assert!(merged.options.include_layer_tier);
        assert!(merged.options.anonymize);
        assert_eq!(merged.options.domain_filter, vec!["Ops"]);
    }

    #[test]
    fn test_invalid_config() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        fs::write(Config::path(dir.path()), "{ not json").unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
