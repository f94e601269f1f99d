use anyhow::{Context, Result};
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vmt_backend::{EntryPoint, TranslatorOptions};

/// File name the driver looks for next to its input
pub const CONFIG_FILE: &str = "vmt.json";

/// When to start the artifact with the bootstrap sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapPolicy {
    /// Only when one of the input modules is the entry module
    #[default]
    Auto,
    Always,
    Never,
}

/// Driver settings loaded from vmt.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub comments: bool,
    pub fuse: bool,
    pub bootstrap: BootstrapPolicy,
    pub entry_module: String,
    pub entry_function: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let entry = EntryPoint::default();
        Self {
            comments: false,
            fuse: true,
            bootstrap: BootstrapPolicy::Auto,
            entry_module: entry.module,
            entry_function: entry.function,
        }
    }
}

impl DriverConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: DriverConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Load vmt.json from beside `input` if there is one
    pub fn discover(input: &Path) -> Result<Self> {
        let path = config_path_for(input);
        if path.is_file() {
            debug!("using config {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line flags on top of the file
    pub fn apply_overrides(&mut self, comments: bool, no_fuse: bool, bootstrap: Option<BootstrapPolicy>) {
        if comments {
            self.comments = true;
        }
        if no_fuse {
            self.fuse = false;
        }
        if let Some(policy) = bootstrap {
            self.bootstrap = policy;
        }
    }

    pub fn translator_options(&self) -> TranslatorOptions {
        TranslatorOptions {
            emit_comments: self.comments,
            fuse_push_pop: self.fuse,
        }
    }

    pub fn entry_point(&self) -> EntryPoint {
        EntryPoint {
            module: self.entry_module.clone(),
            function: self.entry_function.clone(),
        }
    }

    /// Decide whether a run over `modules` gets a bootstrap
    pub fn wants_bootstrap<S: AsRef<str>>(&self, modules: &[S]) -> bool {
        match self.bootstrap {
            BootstrapPolicy::Always => true,
            BootstrapPolicy::Never => false,
            BootstrapPolicy::Auto => modules.iter().any(|m| m.as_ref() == self.entry_module),
        }
    }
}

/// A directory's config lives inside it, a file's beside it
fn config_path_for(input: &Path) -> PathBuf {
    if input.is_dir() {
        input.join(CONFIG_FILE)
    } else {
        input
            .parent()
            .map(|dir| dir.join(CONFIG_FILE))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: DriverConfig = serde_json::from_str(r#"{ "comments": true, "bootstrap": "never" }"#).unwrap();
        assert!(config.comments);
        assert!(config.fuse);
        assert_eq!(config.bootstrap, BootstrapPolicy::Never);
        assert_eq!(config.entry_function, "Sys.init");
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = DriverConfig::default();
        config.apply_overrides(true, true, Some(BootstrapPolicy::Always));
        assert_eq!(
            config.translator_options(),
            TranslatorOptions {
                emit_comments: true,
                fuse_push_pop: false
            }
        );
        assert_eq!(config.bootstrap, BootstrapPolicy::Always);

        // Absent flags leave the file's values alone
        let mut config = DriverConfig {
            comments: true,
            ..Default::default()
        };
        config.apply_overrides(false, false, None);
        assert!(config.comments);
        assert_eq!(config.bootstrap, BootstrapPolicy::Auto);
    }

    #[test]
    fn test_bootstrap_policy() {
        let config = DriverConfig::default();
        assert!(config.wants_bootstrap(&["Main", "Sys"]));
        assert!(!config.wants_bootstrap(&["Main"]));

        let custom = DriverConfig {
            entry_module: "Boot2".to_string(),
            ..Default::default()
        };
        assert!(!custom.wants_bootstrap(&["Sys"]));
        assert!(custom.wants_bootstrap(&["Boot2"]));

        let never = DriverConfig {
            bootstrap: BootstrapPolicy::Never,
            ..Default::default()
        };
        assert!(!never.wants_bootstrap(&["Sys"]));
    }
}
