use crate::error::{PlayplanError, Result};
use crate::paths;
use crate::translate::{LocatorStrategy, TranslateOptions, DEFAULT_EXTENSION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

/// Optional `playplan.yaml`. Command-line flags override every key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_dir: Option<PathBuf>,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub locator: LocatorStrategy,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tests_dir: None,
            summary_dir: None,
            extension: default_extension(),
            locator: LocatorStrategy::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlayplanError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: GeneratorConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load `explicit` if given (it must exist), else `root/playplan.yaml`
    /// if present, else defaults.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = paths::config_path(root);
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn translate_options(&self) -> TranslateOptions {
        TranslateOptions {
            extension: self.extension.clone(),
            locator: self.locator,
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.extension.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "extension must not be empty".to_string(),
            });
        } else if self.extension.starts_with('.') {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "extension '{}' must not start with '.'; use '{}'",
                    self.extension,
                    self.extension.trim_start_matches('.')
                ),
            });
        } else if self.extension.contains('/') || self.extension.contains('\\') {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("extension '{}' must not contain a path separator", self.extension),
            });
        } else if !is_script_extension(&self.extension) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "extension '{}' is not .ts or .js; Playwright may not pick it up",
                    self.extension
                ),
            });
        }

        if let (Some(tests), Some(summary)) = (&self.tests_dir, &self.summary_dir) {
            if tests == summary {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "tests_dir and summary_dir are both '{}'",
                        tests.display()
                    ),
                });
            }
        }

        warnings
    }
}

fn is_script_extension(ext: &str) -> bool {
    ["ts", "js"]
        .iter()
        .any(|lang| ext == *lang || ext.ends_with(&format!(".{lang}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
