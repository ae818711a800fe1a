use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings of a merge run, read from a JSON file. Command-line flags
/// override whatever is set here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Package name of the merged file.
    #[serde(default = "default_package")]
    pub package: String,
    /// Where the merged source goes; stdout when unset.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Where the JSON decision report goes; no report when unset.
    #[serde(default)]
    pub report: Option<PathBuf>,
    #[serde(default)]
    pub units: Vec<UnitSource>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            package: default_package(),
            output: None,
            report: None,
            units: Vec::new(),
            logging: LoggingSettings::default(),
        }
    }
}

/// One input file and the tag appended to its names on conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSource {
    pub path: PathBuf,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

fn default_package() -> String {
    "merged".into()
}
fn default_level() -> String {
    "info".into()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no input files given")]
    NoUnits,

    #[error("{files} input files but {tags} tags; every file needs exactly one tag")]
    TagCountMismatch { files: usize, tags: usize },

    #[error("empty tag for {}", path.display())]
    EmptyTag { path: PathBuf },
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Settings written by `srcmerge init`: two placeholder units.
    pub fn template() -> Self {
        Self {
            units: vec![
                UnitSource {
                    path: "a/a.go".into(),
                    tag: "A".into(),
                },
                UnitSource {
                    path: "b/b.go".into(),
                    tag: "B".into(),
                },
            ],
            output: Some("merged.go".into()),
            ..Self::default()
        }
    }

    /// The units to merge, in order. Files given on the command line replace
    /// the configured list and must come with one tag each.
    pub fn resolve_units(
        &self,
        files: &[PathBuf],
        tags: &[String],
    ) -> Result<Vec<UnitSource>, ConfigError> {
        let units = if files.is_empty() && tags.is_empty() {
            self.units.clone()
        } else {
            if files.len() != tags.len() {
                return Err(ConfigError::TagCountMismatch {
                    files: files.len(),
                    tags: tags.len(),
                });
            }
            files
                .iter()
                .zip(tags)
                .map(|(path, tag)| UnitSource {
                    path: path.clone(),
                    tag: tag.clone(),
                })
                .collect()
        };

        if units.is_empty() {
            return Err(ConfigError::NoUnits);
        }
        if let Some(unit) = units.iter().find(|u| u.tag.trim().is_empty()) {
            return Err(ConfigError::EmptyTag {
                path: unit.path.clone(),
            });
        }
        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.package, "merged");
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("srcmerge.json");
        let settings = Settings::template();
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_command_line_units_replace_configured() {
        let settings = Settings::template();
        let units = settings
            .resolve_units(&["x.go".into()], &["X".into()])
            .unwrap();
        assert_eq!(
            units,
            vec![UnitSource {
                path: "x.go".into(),
                tag: "X".into(),
            }]
        );
        assert_eq!(settings.resolve_units(&[], &[]).unwrap().len(), 2);
    }

    #[test]
    fn test_unit_validation() {
        let settings = Settings::default();
        assert_eq!(settings.resolve_units(&[], &[]), Err(ConfigError::NoUnits));
        assert_eq!(
            settings.resolve_units(&["a.go".into(), "b.go".into()], &["A".into()]),
            Err(ConfigError::TagCountMismatch { files: 2, tags: 1 })
        );
        assert_eq!(
            settings.resolve_units(&["a.go".into()], &[" ".into()]),
            Err(ConfigError::EmptyTag {
                path: "a.go".into()
            })
        );
    }
}
