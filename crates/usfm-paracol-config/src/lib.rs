//! Project configuration, read from a `paracol.toml` at the project root.
//!
//! Every field has a default, so a missing file or a partial file both work:
//!
//! ```toml
//! book = "JER"
//! skeleton_edition = "brenton"
//!
//! [primary]
//! label = "prideaux"
//!
//! [secondary]
//! label = "web"
//!
//! [document]
//! title = "Jeremiah (Parallel)"
//! format = "latex"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Book code matched against `\id` lines, e.g. `JER`.
    pub book: String,
    /// Edition whose verse list seeds a new mapping table.
    pub skeleton_edition: String,
    pub paths: Paths,
    /// Left column edition; its order drives the document.
    pub primary: Edition,
    /// Right column edition, joined through the mapping table.
    pub secondary: Edition,
    pub document: Document,
    pub mapping: MappingColumns,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            book: "JER".to_string(),
            skeleton_edition: "brenton".to_string(),
            paths: Paths::default(),
            primary: Edition {
                label: "prideaux".to_string(),
            },
            secondary: Edition {
                label: "web".to_string(),
            },
            document: Document::default(),
            mapping: MappingColumns::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Downloaded archives and loose USFM files.
    pub sources: PathBuf,
    /// Unpacked sources, encoded JSON and the parallel rows CSV.
    pub build: PathBuf,
    pub mapping: PathBuf,
    pub output: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            sources: PathBuf::from("sources"),
            build: PathBuf::from("build"),
            mapping: PathBuf::from("data/mapping.csv"),
            output: PathBuf::from("tex/parallel.tex"),
        }
    }
}

impl Paths {
    /// Resolves relative paths against `root`. Absolute paths are kept.
    pub fn resolve(&self, root: &Path) -> Self {
        Self {
            sources: root.join(&self.sources),
            build: root.join(&self.build),
            mapping: root.join(&self.mapping),
            output: root.join(&self.output),
        }
    }

    pub fn usfm_dir(&self) -> PathBuf {
        self.build.join("usfm")
    }

    /// Encoded verses of one edition, e.g. `build/json/web_JER.json`.
    pub fn verses_json(&self, edition: &str, book: &str) -> PathBuf {
        self.build
            .join("json")
            .join(format!("{edition}_{}.json", book.to_uppercase()))
    }

    pub fn rows_csv(&self, book: &str) -> PathBuf {
        self.build.join(format!("{}_parallel.csv", book.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    /// Matched case-insensitively against unpacked source folder names.
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Latex,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub title: String,
    pub preamble: String,
    pub intro: Option<String>,
    pub format: OutputFormat,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            title: "Parallel Edition".to_string(),
            preamble: "preamble.tex".to_string(),
            intro: None,
            format: OutputFormat::Latex,
        }
    }
}

/// Header names of the reference columns in the mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingColumns {
    pub primary: String,
    pub secondary: String,
}

impl Default for MappingColumns {
    fn default() -> Self {
        Self {
            primary: "lxx_ref".to_string(),
            secondary: "mt_ref".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the configured paths
        let paths = &mut config.paths;
        for path in [
            &mut paths.sources,
            &mut paths.build,
            &mut paths.mapping,
            &mut paths.output,
        ] {
            if let Some(expanded) = Self::expand_path(path.as_path()) {
                *path = expanded;
            }
        }

        Ok(Some(config))
    }

    /// Loads the file if present, otherwise the defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path(config_path)?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
