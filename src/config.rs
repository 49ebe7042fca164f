//! Configuration for the converter
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (bible-version-codes.toml)
//! - Environment variables (BVC__*)
//!
//! ## Example config file (bible-version-codes.toml):
//! ```toml
//! [source]
//! path = "sourceXML/BibleVersionCodes.xml"
//!
//! [export]
//! output_dir = "derivedFormats"
//! base_name = "BibleVersionCodes"
//! formats = ["json", "c", "rust", "cache"]
//! output_format = "pretty"
//!
//! [validation]
//! fail_on_errors = true
//! ```

use config_crate::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::export::ExportFormat;

/// Main configuration for the converter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Where the source document lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_path")]
    pub path: PathBuf,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the derived files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File stem shared by every derived file
    #[serde(default = "default_base_name")]
    pub base_name: String,

    /// Formats written by a plain `export`
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,

    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Refuse to export when the load reported errors
    #[serde(default)]
    pub fail_on_errors: bool,
}

fn default_source_path() -> PathBuf {
    PathBuf::from("sourceXML/BibleVersionCodes.xml")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("derivedFormats")
}

fn default_base_name() -> String {
    "BibleVersionCodes".to_string()
}

fn default_formats() -> Vec<ExportFormat> {
    vec![ExportFormat::Json, ExportFormat::Cache]
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            base_name: default_base_name(),
            formats: default_formats(),
            output_format: OutputFormat::default(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        Self::load_layered(config_path, None)
    }

    /// `env` stands in for the process environment when given
    fn load_layered(config_path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "bible-version-codes.toml",
            ".bible-version-codes.toml",
            "config/bible-version-codes.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("org", "openscriptures", "bible-version-codes") {
            let xdg_config = dirs.config_dir().join("bible-version-codes.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // BVC__EXPORT__OUTPUT_DIR=out, BVC__EXPORT__FORMATS=json,c
        builder = builder.add_source(
            Environment::with_prefix("BVC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("export.formats")
                .source(env),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_toml()?)
    }

    /// The configuration as TOML text
    pub fn to_toml(&self) -> std::io::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Source path, resolved against the working directory
    pub fn source_path(&self) -> PathBuf {
        resolve(&self.source.path)
    }

    /// Output directory, resolved against the working directory
    pub fn output_dir(&self) -> PathBuf {
        resolve(&self.export.output_dir)
    }
}

fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(config.source.path, PathBuf::from("sourceXML/BibleVersionCodes.xml"));
        assert_eq!(config.export.base_name, "BibleVersionCodes");
        assert_eq!(config.export.formats, vec![ExportFormat::Json, ExportFormat::Cache]);
        assert!(!config.validation.fail_on_errors);
    }

    #[test]
    fn test_serialize_config() {
        let config = ConverterConfig::default();
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[export]"));
        assert!(toml_str.contains("output_format = \"pretty\""));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[export]\nformats = [\"c\", \"rust\"]\noutput_format = \"compact\"\n\n[validation]\nfail_on_errors = true\n",
        )
        .unwrap();

        let config = ConverterConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.export.formats, vec![ExportFormat::C, ExportFormat::Rust]);
        assert_eq!(config.export.output_format, OutputFormat::Compact);
        assert!(config.validation.fail_on_errors);
        assert_eq!(config.export.base_name, "BibleVersionCodes");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConverterConfig::load_from(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_environment_overrides() {
        let env: Map<String, String> = [
            ("BVC__EXPORT__BASE_NAME", "VersionCodes"),
            ("BVC__EXPORT__FORMATS", "c,rust"),
            ("BVC__VALIDATION__FAIL_ON_ERRORS", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = ConverterConfig::load_layered(None, Some(env)).unwrap();
        assert_eq!(config.export.base_name, "VersionCodes");
        assert_eq!(config.export.formats, vec![ExportFormat::C, ExportFormat::Rust]);
        assert!(config.validation.fail_on_errors);
        assert_eq!(config.export.output_format, OutputFormat::Pretty);
    }
}
