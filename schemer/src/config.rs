//! Project configuration.
//!
//! A project is described by a `.schemer.toml` file next to the schema:
//!
//! ```toml
//! topics_root = "${env:DOCS_REPO}/desktop-src"
//! topics_folder = "nativewifi"
//! schema_display_name = "WLAN_profile"
//! schema_name_for_filenames = "wlan-profileschema"
//! xsd = "WLAN_profile_v1.xsd"
//! # overrides = "WLAN_profile-configuration.txt"
//! # date = "06/30/2025"
//! ```
//!
//! `${env:VAR}` placeholders are expanded before parsing. Relative paths are
//! resolved against the directory of the configuration file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ctx::{AppContext, PathConfig, RunConfig},
    overrides::OverrideRegistry,
    report::RunReport,
    utils::replace_env_placeholders,
};

const DATE_FORMAT: &str = "%m/%d/%Y";

/// Errors raised while loading the project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can not open config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("`{field}` must not be empty")]
    Empty { field: &'static str },

    #[error("`date` must be MM/DD/YYYY, got `{value}`")]
    InvalidDate { value: String },
}

/// Contents of `.schemer.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SchemerConfig {
    /// Directory that contains the topics folder.
    pub topics_root: PathBuf,
    /// Folder holding the current topics. Generated topics go to `<topics_folder>_gen`.
    pub topics_folder: String,
    /// Schema name used in titles and in the default override file name.
    pub schema_display_name: String,
    /// Prefix of every topic file name, for example `wlan-profileschema`.
    pub schema_name_for_filenames: String,
    /// The XSD file to document.
    pub xsd: PathBuf,
    /// Override file. Defaults to `<schema_display_name>-configuration.txt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<PathBuf>,
    /// Pins `ms.date` (MM/DD/YYYY) so that repeated runs produce identical files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl SchemerConfig {
    /// Default configuration file name.
    pub const FILE_NAME: &'static str = ".schemer.toml";

    /// Loads and validates the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        let config = Self::from_toml(&text, base_dir).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parses `text`, resolving relative paths against `base_dir`.
    pub fn from_toml(text: &str, base_dir: &Path) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(&replace_env_placeholders(text))?;
        config.topics_root = base_dir.join(&config.topics_root);
        config.xsd = base_dir.join(&config.xsd);
        config.overrides = config.overrides.map(|p| base_dir.join(p));
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("topics_folder", self.topics_folder.as_str()),
            ("schema_display_name", self.schema_display_name.as_str()),
            ("schema_name_for_filenames", self.schema_name_for_filenames.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::Empty { field: *field });
        }
        if let Some(date) = &self.date {
            parse_date(date)?;
        }
        Ok(())
    }

    /// Override file path, explicit or derived from the display name.
    pub fn overrides_path(&self) -> PathBuf {
        self.overrides.clone().unwrap_or_else(|| {
            self.xsd
                .parent()
                .unwrap_or(Path::new("."))
                .join(format!("{}-configuration.txt", self.schema_display_name))
        })
    }

    /// The `ms.date` for this run: the pinned date, or today.
    pub fn run_date(&self) -> Result<String, ConfigError> {
        match &self.date {
            Some(date) => Ok(parse_date(date)?.format(DATE_FORMAT).to_string()),
            None => Ok(chrono::Local::now().format(DATE_FORMAT).to_string()),
        }
    }

    /// Builds the run context, loading the override file on the way.
    pub fn into_context(self, report: &mut RunReport) -> anyhow::Result<AppContext> {
        self.validate()?;
        let overrides_path = self.overrides_path();
        let overrides = OverrideRegistry::load(&overrides_path, report)?;
        let date = self.run_date()?;

        Ok(AppContext {
            paths: PathConfig::new(&self.topics_root, &self.topics_folder),
            run: RunConfig {
                schema_display_name: self.schema_display_name,
                file_prefix: self.schema_name_for_filenames,
                xsd: self.xsd,
                overrides: overrides_path,
                date,
            },
            overrides,
        })
    }

    /// JSON Schema of the configuration file, pretty-printed.
    pub fn json_schema() -> serde_json::Result<String> {
        let schema = schemars::schema_for!(SchemerConfig);
        serde_json::to_string_pretty(&schema)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ConfigError::InvalidDate {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
topics_root = "${env:SCHEMER_CONFIG_TEST_ROOT}/desktop-src"
topics_folder = "nativewifi"
schema_display_name = "WLAN_profile"
schema_name_for_filenames = "wlan-profileschema"
xsd = "WLAN_profile_v1.xsd"
date = "6/30/2025"
"#;

    #[test]
    fn test_load_expands_and_resolves() {
        unsafe {
            std::env::set_var("SCHEMER_CONFIG_TEST_ROOT", "/repos/docs");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SchemerConfig::FILE_NAME);
        std::fs::write(&path, SAMPLE).unwrap();

        let config = SchemerConfig::load(&path).unwrap();
        assert_eq!(config.topics_root, PathBuf::from("/repos/docs/desktop-src"));
        assert_eq!(config.xsd, dir.path().join("WLAN_profile_v1.xsd"));
        assert_eq!(
            config.overrides_path(),
            dir.path().join("WLAN_profile-configuration.txt")
        );
        assert_eq!(config.run_date().unwrap(), "06/30/2025");
    }

    #[test]
    fn test_invalid_date() {
        let mut config = SchemerConfig::from_toml(SAMPLE, Path::new("/p")).unwrap();
        config.date = Some("2025-06-30".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_empty_field() {
        let mut config = SchemerConfig::from_toml(SAMPLE, Path::new("/p")).unwrap();
        config.schema_name_for_filenames = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Empty {
                field: "schema_name_for_filenames"
            })
        ));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let text = format!("{SAMPLE}\nbogus = 1\n");
        assert!(SchemerConfig::from_toml(&text, Path::new("/p")).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = SchemerConfig::load(Path::new("/nonexistent/.schemer.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_json_schema_lists_fields() {
        let schema = SchemerConfig::json_schema().unwrap();
        assert!(schema.contains("schema_name_for_filenames"));
        assert!(schema.contains("topics_root"));
    }
}
