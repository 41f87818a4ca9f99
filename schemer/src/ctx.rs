//! Run context.
//!
//! [`AppContext`] is built once from the project configuration before the
//! survey starts and is only ever borrowed afterwards: every phase sees the
//! same directories, naming scheme and override rules.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use colored::Colorize;
use xsdtree::Schema;

use crate::{
    overrides::OverrideRegistry,
    utils::{landing_file_name, topic_file_name},
};

/// Where legacy topics are read from and generated topics are written to.
#[derive(Debug, Default, Clone)]
pub struct PathConfig {
    /// Directory holding the current topics, `<topics_root>/<topics_folder>`.
    pub legacy_dir: PathBuf,
    /// Sibling output directory, `<topics_root>/<topics_folder>_gen`.
    pub generated_dir: PathBuf,
}

impl PathConfig {
    pub fn new(topics_root: &Path, topics_folder: &str) -> Self {
        Self {
            legacy_dir: topics_root.join(topics_folder),
            generated_dir: topics_root.join(format!("{topics_folder}_gen")),
        }
    }
}

/// Settings that stay fixed for the whole run.
#[derive(Debug, Default, Clone)]
pub struct RunConfig {
    /// Human-facing schema name, for example `WLAN_profile`.
    pub schema_display_name: String,
    /// File name prefix, for example `wlan-profileschema`.
    pub file_prefix: String,
    /// The schema to document.
    pub xsd: PathBuf,
    /// The override sidecar file (it may not exist).
    pub overrides: PathBuf,
    /// `ms.date` written into every generated topic, `MM/DD/YYYY`.
    pub date: String,
}

/// The immutable state shared by survey, generate and commit.
#[derive(Debug, Default, Clone)]
pub struct AppContext {
    pub paths: PathConfig,
    pub run: RunConfig,
    pub overrides: OverrideRegistry,
}

impl AppContext {
    /// File name of the topic for `element` nested in `parent`.
    pub fn topic_file_name(&self, element: &str, parent: Option<&str>) -> String {
        topic_file_name(&self.run.file_prefix, element, parent)
    }

    /// Predicted path of the legacy topic for `element`.
    pub fn legacy_topic(&self, element: &str, parent: Option<&str>) -> PathBuf {
        self.paths
            .legacy_dir
            .join(self.topic_file_name(element, parent))
    }

    /// Path the generated topic for `element` is written to.
    pub fn generated_topic(&self, element: &str, parent: Option<&str>) -> PathBuf {
        self.paths
            .generated_dir
            .join(self.topic_file_name(element, parent))
    }

    pub fn landing_file_name(&self) -> String {
        landing_file_name(&self.run.file_prefix)
    }

    pub fn legacy_landing(&self) -> PathBuf {
        self.paths.legacy_dir.join(self.landing_file_name())
    }

    pub fn generated_landing(&self) -> PathBuf {
        self.paths.generated_dir.join(self.landing_file_name())
    }

    /// Compiles the configured schema.
    pub fn load_schema(&self) -> anyhow::Result<Schema> {
        println!(
            "{}",
            format!("Reading schema {}", self.run.xsd.display())
                .bold()
                .purple()
        );
        Schema::from_file(&self.run.xsd)
            .with_context(|| format!("failed to compile {}", self.run.xsd.display()))
    }

    /// Fails unless the legacy topics directory exists.
    pub fn check_legacy_dir(&self) -> anyhow::Result<()> {
        if !self.paths.legacy_dir.is_dir() {
            bail!("{} doesn't exist.", self.paths.legacy_dir.display());
        }
        Ok(())
    }

    /// Creates the output directory, which must not exist yet.
    pub fn prepare_generated_dir(&self) -> anyhow::Result<()> {
        let dir = &self.paths.generated_dir;
        if dir.exists() {
            bail!(
                "{} already exists. Remove it or pass --clean.",
                dir.display()
            );
        }
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        debug!("created {}", dir.display());
        Ok(())
    }

    /// Removes the output directory left over from an earlier run.
    pub fn clean_generated_dir(&self) -> anyhow::Result<bool> {
        let dir = &self.paths.generated_dir;
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("failed to remove {}", dir.display()))?;
        println!("{}", format!("Removed {}", dir.display()).yellow());
        Ok(true)
    }
}
