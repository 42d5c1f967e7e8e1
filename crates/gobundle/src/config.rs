//! Bundler configuration
//!
//! Settings are layered, later layers overriding earlier ones:
//! 1. built-in defaults
//! 2. the user file `<config dir>/gobundle/gobundle.toml`
//! 3. `gobundle.toml` in the working directory, or the file passed with
//!    `--config`
//! 4. `GOBUNDLE_PACKAGE` / `GOBUNDLE_DELETE_SOURCES`
//! 5. command-line flags, applied by the binary
//!
//! The resulting [`Config`] is passed by reference into the bundler and never
//! read from global state.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Deserialize;

use crate::{
    dirs::{self, CONFIG_FILE_NAME},
    error::BundleError,
    parser::validate_package_name,
};

pub const ENV_PACKAGE: &str = "GOBUNDLE_PACKAGE";
pub const ENV_DELETE_SOURCES: &str = "GOBUNDLE_DELETE_SOURCES";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Name written into the bundle's package clause
    pub package: String,
    /// Remove the bundled sources after a successful run
    pub delete_sources: bool,
    /// File patterns, expanded in order
    pub files: Vec<String>,
    /// Write the bundle here instead of standard output
    pub output: Option<PathBuf>,
}

/// On-disk form; every key is optional so files can be layered
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    package: Option<String>,
    delete_sources: Option<bool>,
    files: Option<Vec<String>>,
    output: Option<PathBuf>,
}

impl Config {
    /// Load defaults, config files and environment overrides
    ///
    /// `explicit` must exist when given; the user and project files are
    /// optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_file) = dirs::user_config_file().filter(|path| path.is_file()) {
            config.merge_file(&user_file)?;
        }

        match explicit {
            Some(path) => config.merge_file(path)?,
            None => {
                let project_file = Path::new(CONFIG_FILE_NAME);
                if project_file.is_file() {
                    config.merge_file(project_file)?;
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields with the values present in the TOML file at `path`
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());

        if let Some(package) = file.package {
            self.package = package;
        }
        if let Some(delete_sources) = file.delete_sources {
            self.delete_sources = delete_sources;
        }
        if let Some(files) = file.files {
            self.files = files;
        }
        if let Some(output) = file.output {
            self.output = Some(output);
        }
        Ok(())
    }

    /// Apply `GOBUNDLE_*` overrides looked up through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(package) = lookup(ENV_PACKAGE).filter(|value| !value.is_empty()) {
            debug!("Package name from {ENV_PACKAGE}");
            self.package = package;
        }
        if let Some(value) = lookup(ENV_DELETE_SOURCES) {
            self.delete_sources = parse_bool(&value)
                .with_context(|| format!("Invalid value for {ENV_DELETE_SOURCES}"))?;
        }
        Ok(())
    }

    /// Checks that need no file access: package name and patterns
    pub fn validate(&self) -> Result<(), BundleError> {
        if self.package.is_empty() {
            return Err(BundleError::MissingPackageName);
        }
        validate_package_name(&self.package).map_err(|reason| BundleError::InvalidPackageName {
            name: self.package.clone(),
            reason,
        })?;
        if self.files.is_empty() {
            return Err(BundleError::NoPatterns);
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got \"{other}\""),
    }
}
