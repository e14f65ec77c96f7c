//! Reading plan configuration.
//!
//! On disk the configuration is a JSON object with camelCase keys; every key
//! is optional and falls back to [`PlanConfig::default`].
//!
//! ```json
//! { "otChaptersPerDay": 2, "defaultVersion": "ESV", "logFolder": "./notes" }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use ::url::Url;

/// Reading plan parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    /// Old Testament chapters per day.
    pub ot_chapters_per_day: u32,
    /// Gospel chapters per day.
    pub gospel_chapters_per_day: u32,
    /// Acts-through-Revelation chapters per day.
    pub nt_chapters_per_day: u32,
    /// Version used when none is given on the command line.
    pub default_version: String,
    /// Passage endpoint; query parameters are appended verbatim.
    #[serde(rename = "bibleGatewayBaseUrl")]
    pub base_url: String,
    /// Folder for saved Markdown files, relative to the working directory.
    pub log_folder: String,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            ot_chapters_per_day: 3,
            gospel_chapters_per_day: 1,
            nt_chapters_per_day: 1,
            default_version: "NIV".to_string(),
            base_url: "https://www.biblegateway.com/passage/?".to_string(),
            log_folder: "./Log".to_string(),
        }
    }
}

/// Partial configuration; unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigOverrides {
    pub ot_chapters_per_day: Option<u32>,
    pub gospel_chapters_per_day: Option<u32>,
    pub nt_chapters_per_day: Option<u32>,
    pub default_version: Option<String>,
    #[serde(rename = "bibleGatewayBaseUrl")]
    pub base_url: Option<String>,
    pub log_folder: Option<String>,
}

impl ConfigOverrides {
    /// Parses overrides from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads overrides from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("reading configuration from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl PlanConfig {
    /// Checks every field; the first problem found is reported.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("otChaptersPerDay", self.ot_chapters_per_day),
            ("gospelChaptersPerDay", self.gospel_chapters_per_day),
            ("ntChaptersPerDay", self.nt_chapters_per_day),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a positive integer, got {value}"
                )));
            }
        }

        let base = Url::parse(&self.base_url).map_err(|_| {
            Error::InvalidConfig(format!("Invalid bibleGatewayBaseUrl: \"{}\"", self.base_url))
        })?;
        if base.scheme() != "https" {
            return Err(Error::InvalidConfig(format!(
                "bibleGatewayBaseUrl must use HTTPS. Got \"{}:\" in \"{}\"",
                base.scheme(),
                self.base_url
            )));
        }

        if self.default_version.trim().is_empty() {
            return Err(Error::InvalidConfig("defaultVersion must be a non-empty string".to_string()));
        }
        if self.log_folder.trim().is_empty() {
            return Err(Error::InvalidConfig("logFolder must be a non-empty string".to_string()));
        }
        Ok(())
    }

    /// Applies `overrides` on top of `self` and validates the result.
    pub fn merge(&self, overrides: ConfigOverrides) -> Result<PlanConfig> {
        let merged = PlanConfig {
            ot_chapters_per_day: overrides.ot_chapters_per_day.unwrap_or(self.ot_chapters_per_day),
            gospel_chapters_per_day: overrides
                .gospel_chapters_per_day
                .unwrap_or(self.gospel_chapters_per_day),
            nt_chapters_per_day: overrides.nt_chapters_per_day.unwrap_or(self.nt_chapters_per_day),
            default_version: overrides
                .default_version
                .unwrap_or_else(|| self.default_version.clone()),
            base_url: overrides.base_url.unwrap_or_else(|| self.base_url.clone()),
            log_folder: overrides.log_folder.unwrap_or_else(|| self.log_folder.clone()),
        };
        merged.validate()?;
        Ok(merged)
    }

    /// Defaults, overridden by the JSON file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<PlanConfig> {
        match path {
            Some(path) => merge_config(ConfigOverrides::from_json_file(path)?),
            None => Ok(PlanConfig::default()),
        }
    }
}

/// Applies `overrides` on top of the defaults.
pub fn merge_config(overrides: ConfigOverrides) -> Result<PlanConfig> {
    PlanConfig::default().merge(overrides)
}
