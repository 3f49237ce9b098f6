#![doc = include_str!("../README.md")]

use clinic_i18n_lang::{SupportedLocale, UnsupportedLocaleError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, io};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "i18n.toml";

#[derive(Debug, Error)]
pub enum I18nConfigError {
    /// Configuration file not found.
    #[error("i18n.toml configuration file not found")]
    NotFound,
    /// Failed to read configuration file or assets directory.
    #[error("Failed to read configuration: {0}")]
    ReadError(#[from] io::Error),
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A locale key holds something other than a supported URL code.
    #[error("Invalid locale for `{key}`")]
    InvalidLocale {
        /// The configuration key.
        key: &'static str,
        #[source]
        source: UnsupportedLocaleError,
    },
    /// The assets directory contains a locale directory the site does not publish.
    #[error("Unsupported locale directory '{name}' found in assets directory")]
    UnsupportedLocaleDirectory {
        /// The directory name.
        name: String,
    },
}

/// Scroll settings for anchor navigation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ScrollConfig {
    /// Extra space left between the fixed header and the scrolled-to element.
    #[serde(default = "default_gutter")]
    pub gutter: f64,
    /// Animate scrolling instead of jumping.
    #[serde(default = "default_smooth")]
    pub smooth: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            gutter: default_gutter(),
            smooth: default_smooth(),
        }
    }
}

/// Storage key of the chosen locale when `preference_key` is not set.
pub const DEFAULT_PREFERENCE_KEY: &str = "lang";

fn default_gutter() -> f64 {
    8.0
}

fn default_smooth() -> bool {
    true
}

fn default_preference_key() -> String {
    DEFAULT_PREFERENCE_KEY.to_string()
}

/// The configuration for the locale layer.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct I18nConfig {
    /// Locale that unrecognized language signals degrade to.
    pub default_locale: String,
    /// Locale prepended to prefix-less paths before any locale is active.
    /// Defaults to `default_locale`.
    #[serde(default)]
    pub redirect_locale: Option<String>,
    /// Locale the resource loader retries with when a bundle is missing.
    /// Defaults to `default_locale`.
    #[serde(default)]
    pub fallback_locale: Option<String>,
    /// Directory holding page bundles.
    /// Expected structure: {assets_dir}/{locale}/pages/{page}.json
    pub assets_dir: PathBuf,
    /// Key under which the chosen locale is persisted.
    #[serde(default = "default_preference_key")]
    pub preference_key: String,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

impl I18nConfig {
    /// Builds a configuration in code, with every optional key at its default.
    pub fn new(default_locale: SupportedLocale, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            default_locale: default_locale.to_string(),
            redirect_locale: None,
            fallback_locale: None,
            assets_dir: assets_dir.into(),
            preference_key: default_preference_key(),
            scroll: ScrollConfig::default(),
        }
    }

    /// Reads the configuration from a path.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, I18nConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(I18nConfigError::NotFound);
        }

        let content = fs_err::read_to_string(path)?;
        let config: I18nConfig = toml::from_str(&content)?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "loaded i18n configuration");
        Ok(config)
    }

    /// Reads the configuration from the manifest directory.
    pub fn read_from_manifest_dir() -> Result<Self, I18nConfigError> {
        let manifest_dir = env::var("CARGO_MANIFEST_DIR").map_err(|_| I18nConfigError::NotFound)?;
        Self::from_manifest_dir(Path::new(&manifest_dir))
    }

    /// Reads `i18n.toml` from the given directory.
    pub fn from_manifest_dir(manifest_dir: &Path) -> Result<Self, I18nConfigError> {
        Self::read_from_path(manifest_dir.join(CONFIG_FILE_NAME))
    }

    /// Checks that every locale key parses.
    pub fn validate(&self) -> Result<(), I18nConfigError> {
        self.default_locale()?;
        self.redirect_locale()?;
        self.fallback_locale()?;
        Ok(())
    }

    pub fn default_locale(&self) -> Result<SupportedLocale, I18nConfigError> {
        parse_locale("default_locale", &self.default_locale)
    }

    pub fn redirect_locale(&self) -> Result<SupportedLocale, I18nConfigError> {
        match &self.redirect_locale {
            Some(raw) => parse_locale("redirect_locale", raw),
            None => self.default_locale(),
        }
    }

    pub fn fallback_locale(&self) -> Result<SupportedLocale, I18nConfigError> {
        match &self.fallback_locale {
            Some(raw) => parse_locale("fallback_locale", raw),
            None => self.default_locale(),
        }
    }

    /// Returns the path to the assets directory from a base directory.
    /// If `base_dir` is `None`, uses `CARGO_MANIFEST_DIR` environment variable.
    pub fn assets_dir_from_base(
        &self,
        base_dir: Option<&Path>,
    ) -> Result<PathBuf, I18nConfigError> {
        let base = match base_dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                let manifest_dir =
                    env::var("CARGO_MANIFEST_DIR").map_err(|_| I18nConfigError::NotFound)?;
                PathBuf::from(manifest_dir)
            },
        };

        Ok(base.join(&self.assets_dir))
    }

    /// Returns the locales that have a directory under the assets directory,
    /// in [`SupportedLocale::ALL`] order.
    pub fn available_locales_from_base(
        &self,
        base_dir: Option<&Path>,
    ) -> Result<Vec<SupportedLocale>, I18nConfigError> {
        let assets_path = self.assets_dir_from_base(base_dir)?;
        let mut locales = Vec::new();

        for entry in fs_err::read_dir(&assets_path)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let name = entry.file_name().into_string().map_err(|raw| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Assets directory contains a non UTF-8 entry: {:?}", raw),
                )
            })?;

            let locale = SupportedLocale::from_code(&name)
                .ok_or(I18nConfigError::UnsupportedLocaleDirectory { name })?;
            if !locales.contains(&locale) {
                locales.push(locale);
            }
        }

        locales.sort();
        Ok(locales)
    }
}

fn parse_locale(key: &'static str, raw: &str) -> Result<SupportedLocale, I18nConfigError> {
    raw.parse()
        .map_err(|source| I18nConfigError::InvalidLocale { key, source })
}
