//! Page bundles read from an assets directory at runtime.

use crate::PageName;
use crate::provider::{BundleFuture, BundleProvider, ProviderError};
use clinic_i18n_lang::SupportedLocale;
use futures::FutureExt as _;
use futures::future;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};

/// Serves `{root}/{locale}/pages/{page}.json` from the filesystem.
///
/// Files are read on every fetch; the loader's cache keeps each result for
/// the session.
#[derive(Clone, Debug)]
pub struct AssetDirBundles {
    root: PathBuf,
    locales: Vec<SupportedLocale>,
}

impl AssetDirBundles {
    /// `locales` are the locale directories present under `root`.
    pub fn new(root: impl Into<PathBuf>, locales: Vec<SupportedLocale>) -> Self {
        Self {
            root: root.into(),
            locales,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn locales(&self) -> &[SupportedLocale] {
        &self.locales
    }

    fn file_path(&self, locale: SupportedLocale, page: PageName) -> PathBuf {
        self.root
            .join(locale.as_str())
            .join("pages")
            .join(format!("{}.json", page))
    }

    fn read(&self, locale: SupportedLocale, page: PageName) -> Result<Value, ProviderError> {
        let path = self.file_path(locale, page);
        let text = match fs_err::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(ProviderError::not_found(locale, page));
            },
            Err(error) => return Err(ProviderError::transient(locale, page, error)),
        };

        serde_json::from_str(&text).map_err(|source| ProviderError::Malformed {
            locale,
            page,
            source,
        })
    }
}

impl BundleProvider for AssetDirBundles {
    fn fetch(&self, locale: SupportedLocale, page: PageName) -> BundleFuture {
        if !self.has_locale(locale) {
            return future::ready(Err(ProviderError::not_found(locale, page))).boxed();
        }
        future::ready(self.read(locale, page)).boxed()
    }

    fn has_locale(&self, locale: SupportedLocale) -> bool {
        self.locales.contains(&locale)
    }
}
