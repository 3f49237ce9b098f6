//! Page bundles embedded into the binary with `rust-embed`.

use crate::provider::{BundleFuture, BundleProvider, ProviderError};
use crate::PageName;
use clinic_i18n_lang::SupportedLocale;
use futures::FutureExt as _;
use futures::future;
use rust_embed::RustEmbed;
use std::marker::PhantomData;

/// Serves `{locale}/pages/{page}.json` files from a [`RustEmbed`] folder.
#[derive(Debug)]
pub struct EmbeddedBundles<T: RustEmbed> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T: RustEmbed> Default for EmbeddedBundles<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RustEmbed> EmbeddedBundles<T> {
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }

    fn file_path(locale: SupportedLocale, page: PageName) -> String {
        format!("{}/pages/{}.json", locale, page)
    }

    /// Every `(locale, page name)` pair present in the folder.
    ///
    /// Directories that are not a supported locale code are skipped.
    pub fn discover() -> Vec<(SupportedLocale, String)> {
        let mut found: Vec<(SupportedLocale, String)> = T::iter()
            .filter_map(|file_path| {
                let (locale, rest) = file_path.split_once('/')?;
                let locale = SupportedLocale::from_code(locale)?;
                let page = rest.strip_prefix("pages/")?.strip_suffix(".json")?;
                (!page.contains('/')).then(|| (locale, page.to_owned()))
            })
            .collect();

        found.sort();
        found
    }

    /// Locales with at least one page, in [`SupportedLocale::ALL`] order.
    pub fn discover_locales() -> Vec<SupportedLocale> {
        let mut locales: Vec<_> = Self::discover().into_iter().map(|(l, _)| l).collect();
        locales.dedup();
        locales
    }
}

impl<T: RustEmbed + 'static> BundleProvider for EmbeddedBundles<T> {
    fn fetch(&self, locale: SupportedLocale, page: PageName) -> BundleFuture {
        let file_path = Self::file_path(locale, page);

        let result = match T::get(&file_path) {
            Some(file) => serde_json::from_slice(&file.data)
                .map_err(|source| ProviderError::Malformed { locale, page, source }),
            None => Err(ProviderError::not_found(locale, page)),
        };

        future::ready(result).boxed()
    }

    fn has_locale(&self, locale: SupportedLocale) -> bool {
        let prefix = format!("{}/pages/", locale);
        T::iter().any(|file_path| file_path.starts_with(&prefix))
    }
}
