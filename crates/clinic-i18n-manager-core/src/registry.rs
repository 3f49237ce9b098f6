use crate::provider::{BundleFuture, BundleProvider, ProviderError};
use crate::PageName;
use clinic_i18n_lang::SupportedLocale;
use futures::FutureExt as _;
use futures::future;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A bundle declared at compile time.
///
/// Submit one with `inventory::submit!` to have it picked up by
/// [`BundleRegistry::with_discovered_bundles`].
#[derive(Debug)]
pub struct StaticBundle {
    pub locale: SupportedLocale,
    pub page: PageName,
    /// JSON text of the bundle.
    pub json: &'static str,
}

impl StaticBundle {
    pub const fn new(locale: SupportedLocale, page: PageName, json: &'static str) -> Self {
        Self { locale, page, json }
    }
}

inventory::collect!(StaticBundle);

type LoaderFn = dyn Fn() -> BundleFuture + Send + Sync;

enum BundleSource {
    Json(&'static str),
    Value(Arc<Value>),
    Loader(Arc<LoaderFn>),
}

impl fmt::Debug for BundleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(json) => f.debug_tuple("Json").field(&json.len()).finish(),
            Self::Value(_) => f.write_str("Value"),
            Self::Loader(_) => f.write_str("Loader"),
        }
    }
}

/// Explicit `(locale, page)` to bundle source table.
#[derive(Debug, Default)]
pub struct BundleRegistry {
    sources: FxHashMap<(SupportedLocale, PageName), BundleSource>,
}

impl BundleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every [`StaticBundle`] linked into the binary.
    pub fn with_discovered_bundles() -> Self {
        let mut registry = Self::default();
        for bundle in inventory::iter::<StaticBundle>() {
            tracing::debug!(
                locale = %bundle.locale,
                page = %bundle.page,
                "Discovered static bundle"
            );
            registry.register_json(bundle.locale, bundle.page, bundle.json);
        }
        registry
    }

    /// Registers JSON text, parsed on every fetch.
    pub fn register_json(
        &mut self,
        locale: SupportedLocale,
        page: PageName,
        json: &'static str,
    ) -> &mut Self {
        self.insert(locale, page, BundleSource::Json(json))
    }

    pub fn register_value(
        &mut self,
        locale: SupportedLocale,
        page: PageName,
        value: Value,
    ) -> &mut Self {
        self.insert(locale, page, BundleSource::Value(Arc::new(value)))
    }

    /// Registers an async loader, called on every fetch of the pair.
    pub fn register_loader<F>(
        &mut self,
        locale: SupportedLocale,
        page: PageName,
        loader: F,
    ) -> &mut Self
    where
        F: Fn() -> BundleFuture + Send + Sync + 'static,
    {
        self.insert(locale, page, BundleSource::Loader(Arc::new(loader)))
    }

    fn insert(
        &mut self,
        locale: SupportedLocale,
        page: PageName,
        source: BundleSource,
    ) -> &mut Self {
        if self.sources.insert((locale, page), source).is_some() {
            tracing::warn!(%locale, %page, "Replacing previously registered bundle");
        }
        self
    }

    pub fn contains(&self, locale: SupportedLocale, page: PageName) -> bool {
        self.sources.contains_key(&(locale, page))
    }

    /// Locales with at least one registered page, in [`SupportedLocale::ALL`] order.
    pub fn locales(&self) -> Vec<SupportedLocale> {
        SupportedLocale::ALL
            .into_iter()
            .filter(|locale| self.sources.keys().any(|(l, _)| l == locale))
            .collect()
    }

    /// Pages registered for `locale`, sorted by name.
    pub fn pages(&self, locale: SupportedLocale) -> Vec<PageName> {
        let mut pages: Vec<_> = self
            .sources
            .keys()
            .filter(|(l, _)| *l == locale)
            .map(|(_, page)| *page)
            .collect();
        pages.sort();
        pages
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl BundleProvider for BundleRegistry {
    fn fetch(&self, locale: SupportedLocale, page: PageName) -> BundleFuture {
        match self.sources.get(&(locale, page)) {
            None => future::ready(Err(ProviderError::not_found(locale, page))).boxed(),
            Some(BundleSource::Json(json)) => {
                let parsed = serde_json::from_str(json).map_err(|source| ProviderError::Malformed {
                    locale,
                    page,
                    source,
                });
                future::ready(parsed).boxed()
            },
            Some(BundleSource::Value(value)) => future::ready(Ok(Value::clone(value))).boxed(),
            Some(BundleSource::Loader(loader)) => loader(),
        }
    }

    fn has_locale(&self, locale: SupportedLocale) -> bool {
        self.sources.keys().any(|(l, _)| *l == locale)
    }
}
