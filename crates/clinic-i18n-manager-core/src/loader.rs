//! The session bundle cache and the per-page "last started wins" commit rule.

use crate::bundle::ResourceBundle;
use crate::fallback::{fallback_chain, resolve_fallback_locale};
use crate::provider::{BundleProvider, ProviderError};
use crate::PageName;
use clinic_i18n_lang::SupportedLocale;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Result of a [`ResourceLoader::refresh`].
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// The bundle became the page's current bundle.
    Applied(Arc<ResourceBundle>),
    /// A newer refresh of the same page was started first; the result was dropped.
    Superseded { generation: u64 },
}

impl LoadOutcome {
    pub fn applied(&self) -> Option<&Arc<ResourceBundle>> {
        match self {
            Self::Applied(bundle) => Some(bundle),
            Self::Superseded { .. } => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }
}

/// Proof that a refresh of `page` was started as request number `generation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    page: PageName,
    generation: u64,
}

impl LoadTicket {
    pub fn page(&self) -> PageName {
        self.page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Default)]
struct PageSlot {
    generation: u64,
    current: Option<Arc<ResourceBundle>>,
}

struct LoaderInner {
    provider: Arc<dyn BundleProvider>,
    fallback: SupportedLocale,
    cache: RwLock<FxHashMap<(SupportedLocale, PageName), Arc<ResourceBundle>>>,
    slots: Mutex<FxHashMap<PageName, PageSlot>>,
}

/// Loads page bundles through a [`BundleProvider`].
///
/// Cloning is cheap and every clone shares the cache and the current bundles.
#[derive(Clone)]
pub struct ResourceLoader {
    inner: Arc<LoaderInner>,
}

impl fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("fallback", &self.inner.fallback)
            .field("cached", &self.inner.cache.read().len())
            .finish_non_exhaustive()
    }
}

impl ResourceLoader {
    pub fn new(provider: impl BundleProvider, fallback: SupportedLocale) -> Self {
        Self::from_shared(Arc::new(provider), fallback)
    }

    pub fn from_shared(provider: Arc<dyn BundleProvider>, fallback: SupportedLocale) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                provider,
                fallback,
                cache: RwLock::new(FxHashMap::default()),
                slots: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    pub fn fallback_locale(&self) -> SupportedLocale {
        self.inner.fallback
    }

    /// Whether the provider has any content for `locale`.
    pub fn has_content_for(&self, locale: SupportedLocale) -> bool {
        self.inner.provider.has_locale(locale)
    }

    /// The first locale of `requested`'s fallback chain that has content.
    pub fn content_locale(&self, requested: SupportedLocale) -> Option<SupportedLocale> {
        let available: Vec<_> = SupportedLocale::ALL
            .into_iter()
            .filter(|locale| self.has_content_for(*locale))
            .collect();
        resolve_fallback_locale(requested, &[self.inner.fallback], &available)
    }

    /// A previously loaded bundle for exactly this pair.
    pub fn cached(&self, locale: SupportedLocale, page: PageName) -> Option<Arc<ResourceBundle>> {
        self.inner.cached(locale, page)
    }

    /// The bundle committed by the newest finished refresh of `page`.
    pub fn current(&self, page: PageName) -> Option<Arc<ResourceBundle>> {
        self.inner
            .slots
            .lock()
            .get(&page)
            .and_then(|slot| slot.current.clone())
    }

    /// Resolves a bundle without touching the page's current bundle.
    ///
    /// Never fails: a missing bundle is answered with the fallback locale's
    /// bundle, or an empty placeholder when that is missing too.
    pub fn load(
        &self,
        locale: SupportedLocale,
        page: PageName,
    ) -> impl Future<Output = Arc<ResourceBundle>> + Send + 'static {
        let inner = Arc::clone(&self.inner);
        async move { inner.resolve(locale, page).await }
    }

    /// Starts a new request generation for `page`, invalidating older ones.
    pub fn begin(&self, page: PageName) -> LoadTicket {
        let mut slots = self.inner.slots.lock();
        let slot = slots.entry(page).or_default();
        slot.generation += 1;
        LoadTicket {
            page,
            generation: slot.generation,
        }
    }

    /// Makes `bundle` current for the ticket's page if the ticket is still the newest.
    pub fn commit(&self, ticket: LoadTicket, bundle: Arc<ResourceBundle>) -> LoadOutcome {
        let mut slots = self.inner.slots.lock();
        let slot = slots.entry(ticket.page).or_default();

        if slot.generation != ticket.generation {
            tracing::debug!(
                page = %ticket.page,
                stale = ticket.generation,
                newest = slot.generation,
                "Discarding superseded bundle"
            );
            return LoadOutcome::Superseded {
                generation: ticket.generation,
            };
        }

        slot.current = Some(Arc::clone(&bundle));
        LoadOutcome::Applied(bundle)
    }

    /// Loads `page` in `locale` and makes it current unless a newer refresh
    /// of the page has been started in the meantime.
    ///
    /// The generation is taken when this method is called, not when the
    /// returned future is first polled.
    pub fn refresh(
        &self,
        locale: SupportedLocale,
        page: PageName,
    ) -> impl Future<Output = LoadOutcome> + Send + 'static {
        let ticket = self.begin(page);
        let loader = self.clone();
        async move {
            let bundle = loader.inner.resolve(locale, page).await;
            loader.commit(ticket, bundle)
        }
    }
}

impl LoaderInner {
    fn cached(&self, locale: SupportedLocale, page: PageName) -> Option<Arc<ResourceBundle>> {
        self.cache.read().get(&(locale, page)).cloned()
    }

    fn store(
        &self,
        locale: SupportedLocale,
        page: PageName,
        content: Value,
    ) -> Arc<ResourceBundle> {
        let mut cache = self.cache.write();
        // A concurrent load may have won; the first stored bundle stays.
        Arc::clone(
            cache
                .entry((locale, page))
                .or_insert_with(|| Arc::new(ResourceBundle::new(locale, page, content))),
        )
    }

    async fn resolve(&self, requested: SupportedLocale, page: PageName) -> Arc<ResourceBundle> {
        for locale in fallback_chain(requested, &[self.fallback]) {
            let bundle = match self.cached(locale, page) {
                Some(hit) => Some(hit),
                None => match self.fetch_with_retry(locale, page).await {
                    Ok(content) => Some(self.store(locale, page, content)),
                    Err(error) => {
                        tracing::warn!(%locale, %page, %error, "Bundle fetch failed");
                        None
                    },
                },
            };

            if let Some(bundle) = bundle {
                if locale == requested {
                    return bundle;
                }
                tracing::info!(%requested, %locale, %page, "Serving fallback bundle");
                return Arc::new(bundle.fallback_for(requested));
            }
        }

        tracing::warn!(%requested, %page, "No bundle available, serving placeholder");
        Arc::new(ResourceBundle::placeholder(requested, page))
    }

    async fn fetch_with_retry(
        &self,
        locale: SupportedLocale,
        page: PageName,
    ) -> Result<Value, ProviderError> {
        match self.provider.fetch(locale, page).await {
            Err(error) if error.is_transient() => {
                tracing::debug!(%locale, %page, %error, "Retrying transient bundle failure");
                self.provider.fetch(locale, page).await
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::BundleFuture;
    use crate::registry::BundleRegistry;
    use crate::BundleOrigin;
    use futures::FutureExt as _;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::future;
    use serde_json::json;
    use std::pin::pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> BundleRegistry {
        let mut registry = BundleRegistry::new();
        registry
            .register_value(SupportedLocale::En, PageName::ABOUT, json!({ "title": "About" }))
            .register_value(SupportedLocale::Ko, PageName::ABOUT, json!({ "title": "소개" }));
        registry
    }

    /// Fetches block until the test releases the locale's response.
    #[derive(Default)]
    struct GatedProvider {
        gates: Mutex<FxHashMap<SupportedLocale, oneshot::Receiver<Value>>>,
    }

    impl GatedProvider {
        fn gate(&self, locale: SupportedLocale) -> oneshot::Sender<Value> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().insert(locale, rx);
            tx
        }
    }

    impl BundleProvider for GatedProvider {
        fn fetch(&self, locale: SupportedLocale, page: PageName) -> BundleFuture {
            match self.gates.lock().remove(&locale) {
                Some(rx) => rx
                    .map(move |result| {
                        result.map_err(|canceled| ProviderError::transient(locale, page, canceled))
                    })
                    .boxed(),
                None => future::ready(Err(ProviderError::not_found(locale, page))).boxed(),
            }
        }
    }

    /// Fails transiently a fixed number of times, then succeeds.
    struct FlakyProvider {
        failures_left: AtomicUsize,
        calls: AtomicUsize,
    }

    impl BundleProvider for FlakyProvider {
        fn fetch(&self, locale: SupportedLocale, page: PageName) -> BundleFuture {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let failed = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            let result = if failed {
                Err(ProviderError::transient(locale, page, anyhow::anyhow!("connection reset")))
            } else {
                Ok(json!({ "locale": locale.as_str() }))
            };
            future::ready(result).boxed()
        }
    }

    #[test]
    fn loads_exact_bundle_and_caches_it() {
        let loader = ResourceLoader::new(registry(), SupportedLocale::En);
        let bundle = block_on(loader.load(SupportedLocale::Ko, PageName::ABOUT));

        assert_eq!(bundle.origin(), BundleOrigin::Exact);
        assert_eq!(bundle.text("title"), Some("소개"));

        let cached = loader.cached(SupportedLocale::Ko, PageName::ABOUT).unwrap();
        assert!(Arc::ptr_eq(&bundle, &cached));
        assert!(Arc::ptr_eq(
            &cached,
            &block_on(loader.load(SupportedLocale::Ko, PageName::ABOUT))
        ));
    }

    #[test]
    fn missing_locale_falls_back() {
        let loader = ResourceLoader::new(registry(), SupportedLocale::En);
        let bundle = block_on(loader.load(SupportedLocale::Cn, PageName::ABOUT));

        assert_eq!(bundle.origin(), BundleOrigin::Fallback);
        assert_eq!(bundle.locale(), SupportedLocale::En);
        assert_eq!(bundle.requested_locale(), SupportedLocale::Cn);
        assert_eq!(bundle.text("title"), Some("About"));
        assert!(loader.cached(SupportedLocale::Cn, PageName::ABOUT).is_none());
        assert!(loader.cached(SupportedLocale::En, PageName::ABOUT).is_some());
    }

    #[test]
    fn missing_everywhere_serves_placeholder() {
        let loader = ResourceLoader::new(registry(), SupportedLocale::En);
        let bundle = block_on(loader.load(SupportedLocale::Cn, PageName::TREATMENTS));

        assert!(bundle.is_placeholder());
        assert_eq!(bundle.content(), &json!({}));
        assert!(loader.cached(SupportedLocale::Cn, PageName::TREATMENTS).is_none());
    }

    #[test]
    fn malformed_bundle_falls_back() {
        let mut registry = registry();
        registry.register_json(SupportedLocale::Ko, PageName::EVENT, "[1, 2,");
        registry.register_json(SupportedLocale::En, PageName::EVENT, r#"{ "title": "Events" }"#);
        let loader = ResourceLoader::new(registry, SupportedLocale::En);

        let bundle = block_on(loader.load(SupportedLocale::Ko, PageName::EVENT));
        assert_eq!(bundle.origin(), BundleOrigin::Fallback);
        assert_eq!(bundle.text("title"), Some("Events"));
    }

    #[test]
    fn transient_failure_is_retried_once() {
        let provider = Arc::new(FlakyProvider {
            failures_left: AtomicUsize::new(1),
            calls: AtomicUsize::new(0),
        });
        let loader = ResourceLoader::from_shared(provider.clone(), SupportedLocale::En);

        let bundle = block_on(loader.load(SupportedLocale::Ko, PageName::HOME));
        assert_eq!(bundle.origin(), BundleOrigin::Exact);
        assert_eq!(bundle.text("locale"), Some("ko"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn repeated_transient_failure_moves_to_fallback() {
        let provider = Arc::new(FlakyProvider {
            failures_left: AtomicUsize::new(2),
            calls: AtomicUsize::new(0),
        });
        let loader = ResourceLoader::from_shared(provider.clone(), SupportedLocale::En);

        let bundle = block_on(loader.load(SupportedLocale::Ko, PageName::HOME));
        assert_eq!(bundle.origin(), BundleOrigin::Fallback);
        assert_eq!(bundle.text("locale"), Some("en"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn refresh_commits_current_bundle() {
        let loader = ResourceLoader::new(registry(), SupportedLocale::En);
        assert!(loader.current(PageName::ABOUT).is_none());

        let outcome = block_on(loader.refresh(SupportedLocale::Ko, PageName::ABOUT));
        let applied = outcome.applied().unwrap();
        assert_eq!(applied.text("title"), Some("소개"));
        assert_eq!(loader.current(PageName::ABOUT).as_ref(), Some(applied));
    }

    #[test]
    fn stale_ticket_is_not_committed() {
        let loader = ResourceLoader::new(registry(), SupportedLocale::En);
        let first = loader.begin(PageName::ABOUT);
        let second = loader.begin(PageName::ABOUT);
        assert!(second.generation() > first.generation());

        let bundle = block_on(loader.load(SupportedLocale::Ko, PageName::ABOUT));
        assert!(loader.commit(first, bundle.clone()).is_superseded());
        assert!(loader.current(PageName::ABOUT).is_none());
        assert!(!loader.commit(second, bundle).is_superseded());
    }

    #[test]
    fn generations_are_tracked_per_page() {
        let loader = ResourceLoader::new(registry(), SupportedLocale::En);
        let about = loader.refresh(SupportedLocale::Ko, PageName::ABOUT);
        let _event = loader.begin(PageName::EVENT);

        assert!(!block_on(about).is_superseded());
    }

    #[test]
    fn last_started_refresh_wins_regardless_of_completion_order() {
        let provider = Arc::new(GatedProvider::default());
        let en = provider.gate(SupportedLocale::En);
        let ko = provider.gate(SupportedLocale::Ko);
        let cn = provider.gate(SupportedLocale::Cn);
        let loader = ResourceLoader::from_shared(provider.clone(), SupportedLocale::En);

        block_on(async {
            let mut to_en = pin!(loader.refresh(SupportedLocale::En, PageName::ABOUT));
            let mut to_ko = pin!(loader.refresh(SupportedLocale::Ko, PageName::ABOUT));
            let mut to_cn = pin!(loader.refresh(SupportedLocale::Cn, PageName::ABOUT));

            assert!(futures::poll!(to_en.as_mut()).is_pending());
            assert!(futures::poll!(to_ko.as_mut()).is_pending());
            assert!(futures::poll!(to_cn.as_mut()).is_pending());

            cn.send(json!({ "title": "关于" })).unwrap();
            let cn_outcome = to_cn.await;
            assert_eq!(cn_outcome.applied().unwrap().text("title"), Some("关于"));

            ko.send(json!({ "title": "소개" })).unwrap();
            assert!(to_ko.await.is_superseded());

            en.send(json!({ "title": "About" })).unwrap();
            assert!(to_en.await.is_superseded());
        });

        let current = loader.current(PageName::ABOUT).unwrap();
        assert_eq!(current.locale(), SupportedLocale::Cn);
        assert_eq!(current.text("title"), Some("关于"));
        // Stale responses still warm the cache.
        assert!(loader.cached(SupportedLocale::En, PageName::ABOUT).is_some());
    }

    #[test]
    fn content_locale_walks_to_fallback() {
        let loader = ResourceLoader::new(registry(), SupportedLocale::En);
        assert_eq!(loader.content_locale(SupportedLocale::Ko), Some(SupportedLocale::Ko));
        assert_eq!(loader.content_locale(SupportedLocale::Cn), Some(SupportedLocale::En));
        assert!(!loader.has_content_for(SupportedLocale::Cn));
    }
}
