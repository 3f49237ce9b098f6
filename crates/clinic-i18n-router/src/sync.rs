//! Keeps the URL prefix, the active locale and the document language in step.

use crate::env::{DocumentEnv, Navigator, PreferenceStore};
use crate::route::RouteState;
use crate::routes::PageRoute;
use clinic_i18n_lang::{LocaleNormalizer, LocaleResolutionInput, SupportedLocale};
use clinic_i18n_manager_core::{LoadOutcome, PageName, ResourceLoader};
use clinic_i18n_toml::{DEFAULT_PREFERENCE_KEY, I18nConfig, I18nConfigError};
use futures::FutureExt as _;
use futures::future::{self, BoxFuture};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Read-only view of the active locale.
#[derive(Clone, Debug)]
pub struct LocaleReader(Arc<RwLock<Option<SupportedLocale>>>);

impl LocaleReader {
    /// `None` until the first route has been synchronized.
    pub fn get(&self) -> Option<SupportedLocale> {
        *self.0.read()
    }

    pub fn get_or(&self, default: SupportedLocale) -> SupportedLocale {
        self.get().unwrap_or(default)
    }
}

/// The active locale. Only its owner can change it.
#[derive(Debug, Default)]
pub struct ActiveLocale(Arc<RwLock<Option<SupportedLocale>>>);

impl ActiveLocale {
    pub fn get(&self) -> Option<SupportedLocale> {
        *self.0.read()
    }

    fn set(&mut self, locale: SupportedLocale) {
        *self.0.write() = Some(locale);
    }

    pub fn reader(&self) -> LocaleReader {
        LocaleReader(Arc::clone(&self.0))
    }
}

/// Locale decisions the synchronizer takes from configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncSettings {
    /// Coerces foreign prefixes and has the system default locale.
    pub normalizer: LocaleNormalizer,
    /// Prefix for prefix-less paths when nothing better is known.
    pub redirect_locale: SupportedLocale,
    /// [`PreferenceStore`] key of the chosen locale code.
    pub preference_key: String,
}

impl SyncSettings {
    pub fn from_config(config: &I18nConfig) -> Result<Self, I18nConfigError> {
        Ok(Self {
            normalizer: LocaleNormalizer::new(config.default_locale()?),
            redirect_locale: config.redirect_locale()?,
            preference_key: config.preference_key.clone(),
        })
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            normalizer: LocaleNormalizer::default(),
            redirect_locale: SupportedLocale::En,
            preference_key: DEFAULT_PREFERENCE_KEY.to_string(),
        }
    }
}

/// What one synchronization step did.
#[derive(Default)]
pub struct RouteSync {
    /// Target of the replace-navigation that was issued.
    pub redirect: Option<String>,
    /// The newly activated locale, when it changed.
    pub activated: Option<SupportedLocale>,
    /// Bundle refreshes for the route; the host drives this to completion.
    pub refresh: Option<BoxFuture<'static, Vec<LoadOutcome>>>,
}

impl RouteSync {
    pub fn is_noop(&self) -> bool {
        self.redirect.is_none() && self.activated.is_none() && self.refresh.is_none()
    }
}

impl fmt::Debug for RouteSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSync")
            .field("redirect", &self.redirect)
            .field("activated", &self.activated)
            .field("refresh", &self.refresh.is_some())
            .finish()
    }
}

/// Single writer of the active locale.
pub struct Synchronizer {
    settings: SyncSettings,
    active: ActiveLocale,
    bundles: Vec<PageName>,
    browser_language: Option<String>,
    loader: ResourceLoader,
    navigator: Arc<dyn Navigator>,
    document: Arc<dyn DocumentEnv>,
    preferences: Arc<dyn PreferenceStore>,
}

impl fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("settings", &self.settings)
            .field("active", &self.active.get())
            .field("bundles", &self.bundles)
            .finish_non_exhaustive()
    }
}

impl Synchronizer {
    pub fn new(
        settings: SyncSettings,
        loader: ResourceLoader,
        navigator: Arc<dyn Navigator>,
        document: Arc<dyn DocumentEnv>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            settings,
            active: ActiveLocale::default(),
            bundles: Vec::new(),
            browser_language: None,
            loader,
            navigator,
            document,
            preferences,
        }
    }

    /// The browser's `Accept-Language` style list, consulted when a
    /// prefix-less path is seen before any locale is active.
    pub fn with_browser_language(mut self, accept_language: impl Into<String>) -> Self {
        self.browser_language = Some(accept_language.into());
        self
    }

    pub fn active_locale(&self) -> Option<SupportedLocale> {
        self.active.get()
    }

    pub fn reader(&self) -> LocaleReader {
        self.active.reader()
    }

    pub fn loader(&self) -> &ResourceLoader {
        &self.loader
    }

    /// Locale for a prefix-less path: the active one, else the stored or
    /// browser preference, else the redirect default.
    fn missing_prefix_locale(&self) -> SupportedLocale {
        if let Some(active) = self.active.get() {
            return active;
        }

        let input = LocaleResolutionInput {
            path_segment: None,
            stored_preference: self.preferences.load(&self.settings.preference_key),
            accept_language: self.browser_language.clone(),
        };
        input.resolve(&LocaleNormalizer::new(self.settings.redirect_locale))
    }

    /// Reacts to the router reporting `href` as the current location.
    ///
    /// Re-running it for the same location is a no-op.
    pub fn on_route(&mut self, href: &str) -> RouteSync {
        let mut sync = RouteSync::default();
        let mut route = RouteState::parse(href);

        let missing = self.missing_prefix_locale();
        if let Some(corrected) = route.enforce_prefix(missing, &self.settings.normalizer) {
            let target = corrected.href();
            tracing::info!(from = href, to = %target, "Redirecting to locale-prefixed route");
            self.navigator.replace(&target);
            sync.redirect = Some(target);
            route = corrected;
        }

        let requested = route
            .locale()
            .unwrap_or_else(|| self.settings.normalizer.default_locale());
        self.activate(requested, &route, &mut sync);
        sync
    }

    /// Switches to `locale` from the language picker.
    ///
    /// The URL is rewritten in place and the locale activated without waiting
    /// for the router to report the new location.
    pub fn select_locale(&mut self, locale: SupportedLocale, current_href: &str) -> RouteSync {
        let mut sync = RouteSync::default();
        let current = RouteState::parse(current_href);
        let target_route = current.switch_locale(locale);
        let target = target_route.href();

        if target != current.href() {
            tracing::info!(from = current_href, to = %target, "Switching locale");
            self.navigator.replace(&target);
            sync.redirect = Some(target);
        }

        self.preferences.store(&self.settings.preference_key, locale.as_str());
        self.activate(locale, &target_route, &mut sync);
        sync
    }

    fn activate(&mut self, requested: SupportedLocale, route: &RouteState, sync: &mut RouteSync) {
        let locale = if self.loader.has_content_for(requested) {
            requested
        } else {
            let default = self.settings.normalizer.default_locale();
            tracing::warn!(%requested, %default, "No content for locale, using default");
            default
        };

        let changed = self.active.get() != Some(locale);
        if changed {
            self.active.set(locale);
            self.document.set_lang(locale.lang_tag());
            sync.activated = Some(locale);
            tracing::info!(%locale, "Activated locale");
        }

        let bundles = PageRoute::parse(route.logical_path()).bundles();
        if changed || bundles != self.bundles {
            // Tickets are taken here, in event order, before anything is polled.
            let refreshes: Vec<_> = bundles
                .iter()
                .map(|page| self.loader.refresh(locale, *page))
                .collect();
            sync.refresh = Some(future::join_all(refreshes).boxed());
            self.bundles = bundles;
        }
    }
}
