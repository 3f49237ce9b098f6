use crate::nav::{NavItem, Viewport, nav_items, visible_items};
use clinic_i18n_lang::SupportedLocale;
use clinic_i18n_manager_core::{
    AssetDirBundles, BundleProvider, BundleRegistry, EmbeddedBundles, MessageCatalog,
    MessageError, PageName, ResourceBundle, ResourceLoader,
};
use clinic_i18n_router::{
    DocumentEnv, LocaleReader, NavigationIntent, Navigator, PreferenceStore, RouteState,
    RouteSync, ScrollAction, ScrollCoordinator, SyncSettings, Synchronizer,
};
use clinic_i18n_toml::{I18nConfig, I18nConfigError};
use fluent_bundle::FluentArgs;
use rust_embed::RustEmbed;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum I18nError {
    #[error(transparent)]
    Config(#[from] I18nConfigError),
    #[error(transparent)]
    Messages(#[from] MessageError),
}

/// The host's router, document and preference storage.
#[derive(Clone)]
pub struct HostEnv {
    pub navigator: Arc<dyn Navigator>,
    pub document: Arc<dyn DocumentEnv>,
    pub preferences: Arc<dyn PreferenceStore>,
}

impl HostEnv {
    pub fn new(
        navigator: Arc<dyn Navigator>,
        document: Arc<dyn DocumentEnv>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            navigator,
            document,
            preferences,
        }
    }
}

/// Result of [`I18n::navigate`].
#[derive(Debug)]
pub struct Navigation {
    /// The location after prefix enforcement.
    pub route: RouteState,
    pub sync: RouteSync,
    /// Resolve with [`I18n::settle_scroll`] once the page content is mounted.
    pub scroll: Option<NavigationIntent>,
}

/// The locale layer of one running site.
///
/// Owns the active locale; components read it through [`I18n::reader`].
pub struct I18n {
    config: I18nConfig,
    default_locale: SupportedLocale,
    sync: Synchronizer,
    scroll: ScrollCoordinator,
    messages: MessageCatalog,
    document: Arc<dyn DocumentEnv>,
}

impl fmt::Debug for I18n {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18n")
            .field("config", &self.config)
            .field("sync", &self.sync)
            .field("scroll", &self.scroll)
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

impl I18n {
    pub fn new(
        config: I18nConfig,
        provider: impl BundleProvider,
        env: HostEnv,
    ) -> Result<Self, I18nError> {
        Self::from_shared(config, Arc::new(provider), env)
    }

    pub fn from_shared(
        config: I18nConfig,
        provider: Arc<dyn BundleProvider>,
        env: HostEnv,
    ) -> Result<Self, I18nError> {
        let default_locale = config.default_locale()?;
        let fallback_locale = config.fallback_locale()?;
        let settings = SyncSettings::from_config(&config)?;

        tracing::debug!(
            %default_locale,
            %fallback_locale,
            redirect_locale = %settings.redirect_locale,
            preference_key = %settings.preference_key,
            "Initialized locale layer"
        );

        let loader = ResourceLoader::from_shared(provider, fallback_locale);
        let sync = Synchronizer::new(
            settings,
            loader,
            env.navigator,
            Arc::clone(&env.document),
            env.preferences,
        );

        Ok(Self {
            scroll: ScrollCoordinator::from_config(&config.scroll),
            messages: MessageCatalog::new(vec![fallback_locale, default_locale]),
            config,
            default_locale,
            sync,
            document: env.document,
        })
    }

    /// Serves every [`StaticBundle`](clinic_i18n_manager_core::StaticBundle)
    /// linked into the binary.
    pub fn with_discovered_bundles(config: I18nConfig, env: HostEnv) -> Result<Self, I18nError> {
        Self::new(config, BundleRegistry::with_discovered_bundles(), env)
    }

    /// Serves `{locale}/pages/{page}.json` files embedded with `T`.
    pub fn with_embedded<T: RustEmbed + 'static>(
        config: I18nConfig,
        env: HostEnv,
    ) -> Result<Self, I18nError> {
        Self::new(config, EmbeddedBundles::<T>::new(), env)
    }

    /// Serves `{assets_dir}/{locale}/pages/{page}.json` from the filesystem.
    ///
    /// `assets_dir` is resolved against `base_dir`, or against
    /// `CARGO_MANIFEST_DIR` when `None`. Every directory under it must be a
    /// supported locale code.
    pub fn with_assets_dir(
        config: I18nConfig,
        base_dir: Option<&Path>,
        env: HostEnv,
    ) -> Result<Self, I18nError> {
        let root = config.assets_dir_from_base(base_dir)?;
        let locales = config.available_locales_from_base(base_dir)?;

        let default_locale = config.default_locale()?;
        if !locales.contains(&default_locale) {
            tracing::warn!(
                %default_locale,
                root = %root.display(),
                "Default locale has no assets directory"
            );
        }

        Self::new(config, AssetDirBundles::new(root, locales), env)
    }

    /// Replaces the catalog behind [`t`](Self::t).
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }

    /// Adds FTL source for `locale` to the message catalog.
    pub fn add_messages(
        &mut self,
        locale: SupportedLocale,
        source: impl Into<String>,
    ) -> Result<(), I18nError> {
        self.messages.add_resource(locale, source.into())?;
        Ok(())
    }

    pub fn with_browser_language(mut self, accept_language: impl Into<String>) -> Self {
        self.sync = self.sync.with_browser_language(accept_language);
        self
    }

    pub fn config(&self) -> &I18nConfig {
        &self.config
    }

    /// The active locale, or the default before the first navigation.
    pub fn locale(&self) -> SupportedLocale {
        self.sync.reader().get_or(self.default_locale)
    }

    pub fn reader(&self) -> LocaleReader {
        self.sync.reader()
    }

    pub fn loader(&self) -> &ResourceLoader {
        self.sync.loader()
    }

    /// Handles the router reporting `href` as the current location.
    pub fn navigate(&mut self, href: &str) -> Navigation {
        let sync = self.sync.on_route(href);
        let route = RouteState::parse(sync.redirect.as_deref().unwrap_or(href));
        let scroll = self.scroll.begin(&route);
        Navigation {
            route,
            sync,
            scroll,
        }
    }

    /// Language picker selection while at `current_href`.
    pub fn select_locale(&mut self, locale: SupportedLocale, current_href: &str) -> RouteSync {
        self.sync.select_locale(locale, current_href)
    }

    /// Performs a navigation's scroll unless a newer navigation superseded it.
    pub fn settle_scroll(&mut self, intent: &NavigationIntent) -> Option<ScrollAction> {
        self.scroll.resolve(intent, self.document.as_ref())
    }

    /// The committed bundle for `page`, or an empty one while none is loaded.
    pub fn bundle(&self, page: PageName) -> Arc<ResourceBundle> {
        self.loader()
            .current(page)
            .unwrap_or_else(|| Arc::new(ResourceBundle::placeholder(self.locale(), page)))
    }

    pub fn nav_items(&self, viewport: Viewport) -> Vec<NavItem> {
        visible_items(&nav_items(&self.bundle(PageName::NAV)), viewport)
    }

    /// Formats a shared UI string in the active locale; unknown ids are echoed.
    pub fn t(&self, id: &str) -> String {
        self.messages.localize_or_id(self.locale(), id, None)
    }

    pub fn t_with_args(&self, id: &str, args: &FluentArgs<'_>) -> String {
        self.messages.localize_or_id(self.locale(), id, Some(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_i18n_router::memory::{MemoryDocument, MemoryNavigator, MemoryPreferences};
    use futures::executor::block_on;
    use serde_json::json;

    fn env(document: Arc<MemoryDocument>) -> HostEnv {
        HostEnv::new(
            Arc::new(MemoryNavigator::new()),
            document,
            Arc::new(MemoryPreferences::new()),
        )
    }

    fn registry() -> BundleRegistry {
        let mut registry = BundleRegistry::new();
        registry
            .register_value(
                SupportedLocale::En,
                PageName::NAV,
                json!([{ "pk": 1, "path": "/about", "label": "About" }]),
            )
            .register_value(
                SupportedLocale::Ko,
                PageName::NAV,
                json!([{ "pk": 1, "path": "/about", "label": "소개" }]),
            );
        registry
    }

    #[test]
    fn rejects_invalid_configured_locale() {
        let mut config = I18nConfig::new(SupportedLocale::En, "locales");
        config.fallback_locale = Some("jp".into());
        let document = Arc::new(MemoryDocument::new(0.0));

        let err = I18n::new(config, registry(), env(document)).unwrap_err();
        assert!(matches!(err, I18nError::Config(_)));
    }

    #[test]
    fn locale_defaults_until_first_navigation() {
        let config = I18nConfig::new(SupportedLocale::Ko, "locales");
        let document = Arc::new(MemoryDocument::new(0.0));
        let mut i18n = I18n::new(config, registry(), env(document)).unwrap();

        assert_eq!(i18n.locale(), SupportedLocale::Ko);
        i18n.navigate("/en/about");
        assert_eq!(i18n.locale(), SupportedLocale::En);
    }

    #[test]
    fn nav_items_follow_active_locale() {
        let config = I18nConfig::new(SupportedLocale::En, "locales");
        let document = Arc::new(MemoryDocument::new(0.0));
        let mut i18n = I18n::new(config, registry(), env(document)).unwrap();
        assert!(i18n.nav_items(Viewport::Desktop).is_empty());

        let navigation = i18n.navigate("/ko/");
        block_on(navigation.sync.refresh.unwrap());
        let labels: Vec<_> = i18n
            .nav_items(Viewport::Desktop)
            .into_iter()
            .map(|item| item.label)
            .collect();
        assert_eq!(labels, vec!["소개"]);
    }

    #[test]
    fn translates_with_configured_fallbacks() {
        let config = I18nConfig::new(SupportedLocale::En, "locales");
        let document = Arc::new(MemoryDocument::new(0.0));
        let mut i18n = I18n::new(config, registry(), env(document)).unwrap();
        i18n.add_messages(SupportedLocale::En, "book = Book now\nhello = Hello, {$name}\n")
            .unwrap();
        i18n.add_messages(SupportedLocale::Ko, "book = 예약하기\n").unwrap();

        i18n.navigate("/ko/");
        assert_eq!(i18n.t("book"), "예약하기");

        let mut args = FluentArgs::new();
        args.set("name", "Mina");
        assert_eq!(i18n.t_with_args("hello", &args), "Hello, Mina");
        assert_eq!(i18n.t("missing-id"), "missing-id");
    }

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn serves_bundles_from_configured_assets_dir() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "site-locales/en/pages/about.json", r#"{ "title": "About" }"#);
        write(base.path(), "site-locales/ko/pages/about.json", r#"{ "title": "소개" }"#);

        let config = I18nConfig::new(SupportedLocale::En, "site-locales");
        let document = Arc::new(MemoryDocument::new(0.0));
        let mut i18n = I18n::with_assets_dir(config, Some(base.path()), env(document.clone()))
            .unwrap();

        let navigation = i18n.navigate("/ko/about");
        block_on(navigation.sync.refresh.unwrap());
        assert_eq!(i18n.bundle(PageName::ABOUT).text("title"), Some("소개"));

        // No `cn` directory: the default locale is activated instead.
        i18n.navigate("/cn/about");
        assert_eq!(i18n.locale(), SupportedLocale::En);
        assert_eq!(document.lang().as_deref(), Some("en"));
    }

    #[test]
    fn rejects_unknown_locale_directory() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "locales/jp/pages/about.json", "{}");

        let config = I18nConfig::new(SupportedLocale::En, "locales");
        let document = Arc::new(MemoryDocument::new(0.0));
        let err = I18n::with_assets_dir(config, Some(base.path()), env(document)).unwrap_err();
        assert!(matches!(
            err,
            I18nError::Config(I18nConfigError::UnsupportedLocaleDirectory { .. })
        ));
    }

    #[test]
    fn language_choice_is_stored_under_configured_key() {
        let mut config = I18nConfig::new(SupportedLocale::En, "locales");
        config.preference_key = "sora.lang".into();
        let preferences = Arc::new(MemoryPreferences::new());
        let env = HostEnv::new(
            Arc::new(MemoryNavigator::new()),
            Arc::new(MemoryDocument::new(0.0)),
            preferences.clone(),
        );
        let mut i18n = I18n::new(config, registry(), env).unwrap();

        i18n.navigate("/en/about");
        i18n.select_locale(SupportedLocale::Ko, "/en/about");
        assert_eq!(preferences.load("sora.lang").as_deref(), Some("ko"));
        assert_eq!(preferences.load("lang"), None);
    }

    #[test]
    fn navigation_scrolls_after_redirect() {
        let config = I18nConfig::new(SupportedLocale::En, "locales");
        let document = Arc::new(MemoryDocument::new(64.0));
        document.mount("contacts", 1200.0);
        let mut i18n = I18n::new(config, registry(), env(document.clone())).unwrap();

        let navigation = i18n.navigate("/#contacts");
        assert_eq!(navigation.route.href(), "/en#contacts");
        let intent = navigation.scroll.unwrap();
        assert_eq!(i18n.settle_scroll(&intent).unwrap().top, 1128.0);

        // The router reports the corrected location next.
        let echo = i18n.navigate("/en#contacts");
        assert!(echo.sync.is_noop());
        assert!(echo.scroll.is_none());
        assert_eq!(document.scrolls().len(), 1);
    }
}
