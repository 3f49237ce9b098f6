#![doc = include_str!("../README.md")]

mod context;
pub mod nav;

pub use context::{HostEnv, I18n, I18nError, Navigation};
pub use nav::{NavItem, NavTarget, Viewport};

pub use clinic_i18n_lang::{
    LanguageIdentifier, LocaleNormalizer, SupportedLocale, langid, normalize,
};
pub use clinic_i18n_manager_core::{
    BundleOrigin, BundleProvider, BundleRegistry, EmbeddedBundles, LoadOutcome, MessageCatalog,
    PageName, ProviderError, ResourceBundle, ResourceLoader, StaticBundle,
};
pub use clinic_i18n_router::{
    DocumentEnv, LocaleReader, Navigator, PreferenceStore, RouteState, RouteSync, ScrollAction,
    ScrollBehavior, memory,
};
pub use clinic_i18n_toml::{I18nConfig, I18nConfigError};

pub use fluent_bundle::FluentArgs;
pub use rust_embed::RustEmbed;

#[doc(hidden)]
pub use inventory as __inventory;

/// Declares a page bundle picked up by [`I18n::with_discovered_bundles`].
///
/// ```ignore
/// clinic_i18n::static_bundle!(
///     Ko,
///     clinic_i18n::PageName::ABOUT,
///     include_str!("../locales/ko/pages/about.json"),
/// );
/// ```
#[macro_export]
macro_rules! static_bundle {
    ($locale:ident, $page:expr, $json:expr $(,)?) => {
        $crate::__inventory::submit! {
            $crate::StaticBundle::new($crate::SupportedLocale::$locale, $page, $json)
        }
    };
}
