use crate::PageName;
use clinic_i18n_lang::SupportedLocale;
use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

pub type BundleFuture = BoxFuture<'static, Result<Value, ProviderError>>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no '{page}' bundle is authored for locale '{locale}'")]
    NotFound {
        locale: SupportedLocale,
        page: PageName,
    },
    #[error("the '{page}' bundle for locale '{locale}' is malformed: {source}")]
    Malformed {
        locale: SupportedLocale,
        page: PageName,
        #[source]
        source: serde_json::Error,
    },
    #[error("fetching the '{page}' bundle for locale '{locale}' failed: {source}")]
    Transient {
        locale: SupportedLocale,
        page: PageName,
        #[source]
        source: anyhow::Error,
    },
}

impl ProviderError {
    pub fn not_found(locale: SupportedLocale, page: PageName) -> Self {
        Self::NotFound { locale, page }
    }

    pub fn transient(
        locale: SupportedLocale,
        page: PageName,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Transient {
            locale,
            page,
            source: source.into(),
        }
    }

    /// Whether asking again for the same locale might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Source of raw page bundles.
///
/// Implementations distinguish content that does not exist
/// ([`ProviderError::NotFound`]) from a failed attempt to get it
/// ([`ProviderError::Transient`]); the loader retries only the latter.
pub trait BundleProvider: Send + Sync + 'static {
    fn fetch(&self, locale: SupportedLocale, page: PageName) -> BundleFuture;

    /// Whether any content at all is authored for `locale`.
    fn has_locale(&self, _locale: SupportedLocale) -> bool {
        true
    }
}
