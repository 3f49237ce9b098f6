//! Shared UI strings (buttons, form labels, toasts) formatted with Fluent.

use crate::fallback::fallback_chain;
use clinic_i18n_lang::SupportedLocale;
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Failed to parse fluent resource for locale '{locale}': {errors}")]
    Parse {
        locale: SupportedLocale,
        errors: String,
    },
}

/// Per-locale Fluent resources with a fixed fallback order.
#[derive(Default)]
pub struct MessageCatalog {
    resources: FxHashMap<SupportedLocale, Arc<FluentResource>>,
    fallbacks: Vec<SupportedLocale>,
}

impl fmt::Debug for MessageCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut locales: Vec<_> = self.resources.keys().collect();
        locales.sort();
        f.debug_struct("MessageCatalog")
            .field("locales", &locales)
            .field("fallbacks", &self.fallbacks)
            .finish()
    }
}

impl MessageCatalog {
    /// An empty catalog that looks in `fallbacks`, in order, for messages the
    /// requested locale lacks.
    pub fn new(fallbacks: Vec<SupportedLocale>) -> Self {
        Self {
            resources: FxHashMap::default(),
            fallbacks,
        }
    }

    /// A catalog built from FTL sources compiled into the binary.
    pub fn from_static(
        resources: &[(SupportedLocale, &'static str)],
        fallbacks: Vec<SupportedLocale>,
    ) -> Result<Self, MessageError> {
        let mut catalog = Self::new(fallbacks);
        for (locale, source) in resources {
            catalog.add_resource(*locale, (*source).to_string())?;
        }
        Ok(catalog)
    }

    /// Parses and stores the FTL source for `locale`, replacing any previous one.
    pub fn add_resource(
        &mut self,
        locale: SupportedLocale,
        source: String,
    ) -> Result<(), MessageError> {
        let resource =
            FluentResource::try_new(source).map_err(|(_, errs)| MessageError::Parse {
                locale,
                errors: format!("{:?}", errs),
            })?;
        self.resources.insert(locale, Arc::new(resource));
        Ok(())
    }

    pub fn has_locale(&self, locale: SupportedLocale) -> bool {
        self.resources.contains_key(&locale)
    }

    /// Formats message `id` for `locale`, walking the fallback order.
    pub fn localize(
        &self,
        locale: SupportedLocale,
        id: &str,
        args: Option<&FluentArgs<'_>>,
    ) -> Option<String> {
        fallback_chain(locale, &self.fallbacks)
            .into_iter()
            .find_map(|candidate| self.format(candidate, id, args))
    }

    /// Like [`localize`](Self::localize) but returns `id` when nothing matches.
    pub fn localize_or_id(
        &self,
        locale: SupportedLocale,
        id: &str,
        args: Option<&FluentArgs<'_>>,
    ) -> String {
        self.localize(locale, id, args).unwrap_or_else(|| {
            tracing::warn!(%locale, id, "Translation not found");
            id.to_string()
        })
    }

    fn format(
        &self,
        locale: SupportedLocale,
        id: &str,
        args: Option<&FluentArgs<'_>>,
    ) -> Option<String> {
        let resource = self.resources.get(&locale)?;

        let mut bundle = FluentBundle::new(vec![locale.language_identifier()]);
        bundle.set_use_isolating(false);
        if let Err(errors) = bundle.add_resource(Arc::clone(resource)) {
            tracing::error!(%locale, "Failed to add resource to bundle: {:?}", errors);
            return None;
        }

        let message = bundle.get_message(id)?;
        let pattern = message.value()?;

        let mut errors = Vec::new();
        let value = bundle.format_pattern(pattern, args, &mut errors);

        if !errors.is_empty() {
            tracing::error!(%locale, id, "Fluent formatting errors: {:?}", errors);
            return None;
        }

        Some(value.into_owned())
    }
}
