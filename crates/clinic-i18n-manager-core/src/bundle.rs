use crate::PageName;
use clinic_i18n_lang::SupportedLocale;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

/// How a bundle came to be served for a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BundleOrigin {
    /// Authored content for the requested locale.
    Exact,
    /// Content of the fallback locale, served because the requested locale had none.
    Fallback,
    /// Empty content, served because no locale in the chain could be loaded.
    Placeholder,
}

/// Translated content for one page in one locale.
///
/// Bundles are immutable; the content is shared between every copy handed
/// out by the loader.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceBundle {
    requested: SupportedLocale,
    locale: SupportedLocale,
    page: PageName,
    origin: BundleOrigin,
    content: Arc<Value>,
}

impl ResourceBundle {
    pub fn new(locale: SupportedLocale, page: PageName, content: Value) -> Self {
        Self {
            requested: locale,
            locale,
            page,
            origin: BundleOrigin::Exact,
            content: Arc::new(content),
        }
    }

    /// An empty object bundle, safe to render with placeholder text.
    pub fn placeholder(requested: SupportedLocale, page: PageName) -> Self {
        Self {
            requested,
            locale: requested,
            page,
            origin: BundleOrigin::Placeholder,
            content: Arc::new(Value::Object(Map::new())),
        }
    }

    /// The same content, re-labelled as the answer to a request for `requested`.
    pub fn fallback_for(&self, requested: SupportedLocale) -> Self {
        Self {
            requested,
            locale: self.locale,
            page: self.page,
            origin: BundleOrigin::Fallback,
            content: Arc::clone(&self.content),
        }
    }

    /// The locale whose content this is.
    pub fn locale(&self) -> SupportedLocale {
        self.locale
    }

    pub fn requested_locale(&self) -> SupportedLocale {
        self.requested
    }

    pub fn page(&self) -> PageName {
        self.page
    }

    pub fn origin(&self) -> BundleOrigin {
        self.origin
    }

    pub fn is_placeholder(&self) -> bool {
        self.origin == BundleOrigin::Placeholder
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Looks up a dotted path such as `hero.title` or `items.0.label`.
    ///
    /// Numeric segments index into arrays.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(&self.content);
        }

        path.split('.').try_fold(self.content.as_ref(), |value, key| match value {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// The string at `path`, if there is one.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// The string at `path`, or `default` when it is missing or not a string.
    pub fn text_or<'a>(&'a self, path: &str, default: &'a str) -> &'a str {
        self.text(path).unwrap_or(default)
    }

    /// Deserializes the whole bundle.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(self.content.as_ref())
    }

    /// Deserializes the value at `path`. A missing path is `Ok(None)`.
    pub fn section<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, serde_json::Error> {
        self.get(path).map(T::deserialize).transpose()
    }
}
