//! Href decomposition and locale prefix handling.

use clinic_i18n_lang::{LocaleNormalizer, SupportedLocale, recognize};
use unic_langid::LanguageIdentifier;

/// What occupies the first path segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalePrefix {
    /// A supported URL code.
    Recognized(SupportedLocale),
    /// Something shaped like a language tag that is not a supported code,
    /// e.g. `xx`, `zh-CN`, `en_us`.
    Foreign(String),
    /// The path starts with a logical segment, or is `/`.
    Missing,
}

/// A router location: path, query and hash.
///
/// `query` keeps its leading `?` and `hash` its leading `#`; both are empty
/// when absent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RouteState {
    path: String,
    query: String,
    hash: String,
}

impl RouteState {
    /// Splits an href such as `/en/treatments?x=1#top`.
    pub fn parse(href: &str) -> Self {
        let (rest, hash) = match href.find('#') {
            Some(i) => href.split_at(i),
            None => (href, ""),
        };
        let (path, query) = match rest.find('?') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self {
            path,
            query: query.to_string(),
            hash: hash.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The hash without `#`, when it names something.
    pub fn fragment(&self) -> Option<&str> {
        self.hash.strip_prefix('#').filter(|fragment| !fragment.is_empty())
    }

    pub fn href(&self) -> String {
        format!("{}{}{}", self.path, self.query, self.hash)
    }

    /// Same query and hash, different path.
    pub fn with_path(&self, path: String) -> Self {
        Self {
            path,
            query: self.query.clone(),
            hash: self.hash.clone(),
        }
    }

    pub fn prefix(&self) -> LocalePrefix {
        let (segment, _) = split_first_segment(&self.path);
        if segment.is_empty() {
            LocalePrefix::Missing
        } else if let Some(locale) = SupportedLocale::from_code(segment) {
            LocalePrefix::Recognized(locale)
        } else if looks_like_language_tag(segment) {
            LocalePrefix::Foreign(segment.to_string())
        } else {
            LocalePrefix::Missing
        }
    }

    /// The recognized locale prefix, if any.
    pub fn locale(&self) -> Option<SupportedLocale> {
        match self.prefix() {
            LocalePrefix::Recognized(locale) => Some(locale),
            _ => None,
        }
    }

    /// Path remainder after the locale segment, exactly as written.
    ///
    /// `/en/about` gives `/about`, `/en` gives the empty string and a path
    /// without a locale segment is returned unchanged. Joining the prefix
    /// back with [`localized_path`] restores the original path.
    pub fn rest(&self) -> &str {
        match self.prefix() {
            LocalePrefix::Recognized(_) | LocalePrefix::Foreign(_) => {
                split_first_segment(&self.path).1
            },
            LocalePrefix::Missing => &self.path,
        }
    }

    /// The path with any locale segment removed; never empty.
    pub fn logical_path(&self) -> &str {
        match self.rest() {
            "" => "/",
            rest => rest,
        }
    }

    /// The corrected route when the prefix is not a supported code.
    ///
    /// A missing prefix is filled with `missing`; a foreign one is replaced by
    /// its normalized locale. Returns `None` for an already prefixed route.
    pub fn enforce_prefix(
        &self,
        missing: SupportedLocale,
        normalizer: &LocaleNormalizer,
    ) -> Option<Self> {
        let locale = match self.prefix() {
            LocalePrefix::Recognized(_) => return None,
            LocalePrefix::Foreign(segment) => normalizer.normalize(&segment),
            LocalePrefix::Missing => missing,
        };
        Some(self.switch_locale(locale))
    }

    /// The same logical location under `locale`.
    pub fn switch_locale(&self, locale: SupportedLocale) -> Self {
        // The bare root maps to `/{locale}`, not `/{locale}/`.
        let rest = if self.path == "/" { "" } else { self.rest() };
        self.with_path(localized_path(locale, rest))
    }
}

/// Joins a locale code and a path remainder.
pub fn localized_path(locale: SupportedLocale, rest: &str) -> String {
    format!("/{}{}", locale, rest)
}

/// `"/en/about"` gives `("en", "/about")`, `"/en"` gives `("en", "")`.
fn split_first_segment(path: &str) -> (&str, &str) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    match trimmed.find('/') {
        Some(i) => (&trimmed[..i], &trimmed[i..]),
        None => (trimmed, ""),
    }
}

/// A bare 2 letter code (`xx`, `EN`), or a tag with subtags naming a
/// supported language (`zh-CN`, `en_us`).
///
/// Any other segment is the start of a logical path, so `faq` or `map` is
/// kept and a prefix is prepended instead.
fn looks_like_language_tag(segment: &str) -> bool {
    if segment.len() == 2 {
        return segment.chars().all(|c| c.is_ascii_alphabetic());
    }

    let candidate = segment.replace('_', "-");
    let Some((primary, _)) = candidate.split_once('-') else {
        return false;
    };

    (2..=3).contains(&primary.len())
        && primary.chars().all(|c| c.is_ascii_alphabetic())
        && candidate.parse::<LanguageIdentifier>().is_ok()
        && recognize(&candidate).is_some()
}
