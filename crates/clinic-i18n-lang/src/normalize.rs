use crate::SupportedLocale;

/// Coerces raw language signals into a [`SupportedLocale`].
///
/// The normalizer is total: any input, including empty or malformed tags,
/// yields a member of the supported set. Unrecognized input degrades to the
/// configured default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocaleNormalizer {
    default: SupportedLocale,
}

impl Default for LocaleNormalizer {
    fn default() -> Self {
        Self::new(SupportedLocale::En)
    }
}

impl LocaleNormalizer {
    pub const fn new(default: SupportedLocale) -> Self {
        Self { default }
    }

    pub const fn default_locale(&self) -> SupportedLocale {
        self.default
    }

    pub fn normalize(&self, raw: &str) -> SupportedLocale {
        recognize(raw).unwrap_or(self.default)
    }
}

/// Normalizes with `en` as the default.
pub fn normalize(raw: &str) -> SupportedLocale {
    LocaleNormalizer::default().normalize(raw)
}

/// Maps a raw tag to a supported locale by its leading letters.
///
/// Tags starting with `ko` map to `ko`, with `zh` or `cn` to `cn` and with
/// `en` to `en`, case-insensitively. Returns `None` for everything else.
pub fn recognize(raw: &str) -> Option<SupportedLocale> {
    // POSIX style values carry an encoding or modifier: `ko_KR.UTF-8`, `sr@latin`.
    let tag = raw
        .trim()
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if tag.starts_with("ko") {
        Some(SupportedLocale::Ko)
    } else if tag.starts_with("zh") || tag.starts_with("cn") {
        Some(SupportedLocale::Cn)
    } else if tag.starts_with("en") {
        Some(SupportedLocale::En)
    } else {
        None
    }
}
