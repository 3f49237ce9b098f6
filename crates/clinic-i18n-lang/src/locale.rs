use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use unic_langid::{LanguageIdentifier, langid};

/// A locale the site publishes content in.
///
/// The serialized form is the URL code, so `SupportedLocale::Cn` appears as
/// `"cn"` both in paths and in stored preferences.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLocale {
    Ko,
    #[default]
    En,
    Cn,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{0}' is not a supported locale code (expected one of ko, en, cn)")]
pub struct UnsupportedLocaleError(pub String);

impl SupportedLocale {
    /// Every supported locale, in language-picker order.
    pub const ALL: [SupportedLocale; 3] = [Self::Ko, Self::En, Self::Cn];

    /// The code used as the URL prefix and as the stored preference value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ko => "ko",
            Self::En => "en",
            Self::Cn => "cn",
        }
    }

    /// Exact match against URL codes. Case-sensitive, no subtags.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|locale| locale.as_str() == code)
    }

    /// BCP 47 tag written to the document language attribute.
    pub const fn lang_tag(self) -> &'static str {
        match self {
            Self::Ko => "ko",
            Self::En => "en",
            Self::Cn => "zh-CN",
        }
    }

    pub fn language_identifier(self) -> LanguageIdentifier {
        match self {
            Self::Ko => langid!("ko"),
            Self::En => langid!("en"),
            Self::Cn => langid!("zh-CN"),
        }
    }

    /// Short label shown by the language picker.
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Ko => "KR",
            Self::En => "US",
            Self::Cn => "CN",
        }
    }
}

impl fmt::Display for SupportedLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupportedLocale {
    type Err = UnsupportedLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnsupportedLocaleError(s.to_owned()))
    }
}
