#![doc = include_str!("../README.md")]

pub use unic_langid::{LanguageIdentifier, langid};

mod locale;
mod normalize;
mod resolve;

pub use locale::{SupportedLocale, UnsupportedLocaleError};
pub use normalize::{LocaleNormalizer, normalize, recognize};
pub use resolve::{LocaleResolutionInput, negotiate_accept_language};
