use crate::{LocaleNormalizer, SupportedLocale, recognize};

/// Untrusted signals that may suggest a locale for one navigation.
///
/// Precedence is path segment, then stored preference, then the browser's
/// `Accept-Language` list, then the normalizer default. A signal only wins its
/// rank when it names a supported language.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocaleResolutionInput {
    pub path_segment: Option<String>,
    pub stored_preference: Option<String>,
    pub accept_language: Option<String>,
}

impl LocaleResolutionInput {
    pub fn resolve(&self, normalizer: &LocaleNormalizer) -> SupportedLocale {
        let direct = [
            self.path_segment.as_deref(),
            self.stored_preference.as_deref(),
        ];

        let resolved = direct
            .into_iter()
            .flatten()
            .find_map(recognize)
            .or_else(|| self.accept_language.as_deref().and_then(best_accept_language));

        match resolved {
            Some(locale) => locale,
            None => {
                tracing::debug!(
                    default = %normalizer.default_locale(),
                    "no usable locale signal, using default"
                );
                normalizer.default_locale()
            },
        }
    }
}

/// Picks the highest weighted supported language from an `Accept-Language`
/// value such as `ko-KR,ko;q=0.9,en;q=0.8`.
pub fn negotiate_accept_language(header: &str, normalizer: &LocaleNormalizer) -> SupportedLocale {
    best_accept_language(header).unwrap_or_else(|| normalizer.default_locale())
}

fn best_accept_language(header: &str) -> Option<SupportedLocale> {
    let mut best: Option<(f32, SupportedLocale)> = None;

    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let tag = parts.next().unwrap_or_default().trim();
        if tag.is_empty() || tag == "*" {
            continue;
        }

        let quality = parts
            .filter_map(|param| param.trim().strip_prefix("q="))
            .find_map(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);
        if quality <= 0.0 || quality.is_nan() {
            continue;
        }

        let Some(locale) = recognize(tag) else {
            continue;
        };

        // Earlier entries win ties.
        if best.is_none_or(|(best_quality, _)| quality > best_quality) {
            best = Some((quality, locale));
        }
    }

    best.map(|(_, locale)| locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7", SupportedLocale::Ko)]
    #[case("fr-FR,fr;q=0.9,zh-CN;q=0.8,en;q=0.5", SupportedLocale::Cn)]
    #[case("en;q=0.4, ko;q=0.6", SupportedLocale::Ko)]
    #[case("ko;q=0, en;q=0.1", SupportedLocale::En)]
    #[case("zh;q=0.5, en;q=0.5", SupportedLocale::Cn)]
    #[case("ko;q=oops", SupportedLocale::Ko)]
    fn accept_language_prefers_weight_then_order(
        #[case] header: &str,
        #[case] expected: SupportedLocale,
    ) {
        let normalizer = LocaleNormalizer::new(SupportedLocale::En);
        assert_eq!(negotiate_accept_language(header, &normalizer), expected);
    }

    #[rstest]
    #[case("")]
    #[case("*")]
    #[case("fr, de;q=0.9")]
    #[case("ko;q=0")]
    fn accept_language_without_candidates_uses_default(#[case] header: &str) {
        let normalizer = LocaleNormalizer::new(SupportedLocale::Ko);
        assert_eq!(
            negotiate_accept_language(header, &normalizer),
            SupportedLocale::Ko
        );
    }

    #[test]
    fn path_segment_outranks_everything() {
        let input = LocaleResolutionInput {
            path_segment: Some("cn".into()),
            stored_preference: Some("ko".into()),
            accept_language: Some("en".into()),
        };
        assert_eq!(input.resolve(&LocaleNormalizer::default()), SupportedLocale::Cn);
    }

    #[test]
    fn unsupported_signals_do_not_claim_their_rank() {
        let input = LocaleResolutionInput {
            path_segment: Some("about".into()),
            stored_preference: Some("fr".into()),
            accept_language: Some("de, ko;q=0.3".into()),
        };
        assert_eq!(input.resolve(&LocaleNormalizer::default()), SupportedLocale::Ko);
    }

    #[test]
    fn stored_preference_beats_browser_language() {
        let input = LocaleResolutionInput {
            path_segment: None,
            stored_preference: Some("ko".into()),
            accept_language: Some("zh-CN".into()),
        };
        assert_eq!(input.resolve(&LocaleNormalizer::default()), SupportedLocale::Ko);
    }

    #[test]
    fn empty_input_resolves_to_default() {
        let normalizer = LocaleNormalizer::new(SupportedLocale::Cn);
        assert_eq!(
            LocaleResolutionInput::default().resolve(&normalizer),
            SupportedLocale::Cn
        );
    }
}
