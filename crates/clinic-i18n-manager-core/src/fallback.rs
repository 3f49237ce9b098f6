use clinic_i18n_lang::SupportedLocale;

/// Returns the lookup order for `requested`.
///
/// This yields the requested locale first, then each of `fallbacks` that has
/// not been listed yet.
pub fn fallback_chain(
    requested: SupportedLocale,
    fallbacks: &[SupportedLocale],
) -> Vec<SupportedLocale> {
    let mut chain = Vec::with_capacity(fallbacks.len() + 1);
    chain.push(requested);

    for locale in fallbacks {
        if !chain.contains(locale) {
            chain.push(*locale);
        }
    }

    chain
}

/// Picks the first locale of the fallback chain that is available.
pub fn resolve_fallback_locale(
    requested: SupportedLocale,
    fallbacks: &[SupportedLocale],
    available: &[SupportedLocale],
) -> Option<SupportedLocale> {
    fallback_chain(requested, fallbacks)
        .into_iter()
        .find(|candidate| available.contains(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use SupportedLocale::{Cn, En, Ko};

    #[test]
    fn chain_starts_with_requested_and_skips_duplicates() {
        assert_eq!(fallback_chain(Cn, &[En, Ko]), vec![Cn, En, Ko]);
        assert_eq!(fallback_chain(En, &[En, Ko]), vec![En, Ko]);
        assert_eq!(fallback_chain(Ko, &[]), vec![Ko]);
    }

    #[test]
    fn resolve_prefers_requested() {
        assert_eq!(resolve_fallback_locale(Ko, &[En], &[En, Ko]), Some(Ko));
    }

    #[test]
    fn resolve_walks_fallbacks_in_order() {
        assert_eq!(resolve_fallback_locale(Cn, &[En, Ko], &[Ko, En]), Some(En));
        assert_eq!(resolve_fallback_locale(Cn, &[En, Ko], &[Ko]), Some(Ko));
    }

    #[test]
    fn resolve_returns_none_when_missing() {
        assert_eq!(resolve_fallback_locale(Cn, &[En], &[Ko]), None);
    }
}
