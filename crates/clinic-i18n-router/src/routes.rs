//! The site's page table, keyed by logical path.

use clinic_i18n_manager_core::PageName;

/// Bundles the page shell (header, footer, booking modal) needs on every page.
pub const SHELL_BUNDLES: [PageName; 2] = [PageName::COMMON, PageName::NAV];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageRoute {
    Home,
    About,
    Event { category_id: Option<String> },
    Treatments,
    Admin,
    AdminLogin,
    StyleGuide,
    NotFound,
}

impl PageRoute {
    /// Matches a logical path (locale prefix already removed).
    pub fn parse(logical_path: &str) -> Self {
        let segments: Vec<&str> = logical_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["about"] => Self::About,
            ["event"] => Self::Event { category_id: None },
            ["event", category_id] => Self::Event {
                category_id: Some((*category_id).to_string()),
            },
            ["treatments"] => Self::Treatments,
            ["admin"] => Self::Admin,
            ["admin", "login"] => Self::AdminLogin,
            ["styleguide"] => Self::StyleGuide,
            _ => Self::NotFound,
        }
    }

    /// Page bundles rendered by this route, shell excluded.
    pub fn page_bundles(&self) -> &'static [PageName] {
        match self {
            Self::Home => &[PageName::HOME, PageName::SLIDES],
            Self::About => &[PageName::ABOUT],
            Self::Event { .. } => &[PageName::EVENT],
            Self::Treatments => &[PageName::TREATMENTS],
            Self::Admin | Self::AdminLogin => &[PageName::ADMIN],
            Self::StyleGuide | Self::NotFound => &[],
        }
    }

    /// Shell bundles followed by the page's own.
    pub fn bundles(&self) -> Vec<PageName> {
        SHELL_BUNDLES
            .iter()
            .chain(self.page_bundles())
            .copied()
            .collect()
    }
}
