//! Header and footer navigation read from the `nav` bundle.

use clinic_i18n_lang::SupportedLocale;
use clinic_i18n_manager_core::ResourceBundle;
use clinic_i18n_router::{RouteState, localized_path};
use serde::{Deserialize, Serialize};

/// One navigation entry.
///
/// Entries with a `scroll_to_id` point at a section of the home page instead
/// of a route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub pk: u32,
    #[serde(default)]
    pub path: String,
    pub label: String,
    #[serde(default = "displayed")]
    pub display: bool,
    #[serde(default)]
    pub mobile_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_to_id: Option<String>,
}

fn displayed() -> bool {
    true
}

/// Which menu is being rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Viewport {
    Desktop,
    Mobile,
}

/// What activating a [`NavItem`] does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavTarget {
    /// Push-navigate to this href.
    Link(String),
    /// The section is on the current page; scroll to it.
    ScrollInPlace(String),
}

impl NavItem {
    /// The item's href under `locale`.
    pub fn href(&self, locale: SupportedLocale) -> String {
        match &self.scroll_to_id {
            Some(id) => format!("{}#{id}", home_path(locale)),
            None => with_prefix(locale, &self.path),
        }
    }

    pub fn target(&self, locale: SupportedLocale, current: &RouteState) -> NavTarget {
        match &self.scroll_to_id {
            Some(id) if is_home(current) => NavTarget::ScrollInPlace(id.clone()),
            _ => NavTarget::Link(self.href(locale)),
        }
    }

    /// Whether the item is highlighted for `current`.
    pub fn is_active(&self, current: &RouteState) -> bool {
        match &self.scroll_to_id {
            Some(id) => is_home(current) && current.fragment() == Some(id.as_str()),
            None => {
                let path = normalize_slashes(&format!("/{}", self.path));
                path != "/"
                    && current.logical_path().trim_end_matches('/') == path.trim_end_matches('/')
            },
        }
    }
}

/// The items of a `nav` bundle: either a top-level array or an `items` array.
///
/// Unparseable content yields an empty menu.
pub fn nav_items(bundle: &ResourceBundle) -> Vec<NavItem> {
    let parsed = match bundle.deserialize::<Vec<NavItem>>() {
        Ok(items) => Ok(Some(items)),
        Err(_) => bundle.section::<Vec<NavItem>>("items"),
    };

    match parsed {
        Ok(items) => items.unwrap_or_default(),
        Err(error) => {
            tracing::warn!(
                locale = %bundle.locale(),
                page = %bundle.page(),
                %error,
                "Malformed navigation items"
            );
            Vec::new()
        },
    }
}

/// Displayed items for `viewport`, in bundle order.
pub fn visible_items(items: &[NavItem], viewport: Viewport) -> Vec<NavItem> {
    items
        .iter()
        .filter(|item| item.display)
        .filter(|item| viewport == Viewport::Mobile || !item.mobile_only)
        .cloned()
        .collect()
}

/// `/{locale}/`.
pub fn home_path(locale: SupportedLocale) -> String {
    localized_path(locale, "/")
}

/// Joins `path` under the locale prefix; empty and `/` give the home path.
pub fn with_prefix(locale: SupportedLocale, path: &str) -> String {
    if path.is_empty() || path == "/" {
        return home_path(locale);
    }
    normalize_slashes(&localized_path(locale, &format!("/{path}")))
}

pub fn is_home(route: &RouteState) -> bool {
    route.logical_path() == "/"
}

fn normalize_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
