//! The host environment the router writes to and reads from.

/// How a scroll is performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Client-side router.
pub trait Navigator: Send + Sync {
    /// Replaces the current history entry with `href` (no new entry).
    fn replace(&self, href: &str);
}

/// The rendered document.
pub trait DocumentEnv: Send + Sync {
    /// Sets the language attribute of the root element.
    fn set_lang(&self, lang: &str);

    /// Measured height of the fixed header.
    fn header_height(&self) -> f64;

    /// Document-relative top of the element with this id, if it is mounted.
    fn element_top(&self, id: &str) -> Option<f64>;

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);
}

/// Persistent key-value storage, such as the browser's `localStorage`.
///
/// The chosen locale code is kept under the configured preference key.
pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&self, key: &str, value: &str);
}
