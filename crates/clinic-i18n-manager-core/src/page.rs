use std::fmt;

/// Name of a page or shared section that owns a resource bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageName(&'static str);

impl PageName {
    /// Strings shared by every page: buttons, form labels, toasts.
    pub const COMMON: Self = Self("common");
    /// Header and footer navigation entries.
    pub const NAV: Self = Self("nav");
    pub const HOME: Self = Self("home");
    pub const ABOUT: Self = Self("about");
    pub const EVENT: Self = Self("event");
    pub const TREATMENTS: Self = Self("treatments");
    /// Carousel slides on the home page.
    pub const SLIDES: Self = Self("slides");
    pub const ADMIN: Self = Self("admin");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
