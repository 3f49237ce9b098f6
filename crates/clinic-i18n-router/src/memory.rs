//! In-process environment for server rendering and tests.

use crate::env::{DocumentEnv, Navigator, PreferenceStore, ScrollBehavior};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Records every replace-navigation.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every href passed to [`Navigator::replace`], oldest first.
    pub fn replacements(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }
}

impl Navigator for MemoryNavigator {
    fn replace(&self, href: &str) {
        self.history.lock().push(href.to_string());
    }
}

#[derive(Debug, Default)]
struct DocumentState {
    lang: Option<String>,
    header_height: f64,
    elements: FxHashMap<String, f64>,
    scrolls: Vec<(f64, ScrollBehavior)>,
}

/// A document with a fixed header and a set of positioned elements.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    state: Mutex<DocumentState>,
}

impl MemoryDocument {
    pub fn new(header_height: f64) -> Self {
        let document = Self::default();
        document.state.lock().header_height = header_height;
        document
    }

    /// Mounts an element with `id` at document-relative `top`.
    pub fn mount(&self, id: &str, top: f64) {
        self.state.lock().elements.insert(id.to_string(), top);
    }

    pub fn unmount(&self, id: &str) {
        self.state.lock().elements.remove(id);
    }

    pub fn lang(&self) -> Option<String> {
        self.state.lock().lang.clone()
    }

    /// Every scroll performed, oldest first.
    pub fn scrolls(&self) -> Vec<(f64, ScrollBehavior)> {
        self.state.lock().scrolls.clone()
    }
}

impl DocumentEnv for MemoryDocument {
    fn set_lang(&self, lang: &str) {
        self.state.lock().lang = Some(lang.to_string());
    }

    fn header_height(&self) -> f64 {
        self.state.lock().header_height
    }

    fn element_top(&self, id: &str) -> Option<f64> {
        self.state.lock().elements.get(id).copied()
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        self.state.lock().scrolls.push((top, behavior));
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<FxHashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `key` with `value`.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.values.lock().insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }
}
