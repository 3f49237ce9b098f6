use crate::env::{DocumentEnv, ScrollBehavior};
use crate::route::RouteState;
use clinic_i18n_toml::ScrollConfig;

/// Where a route transition wants the viewport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScrollTarget {
    Top,
    Anchor(String),
}

/// A pending scroll for one route transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationIntent {
    generation: u64,
    target: ScrollTarget,
}

impl NavigationIntent {
    pub fn target(&self) -> &ScrollTarget {
        &self.target
    }
}

/// A scroll that was performed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollAction {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// Turns route transitions into at most one scroll each.
#[derive(Debug)]
pub struct ScrollCoordinator {
    gutter: f64,
    behavior: ScrollBehavior,
    generation: u64,
    acted: u64,
    last: Option<(String, String)>,
}

impl Default for ScrollCoordinator {
    fn default() -> Self {
        Self::from_config(&ScrollConfig::default())
    }
}

impl ScrollCoordinator {
    pub fn new(gutter: f64, behavior: ScrollBehavior) -> Self {
        Self {
            gutter,
            behavior,
            generation: 0,
            acted: 0,
            last: None,
        }
    }

    pub fn from_config(config: &ScrollConfig) -> Self {
        let behavior = if config.smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        };
        Self::new(config.gutter, behavior)
    }

    /// Starts a transition to `route`, superseding any unresolved intent.
    ///
    /// Returns `None` when `route` has the same path and hash as the previous
    /// transition.
    pub fn begin(&mut self, route: &RouteState) -> Option<NavigationIntent> {
        let key = (route.path().to_string(), route.hash().to_string());
        if self.last.as_ref() == Some(&key) {
            return None;
        }
        self.last = Some(key);
        self.generation += 1;

        let target = match route.fragment() {
            Some(id) => ScrollTarget::Anchor(id.to_string()),
            None => ScrollTarget::Top,
        };

        Some(NavigationIntent {
            generation: self.generation,
            target,
        })
    }

    /// Performs the intent's scroll if it belongs to the newest transition and
    /// has not been acted upon yet.
    ///
    /// An anchor that is not mounted scrolls to the top instead.
    pub fn resolve(
        &mut self,
        intent: &NavigationIntent,
        document: &dyn DocumentEnv,
    ) -> Option<ScrollAction> {
        if intent.generation != self.generation || self.acted == intent.generation {
            tracing::debug!(
                intent = intent.generation,
                newest = self.generation,
                "Dropping stale scroll intent"
            );
            return None;
        }
        self.acted = intent.generation;

        let top = match &intent.target {
            ScrollTarget::Top => 0.0,
            ScrollTarget::Anchor(id) => match document.element_top(id) {
                Some(element_top) => {
                    (element_top - document.header_height() - self.gutter).max(0.0)
                },
                None => {
                    tracing::debug!(anchor = %id, "Scroll target not mounted, scrolling to top");
                    0.0
                },
            },
        };

        let action = ScrollAction {
            top,
            behavior: self.behavior,
        };
        document.scroll_to(action.top, action.behavior);
        Some(action)
    }

    /// [`begin`](Self::begin) and [`resolve`](Self::resolve) in one step.
    pub fn on_navigate(
        &mut self,
        route: &RouteState,
        document: &dyn DocumentEnv,
    ) -> Option<ScrollAction> {
        let intent = self.begin(route)?;
        self.resolve(&intent, document)
    }
}
