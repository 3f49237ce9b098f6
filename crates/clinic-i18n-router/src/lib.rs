#![doc = include_str!("../README.md")]

pub mod env;
pub mod memory;
pub mod route;
pub mod routes;
pub mod scroll;
pub mod sync;

pub use env::{DocumentEnv, Navigator, PreferenceStore, ScrollBehavior};
pub use route::{LocalePrefix, RouteState, localized_path};
pub use routes::{PageRoute, SHELL_BUNDLES};
pub use scroll::{NavigationIntent, ScrollAction, ScrollCoordinator, ScrollTarget};
pub use sync::{ActiveLocale, LocaleReader, RouteSync, SyncSettings, Synchronizer};
