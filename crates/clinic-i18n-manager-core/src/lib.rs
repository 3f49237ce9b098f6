//! Core bundle management for the clinic-i18n locale layer.
//!
//! This crate provides the [`ResourceLoader`] and the provider seams it reads
//! from, without any routing or document concerns.

pub mod assets;
pub mod bundle;
pub mod embedded;
pub mod fallback;
pub mod loader;
pub mod messages;
pub mod page;
pub mod provider;
pub mod registry;

pub use assets::AssetDirBundles;
pub use bundle::{BundleOrigin, ResourceBundle};
pub use embedded::EmbeddedBundles;
pub use loader::{LoadOutcome, LoadTicket, ResourceLoader};
pub use messages::{MessageCatalog, MessageError};
pub use page::PageName;
pub use provider::{BundleFuture, BundleProvider, ProviderError};
pub use registry::{BundleRegistry, StaticBundle};
