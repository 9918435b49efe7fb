//! `Disclosure` Context Loader
//!
//! Progressive disclosure of reference text to a language model.
//!
//! ## Levels
//!
//! - Level 1 (Summary): every guide's description, always resident
//! - Level 2 (Guide): the full guide body, once a topic keyword matched
//! - Level 3 (Reference): a bundled sub-document, once its guide is loaded
//!   and a sub-topic keyword matched
//!
//! The [`Loader`] decides what to fetch; a [`ContentStore`] does the
//! reading; a [`Session`] remembers what one conversation already loaded.
//!
//! ```no_run
//! use disclosure_loader::prelude::*;
//!
//! let discovery = GuideDiscovery::new().add_directory("guides");
//! let loader = Loader::new(discovery.discover()?, discovery.store());
//! let mut session = Session::new();
//!
//! let disclosure = loader.handle_request(&mut session, "a reactivity bug in my composable");
//! for blob in &disclosure.blobs {
//!     println!("{}", blob.text);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod catalog;
pub mod error;
pub mod fallback;
pub mod guide;
pub mod loader;
pub mod session;
pub mod store;
pub mod trigger;

pub use catalog::{Catalog, GuideDiscovery};
pub use error::{LoadError, StoreError};
pub use fallback::{FallbackKind, FallbackStrategy};
pub use guide::{Guide, Reference};
pub use loader::{Blob, Disclosure, LoadWarning, Loader};
pub use session::{LoadLevel, Session};
pub use store::{ContentStore, FsStore, MemoryStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, ContentStore, Disclosure, FsStore, Guide, GuideDiscovery, LoadError, LoadLevel,
        Loader, MemoryStore, Reference, Session,
    };
}
