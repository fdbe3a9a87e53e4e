/*
Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! # Percs
//!
//! A versioned per-commit key/value store layered on top of a content-addressed,
//! tree-structured object store such as a git repository.
//!
//! Each version (a commit id) gets its own key/value namespace. Values are
//! persisted inside the object store itself, under the path
//! `<version>/<key segments...>/.value` of the tree committed to a dedicated
//! pointer, so the data is durable, inspectable with the object store's own
//! tooling, and keeps its full history.
//!
//! ## Features
//!
//! - **Structural sharing**: a write rebuilds only the trees along its own path
//!   and reuses every other subtree by id.
//! - **History**: every write is a commit on top of the previous one; old
//!   commits stay readable.
//! - **Prefix independence**: `foo` and `foo/bar` can both hold values.
//! - **No caching**: every read re-resolves the pointer, so writes made by
//!   other processes are visible immediately.
//!
//! ## Usage
//!
//! ```no_run
//! # #[cfg(feature = "git")]
//! # fn main() -> Result<(), percs::errors::KvError> {
//! use percs::git::GitBackend;
//! use percs::registry::VersionStoreRegistry;
//!
//! let registry = VersionStoreRegistry::new(GitBackend::open(".")?);
//! let store = registry.store_for("HEAD")?;
//! store.set("build/status", "passed")?;
//! assert_eq!(store.get("build/status")?, b"passed");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "git"))]
//! # fn main() {}
//! ```

pub mod backend;
pub mod config;
pub mod errors;
#[cfg(feature = "git")]
pub mod git;
pub mod key;
pub mod registry;
pub mod store;

pub use backend::{MemoryBackend, ObjectBackend};
pub use config::StoreConfig;
pub use errors::KvError;
pub use key::Key;
pub use registry::VersionStoreRegistry;
pub use store::KvStore;
