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

use crate::backend::ObjectBackend;
use crate::config::StoreConfig;
use crate::errors::KvError;
use crate::key::Key;
use crate::store::{collect_values, KvStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// A value found while enumerating the whole namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    /// Top-level segment, i.e. the textual form of the version id.
    pub version: String,
    pub key: Key,
    pub value: Vec<u8>,
}

/// Hands out one [`KvStore`] per version.
///
/// Stores are keyed strictly on the resolved version id and are never
/// evicted, so repeated lookups of the same version yield the same
/// `Arc`. A symbolic revision that later resolves to another id yields a
/// different store.
pub struct VersionStoreRegistry<B: ObjectBackend> {
    backend: Arc<B>,
    config: Arc<StoreConfig>,
    stores: Mutex<HashMap<B::Id, Arc<KvStore<B>>>>,
}

impl<B: ObjectBackend> VersionStoreRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, StoreConfig::default())
    }

    pub fn with_config(backend: B, config: StoreConfig) -> Self {
        VersionStoreRegistry {
            backend: Arc::new(backend),
            config: Arc::new(config),
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the store for an already resolved version id.
    pub fn store(&self, version: B::Id) -> Result<Arc<KvStore<B>>, KvError> {
        let mut stores = self.stores()?;
        let store = stores.entry(version).or_insert_with_key(|version| {
            debug!(%version, "creating store");
            Arc::new(KvStore::new(
                self.backend.clone(),
                version.clone(),
                self.config.clone(),
            ))
        });
        Ok(store.clone())
    }

    /// Resolves `rev` (id, abbreviated id or reference name) and returns its store.
    pub fn store_for(&self, rev: &str) -> Result<Arc<KvStore<B>>, KvError> {
        let version = self.backend.resolve(rev)?;
        debug!(rev, %version, "resolved revision");
        self.store(version)
    }

    /// Number of stores handed out so far.
    pub fn len(&self) -> Result<usize, KvError> {
        Ok(self.stores()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, KvError> {
        Ok(self.len()? == 0)
    }

    fn stores(&self) -> Result<MutexGuard<'_, HashMap<B::Id, Arc<KvStore<B>>>>, KvError> {
        self.stores.lock().map_err(|_| {
            KvError::Backend("Failed to acquire lock on store registry".to_string())
        })
    }

    /// Every value stored for any version, ordered by version then key.
    pub fn list_all(&self) -> Result<Vec<NamespaceEntry>, KvError> {
        let Some(commit) = self.backend.get_ref(&self.config.ref_name)? else {
            return Ok(Vec::new());
        };
        let root = self.backend.read_commit(&commit)?.tree;

        let mut found = Vec::new();
        collect_values(self.backend.as_ref(), &root, &mut Vec::new(), &mut found)?;

        let mut entries = Vec::with_capacity(found.len());
        for (mut segments, blob) in found {
            let version = segments.remove(0);
            if let Some(key) = Key::from_segments(segments) {
                entries.push(NamespaceEntry {
                    version,
                    key,
                    value: self.backend.read_blob(&blob)?,
                });
            }
        }
        entries.sort_by(|a, b| (&a.version, &a.key).cmp(&(&b.version, &b.key)));
        Ok(entries)
    }
}
