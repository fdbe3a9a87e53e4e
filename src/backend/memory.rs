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

use crate::backend::{CommitMeta, CommitRecord, ObjectBackend, PreviousValue, TreeEntries};
use crate::errors::KvError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Shortest abbreviated id accepted by [`MemoryBackend::resolve`].
const MIN_ABBREV_LEN: usize = 4;

/// Content address of an object held by a [`MemoryBackend`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemoryId(pub [u8; 32]);

impl MemoryId {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let array: [u8; 32] = bytes.try_into().ok()?;
        Some(MemoryId(array))
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryId({})", &self.to_hex()[..12])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum StoredObject {
    Blob(Vec<u8>),
    Tree(TreeEntries<MemoryId>),
    Commit(CommitRecord<MemoryId>),
}

impl StoredObject {
    fn kind(&self) -> &'static str {
        match self {
            StoredObject::Blob(_) => "blob",
            StoredObject::Tree(_) => "tree",
            StoredObject::Commit(_) => "commit",
        }
    }
}

/// An in-process object store.
///
/// Objects are addressed by the SHA-256 of their bincode encoding and are
/// never removed. Every trait call is counted, which lets callers check that
/// an operation did not reach the backend at all.
#[derive(Default)]
pub struct MemoryBackend {
    objects: Mutex<HashMap<MemoryId, StoredObject>>,
    refs: Mutex<HashMap<String, MemoryId>>,
    calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of [`ObjectBackend`] calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of distinct objects stored.
    pub fn object_count(&self) -> Result<usize, KvError> {
        Ok(self.objects()?.len())
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn objects(&self) -> Result<MutexGuard<'_, HashMap<MemoryId, StoredObject>>, KvError> {
        self.objects
            .lock()
            .map_err(|_| KvError::Backend("object map lock poisoned".to_string()))
    }

    fn refs(&self) -> Result<MutexGuard<'_, HashMap<String, MemoryId>>, KvError> {
        self.refs
            .lock()
            .map_err(|_| KvError::Backend("reference map lock poisoned".to_string()))
    }

    fn write_object(&self, object: StoredObject) -> Result<MemoryId, KvError> {
        let encoded = bincode::serialize(&object)?;
        let id = MemoryId(Sha256::digest(&encoded).into());
        self.objects()?.entry(id).or_insert(object);
        Ok(id)
    }

    fn read_object(&self, id: &MemoryId) -> Result<StoredObject, KvError> {
        self.objects()?
            .get(id)
            .cloned()
            .ok_or_else(|| KvError::ObjectNotFound(id.to_hex()))
    }

    fn find_commit_by_prefix(&self, prefix: &str) -> Result<Option<MemoryId>, KvError> {
        let prefix = prefix.to_ascii_lowercase();
        let objects = self.objects()?;
        let mut matches = objects
            .iter()
            .filter(|(id, object)| {
                matches!(object, StoredObject::Commit(_)) && id.to_hex().starts_with(&prefix)
            })
            .map(|(id, _)| *id);

        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(Some(id)),
            (Some(_), Some(_)) => Err(KvError::RevisionNotFound(format!("{prefix} is ambiguous"))),
            _ => Ok(None),
        }
    }

    fn is_commit(&self, id: &MemoryId) -> Result<bool, KvError> {
        Ok(matches!(self.objects()?.get(id), Some(StoredObject::Commit(_))))
    }
}

impl ObjectBackend for MemoryBackend {
    type Id = MemoryId;

    fn write_blob(&self, data: &[u8]) -> Result<MemoryId, KvError> {
        self.record_call();
        self.write_object(StoredObject::Blob(data.to_vec()))
    }

    fn write_tree(&self, entries: &TreeEntries<MemoryId>) -> Result<MemoryId, KvError> {
        self.record_call();
        self.write_object(StoredObject::Tree(entries.clone()))
    }

    fn read_tree(&self, id: &MemoryId) -> Result<TreeEntries<MemoryId>, KvError> {
        self.record_call();
        match self.read_object(id)? {
            StoredObject::Tree(entries) => Ok(entries),
            other => Err(KvError::UnexpectedObject(format!(
                "{id} is a {}, not a tree",
                other.kind()
            ))),
        }
    }

    fn read_blob(&self, id: &MemoryId) -> Result<Vec<u8>, KvError> {
        self.record_call();
        match self.read_object(id)? {
            StoredObject::Blob(data) => Ok(data),
            other => Err(KvError::UnexpectedObject(format!(
                "{id} is a {}, not a blob",
                other.kind()
            ))),
        }
    }

    fn read_commit(&self, id: &MemoryId) -> Result<CommitRecord<MemoryId>, KvError> {
        self.record_call();
        match self.read_object(id)? {
            StoredObject::Commit(commit) => Ok(commit),
            other => Err(KvError::UnexpectedObject(format!(
                "{id} is a {}, not a commit",
                other.kind()
            ))),
        }
    }

    fn create_commit(
        &self,
        tree: &MemoryId,
        parent: Option<&MemoryId>,
        meta: &CommitMeta,
    ) -> Result<MemoryId, KvError> {
        self.record_call();
        if !matches!(self.objects()?.get(tree), Some(StoredObject::Tree(_))) {
            return Err(KvError::ObjectNotFound(format!("tree {tree}")));
        }
        self.write_object(StoredObject::Commit(CommitRecord {
            tree: *tree,
            parents: parent.into_iter().copied().collect(),
            meta: meta.clone(),
        }))
    }

    fn get_ref(&self, name: &str) -> Result<Option<MemoryId>, KvError> {
        self.record_call();
        Ok(self.refs()?.get(name).copied())
    }

    fn update_ref(
        &self,
        name: &str,
        new: &MemoryId,
        previous: PreviousValue<'_, MemoryId>,
    ) -> Result<(), KvError> {
        self.record_call();
        if !self.is_commit(new)? {
            return Err(KvError::ObjectNotFound(format!("commit {new}")));
        }

        let mut refs = self.refs()?;
        let current = refs.get(name).copied();
        let conflict = |expected: String| KvError::Conflict {
            reference: name.to_string(),
            expected,
            actual: current.map_or_else(|| "<none>".to_string(), |id| id.to_hex()),
        };

        match previous {
            PreviousValue::Any => {}
            PreviousValue::MustNotExist if current.is_some() => {
                return Err(conflict("<none>".to_string()));
            }
            PreviousValue::MustMatch(expected) if current.as_ref() != Some(expected) => {
                return Err(conflict(expected.to_hex()));
            }
            _ => {}
        }

        refs.insert(name.to_string(), *new);
        Ok(())
    }

    fn resolve(&self, rev: &str) -> Result<MemoryId, KvError> {
        self.record_call();

        if let Some(id) = MemoryId::from_hex(rev) {
            if self.is_commit(&id)? {
                return Ok(id);
            }
        }

        let target = {
            let refs = self.refs()?;
            refs.get(rev)
                .or_else(|| refs.get(&format!("refs/heads/{rev}")))
                .copied()
        };
        if let Some(id) = target {
            return Ok(id);
        }

        if rev.len() >= MIN_ABBREV_LEN && rev.chars().all(|c| c.is_ascii_hexdigit()) {
            if let Some(id) = self.find_commit_by_prefix(rev)? {
                return Ok(id);
            }
        }

        Err(KvError::RevisionNotFound(rev.to_string()))
    }
}
