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

//! Per-version key/value store.
//!
//! Every value lives in the backend under the path
//! `<version>/<segment-1>/.../<segment-n>/.value`, inside the tree of the
//! commit the configured pointer (by default `refs/heads/percs`) targets:
//!
//! ```text
//! <first version>/
//!     foo/
//!         .value
//!         bar/
//!             .value
//! <second version>/
//!     123/
//!         456/
//!             .value
//! ```
//!
//! Writes never touch existing objects. A `set` rebuilds only the trees along
//! the written path, reuses every other subtree by id, commits the new root on
//! top of the pointer's previous commit and relinks the pointer.
//!
//! Nothing is cached: every call re-reads the pointer, so writes made by other
//! processes are visible on the next call. The pointer is shared by all
//! versions and keys. Two writers that read it before either relinks race;
//! with [`StoreConfig::compare_and_swap`] the second relink fails with
//! [`KvError::Conflict`], without it the second relink wins and the first
//! commit is left unreferenced.

use crate::backend::{CommitMeta, ObjectBackend, PreviousValue, TreeEntries, TreeEntry};
use crate::config::StoreConfig;
use crate::errors::KvError;
use crate::key::{Key, LEAF_MARKER};
use std::sync::Arc;
use tracing::{debug, trace};

/// A commit reachable from the store pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry<Id> {
    pub id: Id,
    pub meta: CommitMeta,
}

/// Key/value store bound to a single version.
pub struct KvStore<B: ObjectBackend> {
    backend: Arc<B>,
    version: B::Id,
    config: Arc<StoreConfig>,
}

impl<B: ObjectBackend> KvStore<B> {
    pub fn new(backend: Arc<B>, version: B::Id, config: Arc<StoreConfig>) -> Self {
        KvStore {
            backend,
            version,
            config,
        }
    }

    /// The version this store partitions its keys under.
    pub fn version(&self) -> &B::Id {
        &self.version
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Stores `value` under `key` and returns the id of the new pointer commit.
    ///
    /// The key is validated before the backend is touched. The pointer relink
    /// is the only visible state change; a failure before it leaves at most
    /// unreachable objects behind.
    pub fn set<K, V>(&self, key: K, value: V) -> Result<B::Id, KvError>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let key = Key::parse(key).inspect_err(|e| debug!(error = %e, "rejected key"))?;

        let parent = self.backend.get_ref(&self.config.ref_name)?;
        let root = match &parent {
            Some(commit) => Some(self.backend.read_commit(commit)?.tree),
            None => None,
        };

        let segments = self.segments(&key);
        let path = TreePath::load(self.backend.as_ref(), root.as_ref(), &segments)?;

        let blob = self.backend.write_blob(value.as_ref())?;
        let new_root = path.rebuild(self.backend.as_ref(), TreeEntry::blob(blob))?;

        let meta = CommitMeta {
            author_name: self.config.author_name.clone(),
            author_email: self.config.author_email.clone(),
            message: format!("Update {}/{}", self.version, key),
            timestamp: chrono::Utc::now().timestamp(),
        };
        let commit = self
            .backend
            .create_commit(&new_root, parent.as_ref(), &meta)?;

        let previous = match (&parent, self.config.compare_and_swap) {
            (_, false) => PreviousValue::Any,
            (Some(parent), true) => PreviousValue::MustMatch(parent),
            (None, true) => PreviousValue::MustNotExist,
        };
        self.backend
            .update_ref(&self.config.ref_name, &commit, previous)?;

        debug!(
            version = %self.version,
            %key,
            %commit,
            reference = %self.config.ref_name,
            "stored value"
        );
        Ok(commit)
    }

    /// Looks up the value stored under `key` in the pointer's current commit.
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Result<Vec<u8>, KvError> {
        let key = Key::parse(key).inspect_err(|e| debug!(error = %e, "rejected key"))?;

        match self.backend.get_ref(&self.config.ref_name)? {
            Some(commit) => self.lookup(&commit, &key),
            None => Err(KvError::NotFound(key.to_string())),
        }
    }

    /// Whether a value is stored under `key`.
    pub fn contains<K: AsRef<[u8]>>(&self, key: K) -> Result<bool, KvError> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(KvError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Looks up `key` as of an earlier pointer commit.
    pub fn get_at<K: AsRef<[u8]>>(&self, commit: &B::Id, key: K) -> Result<Vec<u8>, KvError> {
        let key = Key::parse(key)?;
        self.lookup(commit, &key)
    }

    /// All keys stored for this version with their values, ordered by key.
    pub fn entries(&self) -> Result<Vec<(Key, Vec<u8>)>, KvError> {
        let Some(commit) = self.backend.get_ref(&self.config.ref_name)? else {
            return Ok(Vec::new());
        };
        let root = self.backend.read_commit(&commit)?.tree;
        let root_entries = self.backend.read_tree(&root)?;

        let version = self.version.to_string();
        let subtree = match root_entries.get(&version) {
            Some(entry) if entry.is_tree() => entry.id.clone(),
            _ => return Ok(Vec::new()),
        };

        let mut found = Vec::new();
        collect_values(self.backend.as_ref(), &subtree, &mut Vec::new(), &mut found)?;

        let mut entries = Vec::with_capacity(found.len());
        for (segments, blob) in found {
            if let Some(key) = Key::from_segments(segments) {
                entries.push((key, self.backend.read_blob(&blob)?));
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    /// Commits reachable from the pointer along first parents, newest first.
    ///
    /// The pointer is shared, so this includes writes made for other versions.
    pub fn history(&self) -> Result<Vec<HistoryEntry<B::Id>>, KvError> {
        let mut history = Vec::new();
        let mut next = self.backend.get_ref(&self.config.ref_name)?;

        while let Some(id) = next {
            let record = self.backend.read_commit(&id)?;
            next = record.parents.into_iter().next();
            history.push(HistoryEntry {
                id,
                meta: record.meta,
            });
        }
        Ok(history)
    }

    fn segments(&self, key: &Key) -> Vec<String> {
        let mut segments = Vec::with_capacity(key.segments().len() + 1);
        segments.push(self.version.to_string());
        segments.extend(key.segments().iter().cloned());
        segments
    }

    fn lookup(&self, commit: &B::Id, key: &Key) -> Result<Vec<u8>, KvError> {
        let root = self.backend.read_commit(commit)?.tree;
        let segments = self.segments(key);
        let path = TreePath::load(self.backend.as_ref(), Some(&root), &segments)?;

        match path.leaf().and_then(|entries| entries.get(LEAF_MARKER)) {
            Some(entry) if entry.is_blob() => self.backend.read_blob(&entry.id),
            _ => Err(KvError::NotFound(key.to_string())),
        }
    }
}

/// The trees along one key path, top-down.
///
/// `levels[0]` is the root tree; `levels[i]` is the tree reached through
/// `segments[i - 1]`, or `None` where the path does not exist yet.
struct TreePath<Id> {
    segments: Vec<String>,
    levels: Vec<Option<TreeEntries<Id>>>,
}

impl<Id: Clone> TreePath<Id> {
    /// Resolves as much of `segments` below `root` as exists.
    fn load<B>(backend: &B, root: Option<&Id>, segments: &[String]) -> Result<Self, KvError>
    where
        B: ObjectBackend<Id = Id>,
    {
        let mut levels = Vec::with_capacity(segments.len() + 1);
        let mut current = match root {
            Some(id) => Some(backend.read_tree(id)?),
            None => None,
        };

        for segment in segments {
            let child = match current.as_ref().and_then(|entries| entries.get(segment)) {
                Some(entry) if entry.is_tree() => Some(backend.read_tree(&entry.id)?),
                _ => None,
            };
            levels.push(current);
            current = child;
        }
        levels.push(current);

        trace!(
            depth = segments.len(),
            existing = levels.iter().filter(|level| level.is_some()).count(),
            "loaded tree path"
        );
        Ok(TreePath {
            segments: segments.to_vec(),
            levels,
        })
    }

    /// The deepest tree of the path, if it exists.
    fn leaf(&self) -> Option<&TreeEntries<Id>> {
        self.levels.last().and_then(Option::as_ref)
    }

    /// Writes new trees bottom-up with `leaf` bound to the leaf marker and
    /// returns the id of the new root.
    ///
    /// Each new tree is a copy of the existing one at its level with a single
    /// entry rebound, so unrelated entries keep their ids.
    fn rebuild<B>(self, backend: &B, leaf: TreeEntry<Id>) -> Result<Id, KvError>
    where
        B: ObjectBackend<Id = Id>,
    {
        let mut name = LEAF_MARKER.to_string();
        let mut child = leaf;

        for (depth, level) in self.levels.into_iter().enumerate().rev() {
            let mut entries = level.unwrap_or_default();
            entries.insert(name, child);
            let id = backend.write_tree(&entries)?;

            if depth == 0 {
                return Ok(id);
            }
            name = self.segments[depth - 1].clone();
            child = TreeEntry::tree(id);
        }

        Err(KvError::Backend("empty tree path".to_string()))
    }
}

/// Walks `tree` and collects the path and blob of every leaf marker below it.
pub(crate) fn collect_values<B: ObjectBackend>(
    backend: &B,
    tree: &B::Id,
    prefix: &mut Vec<String>,
    out: &mut Vec<(Vec<String>, B::Id)>,
) -> Result<(), KvError> {
    for (name, entry) in backend.read_tree(tree)? {
        if entry.is_tree() {
            prefix.push(name);
            collect_values(backend, &entry.id, prefix, out)?;
            prefix.pop();
        } else if name == LEAF_MARKER && entry.is_blob() && !prefix.is_empty() {
            out.push((prefix.clone(), entry.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CommitRecord, EntryKind, MemoryBackend, MemoryId};

    fn create_test_store() -> (Arc<MemoryBackend>, KvStore<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let store = KvStore::new(
            backend.clone(),
            MemoryId([1; 32]),
            Arc::new(StoreConfig::default()),
        );
        (backend, store)
    }

    fn store_for(backend: &Arc<MemoryBackend>, version: u8) -> KvStore<MemoryBackend> {
        KvStore::new(
            backend.clone(),
            MemoryId([version; 32]),
            Arc::new(StoreConfig::default()),
        )
    }

    fn root_entries(backend: &MemoryBackend) -> TreeEntries<MemoryId> {
        let commit = backend.get_ref("refs/heads/percs").unwrap().unwrap();
        let root = backend.read_commit(&commit).unwrap().tree;
        backend.read_tree(&root).unwrap()
    }

    #[test]
    fn test_inserting_a_single_toplevel_key() {
        let (_backend, store) = create_test_store();
        store.set("foo", "bar").unwrap();
        assert_eq!(store.get("foo").unwrap(), b"bar");
    }

    #[test]
    fn test_inserting_two_toplevel_keys() {
        let (_backend, store) = create_test_store();
        store.set("foo", "bar").unwrap();
        store.set("baz", "123").unwrap();
        assert_eq!(store.get("foo").unwrap(), b"bar");
        assert_eq!(store.get("baz").unwrap(), b"123");

        let entries = store.entries().unwrap();
        let entries: Vec<(String, Vec<u8>)> = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("baz".to_string(), b"123".to_vec()),
                ("foo".to_string(), b"bar".to_vec()),
            ]
        );
    }

    #[test]
    fn test_hierarchical_keys() {
        let (_backend, store) = create_test_store();
        store.set("foo/bar", "baz").unwrap();
        store.set("1/2/3", "123").unwrap();
        assert_eq!(store.get("foo/bar").unwrap(), b"baz");
        assert_eq!(store.get("1/2/3").unwrap(), b"123");
        assert!(store.get("foo").unwrap_err().is_not_found());
        assert!(store.get("1/2").unwrap_err().is_not_found());
    }

    #[test]
    fn test_keys_with_existing_prefixes() {
        let (_backend, store) = create_test_store();
        store.set("foo", "bar").unwrap();
        store.set("foo/bar", "baz/ruux").unwrap();
        store.set("foo/bar/baz", "ruux/123").unwrap();
        assert_eq!(store.get("foo").unwrap(), b"bar");
        assert_eq!(store.get("foo/bar").unwrap(), b"baz/ruux");
        assert_eq!(store.get("foo/bar/baz").unwrap(), b"ruux/123");
    }

    #[test]
    fn test_setting_a_prefix_keeps_deeper_keys() {
        let (_backend, store) = create_test_store();
        store.set("foo/bar/baz", "deep").unwrap();
        store.set("foo", "shallow").unwrap();
        store.set("foo", "shallower").unwrap();
        assert_eq!(store.get("foo/bar/baz").unwrap(), b"deep");
        assert_eq!(store.get("foo").unwrap(), b"shallower");
    }

    #[test]
    fn test_equivalent_spellings_address_the_same_value() {
        let (_backend, store) = create_test_store();
        store.set("/foo//bar/", "value").unwrap();
        assert_eq!(store.get("foo/bar").unwrap(), b"value");
        store.set("foo/bar", "other").unwrap();
        assert_eq!(store.get("//foo/bar").unwrap(), b"other");
        assert_eq!(store.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_versions_do_not_interfere() {
        let backend = Arc::new(MemoryBackend::new());
        let stores: Vec<_> = (1..10).map(|v| store_for(&backend, v)).collect();
        for store in &stores {
            store.set("foo", store.version().to_hex()).unwrap();
        }
        for store in &stores {
            assert_eq!(
                store.get("foo").unwrap(),
                store.version().to_hex().as_bytes()
            );
        }

        let other = store_for(&backend, 42);
        assert!(other.get("foo").unwrap_err().is_not_found());
        assert!(other.entries().unwrap().is_empty());
        assert_eq!(root_entries(&backend).len(), 9);
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let (_backend, store) = create_test_store();
        assert!(matches!(store.get("foo"), Err(KvError::NotFound(key)) if key == "foo"));
        assert!(!store.contains("foo").unwrap());

        store.set("foo", "bar").unwrap();
        assert!(store.contains("foo").unwrap());
        assert!(store.get("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_invalid_keys_never_reach_the_backend() {
        let (backend, store) = create_test_store();

        let err = store.set([0xffu8, 0xfe], "foo").unwrap_err();
        assert!(matches!(err, KvError::InvalidKeyType));
        let err = store.set("?+<23=?><///", "foo").unwrap_err();
        assert!(matches!(err, KvError::InvalidKeyFormat { .. }));
        let err = store.get("///").unwrap_err();
        assert!(matches!(err, KvError::InvalidKeyFormat { .. }));

        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_overwrite_preserves_history() {
        let (backend, store) = create_test_store();
        let first = store.set("key", "v1").unwrap();
        let second = store.set("key", "v2").unwrap();

        assert_eq!(store.get("key").unwrap(), b"v2");
        assert_eq!(store.get_at(&first, "key").unwrap(), b"v1");
        assert_eq!(store.get_at(&second, "key").unwrap(), b"v2");

        let record = backend.read_commit(&second).unwrap();
        assert_eq!(record.parents, vec![first]);

        let history = store.history().unwrap();
        let ids: Vec<MemoryId> = history.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(
            history[0].meta.message,
            format!("Update {}/key", store.version())
        );
        assert_eq!(history[0].meta.author_name, "percs");
    }

    #[test]
    fn test_unrelated_subtrees_are_shared() {
        let (backend, store) = create_test_store();
        store.set("a/x", "1").unwrap();
        store.set("b/y", "2").unwrap();

        let version = store.version().to_hex();
        let version_tree = |backend: &MemoryBackend| {
            let id = root_entries(backend)[&version].id;
            backend.read_tree(&id).unwrap()
        };

        let before = version_tree(&*backend);
        store.set("b/z", "3").unwrap();
        let after = version_tree(&*backend);

        assert_eq!(before["a"], after["a"]);
        assert_ne!(before["b"], after["b"]);
    }

    #[test]
    fn test_foreign_entries_keep_their_kind() {
        let (backend, store) = create_test_store();
        let script = backend.write_blob(b"#!/bin/sh\n").unwrap();
        let target = backend.write_blob(b"run.sh").unwrap();

        let mut entries = TreeEntries::new();
        entries.insert(
            "run.sh".to_string(),
            TreeEntry {
                kind: EntryKind::BlobExecutable,
                id: script,
            },
        );
        entries.insert(
            "latest".to_string(),
            TreeEntry {
                kind: EntryKind::Link,
                id: target,
            },
        );
        entries.insert(
            "vendor".to_string(),
            TreeEntry {
                kind: EntryKind::Commit,
                id: MemoryId([8; 32]),
            },
        );
        let root = backend.write_tree(&entries).unwrap();
        let meta = CommitMeta {
            author_name: "other".to_string(),
            author_email: "other@localhost".to_string(),
            message: "foreign data".to_string(),
            timestamp: 0,
        };
        let commit = backend.create_commit(&root, None, &meta).unwrap();
        backend
            .update_ref("refs/heads/percs", &commit, PreviousValue::MustNotExist)
            .unwrap();

        store.set("foo", "bar").unwrap();

        let after = root_entries(&backend);
        for (name, entry) in &entries {
            assert_eq!(after.get(name), Some(entry), "{name}");
        }
        assert_eq!(after.len(), entries.len() + 1);
        assert_eq!(store.get("foo").unwrap(), b"bar");
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Fault {
        WriteBlob,
        WriteTree,
        CreateCommit,
    }

    /// Wraps a `MemoryBackend` to fail a chosen write, or to move the
    /// pointer to a competing commit right before the first relink.
    struct FaultyBackend {
        inner: MemoryBackend,
        fault: std::sync::Mutex<Option<Fault>>,
        race: std::sync::atomic::AtomicBool,
    }

    impl FaultyBackend {
        fn new(race: bool) -> Self {
            FaultyBackend {
                inner: MemoryBackend::new(),
                fault: std::sync::Mutex::new(None),
                race: std::sync::atomic::AtomicBool::new(race),
            }
        }

        fn inject(&self, fault: Fault) {
            *self.fault.lock().unwrap() = Some(fault);
        }

        fn check(&self, op: Fault) -> Result<(), KvError> {
            if *self.fault.lock().unwrap() == Some(op) {
                return Err(KvError::Backend(format!("injected {op:?} failure")));
            }
            Ok(())
        }
    }

    impl ObjectBackend for FaultyBackend {
        type Id = MemoryId;

        fn write_blob(&self, data: &[u8]) -> Result<MemoryId, KvError> {
            self.check(Fault::WriteBlob)?;
            self.inner.write_blob(data)
        }

        fn write_tree(&self, entries: &TreeEntries<MemoryId>) -> Result<MemoryId, KvError> {
            self.check(Fault::WriteTree)?;
            self.inner.write_tree(entries)
        }

        fn read_tree(&self, id: &MemoryId) -> Result<TreeEntries<MemoryId>, KvError> {
            self.inner.read_tree(id)
        }

        fn read_blob(&self, id: &MemoryId) -> Result<Vec<u8>, KvError> {
            self.inner.read_blob(id)
        }

        fn read_commit(&self, id: &MemoryId) -> Result<CommitRecord<MemoryId>, KvError> {
            self.inner.read_commit(id)
        }

        fn create_commit(
            &self,
            tree: &MemoryId,
            parent: Option<&MemoryId>,
            meta: &CommitMeta,
        ) -> Result<MemoryId, KvError> {
            self.check(Fault::CreateCommit)?;
            self.inner.create_commit(tree, parent, meta)
        }

        fn get_ref(&self, name: &str) -> Result<Option<MemoryId>, KvError> {
            self.inner.get_ref(name)
        }

        fn update_ref(
            &self,
            name: &str,
            new: &MemoryId,
            previous: PreviousValue<'_, MemoryId>,
        ) -> Result<(), KvError> {
            if self.race.swap(false, std::sync::atomic::Ordering::SeqCst) {
                let tree = self.inner.write_tree(&TreeEntries::new())?;
                let meta = CommitMeta {
                    author_name: "other".to_string(),
                    author_email: "other@localhost".to_string(),
                    message: "competing write".to_string(),
                    timestamp: 0,
                };
                let competing = self.inner.create_commit(&tree, None, &meta)?;
                self.inner.update_ref(name, &competing, PreviousValue::Any)?;
            }
            self.inner.update_ref(name, new, previous)
        }

        fn resolve(&self, rev: &str) -> Result<MemoryId, KvError> {
            self.inner.resolve(rev)
        }
    }

    fn faulty_store(
        race: bool,
        compare_and_swap: bool,
    ) -> (Arc<FaultyBackend>, KvStore<FaultyBackend>) {
        let backend = Arc::new(FaultyBackend::new(race));
        let config = StoreConfig::default().with_compare_and_swap(compare_and_swap);
        let store = KvStore::new(backend.clone(), MemoryId([5; 32]), Arc::new(config));
        (backend, store)
    }

    #[test]
    fn test_failed_write_leaves_pointer_untouched() {
        for fault in [Fault::WriteBlob, Fault::WriteTree, Fault::CreateCommit] {
            let (backend, store) = faulty_store(false, true);
            let before = store.set("foo", "old").unwrap();

            backend.inject(fault);
            let err = store.set("foo", "new").unwrap_err();
            assert!(matches!(err, KvError::Backend(_)), "{fault:?}: {err}");
            assert_eq!(
                backend.get_ref("refs/heads/percs").unwrap(),
                Some(before),
                "{fault:?}"
            );
            assert_eq!(store.get("foo").unwrap(), b"old", "{fault:?}");
            assert_eq!(store.history().unwrap().len(), 1, "{fault:?}");
        }
    }

    #[test]
    fn test_lost_race_is_a_conflict() {
        let (backend, store) = faulty_store(true, true);

        let err = store.set("foo", "mine").unwrap_err();
        assert!(matches!(err, KvError::Conflict { .. }));

        // The competing commit stays in place and our value is not visible.
        let head = backend.get_ref("refs/heads/percs").unwrap().unwrap();
        assert_eq!(
            backend.read_commit(&head).unwrap().meta.message,
            "competing write"
        );
        assert!(store.get("foo").unwrap_err().is_not_found());

        store.set("foo", "retry").unwrap();
        assert_eq!(store.get("foo").unwrap(), b"retry");
    }

    #[test]
    fn test_lost_race_overwrites_without_compare_and_swap() {
        let (backend, store) = faulty_store(true, false);

        let commit = store.set("foo", "mine").unwrap();
        assert_eq!(backend.get_ref("refs/heads/percs").unwrap(), Some(commit));
        // The competing commit is no longer reachable from the pointer.
        assert_eq!(store.history().unwrap().len(), 1);
        assert_eq!(store.get("foo").unwrap(), b"mine");
    }

    #[test]
    fn test_last_writer_wins_without_compare_and_swap() {
        let backend = Arc::new(MemoryBackend::new());
        let config = Arc::new(StoreConfig::default().with_compare_and_swap(false));
        let store = KvStore::new(backend.clone(), MemoryId([3; 32]), config);

        store.set("foo", "one").unwrap();
        store.set("foo", "two").unwrap();
        assert_eq!(store.get("foo").unwrap(), b"two");
        assert_eq!(store.history().unwrap().len(), 2);
    }

    #[test]
    fn test_custom_reference_name() {
        let backend = Arc::new(MemoryBackend::new());
        let config = Arc::new(StoreConfig::default().with_ref_name("refs/percs/notes"));
        let store = KvStore::new(backend.clone(), MemoryId([4; 32]), config);

        store.set("foo", "bar").unwrap();
        assert!(backend.get_ref("refs/heads/percs").unwrap().is_none());
        assert!(backend.get_ref("refs/percs/notes").unwrap().is_some());
    }
}
