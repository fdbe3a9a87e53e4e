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

//! The content-addressed object store the key/value layer is written against.

pub mod memory;

use crate::errors::KvError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

pub use memory::{MemoryBackend, MemoryId};

/// What a tree entry points at.
///
/// Entries the store does not create itself (executables, symlinks,
/// submodules) keep their kind so rewriting a tree does not alter them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Tree,
    Blob,
    BlobExecutable,
    Link,
    /// A commit in another repository (git submodule).
    Commit,
}

/// A single named child of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeEntry<Id> {
    pub kind: EntryKind,
    pub id: Id,
}

impl<Id> TreeEntry<Id> {
    pub fn tree(id: Id) -> Self {
        TreeEntry {
            kind: EntryKind::Tree,
            id,
        }
    }

    pub fn blob(id: Id) -> Self {
        TreeEntry {
            kind: EntryKind::Blob,
            id,
        }
    }

    pub fn is_tree(&self) -> bool {
        self.kind == EntryKind::Tree
    }

    /// Whether the entry holds readable file contents.
    pub fn is_blob(&self) -> bool {
        matches!(self.kind, EntryKind::Blob | EntryKind::BlobExecutable)
    }
}

/// Entries of a tree, ordered by name.
pub type TreeEntries<Id> = BTreeMap<String, TreeEntry<Id>>;

/// Descriptive data attached to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMeta {
    pub author_name: String,
    pub author_email: String,
    pub message: String,
    /// Seconds since the unix epoch.
    pub timestamp: i64,
}

/// A commit as read back from a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord<Id> {
    pub tree: Id,
    pub parents: Vec<Id>,
    pub meta: CommitMeta,
}

/// Constraint on the current target of a reference when relinking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousValue<'a, Id> {
    /// Overwrite whatever the reference points at.
    Any,
    /// The reference must not exist yet.
    MustNotExist,
    /// The reference must currently point at this commit.
    MustMatch(&'a Id),
}

/// A trait for content-addressed object stores.
///
/// Blobs, trees and commits are immutable and addressed by their content;
/// references are the only mutable state. Implementors can be backed by a
/// git repository, an in-memory map, or any other store that keeps these
/// guarantees.
pub trait ObjectBackend {
    /// Content address of an object.
    type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    /// Writes a blob. Equal bytes yield equal ids.
    fn write_blob(&self, data: &[u8]) -> Result<Self::Id, KvError>;

    /// Writes a tree. Equal entries yield equal ids.
    fn write_tree(&self, entries: &TreeEntries<Self::Id>) -> Result<Self::Id, KvError>;

    /// Reads the entries of a tree. Fails if the id is unknown or not a tree.
    fn read_tree(&self, id: &Self::Id) -> Result<TreeEntries<Self::Id>, KvError>;

    /// Reads the bytes of a blob. Fails if the id is unknown or not a blob.
    fn read_blob(&self, id: &Self::Id) -> Result<Vec<u8>, KvError>;

    /// Reads a commit's root tree, parents and metadata.
    fn read_commit(&self, id: &Self::Id) -> Result<CommitRecord<Self::Id>, KvError>;

    /// Writes a commit of `tree` on top of `parent`.
    fn create_commit(
        &self,
        tree: &Self::Id,
        parent: Option<&Self::Id>,
        meta: &CommitMeta,
    ) -> Result<Self::Id, KvError>;

    /// Returns the commit a reference points at, or `None` if it does not exist.
    fn get_ref(&self, name: &str) -> Result<Option<Self::Id>, KvError>;

    /// Relinks a reference to `new`.
    ///
    /// The update is atomic. When `previous` does not hold the reference is
    /// left untouched and [`KvError::Conflict`] is returned.
    fn update_ref(
        &self,
        name: &str,
        new: &Self::Id,
        previous: PreviousValue<'_, Self::Id>,
    ) -> Result<(), KvError>;

    /// Resolves a revision (full id, abbreviated id or reference name) to a commit id.
    fn resolve(&self, rev: &str) -> Result<Self::Id, KvError>;
}
