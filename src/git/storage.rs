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

use crate::backend::{
    CommitMeta, CommitRecord, EntryKind, ObjectBackend, PreviousValue, TreeEntries, TreeEntry,
};
use crate::errors::KvError;
use gix::prelude::*;
use gix::refs::transaction::PreviousValue as GixPreviousValue;
use std::path::Path;
use tracing::debug;

/// Git-backed object store
///
/// Values, trees and commits are written as regular git objects into the
/// repository's object database, so the key/value namespace can be
/// inspected with plain git tooling, e.g.
/// `git ls-tree -r --name-only refs/heads/percs`.
pub struct GitBackend {
    repo: gix::Repository,
}

impl GitBackend {
    /// Wrap an already opened repository
    pub fn new(repo: gix::Repository) -> Self {
        GitBackend { repo }
    }

    /// Open an existing repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KvError> {
        let repo = gix::open(path.as_ref()).map_err(|e| KvError::GitOpenError(Box::new(e)))?;
        Ok(Self::new(repo))
    }

    /// Initialize a bare repository at `path`
    pub fn init_bare<P: AsRef<Path>>(path: P) -> Result<Self, KvError> {
        let repo = gix::init_bare(path.as_ref())
            .map_err(|e| KvError::GitObjectError(format!("Failed to init repository: {e}")))?;
        Ok(Self::new(repo))
    }

    pub fn repository(&self) -> &gix::Repository {
        &self.repo
    }

    /// Author name and email from the repository's git configuration, if both are set
    pub fn default_author(&self) -> Option<(String, String)> {
        let config = self.repo.config_snapshot();
        let name = config.string("user.name")?.to_string();
        let email = config.string("user.email")?.to_string();
        Some((name, email))
    }

    fn find_object<'a>(
        &self,
        id: &gix::ObjectId,
        buffer: &'a mut Vec<u8>,
    ) -> Result<gix::objs::Data<'a>, KvError> {
        self.repo
            .objects
            .find(id, buffer)
            .map_err(|e| KvError::ObjectNotFound(format!("{id}: {e}")))
    }

    fn write<T: gix::objs::WriteTo>(&self, object: &T) -> Result<gix::ObjectId, KvError> {
        self.repo.objects.write(object).map_err(|e| {
            KvError::GitObjectError(format!("Failed to write {}: {e}", object.kind()))
        })
    }
}

fn to_git_kind(kind: EntryKind) -> gix::objs::tree::EntryKind {
    match kind {
        EntryKind::Tree => gix::objs::tree::EntryKind::Tree,
        EntryKind::Blob => gix::objs::tree::EntryKind::Blob,
        EntryKind::BlobExecutable => gix::objs::tree::EntryKind::BlobExecutable,
        EntryKind::Link => gix::objs::tree::EntryKind::Link,
        EntryKind::Commit => gix::objs::tree::EntryKind::Commit,
    }
}

fn from_git_kind(kind: gix::objs::tree::EntryKind) -> EntryKind {
    match kind {
        gix::objs::tree::EntryKind::Tree => EntryKind::Tree,
        gix::objs::tree::EntryKind::Blob => EntryKind::Blob,
        gix::objs::tree::EntryKind::BlobExecutable => EntryKind::BlobExecutable,
        gix::objs::tree::EntryKind::Link => EntryKind::Link,
        gix::objs::tree::EntryKind::Commit => EntryKind::Commit,
    }
}

impl ObjectBackend for GitBackend {
    type Id = gix::ObjectId;

    fn write_blob(&self, data: &[u8]) -> Result<gix::ObjectId, KvError> {
        let blob = gix::objs::Blob {
            data: data.to_vec(),
        };
        self.write(&blob)
    }

    fn write_tree(&self, entries: &TreeEntries<gix::ObjectId>) -> Result<gix::ObjectId, KvError> {
        let mut tree_entries: Vec<gix::objs::tree::Entry> = entries
            .iter()
            .map(|(name, entry)| gix::objs::tree::Entry {
                mode: to_git_kind(entry.kind).into(),
                filename: name.as_str().into(),
                oid: entry.id,
            })
            .collect();
        // Git orders tree entries as if subtree names ended in '/'
        tree_entries.sort();

        self.write(&gix::objs::Tree {
            entries: tree_entries,
        })
    }

    fn read_tree(&self, id: &gix::ObjectId) -> Result<TreeEntries<gix::ObjectId>, KvError> {
        let mut buffer = Vec::new();
        let object = self.find_object(id, &mut buffer)?;

        let tree = match object.decode() {
            Ok(gix::objs::ObjectRef::Tree(tree)) => tree,
            _ => return Err(KvError::UnexpectedObject(format!("{id} is not a tree"))),
        };

        let mut entries = TreeEntries::new();
        for entry in tree.entries {
            entries.insert(
                entry.filename.to_string(),
                TreeEntry {
                    kind: from_git_kind(entry.mode.kind()),
                    id: entry.oid.to_owned(),
                },
            );
        }
        Ok(entries)
    }

    fn read_blob(&self, id: &gix::ObjectId) -> Result<Vec<u8>, KvError> {
        let mut buffer = Vec::new();
        let object = self.find_object(id, &mut buffer)?;

        let data = match object.decode() {
            Ok(gix::objs::ObjectRef::Blob(blob)) => blob.data.to_vec(),
            _ => return Err(KvError::UnexpectedObject(format!("{id} is not a blob"))),
        };
        Ok(data)
    }

    fn read_commit(&self, id: &gix::ObjectId) -> Result<CommitRecord<gix::ObjectId>, KvError> {
        let mut buffer = Vec::new();
        let object = self.find_object(id, &mut buffer)?;

        let commit = match object.decode() {
            Ok(gix::objs::ObjectRef::Commit(commit)) => commit,
            _ => return Err(KvError::UnexpectedObject(format!("{id} is not a commit"))),
        };

        Ok(CommitRecord {
            tree: commit.tree(),
            parents: commit.parents().collect(),
            meta: CommitMeta {
                author_name: commit.author.name.to_string(),
                author_email: commit.author.email.to_string(),
                message: commit.message.to_string(),
                timestamp: commit.author.time.seconds,
            },
        })
    }

    fn create_commit(
        &self,
        tree: &gix::ObjectId,
        parent: Option<&gix::ObjectId>,
        meta: &CommitMeta,
    ) -> Result<gix::ObjectId, KvError> {
        let signature = gix::actor::Signature {
            name: meta.author_name.as_str().into(),
            email: meta.author_email.as_str().into(),
            time: gix::date::Time {
                seconds: meta.timestamp,
                offset: 0,
                sign: gix::date::time::Sign::Plus,
            },
        };

        let parent_ids: Vec<gix::ObjectId> = parent.into_iter().copied().collect();

        let commit = gix::objs::Commit {
            tree: *tree,
            parents: parent_ids.into(),
            author: signature.clone(),
            committer: signature,
            encoding: None,
            message: meta.message.as_str().into(),
            extra_headers: vec![],
        };

        let commit_id = self.write(&commit)?;
        debug!(%commit_id, %tree, "wrote commit");
        Ok(commit_id)
    }

    fn get_ref(&self, name: &str) -> Result<Option<gix::ObjectId>, KvError> {
        let reference = self
            .repo
            .try_find_reference(name)
            .map_err(|e| KvError::GitReferenceError(format!("Failed to find {name}: {e}")))?;

        match reference {
            Some(mut reference) => {
                let id = reference.peel_to_id_in_place().map_err(|e| {
                    KvError::GitReferenceError(format!("Failed to peel {name}: {e}"))
                })?;
                Ok(Some(id.detach()))
            }
            None => Ok(None),
        }
    }

    fn update_ref(
        &self,
        name: &str,
        new: &gix::ObjectId,
        previous: PreviousValue<'_, gix::ObjectId>,
    ) -> Result<(), KvError> {
        let current = self.get_ref(name)?;
        let constraint = match previous {
            PreviousValue::Any => GixPreviousValue::Any,
            PreviousValue::MustNotExist => {
                if let Some(actual) = current {
                    return Err(KvError::Conflict {
                        reference: name.to_string(),
                        expected: "<none>".to_string(),
                        actual: actual.to_string(),
                    });
                }
                GixPreviousValue::MustNotExist
            }
            PreviousValue::MustMatch(expected) => {
                if current.as_ref() != Some(expected) {
                    return Err(KvError::Conflict {
                        reference: name.to_string(),
                        expected: expected.to_string(),
                        actual: current.map_or_else(|| "<none>".to_string(), |id| id.to_string()),
                    });
                }
                GixPreviousValue::MustExistAndMatch(gix::refs::Target::Object(*expected))
            }
        };

        // The lock taken by the reference transaction re-checks the constraint
        self.repo
            .reference(name, *new, constraint, "percs: update")
            .map_err(|e| KvError::GitReferenceError(format!("Failed to update {name}: {e}")))?;
        Ok(())
    }

    fn resolve(&self, rev: &str) -> Result<gix::ObjectId, KvError> {
        let spec = format!("{rev}^{{commit}}");
        self.repo
            .rev_parse_single(spec.as_str())
            .map(|id| id.detach())
            .map_err(|e| KvError::RevisionNotFound(format!("{rev}: {e}")))
    }
}
