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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("Key is not a string")]
    InvalidKeyType,

    #[error("Key \"{key}\" does not match format \"{pattern}\"")]
    InvalidKeyFormat { key: String, pattern: &'static str },

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Reference {reference} moved: expected {expected}, found {actual}")]
    Conflict {
        reference: String,
        expected: String,
        actual: String,
    },

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Unexpected object: {0}")]
    UnexpectedObject(String),

    #[error("Revision not found: {0}")]
    RevisionNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] bincode::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[cfg(feature = "git")]
    #[error("Git repository error: {0}")]
    GitOpenError(#[from] Box<gix::open::Error>),

    #[cfg(feature = "git")]
    #[error("Git object error: {0}")]
    GitObjectError(String),

    #[cfg(feature = "git")]
    #[error("Git reference error: {0}")]
    GitReferenceError(String),
}

impl KvError {
    /// Whether this error means "no value stored under the key".
    pub fn is_not_found(&self) -> bool {
        matches!(self, KvError::NotFound(_))
    }
}
