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

use serde::{Deserialize, Serialize};

/// Name of the pointer that tracks the latest commit of the key/value namespace.
pub const DEFAULT_REF_NAME: &str = "refs/heads/percs";

/// Settings shared by every store handed out by a registry.
///
/// `ref_name` is the single mutable pointer for all versions and keys. Two
/// writers that read it before either relinks it race; with
/// `compare_and_swap` enabled the loser gets [`crate::errors::KvError::Conflict`],
/// otherwise the last relink wins and the first writer's commit becomes
/// unreachable from the pointer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    pub ref_name: String,
    pub author_name: String,
    pub author_email: String,
    pub compare_and_swap: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            ref_name: DEFAULT_REF_NAME.to_string(),
            author_name: "percs".to_string(),
            author_email: "percs@localhost".to_string(),
            compare_and_swap: true,
        }
    }
}

impl StoreConfig {
    pub fn with_ref_name(mut self, ref_name: impl Into<String>) -> Self {
        self.ref_name = ref_name.into();
        self
    }

    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_name = name.into();
        self.author_email = email.into();
        self
    }

    pub fn with_compare_and_swap(mut self, enabled: bool) -> Self {
        self.compare_and_swap = enabled;
        self
    }
}
