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

//! Key validation and normalization.
//!
//! Keys are slash-delimited. Leading and trailing slashes as well as empty
//! segments are dropped, so `/foo//bar/` and `foo/bar` name the same entry.
//! Each remaining segment may only contain ASCII letters, digits, `-`, `_`
//! and `:`.

use crate::errors::KvError;
use std::fmt;

/// Human-readable form of the accepted key format, used in error messages.
pub const KEY_PATTERN: &str = "^[a-z0-9-_/:]+$";

/// Reserved tree entry holding the value of the path ending at its tree.
///
/// The leading dot keeps it out of the legal segment alphabet, so a key and
/// its own prefixes can all carry values.
pub const LEAF_MARKER: &str = ".value";

/// A validated key in its canonical segment form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// Parse raw key bytes.
    ///
    /// Bytes that are not UTF-8 are rejected with [`KvError::InvalidKeyType`];
    /// anything outside the key alphabet, or a key without segments, with
    /// [`KvError::InvalidKeyFormat`].
    pub fn parse<K: AsRef<[u8]>>(raw: K) -> Result<Self, KvError> {
        let raw = std::str::from_utf8(raw.as_ref()).map_err(|_| KvError::InvalidKeyType)?;

        let segments: Vec<String> = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() || !segments.iter().all(|s| is_valid_segment(s)) {
            return Err(KvError::InvalidKeyFormat {
                key: raw.to_string(),
                pattern: KEY_PATTERN,
            });
        }

        Ok(Key { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Build a key from segments read back out of a tree.
    pub(crate) fn from_segments(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() || !segments.iter().all(|s| is_valid_segment(s)) {
            return None;
        }
        Some(Key { segments })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl std::str::FromStr for Key {
    type Err = KvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::parse(s)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
}
