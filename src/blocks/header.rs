// Copyright 2024
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Block metadata.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::{HashChainError, Result};

/// Key/value metadata attached to a [`Block`](super::Block).
///
/// Keys are unique. A key mapped to an empty value counts as absent. Entries
/// are kept sorted by key so a header always serializes the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    store: BTreeMap<String, Bytes>,
}

impl Header {
    /// Creates an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.store.insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    ///
    /// Fails with [`HashChainError::NotFound`] when the key is missing or its
    /// value is empty.
    pub fn get(&self, key: &str) -> Result<&Bytes> {
        match self.store.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(HashChainError::NotFound(format!(
                "header param with name '{}' does not exist",
                key
            ))),
        }
    }

    /// Number of stored entries, including ones with empty values.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bytes)> {
        self.store.iter().map(|(k, v)| (k.as_str(), v))
    }
}
