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

//! Hashing functionality for blocks, chains and envelopes.
//!
//! Identities are SHA-256 digests rendered as URL-safe base64 (padded), so
//! they can double as file names. Envelope integrity uses a keyed 64-bit
//! HighwayHash, which is cheaper and only has to catch corruption.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use highway::{HighwayHash, HighwayHasher, Key};
use sha2::{Digest, Sha256};

use crate::constants::HIGHWAY_HASH_KEY;

/// Content identity of a block or a chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHash(String);

impl BlockHash {
    /// Wraps an already encoded hash string, e.g. one read back from storage.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The base64url text of the hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlockHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn sha256_base64(parts: &[&[u8]]) -> BlockHash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    BlockHash(URL_SAFE.encode(hasher.finalize()))
}

/// Hash of a block: `SHA-256(data || parent)` over the pre-encoding payload.
///
/// The first block of a chain has no parent and hashes its data alone.
pub fn content_hash(data: &[u8], parent: Option<&BlockHash>) -> BlockHash {
    let parent = parent.map(BlockHash::as_str).unwrap_or_default();
    sha256_base64(&[data, parent.as_bytes()])
}

/// Hash identifying a chain, derived from its block size and creation time.
pub fn chain_hash(block_size: usize, timestamp: i64) -> BlockHash {
    let seed = format!("{}{}", block_size, timestamp);
    sha256_base64(&[seed.as_bytes()])
}

/// Calculate the HighwayHash checksum of a serialized envelope body.
pub fn envelope_checksum(data: &[u8]) -> u64 {
    let mut hasher = HighwayHasher::new(Key(HIGHWAY_HASH_KEY));
    hasher.append(data);
    hasher.finalize64()
}
