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

//! The block: one hashed, encoded unit of payload.

use bytes::Bytes;
use log::trace;

use super::Header;
use crate::encoder::{Encoder, SharedEncoder};
use crate::error::{HashChainError, Result};
use crate::hash::{content_hash, BlockHash};

/// A unit of payload linked to its predecessor by hash.
///
/// A block starts out holding plaintext. [`Block::encode`] seals it: the hash
/// is computed from the plaintext and the parent hash, then the payload is
/// replaced by its encoded form. A sealed block rejects further changes to
/// its payload or parent, so its hash always describes its content.
#[derive(Debug, Clone)]
pub struct Block {
    encoder: SharedEncoder,
    header: Header,
    data: Bytes,
    hash: Option<BlockHash>,
    parent_hash: Option<BlockHash>,
}

impl Block {
    /// Creates an empty, unsealed block using `encoder` for its payload.
    pub fn new(encoder: SharedEncoder, header: Header) -> Self {
        Self {
            encoder,
            header,
            data: Bytes::new(),
            hash: None,
            parent_hash: None,
        }
    }

    /// Creates an unsealed block already holding `data`.
    pub fn with_data(encoder: SharedEncoder, header: Header, data: impl Into<Bytes>) -> Self {
        let mut block = Self::new(encoder, header);
        block.data = data.into();
        block
    }

    /// Rebuilds a block from stored fields.
    pub(crate) fn from_parts(
        encoder: SharedEncoder,
        header: Header,
        data: Bytes,
        hash: Option<BlockHash>,
        parent_hash: Option<BlockHash>,
    ) -> Self {
        Self {
            encoder,
            header,
            data,
            hash,
            parent_hash,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Mutable access to the header while the block is still unsealed.
    pub fn header_mut(&mut self) -> Result<&mut Header> {
        self.ensure_unsealed()?;
        Ok(&mut self.header)
    }

    /// The payload: plaintext before encoding, encoded bytes afterwards.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Replaces the plaintext payload. Fails once the block is sealed.
    pub fn set_data(&mut self, data: impl Into<Bytes>) -> Result<()> {
        self.ensure_unsealed()?;
        self.data = data.into();
        Ok(())
    }

    /// The content hash, set by [`Block::encode`].
    pub fn hash(&self) -> Option<&BlockHash> {
        self.hash.as_ref()
    }

    /// Hash of the predecessor; `None` for the first block of a chain.
    pub fn parent_hash(&self) -> Option<&BlockHash> {
        self.parent_hash.as_ref()
    }

    /// Links this block to `parent`. Fails once the block is sealed.
    pub fn set_parent_hash(&mut self, parent: Option<BlockHash>) -> Result<()> {
        self.ensure_unsealed()?;
        self.parent_hash = parent;
        Ok(())
    }

    pub fn is_encoded(&self) -> bool {
        self.hash.is_some()
    }

    pub fn encoder(&self) -> &SharedEncoder {
        &self.encoder
    }

    /// Hashes the plaintext payload together with the parent hash and replaces
    /// the payload with its encoded form.
    ///
    /// On failure the block is left exactly as it was.
    pub fn encode(&mut self) -> Result<()> {
        self.ensure_unsealed()?;

        let hash = content_hash(&self.data, self.parent_hash.as_ref());
        let encoded = self
            .encoder
            .encode(&self.data)
            .map_err(|source| HashChainError::EncodingFailed {
                context: format!("could not encode block '{}'", hash),
                source,
            })?;

        trace!(
            "Encoded block {} ({} -> {} bytes)",
            hash,
            self.data.len(),
            encoded.len()
        );

        self.data = Bytes::from(encoded);
        self.hash = Some(hash);
        Ok(())
    }

    /// Decodes the payload with the block's own encoder.
    pub fn decoded(&self) -> Result<Bytes> {
        decode_data(self, self.encoder.as_ref())
    }

    fn ensure_unsealed(&self) -> Result<()> {
        match &self.hash {
            Some(hash) => Err(HashChainError::BlockSealed(hash.to_string())),
            None => Ok(()),
        }
    }
}

/// Decodes a block's payload with `decoder`.
///
/// Decoding with anything but the encoder that sealed the block fails or
/// yields different bytes; it never hands back the original plaintext.
pub fn decode_data(block: &Block, decoder: &dyn Encoder) -> Result<Bytes> {
    decoder
        .decode(&block.data)
        .map(Bytes::from)
        .map_err(|source| HashChainError::DecodingFailed {
            context: format!(
                "encountered an error while decoding data of block '{}'",
                block.hash.as_ref().map(BlockHash::as_str).unwrap_or("<unsealed>")
            ),
            source,
        })
}
