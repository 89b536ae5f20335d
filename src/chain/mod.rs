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

//! Hash chains of encoded blocks.
//!
//! A [`Chain`] splits written bytes into fixed-size blocks, links each block
//! to its predecessor through the parent hash and keeps every block in an
//! index keyed by block hash. Reads walk the links backwards from the tail,
//! so the chain never stores an explicit order.
//!
//! ```text
//! first <-parent- second <-parent- ... <-parent- tail
//! ```

mod ancestors;
mod config;

pub use ancestors::Ancestors;
pub use config::ChainConfig;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Bytes, BytesMut};
use log::{debug, trace, warn};

use crate::blocks::{decode_data, Block, Header};
use crate::chunker;
use crate::constants::CHAIN_HEADER_KEY;
use crate::encoder::SharedEncoder;
use crate::error::{HashChainError, Result};
use crate::hash::{chain_hash, BlockHash};
use crate::parallel::{decode_all, CancellationToken, DecodeTask};

/// An append-only sequence of blocks sharing one encoder.
#[derive(Debug)]
pub struct Chain {
    encoder: SharedEncoder,
    config: ChainConfig,
    blocks: HashMap<BlockHash, Block>,
    tail: Option<BlockHash>,
    hash: Option<BlockHash>,
    timestamp: i64,
}

impl Chain {
    /// Creates an empty chain that splits writes into `block_size` byte blocks.
    pub fn new(encoder: SharedEncoder, block_size: usize) -> Result<Self> {
        Self::with_config(encoder, ChainConfig::with_block_size(block_size)?)
    }

    /// Creates an empty chain with a custom configuration.
    pub fn with_config(encoder: SharedEncoder, config: ChainConfig) -> Result<Self> {
        config.validate()?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as i64)
            .unwrap_or_default();

        debug!(
            "Created chain with block size {} and {} decode workers",
            config.block_size, config.decode_workers
        );

        Ok(Self {
            encoder,
            config,
            blocks: HashMap::new(),
            tail: None,
            hash: None,
            timestamp,
        })
    }

    /// Number of blocks appended so far.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn encoder(&self) -> &SharedEncoder {
        &self.encoder
    }

    /// Creation time in nanoseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Chain identity, derived on the first write.
    pub fn hash(&self) -> Option<&BlockHash> {
        self.hash.as_ref()
    }

    /// The most recently appended block.
    pub fn tail(&self) -> Option<&Block> {
        self.tail.as_ref().and_then(|hash| self.blocks.get(hash))
    }

    pub(crate) fn tail_hash(&self) -> Option<&BlockHash> {
        self.tail.as_ref()
    }

    /// Looks up a block by its hash.
    pub fn block(&self, hash: &BlockHash) -> Option<&Block> {
        self.blocks.get(hash)
    }

    /// Iterates from the tail back to the first block.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors::new(self)
    }

    fn ensure_hash(&mut self) -> BlockHash {
        match &self.hash {
            Some(hash) => hash.clone(),
            None => {
                let hash = chain_hash(self.config.block_size, self.timestamp);
                debug!("Derived chain hash {}", hash);
                self.hash = Some(hash.clone());
                hash
            }
        }
    }

    /// Links `block` to the current tail, seals it and makes it the new tail.
    ///
    /// The chain is unchanged when this fails.
    pub(crate) fn add_block(&mut self, mut block: Block) -> Result<BlockHash> {
        let append_failed = |source: HashChainError| HashChainError::ChainAppendFailed {
            source: Box::new(source),
        };

        block
            .set_parent_hash(self.tail.clone())
            .map_err(append_failed)?;
        block.encode().map_err(append_failed)?;

        let hash = block.hash().cloned().ok_or_else(|| {
            append_failed(HashChainError::Other("Encoded block has no hash".to_string()))
        })?;
        if self.blocks.contains_key(&hash) {
            return Err(append_failed(HashChainError::Other(format!(
                "block '{}' is already part of the chain",
                hash
            ))));
        }

        trace!("Appending block {} at position {}", hash, self.blocks.len());
        self.blocks.insert(hash.clone(), block);
        self.tail = Some(hash.clone());
        Ok(hash)
    }

    /// Splits `data` into blocks of at most `block_size` bytes and appends them
    /// in order.
    ///
    /// Returns the hashes of the appended blocks. If a block fails to encode,
    /// the blocks before it stay in the chain and the error names the failing
    /// block's position within this write.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<Vec<BlockHash>> {
        let chain_hash = self.ensure_hash();
        let chunks = chunker::split(Bytes::copy_from_slice(data), self.config.block_size);
        let mut written = Vec::with_capacity(chunks.len());

        for (block_index, chunk) in chunks.enumerate() {
            let mut header = Header::new();
            header.add(CHAIN_HEADER_KEY, chain_hash.as_str().to_owned());

            let block = Block::with_data(SharedEncoder::clone(&self.encoder), header, chunk);
            match self.add_block(block) {
                Ok(hash) => written.push(hash),
                Err(e) => {
                    warn!(
                        "Write stopped at block {} after appending {} blocks",
                        block_index,
                        written.len()
                    );
                    return Err(HashChainError::ChainWriteFailed {
                        block_index,
                        source: Box::new(e),
                    });
                }
            }
        }

        debug!(
            "Wrote {} bytes as {} blocks, chain now holds {}",
            data.len(),
            written.len(),
            self.blocks.len()
        );
        Ok(written)
    }

    /// Collects the blocks from tail to first and checks the walk reached all of them.
    fn traverse(&self) -> Result<Vec<&Block>> {
        if self.is_empty() {
            return Err(HashChainError::EmptyChain);
        }

        let blocks = self.ancestors().collect::<Result<Vec<_>>>()?;
        if blocks.len() != self.blocks.len() {
            return Err(HashChainError::Other(format!(
                "traversal reached {} of {} blocks",
                blocks.len(),
                self.blocks.len()
            )));
        }
        Ok(blocks)
    }

    /// Decodes every block and returns the payloads concatenated from the
    /// first block to the tail.
    pub fn read_bytes(&self) -> Result<Bytes> {
        let blocks = self.traverse()?;

        let mut payloads = Vec::with_capacity(blocks.len());
        for block in &blocks {
            payloads.push(decode_data(block, self.encoder.as_ref())?);
        }

        Ok(concat_reversed(&payloads))
    }

    /// Same output as [`read_bytes`](Self::read_bytes), decoding blocks on
    /// several threads.
    pub fn read_bytes_in_chunks(&self) -> Result<Bytes> {
        self.read_bytes_in_chunks_with(&CancellationToken::new())
    }

    /// Concurrent read that stops early when `cancel` fires.
    pub fn read_bytes_in_chunks_with(&self, cancel: &CancellationToken) -> Result<Bytes> {
        let blocks = self.traverse()?;

        let tasks = blocks
            .iter()
            .enumerate()
            .map(|(index, block)| DecodeTask {
                index,
                label: block.hash().map(BlockHash::to_string).unwrap_or_default(),
                data: block.data().clone(),
            })
            .collect();

        let payloads = decode_all(
            tasks,
            self.encoder.as_ref(),
            self.config.decode_workers,
            cancel,
        )?;

        Ok(concat_reversed(&payloads))
    }

    /// Decodes only the most recently appended block.
    pub fn read_tail_bytes(&self) -> Result<Bytes> {
        let tail = self.tail().ok_or(HashChainError::EmptyChain)?;
        decode_data(tail, self.encoder.as_ref())
    }
}

/// Joins payloads collected tail first into first-to-tail order.
fn concat_reversed(payloads: &[Bytes]) -> Bytes {
    let total = payloads.iter().map(Bytes::len).sum();
    let mut output = BytesMut::with_capacity(total);
    for payload in payloads.iter().rev() {
        output.extend_from_slice(payload);
    }
    output.freeze()
}

#[cfg(test)]
mod tests;
