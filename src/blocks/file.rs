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

//! Storing blocks as individual files.
//!
//! A block is stored in a file named by its hash, directly inside a caller
//! chosen directory. The file holds the block envelope, encoded slice by
//! slice through [`encode_chunked`]. Reading decodes the whole file in one
//! call, which works because encoders accept concatenated encodings.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::debug;

use super::envelope;
use super::Block;
use crate::constants::{DEFAULT_PERSIST_CHUNK_SIZE, DEFAULT_QUEUE_CAPACITY};
use crate::encoder::{Encoder, SharedEncoder};
use crate::error::{HashChainError, Result};
use crate::hash::BlockHash;
use crate::parallel::{encode_chunked, CancellationToken};

/// Configuration for writing block files.
#[derive(Debug, Clone)]
pub struct BlockFileConfig {
    /// Length of the envelope slices handed to the encoder.
    ///
    /// Unrelated to the chain block size.
    pub chunk_size: usize,

    /// Items allowed to wait between two pipeline stages.
    pub queue_capacity: usize,
}

impl Default for BlockFileConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_PERSIST_CHUNK_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl BlockFileConfig {
    /// Creates a config with a custom envelope slice length.
    pub fn with_chunk_size(chunk_size: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the queue capacity between pipeline stages (minimum one).
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity.max(1);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(HashChainError::InvalidConfig(
                "Block file chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Path of the file holding the block with `hash` inside `dir`.
pub fn block_path(dir: impl AsRef<Path>, hash: &BlockHash) -> PathBuf {
    dir.as_ref().join(hash.as_str())
}

/// Stores `block` in `dir` using the default [`BlockFileConfig`].
///
/// See [`save_to_file_with`].
pub fn save_to_file(
    encoder: &dyn Encoder,
    block: &mut Block,
    dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    save_to_file_with(
        encoder,
        block,
        dir,
        &BlockFileConfig::default(),
        &CancellationToken::new(),
    )
}

/// Stores `block` in `dir`, encoding the envelope with `encoder`.
///
/// An unsealed block is encoded first, so the file name is always its hash.
/// Returns the path of the written file.
pub fn save_to_file_with(
    encoder: &dyn Encoder,
    block: &mut Block,
    dir: impl AsRef<Path>,
    config: &BlockFileConfig,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    config.validate()?;

    if !block.is_encoded() {
        debug!("Block does not have hash. Encoding it first");
        block.encode()?;
    }
    let hash = block
        .hash()
        .cloned()
        .ok_or_else(|| HashChainError::Other("Encoded block has no hash".to_string()))?;

    let serialized = envelope::serialize(block)?;
    let encoded = encode_chunked(
        serialized,
        encoder,
        config.chunk_size,
        config.queue_capacity,
        cancel,
    )?;

    let path = block_path(dir, &hash);
    let mut file = File::create(&path)?;
    write_block_bytes(&mut file, &encoded, &path)?;
    file.sync_all()?;

    debug!("Saved block {} ({} bytes) to {}", hash, encoded.len(), path.display());
    Ok(path)
}

/// Hands `bytes` to `sink` in a single write and reports a short write as an error.
pub(crate) fn write_block_bytes<W: Write>(sink: &mut W, bytes: &[u8], path: &Path) -> Result<()> {
    let written = sink.write(bytes)?;
    if written < bytes.len() {
        return Err(HashChainError::ShortWrite {
            path: path.to_path_buf(),
            written,
            expected: bytes.len(),
        });
    }
    sink.flush()?;
    Ok(())
}

/// Loads a block file, decoding it with `decoder`.
///
/// The returned block also uses `decoder` for its payload. Use
/// [`read_from_file_with`] when payloads and files use different encoders.
pub fn read_from_file(path: impl AsRef<Path>, decoder: SharedEncoder) -> Result<Block> {
    let payload_encoder = SharedEncoder::clone(&decoder);
    read_from_file_with(path, decoder.as_ref(), payload_encoder)
}

/// Loads a block file, decoding it with `decoder` and attaching `payload_encoder`
/// to the returned block.
pub fn read_from_file_with(
    path: impl AsRef<Path>,
    decoder: &dyn Encoder,
    payload_encoder: SharedEncoder,
) -> Result<Block> {
    let path = path.as_ref();
    let encoded = match fs::read(path) {
        Ok(encoded) => encoded,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(HashChainError::NotFound(format!(
                "block file '{}' does not exist",
                path.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };

    let serialized = decoder
        .decode(&encoded)
        .map_err(|source| HashChainError::DecodingFailed {
            context: format!("couldn't decode block file '{}'", path.display()),
            source,
        })?;

    let block = envelope::deserialize(Bytes::from(serialized), payload_encoder)?;
    debug!(
        "Loaded block {} from {}",
        block.hash().map(BlockHash::as_str).unwrap_or_default(),
        path.display()
    );
    Ok(block)
}
