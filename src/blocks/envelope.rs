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

//! Serialized form of a block.
//!
//! The envelope is the byte string that gets encoded and written to storage.
//! It has no version tag; all fields are length-prefixed with varints:
//!
//! ```text
//! varint(n_entries)
//!   n_entries x { varint(len) key, varint(len) value }     (sorted by key)
//! varint(len) data
//! varint(len) hash          (empty when the block is unsealed)
//! varint(len) parent_hash   (empty for the first block)
//! checksum                  (8 bytes, LE HighwayHash of everything above)
//! ```

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{Block, Header};
use crate::constants::ENVELOPE_CHECKSUM_SIZE;
use crate::encoder::SharedEncoder;
use crate::error::{HashChainError, Result};
use crate::hash::{envelope_checksum, BlockHash};
use crate::varint::{read_vu64, vu64_len, write_vu64};

fn put_field(buffer: &mut BytesMut, field: &[u8]) {
    write_vu64(field.len() as u64, buffer);
    buffer.put_slice(field);
}

fn field_len(field: &[u8]) -> usize {
    vu64_len(field.len() as u64) + field.len()
}

/// Serializes `block` into an envelope.
pub fn serialize(block: &Block) -> Result<Bytes> {
    let hash = block.hash().map(BlockHash::as_str).unwrap_or_default();
    let parent = block.parent_hash().map(BlockHash::as_str).unwrap_or_default();

    let mut capacity = vu64_len(block.header().len() as u64)
        + field_len(block.data())
        + field_len(hash.as_bytes())
        + field_len(parent.as_bytes())
        + ENVELOPE_CHECKSUM_SIZE;
    for (key, value) in block.header().iter() {
        capacity += field_len(key.as_bytes()) + field_len(value);
    }

    let mut buffer = BytesMut::with_capacity(capacity);
    write_vu64(block.header().len() as u64, &mut buffer);
    for (key, value) in block.header().iter() {
        put_field(&mut buffer, key.as_bytes());
        put_field(&mut buffer, value);
    }
    put_field(&mut buffer, block.data());
    put_field(&mut buffer, hash.as_bytes());
    put_field(&mut buffer, parent.as_bytes());

    let checksum = envelope_checksum(&buffer);
    buffer.put_u64_le(checksum);

    if buffer.len() != capacity {
        return Err(HashChainError::SerializationFailed(format!(
            "envelope for block '{}' is {} bytes, expected {}",
            hash,
            buffer.len(),
            capacity
        )));
    }

    Ok(buffer.freeze())
}

fn take_field(buf: &mut Bytes, what: &str) -> Result<Bytes> {
    let len = read_vu64(buf)?;
    if len > buf.remaining() as u64 {
        return Err(HashChainError::DeserializationFailed(format!(
            "{} declares {} bytes but only {} remain",
            what,
            len,
            buf.remaining()
        )));
    }
    Ok(buf.split_to(len as usize))
}

fn take_text(buf: &mut Bytes, what: &str) -> Result<String> {
    let raw = take_field(buf, what)?;
    String::from_utf8(raw.to_vec()).map_err(|e| {
        HashChainError::DeserializationFailed(format!("{} is not valid UTF-8: {}", what, e))
    })
}

fn take_hash(buf: &mut Bytes, what: &str) -> Result<Option<BlockHash>> {
    let text = take_text(buf, what)?;
    Ok((!text.is_empty()).then(|| BlockHash::from_encoded(text)))
}

/// Rebuilds a block from an envelope produced by [`serialize`].
///
/// The returned block uses `encoder` for its payload.
pub fn deserialize(envelope: Bytes, encoder: SharedEncoder) -> Result<Block> {
    if envelope.len() < ENVELOPE_CHECKSUM_SIZE {
        return Err(HashChainError::DeserializationFailed(format!(
            "envelope of {} bytes is too short for its checksum",
            envelope.len()
        )));
    }

    let body_len = envelope.len() - ENVELOPE_CHECKSUM_SIZE;
    let expected = (&envelope[body_len..]).read_u64::<LittleEndian>()?;
    let actual = envelope_checksum(&envelope[..body_len]);
    if expected != actual {
        return Err(HashChainError::DeserializationFailed(format!(
            "envelope checksum mismatch: stored {:#018x}, computed {:#018x}",
            expected, actual
        )));
    }

    let mut body = envelope.slice(..body_len);

    let entries = read_vu64(&mut body)?;
    let mut header = Header::new();
    for _ in 0..entries {
        let key = take_text(&mut body, "header key")?;
        let value = take_field(&mut body, "header value")?;
        header.add(key, value);
    }

    let data = take_field(&mut body, "block data")?;
    let hash = take_hash(&mut body, "block hash")?;
    let parent_hash = take_hash(&mut body, "parent hash")?;

    if body.has_remaining() {
        return Err(HashChainError::DeserializationFailed(format!(
            "{} trailing bytes after block fields",
            body.remaining()
        )));
    }

    Ok(Block::from_parts(encoder, header, data, hash, parent_hash))
}
