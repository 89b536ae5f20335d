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

//! Varint length prefixes for the block envelope.

use crate::error::{HashChainError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Writes `value` as a little-endian base-128 varint.
#[inline]
pub fn write_vu64(value: u64, buffer: &mut BytesMut) {
    let mut val = value;
    while val >= 0x80 {
        buffer.put_u8(((val as u8) & 0x7F) | 0x80);
        val >>= 7;
    }
    buffer.put_u8(val as u8);
}

/// Reads the next varint encoded u64
#[inline]
pub fn read_vu64(buf: &mut Bytes) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        if !buf.has_remaining() {
            return Err(HashChainError::DeserializationFailed(
                "Truncated varint".to_string(),
            ));
        }

        let byte = buf.get_u8();
        result |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            break;
        }

        shift += 7;
        if shift >= 64 {
            return Err(HashChainError::DeserializationFailed(
                "Varint too long".to_string(),
            ));
        }
    }

    Ok(result)
}

/// Number of bytes `write_vu64` emits for `value`.
#[inline]
pub fn vu64_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}
