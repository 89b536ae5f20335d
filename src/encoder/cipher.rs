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

//! ChaCha20-Poly1305 encoder.
//!
//! Encoded output is a sequence of self-delimiting frames:
//!
//! ```text
//! +------------------+----------------+--------------------------------+
//! |  plaintext_len   |     nonce      |   ciphertext || poly1305 tag   |
//! |  (4 bytes, LE)   |   (12 bytes)   |   (plaintext_len + 16 bytes)   |
//! +------------------+----------------+--------------------------------+
//! ```
//!
//! Each frame covers at most `frame_size` bytes of input. Since frames carry
//! their own length and nonce, encodings can be concatenated and decoded in a
//! single pass.

use std::fmt;

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::BufMut;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

use super::{CodecError, Encoder};
use crate::constants::DEFAULT_CIPHER_FRAME_SIZE;
use crate::error::{HashChainError, Result};

const LEN_SIZE: usize = 4;
const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;
const FRAME_PREFIX_SIZE: usize = LEN_SIZE + NONCE_SIZE;

/// Authenticated encryption with a key private to the instance.
#[derive(Clone)]
pub struct CipherEncoder {
    cipher: ChaCha20Poly1305,
    frame_size: usize,
}

impl CipherEncoder {
    /// Creates an encoder with a freshly generated random key.
    ///
    /// Two generated encoders cannot read each other's output.
    pub fn generate() -> Self {
        let key = ChaCha20Poly1305::generate_key(&mut OsRng);
        Self {
            cipher: ChaCha20Poly1305::new(&key),
            frame_size: DEFAULT_CIPHER_FRAME_SIZE,
        }
    }

    /// Creates an encoder from a caller-held 256-bit key.
    pub fn from_key(key: [u8; 32]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key)),
            frame_size: DEFAULT_CIPHER_FRAME_SIZE,
        }
    }

    /// Sets the maximum plaintext length of one frame.
    pub fn with_frame_size(mut self, frame_size: usize) -> Result<Self> {
        if frame_size == 0 || frame_size > u32::MAX as usize {
            return Err(HashChainError::InvalidConfig(format!(
                "Cipher frame size ({}) must be between 1 and {}",
                frame_size,
                u32::MAX
            )));
        }
        self.frame_size = frame_size;
        Ok(self)
    }

    /// Maximum plaintext length of one frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn seal_frame(&self, plaintext: &[u8], out: &mut Vec<u8>) -> std::result::Result<(), CodecError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| CodecError::Cipher(format!("encryption failed: {}", e)))?;

        out.put_u32_le(plaintext.len() as u32);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(())
    }
}

impl fmt::Debug for CipherEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherEncoder")
            .field("frame_size", &self.frame_size)
            .finish_non_exhaustive()
    }
}

impl Encoder for CipherEncoder {
    fn encode(&self, data: &[u8]) -> std::result::Result<Vec<u8>, CodecError> {
        let frames = data.len().div_ceil(self.frame_size).max(1);
        let mut out = Vec::with_capacity(data.len() + frames * (FRAME_PREFIX_SIZE + TAG_SIZE));

        if data.is_empty() {
            // An empty payload still gets a frame, so the output never equals the input.
            self.seal_frame(&[], &mut out)?;
        } else {
            for frame in data.chunks(self.frame_size) {
                self.seal_frame(frame, &mut out)?;
            }
        }

        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> std::result::Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(data.len());
        let mut rest = data;
        let mut frame_index = 0usize;

        while !rest.is_empty() {
            if rest.len() < FRAME_PREFIX_SIZE + TAG_SIZE {
                return Err(CodecError::Malformed(format!(
                    "frame {} is truncated: {} bytes left",
                    frame_index,
                    rest.len()
                )));
            }

            let plaintext_len = (&rest[..LEN_SIZE])
                .read_u32::<LittleEndian>()
                .map_err(|e| CodecError::Malformed(e.to_string()))? as usize;
            let frame_end = FRAME_PREFIX_SIZE + plaintext_len + TAG_SIZE;
            if rest.len() < frame_end {
                return Err(CodecError::Malformed(format!(
                    "frame {} declares {} bytes but only {} remain",
                    frame_index,
                    plaintext_len,
                    rest.len() - FRAME_PREFIX_SIZE
                )));
            }

            let nonce = Nonce::from_slice(&rest[LEN_SIZE..FRAME_PREFIX_SIZE]);
            let plaintext = self
                .cipher
                .decrypt(nonce, &rest[FRAME_PREFIX_SIZE..frame_end])
                .map_err(|_| {
                    CodecError::Cipher(format!("frame {} failed authentication", frame_index))
                })?;

            out.extend_from_slice(&plaintext);
            rest = &rest[frame_end..];
            frame_index += 1;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_same_instance() {
        let encoder = CipherEncoder::generate();
        let encoded = encoder.encode(b"Hello world").unwrap();

        assert_ne!(encoded, b"Hello world");
        assert_eq!(encoder.decode(&encoded).unwrap(), b"Hello world");
    }

    #[test]
    fn test_different_key_fails() {
        let encoder = CipherEncoder::generate();
        let other = CipherEncoder::generate();
        let encoded = encoder.encode(b"Hello world").unwrap();

        assert!(matches!(other.decode(&encoded), Err(CodecError::Cipher(_))));
    }

    #[test]
    fn test_same_key_reads_across_instances() {
        let key = [7u8; 32];
        let encoded = CipherEncoder::from_key(key).encode(b"shared").unwrap();
        assert_eq!(CipherEncoder::from_key(key).decode(&encoded).unwrap(), b"shared");
    }

    #[test]
    fn test_empty_input_still_framed() {
        let encoder = CipherEncoder::generate();
        let encoded = encoder.encode(&[]).unwrap();

        assert_eq!(encoded.len(), FRAME_PREFIX_SIZE + TAG_SIZE);
        assert!(encoder.decode(&encoded).unwrap().is_empty());
    }

    #[test]
    fn test_concatenated_encodings_decode_in_one_call() {
        let encoder = CipherEncoder::generate().with_frame_size(5).unwrap();
        let parts: [&[u8]; 3] = [b"first part ", b"second ", b"third and last"];

        let mut joined = Vec::new();
        for part in parts {
            joined.extend(encoder.encode(part).unwrap());
        }

        assert_eq!(encoder.decode(&joined).unwrap(), parts.concat());
    }

    #[test]
    fn test_multi_frame_layout() {
        let encoder = CipherEncoder::generate().with_frame_size(4).unwrap();
        let encoded = encoder.encode(b"0123456789").unwrap();

        // 4 + 4 + 2 bytes of plaintext in three frames
        assert_eq!(encoded.len(), 10 + 3 * (FRAME_PREFIX_SIZE + TAG_SIZE));
        assert_eq!(encoder.decode(&encoded).unwrap(), b"0123456789");
    }

    #[test]
    fn test_truncated_input_is_malformed() {
        let encoder = CipherEncoder::generate();
        let encoded = encoder.encode(b"Hello world").unwrap();

        let result = encoder.decode(&encoded[..encoded.len() - 1]);
        assert!(matches!(result, Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_tampered_frame_fails() {
        let encoder = CipherEncoder::generate();
        let mut encoded = encoder.encode(b"Hello world").unwrap();
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;

        assert!(matches!(encoder.decode(&encoded), Err(CodecError::Cipher(_))));
    }

    #[test]
    fn test_invalid_frame_size() {
        assert!(matches!(
            CipherEncoder::generate().with_frame_size(0),
            Err(HashChainError::InvalidConfig(_))
        ));
    }
}
