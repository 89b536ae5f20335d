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

//! Constants shared by blocks, chains and the persistence pipeline.

/// Default number of payload bytes per chain block.
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// Default slice length used when a serialized block is encoded for storage.
///
/// Independent of the chain block size: it only controls how the envelope is
/// cut up before being fed to the encoder.
pub const DEFAULT_PERSIST_CHUNK_SIZE: usize = 128;

/// Default number of in-flight items a pipeline handoff queue holds before
/// the producer blocks.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

/// Header key under which a block records the hash of the chain it belongs to.
pub const CHAIN_HEADER_KEY: &str = "chain";

/// Size of the checksum trailer appended to a serialized block envelope.
pub const ENVELOPE_CHECKSUM_SIZE: usize = 8;

/// Default plaintext length of a single [`CipherEncoder`](crate::encoder::CipherEncoder) frame.
pub const DEFAULT_CIPHER_FRAME_SIZE: usize = 4096;

/// The HighwayHash key used for envelope checksums.
/// This is 'hashchai', 'n/envel.', 'ope/v1\0\0', 'checksum' in 64-bit little-endian chunks.
pub const HIGHWAY_HASH_KEY: [u64; 4] = [
    0x6961686368736168,
    0x2e6c65766e652f6e,
    0x000031762f65706f,
    0x6d75736b63656863,
];
