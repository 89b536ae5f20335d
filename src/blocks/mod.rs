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

//! Blocks: hashed, encoded units of payload and their storage format.
//!
//! # Key Components
//!
//! - [`Header`]: key/value metadata carried by every block.
//! - [`Block`]: payload plus content hash and parent link. [`Block::encode`]
//!   seals the block: it fixes the hash and replaces the payload with its
//!   encoded form.
//! - [`envelope`]: the binary form of a block used for storage.
//! - [`file`]: one file per block, named by the block hash.
//!
//! # Block Hash
//!
//! ```text
//! hash = base64url( SHA-256( plaintext || parent_hash ) )
//! ```
//!
//! The first block of a chain has no parent and hashes its plaintext alone.

mod block;
pub mod envelope;
pub mod file;
mod header;

pub use block::{decode_data, Block};
pub use file::{
    block_path, read_from_file, read_from_file_with, save_to_file, save_to_file_with,
    BlockFileConfig,
};
pub use header::Header;

#[cfg(test)]
mod tests;
