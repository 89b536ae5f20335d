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

//! Hashchain stores byte streams as hash-linked chains of encoded blocks.
//!
//! Written bytes are split into fixed-size blocks. Every block is hashed
//! together with its parent's hash and its payload is passed through a
//! pluggable [`Encoder`](encoder::Encoder), by default an authenticated
//! cipher. Chains can be read back sequentially or with a pool of decode
//! threads, and single blocks can be stored as files named by their hash.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hashchain::{Chain, CipherEncoder};
//!
//! # fn main() -> hashchain::Result<()> {
//! let mut chain = Chain::new(Arc::new(CipherEncoder::generate()), 256)?;
//! chain.write_bytes(b"hello world")?;
//! assert_eq!(&chain.read_bytes_in_chunks()?[..], b"hello world");
//! # Ok(())
//! # }
//! ```

pub mod blocks;
pub mod chain;
pub mod chunker;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod hash;
pub mod parallel;
pub(crate) mod varint;


// Re-exports for a cleaner API
pub use blocks::{read_from_file, save_to_file, Block, BlockFileConfig, Header};
pub use chain::{Chain, ChainConfig};
pub use encoder::{CipherEncoder, Encoder, IdentityEncoder, SharedEncoder};
pub use error::{HashChainError, Result};
pub use hash::BlockHash;
pub use parallel::CancellationToken;
