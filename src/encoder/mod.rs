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

//! Pluggable byte transforms applied to block payloads and stored envelopes.
//!
//! Blocks and chains never own an encoder; they hold a [`SharedEncoder`]
//! handed to them at construction, so one instance can serve a whole chain
//! and test doubles can be swapped in without touching block code.
//!
//! An encoder must satisfy two properties:
//!
//! - `decode(encode(x)) == x` for the same instance, while decoding with a
//!   different instance fails or yields something other than `x`.
//! - `decode` accepts the concatenation of several independent `encode`
//!   outputs and returns the concatenation of their inputs. Block storage
//!   relies on this: envelopes are encoded slice by slice but decoded in one
//!   call.

use std::fmt::Debug;
use std::sync::Arc;

use thiserror::Error;

mod cipher;
mod identity;

pub use cipher::CipherEncoder;
pub use identity::IdentityEncoder;

/// Failure reported by an [`Encoder`] transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The underlying cipher refused the input (bad key, failed authentication).
    #[error("cipher failure: {0}")]
    Cipher(String),

    /// The input is not something this encoder produced.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// The encoder declined to process the input.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// A reversible byte transform.
pub trait Encoder: Send + Sync + Debug {
    /// Transform plaintext into its encoded form.
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Reverse [`Encoder::encode`].
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// An encoder shared between a chain and all of its blocks.
pub type SharedEncoder = Arc<dyn Encoder>;
