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

//! Error types for hashchain operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::encoder::CodecError;

/// The main error type for hashchain operations.
#[derive(Debug, Error)]
pub enum HashChainError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A header key, block file or linked block does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The encoder rejected a payload or envelope.
    #[error("Encoding failed ({context}): {source}")]
    EncodingFailed {
        context: String,
        #[source]
        source: CodecError,
    },

    /// The encoder could not reverse a payload or envelope.
    #[error("Decoding failed ({context}): {source}")]
    DecodingFailed {
        context: String,
        #[source]
        source: CodecError,
    },

    /// A block could not be turned into an envelope.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Envelope bytes could not be turned back into a block.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Fewer bytes reached the sink than were handed to it.
    #[error("Short write to '{}': wrote {written} of {expected} bytes", path.display())]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },

    /// A read was attempted on a chain without blocks.
    #[error("Chain is empty")]
    EmptyChain,

    /// A block could not be linked onto the chain tail.
    #[error("Unable to add block to chain: {source}")]
    ChainAppendFailed {
        #[source]
        source: Box<HashChainError>,
    },

    /// A bulk write stopped at the given block.
    #[error("Chain write failed at block {block_index}: {source}")]
    ChainWriteFailed {
        block_index: usize,
        #[source]
        source: Box<HashChainError>,
    },

    /// The block already carries a hash and can no longer change.
    #[error("Block '{0}' is already encoded")]
    BlockSealed(String),

    /// A configuration value was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Occurs when attempting to interact with a closed queue.
    #[error("Queue is closed: {0}")]
    QueueClosed(String),

    /// A pipeline was stopped through its cancellation token.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// A general error occurred.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for hashchain operations.
pub type Result<T> = std::result::Result<T, HashChainError>;
