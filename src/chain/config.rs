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

//! Chain configuration.

use crate::constants::DEFAULT_BLOCK_SIZE;
use crate::error::{HashChainError, Result};

/// Configuration options for a [`Chain`](super::Chain).
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Payload bytes per block when splitting written data (default: 256).
    pub block_size: usize,

    /// Upper bound on threads used by concurrent reads.
    pub decode_workers: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        // Default to using the number of available CPUs for decode workers
        let decode_workers = match std::thread::available_parallelism() {
            Ok(num) => num.get(),
            Err(_) => 2,
        };

        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            decode_workers,
        }
    }
}

impl ChainConfig {
    /// Creates a config with a custom block size.
    ///
    /// Returns an error if `block_size` is zero.
    pub fn with_block_size(block_size: usize) -> Result<Self> {
        let config = Self {
            block_size,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the number of decode workers (minimum one).
    pub fn with_decode_workers(mut self, decode_workers: usize) -> Self {
        self.decode_workers = decode_workers.max(1);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(HashChainError::InvalidConfig(
                "Chain block size must be greater than zero".to_string(),
            ));
        }
        if self.decode_workers == 0 {
            return Err(HashChainError::InvalidConfig(
                "Chain needs at least one decode worker".to_string(),
            ));
        }
        Ok(())
    }
}
