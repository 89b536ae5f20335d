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

//! Backward traversal from the chain tail.

use super::Chain;
use crate::blocks::Block;
use crate::error::{HashChainError, Result};
use crate::hash::BlockHash;

/// Iterator over a chain's blocks from the tail back to the first block,
/// following `parent_hash` links through the chain's block index.
///
/// Yields an error and stops if a link points at a block the chain does not
/// hold, or if the walk runs longer than the chain.
#[derive(Debug)]
pub struct Ancestors<'a> {
    chain: &'a Chain,
    next: Option<&'a BlockHash>,
    remaining: usize,
}

impl<'a> Ancestors<'a> {
    pub(super) fn new(chain: &'a Chain) -> Self {
        Self {
            chain,
            next: chain.tail_hash(),
            remaining: chain.len(),
        }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Result<&'a Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.next.take()?;

        if self.remaining == 0 {
            return Some(Err(HashChainError::Other(format!(
                "Traversal passed {} blocks and still links to '{}'",
                self.chain.len(),
                hash
            ))));
        }

        match self.chain.block(hash) {
            Some(block) => {
                self.next = block.parent_hash();
                self.remaining -= 1;
                Some(Ok(block))
            }
            None => Some(Err(HashChainError::NotFound(format!(
                "block '{}' is not part of the chain",
                hash
            )))),
        }
    }
}
