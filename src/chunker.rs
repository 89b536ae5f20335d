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

//! Splitting byte buffers into fixed-size chunks.
//!
//! Chunks are zero-copy [`Bytes`] views into the source buffer, handed out
//! lazily and in order. Every chunk is `chunk_size` long except possibly the
//! last one, which holds the remainder.

use bytes::Bytes;

/// Lazy, ordered iterator over the chunks of a buffer.
#[derive(Debug, Clone)]
pub struct Chunks {
    data: Bytes,
    chunk_size: usize,
}

/// Split `data` into chunks of `chunk_size` bytes.
///
/// Empty input yields no chunks.
///
/// # Panics
///
/// Panics if `chunk_size` is zero. Callers validate sizes at configuration
/// time, so a zero here is a bug.
pub fn split(data: Bytes, chunk_size: usize) -> Chunks {
    assert!(chunk_size > 0, "chunk size must be greater than zero");
    Chunks { data, chunk_size }
}

/// Number of chunks `split` produces for `len` bytes.
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    assert!(chunk_size > 0, "chunk size must be greater than zero");
    len.div_ceil(chunk_size)
}

impl Iterator for Chunks {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.data.is_empty() {
            return None;
        }
        let take = self.chunk_size.min(self.data.len());
        Some(self.data.split_to(take))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = chunk_count(self.data.len(), self.chunk_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks {}

impl std::iter::FusedIterator for Chunks {}
