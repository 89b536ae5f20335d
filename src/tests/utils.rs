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

//! Utility types for tests

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::encoder::{CipherEncoder, CodecError, Encoder, SharedEncoder};

/// Encoder whose every transform fails.
#[derive(Debug, Default)]
pub struct FailingEncoder;

impl Encoder for FailingEncoder {
    fn encode(&self, _data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::Rejected("encode always fails".to_string()))
    }

    fn decode(&self, _data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::Rejected("decode always fails".to_string()))
    }
}

/// Encoder that reverses bytes and starts failing after `budget` encodes.
#[derive(Debug)]
pub struct ExhaustibleEncoder {
    budget: usize,
    calls: AtomicUsize,
}

impl ExhaustibleEncoder {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Encoder for ExhaustibleEncoder {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.budget {
            return Err(CodecError::Rejected("encode budget exhausted".to_string()));
        }
        Ok(data.iter().rev().copied().collect())
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.iter().rev().copied().collect())
    }
}

/// Sink that accepts at most `limit` bytes per write.
#[derive(Debug, Default)]
pub struct ShortWriter {
    pub limit: usize,
    pub written: Vec<u8>,
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.limit);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn cipher() -> SharedEncoder {
    Arc::new(CipherEncoder::generate())
}

/// `len` bytes of repeating "hello world".
pub fn hello_world(len: usize) -> Vec<u8> {
    b"hello world".iter().copied().cycle().take(len).collect()
}
