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

//! Integration tests for writing to and reading from a chain.
//!
//! These tests verify that bytes written to a chain come back unchanged from
//! both the sequential and the concurrent read path.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use hashchain::error::Result;
use hashchain::{Chain, ChainConfig, CipherEncoder, HashChainError, IdentityEncoder, SharedEncoder};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes `data` to a fresh chain and returns it.
fn write_chain(encoder: SharedEncoder, data: &[u8], block_size: usize) -> Result<Chain> {
    let mut chain = Chain::new(encoder, block_size)?;
    chain.write_bytes(data)?;
    Ok(chain)
}

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

#[test]
fn test_hello_world_three_blocks() -> Result<()> {
    init_logging();

    let data: Vec<u8> = b"hello world".iter().copied().cycle().take(520).collect();
    let chain = write_chain(Arc::new(CipherEncoder::generate()), &data, 256)?;

    assert_eq!(chain.len(), 3);
    assert_eq!(&chain.read_bytes()?[..], &data[..]);
    assert_eq!(&chain.read_bytes_in_chunks()?[..], &data[..]);
    assert_eq!(&chain.read_tail_bytes()?[..], &data[512..]);
    Ok(())
}

#[test]
fn test_round_trip_many_sizes() -> Result<()> {
    init_logging();
    let encoder: SharedEncoder = Arc::new(CipherEncoder::generate());

    for len in [1usize, 2, 63, 64, 65, 255, 256, 257, 1000, 4096] {
        let data = random_bytes(len, len as u64);
        let chain = write_chain(encoder.clone(), &data, 64)?;

        assert_eq!(chain.len(), len.div_ceil(64), "block count for {} bytes", len);
        assert_eq!(&chain.read_bytes()?[..], &data[..], "sequential read of {} bytes", len);
    }
    Ok(())
}

#[test]
fn test_block_size_one() -> Result<()> {
    let data = b"tiny";
    let chain = write_chain(Arc::new(IdentityEncoder), data, 1)?;

    assert_eq!(chain.len(), 4);
    assert_eq!(&chain.read_bytes()?[..], data);
    Ok(())
}

#[test]
fn test_block_larger_than_data() -> Result<()> {
    let data = random_bytes(100, 7);
    let chain = write_chain(Arc::new(CipherEncoder::generate()), &data, 1 << 20)?;

    assert_eq!(chain.len(), 1);
    assert!(chain.tail().and_then(|block| block.parent_hash()).is_none());
    assert_eq!(&chain.read_bytes()?[..], &data[..]);
    Ok(())
}

#[test]
fn test_repeated_writes_append() -> Result<()> {
    let config = ChainConfig::with_block_size(10)?.with_decode_workers(3);
    let mut chain = Chain::with_config(Arc::new(CipherEncoder::generate()), config)?;

    let mut expected = Vec::new();
    for round in 0..20u64 {
        let data = random_bytes(round as usize * 3 + 1, round);
        chain.write_bytes(&data)?;
        expected.extend_from_slice(&data);
    }

    assert_eq!(&chain.read_bytes()?[..], &expected[..]);
    assert_eq!(&chain.read_bytes_in_chunks()?[..], &expected[..]);
    Ok(())
}

#[test]
fn test_empty_chain_is_an_error() -> Result<()> {
    let chain = Chain::new(Arc::new(CipherEncoder::generate()), 16)?;

    assert!(matches!(chain.read_bytes(), Err(HashChainError::EmptyChain)));
    assert!(matches!(chain.read_bytes_in_chunks(), Err(HashChainError::EmptyChain)));
    Ok(())
}

#[test]
fn test_chains_with_same_data_differ_by_key() -> Result<()> {
    let data = random_bytes(300, 99);
    let first = write_chain(Arc::new(CipherEncoder::generate()), &data, 100)?;
    let second = write_chain(Arc::new(CipherEncoder::generate()), &data, 100)?;

    // Hashes cover the plaintext, so both chains link the same way.
    let first_tail = first.tail().and_then(|block| block.hash()).cloned();
    let second_tail = second.tail().and_then(|block| block.hash()).cloned();
    assert_eq!(first_tail, second_tail);

    // The stored payloads differ.
    let first_data = first.tail().map(|block| block.data().clone());
    let second_data = second.tail().map(|block| block.data().clone());
    assert_ne!(first_data, second_data);
    Ok(())
}
