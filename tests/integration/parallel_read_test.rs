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

//! Integration tests for the concurrent read path.
//!
//! The concurrent read must return exactly what the sequential read returns,
//! for any block count and any number of decode workers.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use hashchain::error::Result;
use hashchain::{CancellationToken, Chain, ChainConfig, CipherEncoder, HashChainError, SharedEncoder};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn chain_with(encoder: SharedEncoder, data: &[u8], block_size: usize, workers: usize) -> Result<Chain> {
    let config = ChainConfig::with_block_size(block_size)?.with_decode_workers(workers);
    let mut chain = Chain::with_config(encoder, config)?;
    chain.write_bytes(data)?;
    Ok(chain)
}

#[test]
fn test_sequential_and_concurrent_reads_agree() -> Result<()> {
    init_logging();
    let encoder: SharedEncoder = Arc::new(CipherEncoder::generate());
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for len in 1..=64usize {
        let data: Vec<u8> = (0..len * 13).map(|_| rng.gen()).collect();
        let chain = chain_with(encoder.clone(), &data, 8, 4)?;

        let sequential = chain.read_bytes()?;
        let concurrent = chain.read_bytes_in_chunks()?;
        assert_eq!(sequential, concurrent, "reads differ for {} bytes", data.len());
        assert_eq!(&concurrent[..], &data[..]);
    }
    Ok(())
}

#[test]
fn test_worker_counts() -> Result<()> {
    let encoder: SharedEncoder = Arc::new(CipherEncoder::generate());
    let data: Vec<u8> = (0..4000u32).map(|i| (i * 31 % 256) as u8).collect();

    for workers in [1usize, 2, 3, 8, 64, 1000] {
        let chain = chain_with(encoder.clone(), &data, 50, workers)?;
        assert_eq!(&chain.read_bytes_in_chunks()?[..], &data[..], "{} workers", workers);
    }
    Ok(())
}

#[test]
fn test_many_small_blocks() -> Result<()> {
    init_logging();
    let data: Vec<u8> = b"chained".iter().copied().cycle().take(10_000).collect();
    let chain = chain_with(Arc::new(CipherEncoder::generate()), &data, 3, 16)?;

    assert_eq!(chain.len(), 3334);
    assert_eq!(&chain.read_bytes_in_chunks()?[..], &data[..]);
    Ok(())
}

#[test]
fn test_cancelled_token_stops_read() -> Result<()> {
    let chain = chain_with(Arc::new(CipherEncoder::generate()), &[1u8; 512], 16, 4)?;

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(matches!(
        chain.read_bytes_in_chunks_with(&cancel),
        Err(HashChainError::Cancelled(_))
    ));

    // A fresh token reads normally.
    assert_eq!(chain.read_bytes_in_chunks_with(&CancellationToken::new())?.len(), 512);
    Ok(())
}

#[test]
fn test_concurrent_reads_from_threads() -> Result<()> {
    let data: Vec<u8> = (0..2048u32).map(|i| i as u8).collect();
    let chain = Arc::new(chain_with(Arc::new(CipherEncoder::generate()), &data, 100, 2)?);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let chain = Arc::clone(&chain);
            std::thread::spawn(move || chain.read_bytes_in_chunks())
        })
        .collect();

    for handle in handles {
        let read = handle.join().expect("reader thread panicked")?;
        assert_eq!(&read[..], &data[..]);
    }
    Ok(())
}
