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

//! Integration tests for storing blocks as files.

use std::sync::Arc;

use tempfile::tempdir;

use hashchain::blocks::{block_path, read_from_file_with, save_to_file_with};
use hashchain::error::Result;
use hashchain::{
    read_from_file, save_to_file, Block, BlockFileConfig, CancellationToken, Chain, CipherEncoder,
    HashChainError, Header, IdentityEncoder, SharedEncoder,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_save_and_reload_chain_blocks() -> Result<()> {
    init_logging();
    let encoder: SharedEncoder = Arc::new(CipherEncoder::generate());
    let mut chain = Chain::new(encoder.clone(), 64)?;
    let hashes = chain.write_bytes(&vec![42u8; 200])?;

    let dir = tempdir()?;
    for hash in &hashes {
        let mut block = chain.block(hash).cloned().expect("block is in the chain");
        let path = save_to_file(encoder.as_ref(), &mut block, dir.path())?;
        assert_eq!(path, block_path(dir.path(), hash));
    }

    for (i, hash) in hashes.iter().enumerate() {
        let loaded = read_from_file(block_path(dir.path(), hash), encoder.clone())?;
        assert_eq!(loaded.hash(), Some(hash));
        let parent = if i == 0 { None } else { Some(&hashes[i - 1]) };
        assert_eq!(loaded.parent_hash(), parent);
    }
    Ok(())
}

#[test]
fn test_unsealed_block_is_sealed_before_saving() -> Result<()> {
    let encoder: SharedEncoder = Arc::new(CipherEncoder::generate());
    let mut header = Header::new();
    header.add("kind", "note");
    let mut block = Block::with_data(encoder.clone(), header, &b"persist me"[..]);

    let dir = tempdir()?;
    let path = save_to_file(encoder.as_ref(), &mut block, dir.path())?;
    assert!(block.is_encoded());

    let loaded = read_from_file(&path, encoder)?;
    assert_eq!(&loaded.decoded()?[..], b"persist me");
    assert_eq!(&loaded.header().get("kind")?[..], b"note");
    Ok(())
}

#[test]
fn test_file_and_payload_encoders_can_differ() -> Result<()> {
    let payload: SharedEncoder = Arc::new(CipherEncoder::generate());
    let storage = CipherEncoder::generate();
    let mut block = Block::with_data(payload.clone(), Header::new(), &b"two layers"[..]);

    let dir = tempdir()?;
    let config = BlockFileConfig::with_chunk_size(16)?;
    let path = save_to_file_with(&storage, &mut block, dir.path(), &config, &CancellationToken::new())?;

    let loaded = read_from_file_with(&path, &storage, payload.clone())?;
    assert_eq!(&loaded.decoded()?[..], b"two layers");

    // The payload key cannot open the file.
    assert!(matches!(
        read_from_file(&path, payload),
        Err(HashChainError::DecodingFailed { .. })
    ));
    Ok(())
}

#[test]
fn test_missing_file_is_not_found() -> Result<()> {
    let dir = tempdir()?;
    let result = read_from_file(dir.path().join("absent"), Arc::new(IdentityEncoder));
    assert!(matches!(result, Err(HashChainError::NotFound(_))));
    Ok(())
}

#[test]
fn test_large_block_with_small_slices() -> Result<()> {
    let encoder: SharedEncoder = Arc::new(CipherEncoder::generate());
    let data: Vec<u8> = (0..50_000u32).map(|i| (i % 253) as u8).collect();
    let mut block = Block::with_data(encoder.clone(), Header::new(), data.clone());

    let dir = tempdir()?;
    let config = BlockFileConfig::with_chunk_size(100)?.with_queue_capacity(4);
    let path = save_to_file_with(
        encoder.as_ref(),
        &mut block,
        dir.path(),
        &config,
        &CancellationToken::new(),
    )?;

    let loaded = read_from_file(&path, encoder)?;
    assert_eq!(&loaded.decoded()?[..], &data[..]);
    Ok(())
}
