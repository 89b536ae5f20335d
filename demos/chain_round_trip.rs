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

//! Writes a message into a chain, reads it back both ways and stores the tail
//! block in a temporary directory.
//!
//! Run with `RUST_LOG=debug` to see what the chain does.

use std::sync::Arc;

use hashchain::error::Result;
use hashchain::{read_from_file, save_to_file, Chain, CipherEncoder, SharedEncoder};

fn main() -> Result<()> {
    env_logger::init();

    let encoder: SharedEncoder = Arc::new(CipherEncoder::generate());
    let mut chain = Chain::new(encoder.clone(), 256)?;

    let message: Vec<u8> = b"hello world ".iter().copied().cycle().take(520).collect();
    let hashes = chain.write_bytes(&message)?;
    println!("Wrote {} bytes as {} blocks", message.len(), hashes.len());
    for hash in &hashes {
        println!("  {}", hash);
    }

    let sequential = chain.read_bytes()?;
    let concurrent = chain.read_bytes_in_chunks()?;
    assert_eq!(sequential, concurrent);
    println!("Read back {} bytes", concurrent.len());

    let dir = tempfile::tempdir()?;
    let mut tail = chain.tail().cloned().ok_or(hashchain::HashChainError::EmptyChain)?;
    let path = save_to_file(encoder.as_ref(), &mut tail, dir.path())?;
    let loaded = read_from_file(&path, encoder)?;
    println!(
        "Stored tail at {} (parent {})",
        path.display(),
        loaded
            .parent_hash()
            .map(|hash| hash.to_string())
            .unwrap_or_default()
    );

    Ok(())
}
