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

//! Chunked encode pipeline.
//!
//! Three stages connected by bounded [`TaskQueue`]s:
//!
//! ```text
//! generator --chunks--> encoder --encoded--> collector (caller thread)
//! ```
//!
//! The generator slices the input, one encoder thread transforms each slice,
//! and the collector appends the results. Both queues are single-producer,
//! single-consumer FIFOs, so output order matches input order without any
//! re-sorting. An encoder failure travels down the `encoded` queue as an
//! `Err` item and stops the other stages.

use std::thread;

use bytes::{Bytes, BytesMut};
use log::{debug, trace, warn};

use super::cancel::CancellationToken;
use super::task_queue::TaskQueue;
use crate::chunker::{chunk_count, split};
use crate::encoder::Encoder;
use crate::error::{HashChainError, Result};

/// Encodes `data` slice by slice and returns the concatenated encodings.
///
/// Each slice is `chunk_size` bytes except possibly the last. At most
/// `queue_capacity` items wait between two stages. Cancelling `cancel` stops
/// every stage; the call then fails with [`HashChainError::Cancelled`] unless
/// all slices had already been encoded.
pub fn encode_chunked(
    data: Bytes,
    encoder: &dyn Encoder,
    chunk_size: usize,
    queue_capacity: usize,
    cancel: &CancellationToken,
) -> Result<Bytes> {
    if chunk_size == 0 {
        return Err(HashChainError::InvalidConfig(
            "Pipeline chunk size must be greater than zero".to_string(),
        ));
    }

    let expected = chunk_count(data.len(), chunk_size);
    let input_len = data.len();
    let chunks: TaskQueue<Bytes> = TaskQueue::new(queue_capacity);
    let encoded: TaskQueue<Result<Bytes>> = TaskQueue::new(queue_capacity);

    debug!(
        "Encoding {} bytes in {} chunks of up to {} bytes",
        input_len, expected, chunk_size
    );

    let (output, received) = thread::scope(|scope| {
        scope.spawn(|| generate_chunks(data, chunk_size, &chunks, cancel));
        scope.spawn(|| encode_chunks(&chunks, &encoded, encoder, cancel));

        let collected = collect_chunks(&encoded, input_len);

        // Unblock both stages if the collector stopped early.
        shutdown(&chunks, "chunk");
        shutdown(&encoded, "encoded");
        collected
    })?;

    if received != expected {
        cancel.check("chunked encode")?;
        return Err(HashChainError::Other(format!(
            "Chunked encode produced {} of {} chunks",
            received, expected
        )));
    }

    Ok(output.freeze())
}

fn shutdown<T>(queue: &TaskQueue<T>, name: &str) {
    if let Err(e) = queue.close() {
        warn!("Failed to close {} queue: {}", name, e);
    }
}

fn generate_chunks(
    data: Bytes,
    chunk_size: usize,
    chunks: &TaskQueue<Bytes>,
    cancel: &CancellationToken,
) {
    for (index, chunk) in split(data, chunk_size).enumerate() {
        if cancel.is_cancelled() {
            debug!("Chunk generator cancelled after {} chunks", index);
            break;
        }
        if let Err(e) = chunks.push_back(chunk) {
            trace!("Chunk generator stopping at chunk {}: {}", index, e);
            break;
        }
    }
    shutdown(chunks, "chunk");
}

fn encode_chunks(
    chunks: &TaskQueue<Bytes>,
    encoded: &TaskQueue<Result<Bytes>>,
    encoder: &dyn Encoder,
    cancel: &CancellationToken,
) {
    let mut index = 0usize;

    while let Ok(chunk) = chunks.read_front() {
        if cancel.is_cancelled() {
            debug!("Chunk encoder cancelled at chunk {}", index);
            break;
        }

        let item = encoder
            .encode(&chunk)
            .map(Bytes::from)
            .map_err(|source| HashChainError::EncodingFailed {
                context: format!("could not encode chunk {} of {} bytes", index, chunk.len()),
                source,
            });
        let failed = item.is_err();
        if failed {
            warn!("Chunk encoder failed at chunk {}", index);
        }

        if let Err(e) = encoded.push_back(item) {
            trace!("Chunk encoder stopping at chunk {}: {}", index, e);
            break;
        }
        if failed {
            break;
        }
        index += 1;
    }

    shutdown(encoded, "encoded");
    // Lets a blocked generator exit when we stopped early.
    shutdown(chunks, "chunk");
}

fn collect_chunks(encoded: &TaskQueue<Result<Bytes>>, size_hint: usize) -> Result<(BytesMut, usize)> {
    let mut output = BytesMut::with_capacity(size_hint);
    let mut received = 0usize;

    loop {
        match encoded.read_front() {
            Ok(Ok(chunk)) => {
                trace!("Collected encoded chunk {} ({} bytes)", received, chunk.len());
                output.extend_from_slice(&chunk);
                received += 1;
            }
            Ok(Err(e)) => return Err(e),
            Err(HashChainError::QueueClosed(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((output, received))
}
