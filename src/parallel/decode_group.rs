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

//! Scatter/gather decoding of independent payloads.
//!
//! Tasks go into a [`TaskQueue`], a bounded group of worker threads pulls
//! them off and writes each decoded payload into the [`Slots`] entry named by
//! the task's index. The first failure is kept, the remaining workers are
//! stopped through a child cancellation token, and the caller sees that
//! failure once every worker has been joined.

use std::sync::Mutex;
use std::thread;

use bytes::Bytes;
use log::{debug, error, trace};

use super::cancel::CancellationToken;
use super::slot::Slots;
use super::task_queue::TaskQueue;
use crate::encoder::Encoder;
use crate::error::{HashChainError, Result};

/// One payload to decode.
#[derive(Debug, Clone)]
pub struct DecodeTask {
    /// Position of the result in the output of [`decode_all`].
    pub index: usize,
    /// Name used in error messages, usually the block hash.
    pub label: String,
    pub data: Bytes,
}

/// Decodes every task on up to `workers` threads.
///
/// Task indices must be exactly `0..tasks.len()`; the result holds the
/// decoded payload for index `i` at position `i`.
pub fn decode_all(
    tasks: Vec<DecodeTask>,
    decoder: &dyn Encoder,
    workers: usize,
    cancel: &CancellationToken,
) -> Result<Vec<Bytes>> {
    let count = tasks.len();
    if count == 0 {
        return Ok(Vec::new());
    }

    let queue = TaskQueue::new(count);
    for task in tasks {
        queue.push_back(task)?;
    }
    queue.close()?;

    let slots = Slots::new(count);
    let first_error: Mutex<Option<HashChainError>> = Mutex::new(None);
    let stop = cancel.child();
    let workers = workers.clamp(1, count);

    debug!("Decoding {} payloads on {} workers", count, workers);

    thread::scope(|scope| {
        for id in 0..workers {
            let queue = &queue;
            let slots = &slots;
            let first_error = &first_error;
            let stop = &stop;
            scope.spawn(move || decode_worker(id, queue, decoder, slots, first_error, stop));
        }
    });

    let failure = first_error
        .into_inner()
        .map_err(|e| HashChainError::Other(format!("Failed to lock error slot: {}", e)))?;
    if let Some(err) = failure {
        return Err(err);
    }
    cancel.check("parallel decode")?;

    slots.into_values()
}

fn decode_worker(
    id: usize,
    queue: &TaskQueue<DecodeTask>,
    decoder: &dyn Encoder,
    slots: &Slots<Bytes>,
    first_error: &Mutex<Option<HashChainError>>,
    stop: &CancellationToken,
) {
    trace!("Decode worker {} starting", id);

    loop {
        if stop.is_cancelled() {
            trace!("Decode worker {} stopped", id);
            break;
        }

        let task = match queue.read_front() {
            Ok(task) => task,
            Err(HashChainError::QueueClosed(_)) => break,
            Err(e) => {
                record_failure(first_error, stop, e);
                break;
            }
        };

        let outcome = decoder
            .decode(&task.data)
            .map_err(|source| HashChainError::DecodingFailed {
                context: format!(
                    "encountered an error while decoding block '{}' (position {})",
                    task.label, task.index
                ),
                source,
            })
            .and_then(|decoded| slots.fill(task.index, Bytes::from(decoded)));

        if let Err(e) = outcome {
            error!("Decode worker {} failed on task {}: {}", id, task.index, e);
            record_failure(first_error, stop, e);
            break;
        }
    }

    trace!("Decode worker {} exiting", id);
}

fn record_failure(
    first_error: &Mutex<Option<HashChainError>>,
    stop: &CancellationToken,
    err: HashChainError,
) {
    stop.cancel();
    match first_error.lock() {
        Ok(mut slot) => {
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        Err(poisoned) => error!("Dropping worker error, error slot poisoned: {}", poisoned),
    }
}
