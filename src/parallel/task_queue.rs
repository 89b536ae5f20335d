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

//! Bounded, closeable handoff queue between pipeline stages.

use crate::error::{HashChainError, Result};
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Represents the operational state of the task queue
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TaskQueueState {
    /// Items can be added and taken
    Open,
    /// No more items can be added; remaining items can still be taken
    Closed,
}

#[derive(Debug)]
struct TaskQueueInner<T> {
    queue: VecDeque<T>,
    state: TaskQueueState,
    capacity: usize,
}

/// A thread-safe FIFO with a capacity limit.
///
/// `push_back` blocks while the queue is full and `read_front` blocks while it
/// is empty. Closing the queue wakes everyone: blocked producers fail with
/// [`HashChainError::QueueClosed`], consumers drain what is left and then fail
/// the same way. A capacity of one gives a near-synchronous handoff.
#[derive(Debug)]
pub struct TaskQueue<T> {
    inner: Mutex<TaskQueueInner<T>>,
    signal: Condvar,
}

#[inline]
fn queue_closed_err(msg: &str) -> HashChainError {
    HashChainError::QueueClosed(msg.to_string())
}

impl<T> TaskQueue<T> {
    /// Create an empty queue holding at most `capacity` items (minimum one).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(TaskQueueInner {
                queue: VecDeque::new(),
                state: TaskQueueState::Open,
                capacity: capacity.max(1),
            }),
            signal: Condvar::new(),
        }
    }

    #[inline]
    fn acquire_lock(&self) -> Result<MutexGuard<'_, TaskQueueInner<T>>> {
        self.inner
            .lock()
            .map_err(|e| HashChainError::Other(e.to_string()))
    }

    #[inline]
    fn await_signal<'a>(
        &'a self,
        inner: MutexGuard<'a, TaskQueueInner<T>>,
    ) -> Result<MutexGuard<'a, TaskQueueInner<T>>> {
        self.signal
            .wait(inner)
            .map_err(|e| HashChainError::Other(e.to_string()))
    }

    /// Add an item to the back of the queue, waiting for room if it is full.
    pub fn push_back(&self, item: T) -> Result<()> {
        let mut inner = self.acquire_lock()?;

        loop {
            if inner.state == TaskQueueState::Closed {
                return Err(queue_closed_err("Cannot add to a closed queue"));
            }
            if inner.queue.len() < inner.capacity {
                break;
            }
            inner = self.await_signal(inner)?;
        }

        inner.queue.push_back(item);
        self.signal.notify_all();
        Ok(())
    }

    /// Take the item at the front of the queue, waiting until one arrives.
    ///
    /// Fails with [`HashChainError::QueueClosed`] once the queue is closed and empty.
    pub fn read_front(&self) -> Result<T> {
        let mut inner = self.acquire_lock()?;

        loop {
            if let Some(item) = inner.queue.pop_front() {
                self.signal.notify_all();
                return Ok(item);
            }
            if inner.state == TaskQueueState::Closed {
                return Err(queue_closed_err("Queue is closed and empty"));
            }
            inner = self.await_signal(inner)?;
        }
    }

    /// Take the front item if there is one, without blocking.
    pub fn try_read_front(&self) -> Result<Option<T>> {
        let mut inner = self.acquire_lock()?;
        let item = inner.queue.pop_front();
        if item.is_some() {
            self.signal.notify_all();
        }
        Ok(item)
    }

    /// Close the queue and wake every blocked producer and consumer.
    ///
    /// Closing twice is harmless.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.acquire_lock()?;
        inner.state = TaskQueueState::Closed;
        self.signal.notify_all();
        Ok(())
    }

    pub fn is_closed(&self) -> Result<bool> {
        let inner = self.acquire_lock()?;
        Ok(inner.state == TaskQueueState::Closed)
    }

    /// Get the number of items waiting in the queue
    pub fn len(&self) -> Result<usize> {
        let inner = self.acquire_lock()?;
        Ok(inner.queue.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
