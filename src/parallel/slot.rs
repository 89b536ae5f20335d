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

//! Pre-sized, index-addressed result slots.
//!
//! Parallel workers each own a distinct index and write their result into
//! the matching slot, so no two workers ever contend for the same entry and
//! the caller gets results back in index order regardless of completion order.

use crate::error::{HashChainError, Result};
use std::sync::Mutex;

/// State of a single slot
#[derive(Debug)]
enum SlotState<T> {
    /// No value has been written yet
    Empty,
    /// A value is waiting to be taken
    Filled(T),
    /// The value was written and has been taken
    Taken,
}

/// A write-once cell.
#[derive(Debug)]
pub struct Slot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(SlotState::Empty),
        }
    }
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`. Fails if the slot was already written.
    pub fn fill(&self, value: T) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| HashChainError::Other(format!("Failed to lock slot mutex: {}", e)))?;

        match *state {
            SlotState::Empty => {
                *state = SlotState::Filled(value);
                Ok(())
            }
            SlotState::Filled(_) | SlotState::Taken => {
                Err(HashChainError::Other("Slot already filled".to_string()))
            }
        }
    }

    /// Take the value if one has been written and not yet taken.
    pub fn take(&self) -> Result<Option<T>> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| HashChainError::Other(format!("Failed to lock slot mutex: {}", e)))?;

        match std::mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Filled(value) => Ok(Some(value)),
            SlotState::Empty => {
                *state = SlotState::Empty;
                Ok(None)
            }
            SlotState::Taken => Ok(None),
        }
    }

    pub fn is_filled(&self) -> Result<bool> {
        let state = self
            .state
            .lock()
            .map_err(|e| HashChainError::Other(format!("Failed to lock slot mutex: {}", e)))?;
        Ok(matches!(*state, SlotState::Filled(_)))
    }
}

/// A fixed number of slots addressed by index.
#[derive(Debug)]
pub struct Slots<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Slots<T> {
    pub fn new(count: usize) -> Self {
        Self {
            slots: (0..count).map(|_| Slot::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Write the result for `index`.
    pub fn fill(&self, index: usize, value: T) -> Result<()> {
        match self.slots.get(index) {
            Some(slot) => slot.fill(value),
            None => Err(HashChainError::Other(format!(
                "Slot index {} out of range for {} slots",
                index,
                self.slots.len()
            ))),
        }
    }

    /// All values in index order. Fails if any slot was never written.
    pub fn into_values(self) -> Result<Vec<T>> {
        let mut values = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.into_iter().enumerate() {
            match slot.take()? {
                Some(value) => values.push(value),
                None => {
                    return Err(HashChainError::Other(format!(
                        "No result was produced for slot {}",
                        index
                    )))
                }
            }
        }
        Ok(values)
    }
}
