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

//! Concurrent building blocks for block persistence and chain reads.
//!
//! - [`pipeline::encode_chunked`] encodes a serialized block slice by slice
//!   through a generator -> encoder -> collector pipeline.
//! - [`decode_group::decode_all`] decodes many block payloads on a bounded
//!   group of workers and returns them in task order.
//!
//! Both honour a shared [`CancellationToken`] and report the first failure
//! to the caller instead of tearing the process down.

pub mod cancel;
pub mod decode_group;
pub mod pipeline;
pub mod slot;
pub mod task_queue;

pub use cancel::CancellationToken;
pub use decode_group::{decode_all, DecodeTask};
pub use pipeline::encode_chunked;
