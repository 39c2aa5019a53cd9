// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The stream pipeline: bounded queues with a `Shutdown` sentinel, the
//! decoder task that bridges them, and the chunked event sink events
//! are written into.

pub mod decoder;
pub mod pipeline;
pub mod queue;
pub mod sink;

pub use pipeline::{run, QueueRawSink, DEFAULT_QUEUE_CAPACITY};
pub use queue::{channel, Received, Receiver, Sender};
pub use sink::{ChunkedFileSink, EventSink};
