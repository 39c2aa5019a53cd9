// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared data model, error type, and byte-level I/O used by every other
//! crate in the toolkit: the canonical event, channel specifications,
//! device configuration, and the record codec.

pub mod codec;
pub mod error;
pub mod io;
pub mod model;
pub mod units;

pub use codec::RecordDecoder;
pub use error::{Result, TdcError};
pub use model::{
    ChannelSpec, DeviceConfig, Edge, Event, InputChannelConfig, Mode, RawSink, RefSource,
    StreamMarker, SYNC_CHANNEL,
};
