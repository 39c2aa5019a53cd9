// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The canonical event, channel specifications, and device configuration.
//! These types are shared by every crate downstream of the codec: the
//! pipeline moves `Event`s, the analysis crate configures its state
//! machines with `ChannelSpec`s, and the device crate is opened with a
//! `DeviceConfig`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// By convention, the synchronization input occupies channel 0; regular
/// inputs are `channel_index + 1`.
pub const SYNC_CHANNEL: u8 = 0;

/// A canonical `(channel, timestamp_ps)` detection event, already
/// overflow-corrected and expressed in picoseconds. Within one
/// acquisition, `timestamp_ps` is non-decreasing across consecutive
/// events in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Event {
    pub channel: u8,
    pub timestamp_ps: u64,
}

impl Event {
    pub fn new(channel: u8, timestamp_ps: u64) -> Self {
        Event { channel, timestamp_ps }
    }
}

/// A single entry in a coincidence machine's channel list. `Plain` is
/// the ergonomic form a caller writes; it is lifted to
/// `Windowed(id, 0, 0)` when the machine is built. A `Windowed` entry used
/// as a non-base channel with a zero-width window is a configuration
/// error, checked where the machine is constructed (`tdc-analysis`), not
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ChannelSpec {
    Plain(u8),
    Windowed { channel: u8, peak_start_ps: u64, peak_end_ps: u64 },
}

impl ChannelSpec {
    pub fn channel(&self) -> u8 {
        match *self {
            ChannelSpec::Plain(ch) => ch,
            ChannelSpec::Windowed { channel, .. } => channel,
        }
    }

    /// The half-open delay window `(peak_start_ps, peak_end_ps)`, or
    /// `(0, 0)` for a `Plain` entry before normalization.
    pub fn window(&self) -> (u64, u64) {
        match *self {
            ChannelSpec::Plain(_) => (0, 0),
            ChannelSpec::Windowed { peak_start_ps, peak_end_ps, .. } => {
                (peak_start_ps, peak_end_ps)
            }
        }
    }

    /// `true` if the window has zero width, i.e. this spec has not been
    /// given a real delay window.
    pub fn is_zero_width(&self) -> bool {
        let (start, end) = self.window();
        start == end
    }
}

/// Edge polarity for a trigger input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Edge {
    Rising,
    Falling,
}

/// Device acquisition mode. Only T2 (every event individually time-tagged,
/// no on-device histogramming) is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    T2,
}

/// Reference clock source. Only the device's internal clock is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RefSource {
    InternalClock,
}

/// Per-input trigger and offset configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputChannelConfig {
    pub edge_level_mv: i32,
    pub edge: Edge,
    pub channel_offset_ps: i64,
    pub enable: bool,
}

/// An immutable device configuration, constructed before `open` and held
/// for the life of a device handle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    pub sync_divider: u32,
    pub sync_edge_level_mv: i32,
    pub sync_edge: Edge,
    pub sync_channel_offset_ps: i64,
    pub sync_enable: bool,
    pub inputs: Vec<InputChannelConfig>,
}

impl DeviceConfig {
    /// The number of physical input channels this configuration expects
    /// the device to report. `DeviceSource::open` rejects a mismatch
    /// against what the vendor driver reports.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}

/// The acquisition envelope: every acquisition begins with exactly
/// one `Start` marker carrying the device configuration snapshot and
/// requested duration, contains any number of `Batch`es, and ends with
/// exactly one `End` marker. The grammar `(Start Batch* End)*` holds for
/// any stream; markers are never interleaved.
///
/// Generic over the batch element type so the same envelope shape
/// carries raw 32-bit words between the device source and the decoder,
/// and decoded `Event`s between the decoder and its consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMarker<T> {
    Start { config: DeviceConfig, duration_ms: u64 },
    Batch(Vec<T>),
    End,
}

/// Destination for the envelope a device source or decoder publishes
/// into. Implementations decide how `publish` suspends under
/// backpressure; the device source and decoder call it without knowing
/// whether the other side is a bounded channel, a test collector, or
/// something else.
pub trait RawSink<T> {
    fn publish(&mut self, marker: StreamMarker<T>) -> crate::error::Result<()>;
}
