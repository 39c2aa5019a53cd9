// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The record codec: a pure, allocation-free, infallible translation
//! from one 32-bit raw wire record to an optional canonical [`Event`],
//! plus the encoder used by tests and the device test double to go the
//! other way.
//!
//! This is the hot path: the device can emit on the order of 80 million
//! records per second, so decoding one word touches no heap and takes no
//! branch that isn't resolved by the record's own tag bits.

use crate::model::{Event, SYNC_CHANNEL};
use crate::units::ProtocolVersion;

const CHANNEL_MASK: u32 = 0x3F;
const TIME_TAG_MASK: u32 = 0x01FF_FFFF;
const OVERFLOW_CHANNEL: u32 = 0x3F;

/// Owns the overflow-corrected 64-bit time base for one acquisition.
/// Decoding is a pure function of `(ofl, word) -> (ofl', Option<Event>)`;
/// `RecordDecoder` just threads `ofl` through repeated calls to [`decode`](Self::decode).
pub struct RecordDecoder {
    ofl: u64,
    resolution_ps: u64,
    wrap: u64,
}

impl RecordDecoder {
    pub fn new(version: ProtocolVersion, resolution_ps: u64) -> Self {
        RecordDecoder { ofl: 0, resolution_ps, wrap: version.wrap() }
    }

    /// Decodes one raw 32-bit record, advancing the internal overflow
    /// accumulator in place. Returns `Some(event)` for a normal or sync
    /// record, `None` for an overflow record or a discarded external
    /// marker.
    pub fn decode(&mut self, word: u32) -> Option<Event> {
        let special = (word >> 31) & 1;
        let channel_index = (word >> 25) & CHANNEL_MASK;
        let time_tag = word & TIME_TAG_MASK;

        if special == 0 {
            let timestamp_ps = (self.ofl + time_tag as u64) * self.resolution_ps;
            return Some(Event::new((channel_index + 1) as u8, timestamp_ps));
        }

        if channel_index == 0 {
            let timestamp_ps = (self.ofl + time_tag as u64) * self.resolution_ps;
            return Some(Event::new(SYNC_CHANNEL, timestamp_ps));
        }

        if channel_index == OVERFLOW_CHANNEL {
            let multiplicity = if time_tag == 0 { 1 } else { time_tag as u64 };
            self.ofl += self.wrap * multiplicity;
            return None;
        }

        // External marker, 1 <= channel_index <= 15 (and any other
        // unassigned special code): discarded.
        None
    }

    /// The current value of the overflow accumulator, in time-tag units.
    pub fn overflow(&self) -> u64 {
        self.ofl
    }
}

/// Builds one normal-event raw record.
fn encode_normal(channel_index: u8, time_tag: u32) -> u32 {
    debug_assert!(channel_index & !0x3F == 0);
    ((channel_index as u32) << 25) | (time_tag & TIME_TAG_MASK)
}

/// Builds one sync-event raw record (`special = 1`, `channel_index = 0`).
fn encode_sync(time_tag: u32) -> u32 {
    (1 << 31) | (time_tag & TIME_TAG_MASK)
}

/// Builds one overflow raw record advancing `ofl` by `multiplicity` wraps.
fn encode_overflow(multiplicity: u32) -> u32 {
    (1 << 31) | (OVERFLOW_CHANNEL << 25) | (multiplicity & TIME_TAG_MASK)
}

/// Encodes a synthetic, already-sorted event sequence into raw 32-bit
/// records, inserting overflow records as needed to keep each event's
/// time tag within the 25-bit field. This is the inverse of
/// [`RecordDecoder::decode`], used by round-trip tests and by the device
/// test double to synthesize a deterministic word stream.
pub fn encode(events: &[Event], version: ProtocolVersion, resolution_ps: u64) -> Vec<u32> {
    let wrap = version.wrap();
    let mut words = Vec::with_capacity(events.len());
    let mut ofl: u64 = 0;

    for event in events {
        let total_tag_units = event.timestamp_ps / resolution_ps;

        while ofl + (TIME_TAG_MASK as u64) < total_tag_units {
            words.push(encode_overflow(1));
            ofl += wrap;
        }

        let time_tag = (total_tag_units - ofl) as u32;

        if event.channel == SYNC_CHANNEL {
            words.push(encode_sync(time_tag));
        } else {
            words.push(encode_normal(event.channel - 1, time_tag));
        }
    }

    words
}
