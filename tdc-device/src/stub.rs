// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A deterministic, hardware-free [`VendorDriver`] test double. Rather
//! than free-running for a wall-clock duration the way a real device
//! would, this stub emits a fixed, caller-controlled number of batches
//! so pipeline and analysis tests are deterministic.

use std::cell::Cell;

use tdc_core::error::invalid_state_error;
use tdc_core::{Edge, Mode, RefSource, Result};

use crate::driver::{VendorDriver, FIFO_OVERRUN_BIT};

/// Default number of synthetic records per batch, matching the
/// original's 500,000-record stub batches.
const DEFAULT_BATCH_SIZE: usize = 8;

/// A synthetic, deterministic stand-in for the vendor driver. Each
/// `poll` advances the stub's generator by one batch until
/// `batch_count` batches have been produced, at which point `ctc_status`
/// reports completion. Optionally simulates a FIFO overrun after a given
/// number of calls to `flags`.
pub struct StubDriver {
    number_of_input_channels: usize,
    batch_size: usize,
    batch_count: usize,
    batches_emitted: usize,
    overrun_after: Option<usize>,
    // `flags` is `&self` in the VendorDriver trait (it is a pure status
    // read on real hardware); interior mutability lets the stub still
    // count polls to decide when to simulate an overrun.
    flag_polls: Cell<usize>,
    opened: bool,
    next_word: u32,
}

impl StubDriver {
    pub fn new(number_of_input_channels: usize) -> Self {
        StubDriver {
            number_of_input_channels,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_count: 4,
            batches_emitted: 0,
            overrun_after: None,
            flag_polls: Cell::new(0),
            opened: false,
            next_word: 1,
        }
    }

    /// Emit `count` batches of `size` words each before reporting
    /// completion.
    pub fn with_batches(mut self, count: usize, size: usize) -> Self {
        self.batch_count = count;
        self.batch_size = size;
        self
    }

    /// Report a FIFO overrun the `n`th time `flags` is checked.
    pub fn with_overrun_after(mut self, n: usize) -> Self {
        self.overrun_after = Some(n);
        self
    }
}

impl VendorDriver for StubDriver {
    fn open(&mut self, _index: usize) -> Result<()> {
        if self.opened {
            return invalid_state_error("stub device already open");
        }
        self.opened = true;
        Ok(())
    }

    fn initialize(&mut self, mode: Mode, reference: RefSource) -> Result<()> {
        let Mode::T2 = mode;
        let RefSource::InternalClock = reference;
        Ok(())
    }

    fn number_of_input_channels(&self) -> Result<usize> {
        Ok(self.number_of_input_channels)
    }

    fn set_sync_divider(&mut self, _divider: u32) -> Result<()> {
        Ok(())
    }

    fn set_sync_edge_trigger(&mut self, _level_mv: i32, _edge: Edge) -> Result<()> {
        Ok(())
    }

    fn set_sync_channel_offset(&mut self, _offset_ps: i64) -> Result<()> {
        Ok(())
    }

    fn set_sync_channel_enable(&mut self, _enable: bool) -> Result<()> {
        Ok(())
    }

    fn set_input_edge_trigger(&mut self, _channel: usize, _level_mv: i32, _edge: Edge) -> Result<()> {
        Ok(())
    }

    fn set_input_channel_offset(&mut self, _channel: usize, _offset_ps: i64) -> Result<()> {
        Ok(())
    }

    fn set_input_channel_enable(&mut self, _channel: usize, _enable: bool) -> Result<()> {
        Ok(())
    }

    fn start_measurement(&mut self, _duration_ms: u64) -> Result<()> {
        self.batches_emitted = 0;
        self.flag_polls.set(0);
        Ok(())
    }

    fn stop_measurement(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_fifo(&mut self, buf: &mut [u32]) -> Result<usize> {
        if self.batches_emitted >= self.batch_count {
            return Ok(0);
        }

        let n = self.batch_size.min(buf.len());
        for slot in buf.iter_mut().take(n) {
            // special=0, channel_index cycles 0..number_of_input_channels,
            // monotonically increasing time tag: always decodes to valid,
            // arrival-ordered normal events.
            let channel_index = (self.next_word as usize % self.number_of_input_channels) as u32;
            *slot = (channel_index << 25) | (self.next_word & 0x01FF_FFFF);
            self.next_word += 1;
        }

        self.batches_emitted += 1;
        Ok(n)
    }

    fn flags(&self) -> Result<u32> {
        let polls = self.flag_polls.get() + 1;
        self.flag_polls.set(polls);

        match self.overrun_after {
            Some(n) if polls > n => Ok(FIFO_OVERRUN_BIT),
            _ => Ok(0),
        }
    }

    fn ctc_status(&self) -> Result<i32> {
        if self.batches_emitted >= self.batch_count {
            Ok(1)
        } else {
            Ok(0)
        }
    }

    fn close(&mut self) -> Result<()> {
        self.opened = false;
        Ok(())
    }
}
