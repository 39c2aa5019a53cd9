// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device source: drives a [`VendorDriver`] through the
//! `new -> open -> acquiring -> (completed|overrun|aborted) -> closed`
//! lifecycle and exposes the single high-level `stream` operation.

use std::thread::sleep;
use std::time::Duration;

use log::{debug, error, info, warn};

use tdc_core::error::invalid_state_error;
use tdc_core::{DeviceConfig, Edge, Mode, RawSink, RefSource, Result, StreamMarker, TdcError};

use crate::driver::{VendorDriver, FIFO_OVERRUN_BIT};
use crate::registry::{self, DeviceHandleToken};

/// After `open` or any trigger-level/sync-divider change, the vendor
/// manual requires waiting at least 100 ms before count-rate readings are
/// valid; 200 ms is used here as a comfortable fixed margin.
const SETTLE_DELAY: Duration = Duration::from_millis(200);

/// The observable lifecycle of a [`DeviceSource`].
/// Reopening a device past `Closed` is prohibited; every terminal state
/// (`Completed`, `Overrun`, `Aborted`) leads only to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    New,
    Open,
    Acquiring,
    Completed,
    Overrun,
    Aborted,
    Closed,
}

/// Drives a [`VendorDriver`] through one open/configure/acquire/close
/// cycle. A `DeviceSource` is single-use: once it reaches `Closed` it
/// cannot be reopened.
pub struct DeviceSource<D: VendorDriver> {
    driver: D,
    index: usize,
    token: Option<DeviceHandleToken>,
    state: DeviceState,
}

impl<D: VendorDriver> DeviceSource<D> {
    pub fn new(driver: D, index: usize) -> Self {
        DeviceSource { driver, index, token: None, state: DeviceState::New }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Opens, initializes, and configures the device. Fails with
    /// `InvalidState` if this source was already opened, or if the
    /// configured input count does not match the physical channel count.
    pub fn open(&mut self, config: &DeviceConfig) -> Result<()> {
        if self.state != DeviceState::New {
            return invalid_state_error(format!(
                "device source for index {} was already opened; reopening is prohibited",
                self.index
            ));
        }

        let token = registry::checkout(self.index)?;

        self.driver.open(self.index)?;
        self.driver.initialize(Mode::T2, RefSource::InternalClock)?;

        let physical_channels = self.driver.number_of_input_channels()?;
        if physical_channels != config.input_count() {
            return invalid_state_error(format!(
                "configured {} input channels but device reports {physical_channels}",
                config.input_count()
            ));
        }

        self.driver.set_sync_divider(config.sync_divider)?;
        self.driver.set_sync_edge_trigger(config.sync_edge_level_mv, config.sync_edge)?;
        self.driver.set_sync_channel_offset(config.sync_channel_offset_ps)?;
        self.driver.set_sync_channel_enable(config.sync_enable)?;

        for (channel, input) in config.inputs.iter().enumerate() {
            self.driver.set_input_edge_trigger(channel, input.edge_level_mv, input.edge)?;
            self.driver.set_input_channel_offset(channel, input.channel_offset_ps)?;
            self.driver.set_input_channel_enable(channel, input.enable)?;
        }

        sleep(SETTLE_DELAY);

        self.token = Some(token);
        self.state = DeviceState::Open;
        info!("device {} opened and configured", self.index);
        Ok(())
    }

    /// Runs one acquisition: publishes `Start`, arms the device, polls
    /// the FIFO until overrun or completion, and always publishes `End`
    /// and stops the device on the way out.
    pub fn stream(
        &mut self,
        config: DeviceConfig,
        duration_ms: u64,
        sink: &mut impl RawSink<u32>,
    ) -> Result<()> {
        if self.state != DeviceState::Open {
            return invalid_state_error(format!(
                "device source for index {} must be opened before streaming",
                self.index
            ));
        }

        sink.publish(StreamMarker::Start { config, duration_ms })?;
        self.state = DeviceState::Acquiring;

        let result = self.run_poll_loop(duration_ms, sink);

        // `End` is always published and the device is always stopped,
        // on every exit path, including an error returned by the poll loop.
        let publish_end = sink.publish(StreamMarker::End);
        let stop_result = self.driver.stop_measurement();

        self.state = match &result {
            Ok(()) => DeviceState::Completed,
            Err(TdcError::FifoOverrun) => DeviceState::Overrun,
            Err(_) => DeviceState::Aborted,
        };

        result?;
        publish_end?;
        stop_result?;
        Ok(())
    }

    fn run_poll_loop(&mut self, duration_ms: u64, sink: &mut impl RawSink<u32>) -> Result<()> {
        self.driver.start_measurement(duration_ms)?;

        let mut buf = vec![0u32; 1 << 20];

        loop {
            let flags = self.driver.flags()?;
            if flags & FIFO_OVERRUN_BIT != 0 {
                error!("device {} FIFO overrun", self.index);
                self.driver.stop_measurement()?;
                return Err(TdcError::FifoOverrun);
            }

            let count = self.driver.read_fifo(&mut buf)?;
            if count > 0 {
                debug!("device {} polled {count} raw records", self.index);
                sink.publish(StreamMarker::Batch(buf[..count].to_vec()))?;
                continue;
            }

            if self.driver.ctc_status()? > 0 {
                debug!("device {} measurement complete", self.index);
                return Ok(());
            }
        }
    }

    /// Releases the device handle. Idempotent; safe to call from any
    /// state. Warns if called before a terminal acquisition state.
    pub fn close(&mut self) -> Result<()> {
        if self.state == DeviceState::Closed {
            return Ok(());
        }

        if self.state == DeviceState::Acquiring {
            warn!("closing device {} while still acquiring", self.index);
        }

        self.driver.close()?;
        self.token = None;
        self.state = DeviceState::Closed;
        Ok(())
    }
}

impl<D: VendorDriver> Drop for DeviceSource<D> {
    fn drop(&mut self) {
        if self.state != DeviceState::Closed {
            let _ = self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubDriver;
    use tdc_core::model::{Edge as E, InputChannelConfig};

    fn config(n_inputs: usize) -> DeviceConfig {
        DeviceConfig {
            sync_divider: 1,
            sync_edge_level_mv: -50,
            sync_edge: E::Falling,
            sync_channel_offset_ps: 0,
            sync_enable: true,
            inputs: (0..n_inputs)
                .map(|_| InputChannelConfig {
                    edge_level_mv: -50,
                    edge: E::Falling,
                    channel_offset_ps: 0,
                    enable: true,
                })
                .collect(),
        }
    }

    struct VecSink {
        markers: Vec<StreamMarker<u32>>,
    }

    impl RawSink<u32> for VecSink {
        fn publish(&mut self, marker: StreamMarker<u32>) -> Result<()> {
            self.markers.push(marker);
            Ok(())
        }
    }

    #[test]
    fn reopening_is_rejected() {
        let mut source = DeviceSource::new(StubDriver::new(8), 1);
        source.open(&config(8)).unwrap();
        assert_eq!(source.state(), DeviceState::Open);
        assert!(source.open(&config(8)).is_err());
    }

    #[test]
    fn channel_count_mismatch_is_rejected() {
        let mut source = DeviceSource::new(StubDriver::new(8), 2);
        assert!(source.open(&config(4)).is_err());
    }

    #[test]
    fn stream_emits_start_batches_and_end() {
        let mut source = DeviceSource::new(StubDriver::new(8), 3);
        source.open(&config(8)).unwrap();

        let mut sink = VecSink { markers: Vec::new() };
        source.stream(config(8), 50, &mut sink).unwrap();

        assert!(matches!(sink.markers.first(), Some(StreamMarker::Start { .. })));
        assert!(matches!(sink.markers.last(), Some(StreamMarker::End)));
        assert!(sink.markers.iter().any(|m| matches!(m, StreamMarker::Batch(_))));
        assert_eq!(source.state(), DeviceState::Completed);
    }

    #[test]
    fn overrun_still_publishes_end_and_stops() {
        let mut source = DeviceSource::new(StubDriver::new(8).with_overrun_after(2), 4);
        source.open(&config(8)).unwrap();

        let mut sink = VecSink { markers: Vec::new() };
        let result = source.stream(config(8), 50, &mut sink);

        assert!(matches!(result, Err(TdcError::FifoOverrun)));
        assert!(matches!(sink.markers.last(), Some(StreamMarker::End)));
        assert_eq!(source.state(), DeviceState::Overrun);
    }
}
