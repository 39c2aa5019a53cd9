// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wires a raw-word producer, the decoder task of [`crate::decoder`],
//! and a decoded-event consumer together through two bounded queues,
//! each stage running on its own thread.

use std::thread;

use tdc_core::{Event, RawSink, Result, StreamMarker};

use crate::decoder;
use crate::queue::{channel, Received, Sender};
use crate::sink::EventSink;

/// Default queue capacity. Bounded so the producer suspends (rather than
/// growing memory without limit) when downstream stages fall behind.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Adapts a raw-word queue [`Sender`] to the [`RawSink`] trait a device
/// or file source publishes into.
pub struct QueueRawSink {
    tx: Sender<StreamMarker<u32>>,
}

impl QueueRawSink {
    pub fn new(tx: Sender<StreamMarker<u32>>) -> Self {
        QueueRawSink { tx }
    }
}

impl RawSink<u32> for QueueRawSink {
    fn publish(&mut self, marker: StreamMarker<u32>) -> Result<()> {
        self.tx.send(marker);
        Ok(())
    }
}

/// Runs one full pipeline pass: `produce` is handed a [`RawSink`] to
/// publish the raw `Start`/`Batch*`/`End` envelope into (a device source
/// or a capture-file driver), the decoder bridges `raw_q` to `event_q` on
/// its own thread, and every decoded event is written to `sink` on the
/// calling thread, with the acquisition envelope observed in order.
///
/// Returns whatever `produce` returns; a producer error still drains and
/// shuts down the queues cleanly since `produce`'s `RawSink` is dropped
/// (ending `raw_q`) regardless of how it returns.
pub fn run<P>(
    produce: P,
    version: tdc_core::units::ProtocolVersion,
    resolution_ps: u64,
    sink: &mut impl EventSink,
) -> Result<()>
where
    P: FnOnce(&mut QueueRawSink) -> Result<()> + Send,
{
    let (raw_tx, raw_rx) = channel::<StreamMarker<u32>>(DEFAULT_QUEUE_CAPACITY);
    let (event_tx, event_rx) = channel::<StreamMarker<Event>>(DEFAULT_QUEUE_CAPACITY);

    let produce_result = thread::scope(|scope| {
        let producer = scope.spawn(move || {
            let mut raw_sink = QueueRawSink::new(raw_tx);
            produce(&mut raw_sink)
            // `raw_sink` (and its `Sender`) drops here, shutting down `raw_q`.
        });

        let decoder_handle = scope.spawn(move || {
            decoder::run(&raw_rx, &event_tx, version, resolution_ps);
            // `event_tx` drops here, shutting down `event_q`.
        });

        loop {
            match event_rx.recv() {
                Received::Item(StreamMarker::Start { .. }) => {}
                Received::Item(StreamMarker::Batch(events)) => {
                    for event in events {
                        sink.write_event(event)?;
                    }
                }
                Received::Item(StreamMarker::End) => {
                    sink.flush()?;
                }
                Received::Shutdown => break,
            }
        }

        decoder_handle.join().expect("decoder task panicked");
        producer.join().expect("producer thread panicked")
    });

    sink.flush()?;
    produce_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{read_chunked_file, ChunkedFileSink};
    use tdc_core::model::{DeviceConfig, Edge, InputChannelConfig};
    use tempfile::tempdir;

    fn config() -> DeviceConfig {
        DeviceConfig {
            sync_divider: 1,
            sync_edge_level_mv: -50,
            sync_edge: Edge::Falling,
            sync_channel_offset_ps: 0,
            sync_enable: true,
            inputs: vec![InputChannelConfig {
                edge_level_mv: -50,
                edge: Edge::Falling,
                channel_offset_ps: 0,
                enable: true,
            }],
        }
    }

    #[test]
    fn end_to_end_pipeline_decodes_and_writes_events_in_order() {
        let dir = tempdir().unwrap();
        let mut sink = ChunkedFileSink::new(dir.path(), "m");

        run(
            |raw_sink| {
                raw_sink.publish(StreamMarker::Start { config: config(), duration_ms: 100 })?;
                raw_sink.publish(StreamMarker::Batch(vec![0x80000001, 0x00000002]))?;
                raw_sink.publish(StreamMarker::Batch(vec![0xFE000000, 0x00000001]))?;
                raw_sink.publish(StreamMarker::End)?;
                Ok(())
            },
            tdc_core::units::ProtocolVersion::V2,
            5,
            &mut sink,
        )
        .unwrap();

        let events = read_chunked_file(dir.path().join("m_0000.tdcbin")).unwrap();
        assert_eq!(
            events,
            vec![Event::new(0, 5), Event::new(1, 10), Event::new(1, 167_772_165)]
        );
        // Non-decreasing timestamps end-to-end.
        assert!(events.windows(2).all(|pair| pair[0].timestamp_ps <= pair[1].timestamp_ps));
    }

    #[test]
    fn producer_error_still_flushes_the_sink() {
        let dir = tempdir().unwrap();
        let mut sink = ChunkedFileSink::new(dir.path(), "m");

        let result = run(
            |raw_sink| {
                raw_sink.publish(StreamMarker::Start { config: config(), duration_ms: 100 })?;
                raw_sink.publish(StreamMarker::Batch(vec![0x00000001]))?;
                Err(tdc_core::TdcError::FifoOverrun)
            },
            tdc_core::units::ProtocolVersion::V2,
            5,
            &mut sink,
        );

        assert!(result.is_err());
    }
}
