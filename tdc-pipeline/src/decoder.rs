// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The decoder task: repeatedly takes a raw batch off `raw_q`, runs each
//! word through [`RecordDecoder`], and publishes the resulting canonical
//! events on `event_q`. Markers pass through untouched; a new
//! [`RecordDecoder`] is created at every `Start` marker, since the
//! decoder (and its `ofl` accumulator) lives one-to-one with one
//! acquisition.

use log::debug;

use tdc_core::units::ProtocolVersion;
use tdc_core::{Event, RecordDecoder, StreamMarker};

use crate::queue::{Received, Receiver, Sender};

/// Runs the decode loop to completion: consumes `raw_rx` until shutdown,
/// publishing decoded markers on `event_tx`. Returns (and drops
/// `event_tx`, shutting down `event_q`) once `raw_q` shuts down.
pub fn run(
    raw_rx: &Receiver<StreamMarker<u32>>,
    event_tx: &Sender<StreamMarker<Event>>,
    version: ProtocolVersion,
    resolution_ps: u64,
) {
    let mut decoder: Option<RecordDecoder> = None;

    loop {
        match raw_rx.recv() {
            Received::Item(StreamMarker::Start { config, duration_ms }) => {
                debug!("decoder: new acquisition, resetting overflow accumulator");
                decoder = Some(RecordDecoder::new(version, resolution_ps));
                event_tx.send(StreamMarker::Start { config, duration_ms });
            }
            Received::Item(StreamMarker::Batch(words)) => {
                let active = decoder.get_or_insert_with(|| RecordDecoder::new(version, resolution_ps));
                let events: Vec<Event> = words.into_iter().filter_map(|w| active.decode(w)).collect();
                event_tx.send(StreamMarker::Batch(events));
            }
            Received::Item(StreamMarker::End) => {
                decoder = None;
                event_tx.send(StreamMarker::End);
            }
            Received::Shutdown => {
                debug!("decoder: raw queue shut down, stopping");
                return;
            }
        }
    }
}
