// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The coincidence engine: one or more n-fold coincidence state
//! machines running concurrently over a single pass of arrival-ordered
//! events, plus per-channel singles counters.
//!
//! A base channel event always restarts a machine's tuple; a matching
//! in-window target event advances a single progress index. Channel
//! lists are validated eagerly at configuration time rather than at
//! first use.

use std::collections::HashMap;

use log::warn;

use tdc_core::error::{invalid_state_error, unknown_channel_error};
use tdc_core::{ChannelSpec, Event, Result};

/// One normalized entry of a machine's channel list: a channel id and its
/// half-open delay window `(start, end)`. The base entry's window is
/// never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChannelWindow {
    channel: u8,
    start_ps: u64,
    end_ps: u64,
}

impl ChannelWindow {
    /// `true` if `delay` falls strictly inside `(start_ps, end_ps)`.
    /// Boundary values do not count.
    fn contains(&self, delay_ps: u64) -> bool {
        delay_ps > self.start_ps && delay_ps < self.end_ps
    }
}

/// A single n-fold coincidence state machine.
/// `channels[0]` is the base; `channels[1..]` are the targets in order.
pub struct CoincidenceMachine {
    name: String,
    channels: Vec<ChannelWindow>,
    i: usize,
    t0: u64,
    count: u64,
}

impl CoincidenceMachine {
    /// Builds a machine from a caller-supplied `ChannelSpec` list,
    /// lifting `Plain` entries to a zero-width window and validating that
    /// no non-base entry keeps a zero-width window.
    pub fn new(specs: &[ChannelSpec]) -> Result<Self> {
        if specs.len() < 2 {
            return invalid_state_error(format!(
                "a coincidence machine needs at least 2 channels, got {}",
                specs.len()
            ));
        }

        let mut channels = Vec::with_capacity(specs.len());
        for (idx, spec) in specs.iter().enumerate() {
            let (start_ps, end_ps) = spec.window();
            if idx > 0 && start_ps == end_ps {
                return invalid_state_error(format!(
                    "non-base channel {} was configured with a zero-width window",
                    spec.channel()
                ));
            }
            channels.push(ChannelWindow { channel: spec.channel(), start_ps, end_ps });
        }

        let name = format!("{:?}", channels.iter().map(|c| c.channel).collect::<Vec<_>>());

        Ok(CoincidenceMachine { name, channels, i: 0, t0: 0, count: 0 })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    fn base_channel(&self) -> u8 {
        self.channels[0].channel
    }

    /// Dispatches one event to this machine.
    fn process(&mut self, channel: u8, timestamp_ps: u64) {
        if channel == self.base_channel() {
            self.t0 = timestamp_ps;
            self.i = 1;
            return;
        }

        if self.i >= 1 && self.i < self.channels.len() {
            let target = self.channels[self.i];
            if channel == target.channel {
                let delay = timestamp_ps - self.t0;
                if target.contains(delay) {
                    self.i += 1;
                }
            }
        }

        if self.i == self.channels.len() {
            self.count += 1;
            self.i = 0;
        }
    }
}

/// Runs a single pass of arrival-ordered events through every configured
/// [`CoincidenceMachine`] and a per-channel singles counter.
pub struct CoincidenceEngine {
    machines: Vec<CoincidenceMachine>,
    singles: HashMap<u8, u64>,
}

impl CoincidenceEngine {
    /// Builds the engine from a list of n-tuple channel specs. Fails with
    /// `UnknownChannel` if `known_channels` is given and a spec names a
    /// channel outside it, reported at configuration time rather than
    /// left to fail silently at first use.
    pub fn configure(specs: &[Vec<ChannelSpec>], known_channels: Option<&[u8]>) -> Result<Self> {
        let mut machines = Vec::with_capacity(specs.len());
        let mut singles = HashMap::new();

        for machine_specs in specs {
            if let Some(known) = known_channels {
                for spec in machine_specs {
                    if !known.contains(&spec.channel()) {
                        return unknown_channel_error(spec.channel());
                    }
                }
            }

            let machine = CoincidenceMachine::new(machine_specs)?;
            for window in machine_specs.iter().map(|s| s.channel()) {
                singles.entry(window).or_insert(0);
            }
            machines.push(machine);
        }

        Ok(CoincidenceEngine { machines, singles })
    }

    /// Feeds one event to every configured machine, and to the singles
    /// counter if its channel is referenced by any machine. A channel
    /// unknown to the engine is ignored entirely.
    pub fn process(&mut self, channel: u8, timestamp_ps: u64) {
        if let Some(count) = self.singles.get_mut(&channel) {
            *count += 1;
        } else {
            return;
        }

        for machine in &mut self.machines {
            machine.process(channel, timestamp_ps);
        }
    }

    /// Convenience: process a whole arrival-ordered slice of events.
    pub fn process_events(&mut self, events: &[Event]) {
        for event in events {
            self.process(event.channel, event.timestamp_ps);
        }
    }

    pub fn singles(&self, channel: u8) -> u64 {
        *self.singles.get(&channel).unwrap_or(&0)
    }

    /// The machine's count, looked up by its base-then-targets channel
    /// list (e.g. `&[0, 1, 2]`), or `None` if no configured machine has
    /// that exact shape.
    pub fn count(&self, channels: &[u8]) -> Option<u64> {
        self.machines
            .iter()
            .find(|m| m.channels.iter().map(|c| c.channel).eq(channels.iter().copied()))
            .map(|m| m.count())
    }

    pub fn machines(&self) -> &[CoincidenceMachine] {
        &self.machines
    }
}

impl Drop for CoincidenceEngine {
    fn drop(&mut self) {
        for machine in &self.machines {
            if self.singles.get(&machine.base_channel()).copied().unwrap_or(0) < machine.count() {
                // Sum of singles on the base channel must never be
                // smaller than the machine's count; this would indicate
                // a dispatch bug, not a normal configuration.
                warn!(
                    "machine {} counted more coincidences than base-channel singles",
                    machine.name()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdc_core::ChannelSpec::{Plain, Windowed};

    fn windowed(channel: u8, start: u64, end: u64) -> ChannelSpec {
        Windowed { channel, peak_start_ps: start, peak_end_ps: end }
    }

    // Events [(0,100),(1,115),(2,135),(0,240),(0,300)] against machine
    // [(0),(1,10,20),(2,30,40)]: two in-window hits complete the tuple,
    // then two base events in a row each restart it.
    #[test]
    fn coincidence_progress_completes_then_restarts_on_base_events() {
        let specs = vec![Plain(0), windowed(1, 10, 20), windowed(2, 30, 40)];
        let mut machine = CoincidenceMachine::new(&specs).unwrap();

        machine.process(0, 100);
        machine.process(1, 115); // delay 15, in (10,20) -> advances to i=2
        machine.process(2, 135); // delay 35, in (30,40) -> completes the tuple
        machine.process(0, 240);
        machine.process(0, 300);

        assert_eq!(machine.count, 1);
        assert_eq!(machine.i, 1);
    }

    // Window strictness: both inner events land exactly on a boundary.
    #[test]
    fn boundary_delays_do_not_count_as_in_window() {
        let specs = vec![Plain(0), windowed(1, 0, 1), windowed(2, 2, 3)];
        let mut machine = CoincidenceMachine::new(&specs).unwrap();

        machine.process(0, 0);
        machine.process(1, 1); // delay 1, boundary of (0,1) -> not strictly inside
        machine.process(2, 3); // delay 3, boundary of (2,3) -> not strictly inside

        assert_eq!(machine.count, 0);
    }

    #[test]
    fn base_event_always_resets_progress() {
        let specs = vec![Plain(0), windowed(1, 0, 100)];
        let mut machine = CoincidenceMachine::new(&specs).unwrap();

        machine.process(1, 5); // no base seen yet, ignored (i stays 0, not matched as target).
        assert_eq!(machine.i, 0);

        machine.process(0, 10);
        assert_eq!(machine.i, 1);
        assert_eq!(machine.t0, 10);

        // A second base event, even mid-progress, always restarts.
        machine.process(0, 50);
        assert_eq!(machine.i, 1);
        assert_eq!(machine.t0, 50);
    }

    #[test]
    fn non_matching_target_channel_leaves_progress_unchanged() {
        let specs = vec![Plain(0), windowed(1, 0, 100), windowed(2, 0, 100)];
        let mut machine = CoincidenceMachine::new(&specs).unwrap();

        machine.process(0, 0);
        assert_eq!(machine.i, 1);
        // event on channel 2 while expecting channel 1: ignored, i unchanged.
        machine.process(2, 10);
        assert_eq!(machine.i, 1);
        machine.process(1, 20);
        assert_eq!(machine.i, 2);
    }

    #[test]
    fn zero_width_window_on_a_non_base_channel_is_rejected() {
        let specs = vec![Plain(0), Plain(1)];
        assert!(CoincidenceMachine::new(&specs).is_err());
    }

    #[test]
    fn fewer_than_two_channels_is_rejected() {
        assert!(CoincidenceMachine::new(&[Plain(0)]).is_err());
    }

    // Singles on the base channel bound the machine count.
    #[test]
    fn singles_bound_the_machine_count() {
        let mut engine = CoincidenceEngine::configure(
            &[vec![Plain(0), windowed(1, 0, 100)]],
            None,
        )
        .unwrap();

        engine.process(0, 0);
        engine.process(1, 10);
        engine.process(0, 1000);
        engine.process(1, 1010);

        assert_eq!(engine.singles(0), 2);
        assert_eq!(engine.count(&[0, 1]), Some(2));
        assert!(engine.singles(0) >= engine.count(&[0, 1]).unwrap());
    }

    // A machine's count is invariant under events on channels it does
    // not reference.
    #[test]
    fn unreferenced_channels_do_not_affect_the_count() {
        let mut engine = CoincidenceEngine::configure(
            &[vec![Plain(0), windowed(1, 0, 100)]],
            None,
        )
        .unwrap();

        engine.process(0, 0);
        engine.process(1, 10);
        assert_eq!(engine.count(&[0, 1]), Some(1));

        engine.process(9, 20);
        engine.process(9, 9999);
        assert_eq!(engine.count(&[0, 1]), Some(1));
        assert_eq!(engine.singles(9), 0);
    }

    #[test]
    fn unknown_channel_is_rejected_at_configuration_time() {
        let result = CoincidenceEngine::configure(
            &[vec![Plain(0), windowed(5, 0, 100)]],
            Some(&[0, 1, 2]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn parallel_machines_are_independent() {
        let mut engine = CoincidenceEngine::configure(
            &[
                vec![Plain(0), windowed(1, 0, 100)],
                vec![Plain(0), windowed(2, 0, 100)],
            ],
            None,
        )
        .unwrap();

        engine.process(0, 0);
        engine.process(1, 10);
        engine.process(0, 1000);
        engine.process(2, 1010);

        assert_eq!(engine.count(&[0, 1]), Some(1));
        assert_eq!(engine.count(&[0, 2]), Some(1));
    }
}
