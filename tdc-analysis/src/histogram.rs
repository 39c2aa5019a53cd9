// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The delay histogrammer: accumulates, for a base channel and one
//! or more target channels, the distribution of arrival-time
//! differences between adjacent `(base, target)` pairs, and extracts a
//! dominant-bin peak window for auto-windowing.
//!
//! Slides a one-event lag over an arrival-ordered slice and bins the
//! qualifying differences, without a dataframe engine.

use tdc_core::Event;

/// Default histogram bounds and resolution.
pub const DEFAULT_MIN_DELAY_PS: u64 = 0;
pub const DEFAULT_MAX_DELAY_PS: u64 = 1_500;
pub const DEFAULT_BIN_COUNT: usize = 1_000;

/// Default half-width used when extracting a peak window.
pub const DEFAULT_PEAK_HALF_WIDTH_PS: u64 = 50;

/// A linear-binned histogram of `base -> target` arrival-time
/// differences over `[min_delay_ps, max_delay_ps)`.
pub struct DelayHistogram {
    base: u8,
    target: u8,
    min_delay_ps: u64,
    max_delay_ps: u64,
    bins: Vec<u64>,
}

impl DelayHistogram {
    pub fn new(base: u8, target: u8, min_delay_ps: u64, max_delay_ps: u64, bin_count: usize) -> Self {
        DelayHistogram { base, target, min_delay_ps, max_delay_ps, bins: vec![0; bin_count.max(1)] }
    }

    fn bin_width(&self) -> f64 {
        (self.max_delay_ps - self.min_delay_ps) as f64 / self.bins.len() as f64
    }

    /// Indexes the bin `delay_ps` falls into, or `None` if it is outside
    /// `[min_delay_ps, max_delay_ps)`.
    fn bin_index(&self, delay_ps: u64) -> Option<usize> {
        if delay_ps < self.min_delay_ps || delay_ps >= self.max_delay_ps {
            return None;
        }
        let width = self.bin_width();
        let idx = ((delay_ps - self.min_delay_ps) as f64 / width).floor() as usize;
        Some(idx.min(self.bins.len() - 1))
    }

    /// Feeds one arrival-ordered slice of events: for every adjacent pair
    /// `(e, e_next)` with `e.channel == base` and `e_next.channel ==
    /// target`, bins `delta = e_next.timestamp_ps - e.timestamp_ps` when
    /// it falls strictly inside `(min_delay_ps, max_delay_ps)`.
    pub fn accumulate(&mut self, events: &[Event]) {
        for pair in events.windows(2) {
            let (e, e_next) = (pair[0], pair[1]);
            if e.channel != self.base || e_next.channel != self.target {
                continue;
            }
            if e_next.timestamp_ps < e.timestamp_ps {
                continue;
            }
            let delta = e_next.timestamp_ps - e.timestamp_ps;
            if delta <= self.min_delay_ps || delta >= self.max_delay_ps {
                continue;
            }
            if let Some(idx) = self.bin_index(delta) {
                self.bins[idx] += 1;
            }
        }
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// The bin with the highest count, ties broken by lowest bin index.
    /// `None` if every bin is empty.
    pub fn argmax_bin(&self) -> Option<usize> {
        self.bins
            .iter()
            .enumerate()
            .max_by(|(a_idx, a_count), (b_idx, b_count)| {
                a_count.cmp(b_count).then(b_idx.cmp(a_idx))
            })
            .filter(|(_, count)| **count > 0)
            .map(|(idx, _)| idx)
    }

    /// The `[start, end)` picosecond bounds of bin `idx`.
    pub fn bin_bounds(&self, idx: usize) -> (f64, f64) {
        let width = self.bin_width();
        let start = self.min_delay_ps as f64 + idx as f64 * width;
        (start, start + width)
    }
}

/// Computes the dominant-bin peak window `[center - half_width, center +
/// half_width]` for the `(from, to)` channel pair over `events`, using
/// the dataset's own observed min/max delay as the histogram's bounds.
/// Returns `None` if no qualifying pair exists.
pub fn extract_peak(
    events: &[Event],
    from: u8,
    to: u8,
    half_width_ps: u64,
    bin_count: usize,
) -> Option<(i64, i64)> {
    let mut deltas = Vec::new();
    for pair in events.windows(2) {
        let (e, e_next) = (pair[0], pair[1]);
        if e.channel == from && e_next.channel == to && e_next.timestamp_ps >= e.timestamp_ps {
            deltas.push(e_next.timestamp_ps - e.timestamp_ps);
        }
    }

    let min_delay = *deltas.iter().min()?;
    let max_delay = *deltas.iter().max()?;
    if min_delay == max_delay {
        let center = min_delay as i64;
        return Some((center - half_width_ps as i64, center + half_width_ps as i64));
    }

    let mut histogram = DelayHistogram::new(from, to, min_delay, max_delay + 1, bin_count);
    // Re-run accumulation with the dataset-derived bounds rather than the
    // default fixed window.
    for &delta in &deltas {
        if delta > histogram.min_delay_ps && delta < histogram.max_delay_ps {
            if let Some(idx) = histogram.bin_index(delta) {
                histogram.bins[idx] += 1;
            }
        }
    }

    let peak_idx = histogram.argmax_bin()?;
    let (start, end) = histogram.bin_bounds(peak_idx);
    let center = ((start + end) / 2.0).round() as i64;
    Some((center - half_width_ps as i64, center + half_width_ps as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_only_matching_adjacent_base_target_pairs() {
        let events = vec![
            Event::new(0, 100),
            Event::new(1, 150), // delta 50, base(0) -> target(1)
            Event::new(2, 200), // base(1) -> target(2): does not match base channel
            Event::new(0, 300),
            Event::new(1, 340), // delta 40
        ];

        let mut hist = DelayHistogram::new(0, 1, 0, 1_500, 1_000);
        hist.accumulate(&events);

        assert_eq!(hist.bins().iter().sum::<u64>(), 2);
    }

    #[test]
    fn deltas_outside_bounds_are_excluded() {
        let events = vec![Event::new(0, 0), Event::new(1, 2_000)];
        let mut hist = DelayHistogram::new(0, 1, 0, 1_500, 1_000);
        hist.accumulate(&events);
        assert_eq!(hist.bins().iter().sum::<u64>(), 0);
    }

    #[test]
    fn argmax_breaks_ties_by_lowest_bin_index() {
        let mut hist = DelayHistogram::new(0, 1, 0, 10, 5);
        hist.bins = vec![3, 3, 1, 0, 0];
        assert_eq!(hist.argmax_bin(), Some(0));
    }

    #[test]
    fn empty_histogram_has_no_peak() {
        let hist = DelayHistogram::new(0, 1, 0, 1_500, 1_000);
        assert_eq!(hist.argmax_bin(), None);
    }

    #[test]
    fn extract_peak_centers_the_window_on_the_dominant_delay() {
        let mut events = vec![Event::new(0, 0)];
        // Three events at delta=100, one outlier at delta=900: the peak
        // bin should land on 100.
        for i in 0..3 {
            events.push(Event::new(0, i * 1_000));
            events.push(Event::new(1, i * 1_000 + 100));
        }
        events.push(Event::new(0, 10_000));
        events.push(Event::new(1, 10_900));

        let (start, end) = extract_peak(&events, 0, 1, 50, 1_000).unwrap();
        assert!(start <= 100 && 100 <= end, "expected peak window to bracket 100, got ({start}, {end})");
    }

    #[test]
    fn extract_peak_is_none_with_no_qualifying_pairs() {
        let events = vec![Event::new(0, 0), Event::new(2, 10)];
        assert_eq!(extract_peak(&events, 0, 1, 50, 1_000), None);
    }
}
