// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coincidence engine (C5), delay histogrammer (C6), and g² driver (C7):
//! the pure, allocation-light analysis stage that consumes the decoded
//! event stream exposed by `tdc-pipeline`.

pub mod coincidence;
pub mod g2;
pub mod histogram;

pub use coincidence::{CoincidenceEngine, CoincidenceMachine};
pub use g2::{compute_g2, sort_events, G2Report, PeakWindow};
pub use histogram::{extract_peak, DelayHistogram};
