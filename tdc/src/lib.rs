// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! # TDC event-stream toolkit
//!
//! A toolkit for turning the binary event stream of a multi-channel
//! time-to-digital converter into cross-channel delay histograms and
//! n-fold coincidence counts, including g².
//!
//! This crate aggregates the individually-published pieces behind
//! feature flags, one crate per concern, re-exported here:
//!
//! | Crate | Feature | Default | Responsibility |
//! |---|---|---|---|
//! | [`tdc_core`] | always on | yes | record codec, data model, errors |
//! | [`tdc_format_ptu`] | `ptu` | yes | capture-file reader |
//! | [`tdc_device`] | `device` | yes | vendor device source + test double |
//! | [`tdc_pipeline`] | `pipeline` | yes | bounded queues, decoder task, sink |
//! | [`tdc_analysis`] | `analysis` | yes | coincidence engine, histogrammer, g² |
//!
//! # Usage
//!
//! 1. Build a [`tdc_core::DeviceConfig`] (or read one from a capture
//!    file's header via [`tdc_format_ptu::CaptureFileReader`]).
//! 2. Drive a [`tdc_device::DeviceSource`] (or a capture file's raw word
//!    stream) through [`tdc_pipeline::run`], writing decoded events to a
//!    [`tdc_pipeline::ChunkedFileSink`].
//! 3. Feed the decoded events to a [`tdc_analysis::CoincidenceEngine`]
//!    or [`tdc_analysis::DelayHistogram`], or call
//!    [`tdc_analysis::compute_g2`] directly for the canonical
//!    three-channel case.

pub use tdc_core::*;

#[cfg(feature = "ptu")]
pub use tdc_format_ptu as ptu;

#[cfg(feature = "device")]
pub use tdc_device as device;

#[cfg(feature = "pipeline")]
pub use tdc_pipeline as pipeline;

#[cfg(feature = "analysis")]
pub use tdc_analysis as analysis;
