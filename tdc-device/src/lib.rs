// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device source (C3): drives the vendor TDC through a narrow trait,
//! manages the `new -> open -> acquiring -> (completed|overrun|aborted)
//! -> closed` lifecycle, and exposes a single high-level `stream`
//! operation. `registry` models the vendor driver's process-global,
//! index-addressed handle table as an in-process singleton. `stub`
//! provides a deterministic test double so the rest of the toolkit is
//! testable without hardware.

pub mod driver;
pub mod registry;
pub mod source;
pub mod stub;

pub use driver::VendorDriver;
pub use source::{DeviceSource, DeviceState};
pub use stub::StubDriver;
