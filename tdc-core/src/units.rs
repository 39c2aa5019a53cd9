// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time units and the overflow wraparound constants.

/// Default device time resolution, in picoseconds per time-tag unit.
pub const DEFAULT_RESOLUTION_PS: u64 = 5;

/// Overflow wraparound, in time-tag units, for the V1 wire protocol.
pub const WRAP_V1: u64 = 33_552_000;

/// Overflow wraparound, in time-tag units, for the V2 wire protocol.
pub const WRAP_V2: u64 = 33_554_432;

/// Which generation of the overflow wraparound constant a capture or
/// device session uses. The value only affects how far `ofl` advances on
/// an overflow record; it has no other bearing on decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    V1,
    V2,
}

impl ProtocolVersion {
    pub fn wrap(self) -> u64 {
        match self {
            ProtocolVersion::V1 => WRAP_V1,
            ProtocolVersion::V2 => WRAP_V2,
        }
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        ProtocolVersion::V2
    }
}
