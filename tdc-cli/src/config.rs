// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loads an acquisition profile (device configuration plus coincidence
//! specs) from a TOML file. `DeviceConfig` and `ChannelSpec` are the same
//! types the engine uses at run time; there is no parallel DTO layer to
//! keep in sync.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use tdc::error::invalid_format_error;
use tdc::{ChannelSpec, DeviceConfig, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionProfile {
    pub device_index: usize,
    pub duration_ms: u64,
    pub device: DeviceConfig,
    #[serde(default)]
    pub coincidence: Vec<Vec<ChannelSpec>>,
}

impl AcquisitionProfile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        match toml::from_str(&text) {
            Ok(profile) => Ok(profile),
            Err(err) => invalid_format_error(format!("invalid acquisition profile: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_profile() {
        let toml = r#"
            device_index = 0
            duration_ms = 10000

            [device]
            sync_divider = 1
            sync_edge_level_mv = -50
            sync_edge = "Falling"
            sync_channel_offset_ps = 0
            sync_enable = true
            inputs = []

            coincidence = [[0, { channel = 1, peak_start_ps = 10, peak_end_ps = 20 }]]
        "#;

        let profile: AcquisitionProfile = toml::from_str(toml).unwrap();
        assert_eq!(profile.device_index, 0);
        assert_eq!(profile.coincidence.len(), 1);
    }
}
