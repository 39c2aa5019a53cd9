// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The vendor driver is process-global and indexed: only one handle per
//! device index may exist at a time. This module models that as an
//! in-process singleton registry of up to [`MAX_DEVICES`] exclusive
//! slots.

use std::sync::Mutex;

use once_cell::sync::Lazy;
use tdc_core::error::invalid_state_error;
use tdc_core::Result;

/// The vendor driver supports at most this many simultaneously open
/// device handles.
pub const MAX_DEVICES: usize = 8;

static CHECKED_OUT: Lazy<Mutex<[bool; MAX_DEVICES]>> =
    Lazy::new(|| Mutex::new([false; MAX_DEVICES]));

/// An exclusive claim on device slot `index`. Dropping it returns the
/// slot to the registry, modeling `close_device`.
pub struct DeviceHandleToken {
    index: usize,
}

impl DeviceHandleToken {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Drop for DeviceHandleToken {
    fn drop(&mut self) {
        let mut checked_out = CHECKED_OUT.lock().unwrap();
        checked_out[self.index] = false;
    }
}

/// Claims device slot `index`. Fails with `InvalidState` if that slot is
/// already checked out, or if `index` is out of range.
pub fn checkout(index: usize) -> Result<DeviceHandleToken> {
    if index >= MAX_DEVICES {
        return invalid_state_error(format!("device index {index} out of range"));
    }

    let mut checked_out = CHECKED_OUT.lock().unwrap();
    if checked_out[index] {
        return invalid_state_error(format!("device index {index} is already open"));
    }

    checked_out[index] = true;
    Ok(DeviceHandleToken { index })
}

/// The device indices (0..[`MAX_DEVICES`]) that are not currently checked
/// out, i.e. available to `open`. Supplements the core's device
/// operations with an enumeration facility (`list_device_index`).
pub fn available_indices() -> Vec<usize> {
    let checked_out = CHECKED_OUT.lock().unwrap();
    (0..MAX_DEVICES).filter(|&i| !checked_out[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_is_exclusive_until_dropped() {
        // Use a high index to avoid colliding with other tests running
        // concurrently against the same process-global registry.
        let index = 7;
        assert!(available_indices().contains(&index));

        let token = checkout(index).unwrap();
        assert!(!available_indices().contains(&index));
        assert!(checkout(index).is_err());

        drop(token);
        assert!(available_indices().contains(&index));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert!(checkout(MAX_DEVICES).is_err());
    }
}
