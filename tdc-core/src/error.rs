// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `error` module defines the common error type shared by every crate
//! in the toolkit.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// `TdcError` enumerates every error kind the core reports at an API
/// boundary. `MeasurementCompleted` is deliberately absent: normal end of
/// acquisition is not an error and is modeled internally by the device
/// source's poll loop, not surfaced through this type.
#[derive(Debug)]
pub enum TdcError {
    /// A capture file is missing its magic, contains an unrecognized tag
    /// type, or ends before its declared record count is satisfied.
    InvalidFormat(String),
    /// A device handle was reopened, configured after close, or configured
    /// with a channel count that does not match the physical device, or a
    /// coincidence machine was configured with a zero-width window on a
    /// non-base channel.
    InvalidState(String),
    /// The device's on-board FIFO filled before software drained it.
    FifoOverrun,
    /// g² or peak extraction was requested over a dataset with an empty
    /// window (zero singles on one side of the ratio).
    InsufficientData(String),
    /// A coincidence spec named a channel the pipeline never produces.
    UnknownChannel(u8),
    /// An I/O error while reading a capture file or writing a sink chunk.
    Io(io::Error),
}

impl fmt::Display for TdcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TdcError::InvalidFormat(msg) => write!(f, "invalid format: {msg}"),
            TdcError::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            TdcError::FifoOverrun => write!(f, "device FIFO overrun"),
            TdcError::InsufficientData(msg) => write!(f, "insufficient data: {msg}"),
            TdcError::UnknownChannel(ch) => write!(f, "unknown channel: {ch}"),
            TdcError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl StdError for TdcError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TdcError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TdcError {
    fn from(err: io::Error) -> Self {
        TdcError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, TdcError>;

/// Convenience function to create an invalid-format error.
pub fn invalid_format_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(TdcError::InvalidFormat(msg.into()))
}

/// Convenience function to create an invalid-state error.
pub fn invalid_state_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(TdcError::InvalidState(msg.into()))
}

/// Convenience function to create a FIFO-overrun error.
pub fn fifo_overrun_error<T>() -> Result<T> {
    Err(TdcError::FifoOverrun)
}

/// Convenience function to create an insufficient-data error.
pub fn insufficient_data_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(TdcError::InsufficientData(msg.into()))
}

/// Convenience function to create an unknown-channel error.
pub fn unknown_channel_error<T>(channel: u8) -> Result<T> {
    Err(TdcError::UnknownChannel(channel))
}
