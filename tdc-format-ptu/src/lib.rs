// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capture-file reader (C2): parses a PicoQuant-style tagged-header TTTR
//! file header far enough to extract the declared record count, then
//! streams the remaining file as little-endian 32-bit raw records for C1.
//!
//! The header itself is otherwise opaque to this crate: per the system's
//! scope, key/value decoding is specified only enough to find
//! `TTResult_NumberOfRecords` and to skip every other entry correctly.

mod reader;
mod tag;

pub use reader::CaptureFileReader;
pub use tag::TagType;
