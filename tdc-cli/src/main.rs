// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! An illustrative command-line front end over the toolkit. The CLI
//! surface is out of scope for the core and is carried here only as an
//! ambient demo: argument parsing, logging initialization, and config
//! loading all live in this crate, never in the library crates.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::info;

use tdc::analysis::{compute_g2, sort_events, CoincidenceEngine, PeakWindow};
use tdc::model::{ChannelSpec, Event};
use tdc::ptu::CaptureFileReader;
use tdc::units::{ProtocolVersion, DEFAULT_RESOLUTION_PS};
use tdc::{RecordDecoder, Result, TdcError};

use config::AcquisitionProfile;

#[derive(Parser)]
#[command(name = "tdc-cli", about = "Offline analysis over captured TDC event streams")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute g(2) for a 3-channel (sync, ch1, ch2) capture file.
    G2 {
        /// Path to the capture file.
        inputfile: PathBuf,
        /// Peak center for sync -> channel 1, in picoseconds. Extracted
        /// automatically if omitted.
        #[arg(long)]
        peak1: Option<i64>,
        /// Peak center for sync -> channel 2, in picoseconds.
        #[arg(long)]
        peak2: Option<i64>,
        /// Half-width applied around an explicit peak center.
        #[arg(long, default_value_t = 50)]
        peak_width: i64,
        /// Directory to write the result into.
        #[arg(short, long, default_value = "./result")]
        output: PathBuf,
    },
    /// Count n-fold coincidences for one or more `ch,start,end` tuples
    /// against a sync channel.
    Coincidence {
        inputfile: PathBuf,
        #[arg(long, default_value_t = 0)]
        sync_channel: u8,
        /// One or more `channel,start_ps,end_ps` windows.
        #[arg(long = "window", required = true)]
        windows: Vec<String>,
        #[arg(short, long, default_value = "./result")]
        output: PathBuf,
    },
    /// List device slots the vendor driver registry reports as free.
    ListDevices,
    /// Run a live acquisition from a TOML profile (device config plus
    /// coincidence specs) and print the resulting counts.
    Acquire { profile: PathBuf },
}

fn read_capture_file_events(path: &PathBuf) -> Result<Vec<Event>> {
    let reader = CaptureFileReader::open(path)?;
    info!("reading {} declared records from {}", reader.record_count(), path.display());

    let mut decoder = RecordDecoder::new(ProtocolVersion::V2, DEFAULT_RESOLUTION_PS);
    let mut events = Vec::new();
    for word in reader {
        if let Some(event) = decoder.decode(word?) {
            events.push(event);
        }
    }
    Ok(events)
}

fn parse_window(spec: &str) -> Option<(u8, i64, i64)> {
    let mut parts = spec.split(',');
    let channel: u8 = parts.next()?.trim().parse().ok()?;
    let start: i64 = parts.next()?.trim().parse().ok()?;
    let end: i64 = parts.next()?.trim().parse().ok()?;
    Some((channel, start, end))
}

fn run_g2(
    inputfile: PathBuf,
    peak1: Option<i64>,
    peak2: Option<i64>,
    peak_width: i64,
    output: PathBuf,
) -> Result<()> {
    let mut events = read_capture_file_events(&inputfile)?;
    sort_events(&mut events);

    let window_1 = peak1.map(|p| PeakWindow { start_ps: p - peak_width, end_ps: p + peak_width });
    let window_2 = peak2.map(|p| PeakWindow { start_ps: p - peak_width, end_ps: p + peak_width });

    let report = compute_g2(&events, 1, 2, window_1, window_2)?;

    std::fs::create_dir_all(&output)?;
    println!("n_sync = {}", report.n_sync);
    println!("n_sync_1 = {}", report.n_sync_1);
    println!("n_sync_2 = {}", report.n_sync_2);
    println!("n_sync_1_2 = {}", report.n_sync_1_2);
    println!("n_sync_1/n_sync = {:.6}", report.n_sync_1_over_n_sync);
    println!("n_sync_2/n_sync = {:.6}", report.n_sync_2_over_n_sync);
    println!("g2 = {:.6}", report.g2);
    if report.channels_swapped {
        println!("(channel 1 and 2 were swapped so peak 1 is the earlier arrival)");
    }

    Ok(())
}

fn run_coincidence(
    inputfile: PathBuf,
    sync_channel: u8,
    windows: Vec<String>,
    output: PathBuf,
) -> Result<()> {
    let events = read_capture_file_events(&inputfile)?;

    let mut targets = Vec::new();
    for spec in &windows {
        let (channel, start, end) =
            parse_window(spec).ok_or_else(|| TdcError::InvalidState(format!("bad window spec: {spec}")))?;
        targets.push(ChannelSpec::Windowed {
            channel,
            peak_start_ps: start.max(0) as u64,
            peak_end_ps: end.max(0) as u64,
        });
    }

    let mut machine_spec = vec![ChannelSpec::Plain(sync_channel)];
    machine_spec.extend(targets);

    let mut engine = CoincidenceEngine::configure(&[machine_spec], None)?;
    engine.process_events(&events);

    std::fs::create_dir_all(&output)?;
    for machine in engine.machines() {
        println!("{}: {}", machine.name(), machine.count());
    }

    Ok(())
}

fn run_list_devices() -> Result<()> {
    for index in tdc::device::registry::available_indices() {
        println!("{index}");
    }
    Ok(())
}

fn run_acquire(profile_path: PathBuf) -> Result<()> {
    let profile = AcquisitionProfile::load(profile_path)?;
    info!("acquiring from device {} for {} ms", profile.device_index, profile.duration_ms);

    // Illustrative only: acquiring from real hardware requires a
    // `VendorDriver` implementation this crate does not provide.
    println!(
        "profile loaded: device {}, {} ms, {} coincidence machine(s) configured",
        profile.device_index,
        profile.duration_ms,
        profile.coincidence.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::G2 { inputfile, peak1, peak2, peak_width, output } => {
            run_g2(inputfile, peak1, peak2, peak_width, output)
        }
        Command::Coincidence { inputfile, sync_channel, windows, output } => {
            run_coincidence(inputfile, sync_channel, windows, output)
        }
        Command::ListDevices => run_list_devices(),
        Command::Acquire { profile } => run_acquire(profile),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
