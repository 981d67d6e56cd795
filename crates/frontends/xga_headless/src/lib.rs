/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    xga_headless::lib.rs

    A headless frontend for the marty_xga core. Attaches a card, programs a
    display mode, runs the raster clock for a number of frames and reports
    each frame hand-off.

*/

use std::{cell::RefCell, path::Path, rc::Rc, time::Instant};

use marty_xga::{
    bus::DeviceRunTimeUnit,
    devices::xga::{load_rom, XGA_ROM_SIZE},
    tracelogger::TraceLogger,
    videocard::{FrameSink, VideoCard},
    XgaCard,
};

pub mod config;
pub mod mode;

use config::{get_config, ConfigFileParams, DEFAULT_CONFIG_FILE};
use mode::{draw_test_pattern, enable_card, program_mode};

/// Run slice length when advancing the card.
const RUN_SLICE_US: f64 = 1000.0;
/// Give up if this much emulated time passes without a frame.
const MAX_US_PER_FRAME: f64 = 1_000_000.0;

#[derive(Clone, Debug, Default)]
pub struct FrameStats {
    pub frames: u64,
    pub last_size: (u32, u32),
    /// Non-black pixels in the visible region of the last frame.
    pub lit_pixels: usize,
}

/// Collects statistics for each frame the card hands off.
struct StatsSink {
    stats: Rc<RefCell<FrameStats>>,
}

impl FrameSink for StatsSink {
    fn blit(&mut self, width: u32, height: u32, frame: &[u32], stride: usize) {
        let mut stats = self.stats.borrow_mut();
        stats.frames += 1;
        stats.last_size = (width, height);
        stats.lit_pixels = frame
            .chunks(stride)
            .skip(marty_xga::devices::xga::XGA_Y_ADD as usize)
            .take(height as usize)
            .map(|row| {
                let start = marty_xga::devices::xga::XGA_X_ADD as usize;
                row[start..(start + width as usize).min(row.len())]
                    .iter()
                    .filter(|&&p| p & 0x00FF_FFFF != 0)
                    .count()
            })
            .sum();
        log::trace!("Frame {}: {}x{}", stats.frames, width, height);
    }
}

#[derive(Clone, Debug)]
pub struct HeadlessReport {
    pub stats: FrameStats,
    pub refresh_rate: u32,
    pub emulated_us: f64,
    pub elapsed_ms: u128,
}

/// Attach a card according to the configuration and run it for the configured number of frames.
pub fn run_headless(config: &ConfigFileParams) -> Result<HeadlessReport, anyhow::Error> {
    let rom = match config.xga.rom_path.as_ref() {
        Some(path) => load_rom(path)?,
        None => {
            log::warn!("No ROM image configured, attaching with an empty ROM.");
            vec![0xFF; XGA_ROM_SIZE]
        }
    };

    let mut card = XgaCard::attach(&config.xga, &rom, TraceLogger::None)?;
    let stats = Rc::new(RefCell::new(FrameStats::default()));
    card.set_frame_sink(Box::new(StatsSink { stats: stats.clone() }));

    enable_card(&mut card, &config.xga);
    let mode = config.headless.mode.desc();
    program_mode(&mut card, &mode);
    if config.headless.test_pattern {
        draw_test_pattern(&mut card, &mode)?;
    }

    let start = Instant::now();
    let emulated_us = run_frames(&mut card, config.headless.frames as u64)?;
    let elapsed_ms = start.elapsed().as_millis();

    if let Some(dump_dir) = config.headless.dump_dir.as_ref() {
        card.dump_mem(dump_dir);
    }
    card.trace_flush();

    let stats = stats.borrow().clone();
    Ok(HeadlessReport {
        stats,
        refresh_rate: card.get_refresh_rate(),
        emulated_us,
        elapsed_ms,
    })
}

/// Advance the card until it has handed off `frames` more frames. Returns the emulated time.
pub fn run_frames(card: &mut XgaCard, frames: u64) -> Result<f64, anyhow::Error> {
    let target = card.get_frame_count() + frames;
    let mut emulated_us = 0.0;
    let mut since_frame = 0.0;
    let mut last_count = card.get_frame_count();

    while card.get_frame_count() < target {
        card.run(DeviceRunTimeUnit::Microseconds(RUN_SLICE_US));
        emulated_us += RUN_SLICE_US;
        since_frame += RUN_SLICE_US;

        if card.get_frame_count() != last_count {
            last_count = card.get_frame_count();
            since_frame = 0.0;
        }
        else if since_frame > MAX_US_PER_FRAME {
            anyhow::bail!("No frame produced after {}us; is the display enabled?", since_frame);
        }
    }
    Ok(emulated_us)
}

pub fn run() {
    env_logger::init();

    let config = match get_config(DEFAULT_CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to read configuration: {}", e);
            std::process::exit(1);
        }
    };

    match run_headless(&config) {
        Ok(report) => {
            println!(
                "{} {}: {} frames of {}x{} at {}Hz, {:.1}ms emulated in {}ms, {} lit pixels",
                config.xga.xga_type,
                config.headless.mode,
                report.stats.frames,
                report.stats.last_size.0,
                report.stats.last_size.1,
                report.refresh_rate,
                report.emulated_us / 1000.0,
                report.elapsed_ms,
                report.stats.lit_pixels
            );
            if let Some(dump_dir) = config.headless.dump_dir.as_ref() {
                println!("Memory dump written to {}", Path::new(dump_dir).join("xga_mem.bin").display());
            }
        }
        Err(e) => {
            log::error!("Headless run failed: {}", e);
            eprintln!("Headless run failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ModeSelect;

    fn params(mode: ModeSelect, frames: u32) -> ConfigFileParams {
        let mut params = ConfigFileParams::default();
        params.headless.mode = mode;
        params.headless.frames = frames;
        params
    }

    #[test]
    fn runs_vga_mode_frames() {
        let report = run_headless(&params(ModeSelect::Vga640x480x8, 2)).unwrap();
        assert_eq!(report.stats.frames, 2);
        assert_eq!(report.stats.last_size, (640, 479));
        assert_eq!(report.refresh_rate, 60);
        // Bar 0 is black; the other seven bars are lit.
        assert_eq!(report.stats.lit_pixels, 560 * 479);
    }

    #[test]
    fn runs_direct_color_frames() {
        let report = run_headless(&params(ModeSelect::Vga640x480x16, 2)).unwrap();
        assert_eq!(report.stats.last_size, (640, 479));
        assert!(report.stats.lit_pixels > 0);
    }

    #[test]
    fn missing_rom_fails() {
        let mut config = params(ModeSelect::Vga640x480x8, 1);
        config.xga.rom_path = Some("/nonexistent/XGA.BIN".into());
        assert!(run_headless(&config).is_err());
    }
}
