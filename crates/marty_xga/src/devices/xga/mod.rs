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

    devices::xga::mod.rs

    Implementation of the IBM XGA and XGA-2 display adapters.

    The card owns its video memory, coprocessor, CRTC, palette DAC and
    hardware cursor. A host emulator drives it through the IoDevice and
    MemoryMappedDevice traits and advances the raster with VideoCard::run.
    VGA compatibility is provided by an external VgaPassthrough, which
    receives memory accesses while the extended display is off.

*/

#![allow(dead_code)]
use std::{collections::HashMap, fs, path::Path};

use crate::{
    bus::{DeviceRunTimeUnit, MemRangeDescriptor, NO_IO_BYTE, OPEN_BUS_BYTE},
    config::{XgaBus, XgaConfig, XgaType},
    error::XgaError,
    tracelogger::TraceLogger,
    videocard::*,
};

use accel::{AccelEvent, AccelState, CommandWord};
use aperture::ApertureState;
use cursor::HwCursor;
use dac::XgaDac;
use ext_regs::ExtRegisters;
use pixel_map::MapAddressing;
use pos::PosRegisters;
use vga_compat::{LegacyCrtcGuard, VgaPassthrough};
use vram::VideoMemory;

macro_rules! trace {
    ($self:ident, $($t:tt)*) => {{
        if $self.trace_logger.is_some() {
            $self.trace_logger.println(&format!($($t)*));
        }
    }};
}
pub(crate) use trace;

pub mod accel;
pub mod aperture;
pub mod crtc;
pub mod cursor;
pub mod dac;
mod draw;
pub mod ext_regs;
mod io;
mod mmio;
pub mod pixel_map;
pub mod pos;
mod render;
pub mod rop;
pub mod vga_compat;
mod videocard;
pub mod vram;

pub use crtc::{PixelClock, XgaCrtc};

pub const XGA_DEFAULT_ROM_NAME: &str = "XGA.BIN";
pub const XGA2_DEFAULT_ROM_NAME: &str = "XGA2.BIN";

pub const XGA_ROM_SIZE: usize = 0x2000;
pub const XGA_INTEGRATED_ROM_SIZE: usize = 0x8000;
pub const XGA_ROM_DEFAULT_ADDRESS: u32 = 0xC0000;

/// The register window sits at this offset within the ROM window, 0x80 bytes per instance.
pub const XGA_MEMIO_OFFSET: u32 = 0x1C00;
pub const XGA_MEMIO_SIZE: u32 = 0x80;
/// Memory window offsets at or above this address decode to coprocessor registers.
pub const XGA_MEMIO_REGISTER_BASE: u32 = 0x1800;

pub const XGA_EXT_PORT_BASE: u16 = 0x2100;
pub const XGA_EXT_PORT_COUNT: u16 = 0x10;

/// Frequency of the system timer crystal that SystemTicks are counted in.
pub const XGA_SYSTEM_CLOCK_MHZ: f64 = 14.318180;

pub const XGA_FIELD_W: u32 = 2048;
pub const XGA_FIELD_H: u32 = 1536;
/// Left and top overscan, in pixels.
pub const XGA_X_ADD: u32 = 8;
pub const XGA_Y_ADD: u32 = 8;
/// Right overscan, in pixels.
pub const XGA_OVERSCAN_RIGHT: u32 = 8;

/// Wait states charged per access, by bus and width (byte, word, dword).
#[derive(Copy, Clone, Debug)]
pub struct BusTimings {
    pub write: [u32; 3],
    pub read: [u32; 3],
}

pub const XGA_ISA_TIMINGS: BusTimings = BusTimings {
    write: [3, 3, 6],
    read: [5, 5, 10],
};
pub const XGA_MCA_TIMINGS: BusTimings = BusTimings {
    write: [4, 5, 10],
    read: [5, 5, 10],
};

pub struct XgaCard {
    xga_type: XgaType,
    bus: XgaBus,
    integrated_vga: bool,
    instance_isa: u8,
    ext_mem_addr: u8,
    dma: u8,
    system_memory_kib: usize,
    timings: BusTimings,
    rom: Vec<u8>,

    /// Extended graphics display enabled. While clear, display memory accesses go to the VGA.
    on: bool,
    accel: AccelState,
    vram: VideoMemory,
    ext: ExtRegisters,
    dac: XgaDac,
    cursor: HwCursor,
    aperture: ApertureState,
    pos: PosRegisters,
    legacy: LegacyCrtcGuard,
    crtc: XgaCrtc,
    /// Frames remaining for which every line is rendered regardless of page changes.
    fullchange: u8,
    recalc_count: u64,
    system_clock_mhz: f64,

    vga: Option<Box<dyn VgaPassthrough>>,
    frame_sink: Option<Box<dyn FrameSink>>,

    buf: [Vec<u32>; 2],
    front_buf: usize,
    back_buf: usize,
    extents: DisplayExtents,
    frame_count: u64,
    trace_logger: TraceLogger,
}

/// Load a boot ROM image from disk.
pub fn load_rom(path: &Path) -> Result<Vec<u8>, XgaError> {
    if !path.exists() {
        return Err(XgaError::RomNotFound(path.to_path_buf()));
    }
    let rom = fs::read(path).map_err(|e| XgaError::RomRead(path.to_path_buf(), e.to_string()))?;
    if rom.is_empty() {
        return Err(XgaError::RomEmpty);
    }
    Ok(rom)
}

impl XgaCard {
    /// Create a card from a validated configuration and a boot ROM image. The image is padded
    /// with 0xFF or truncated to the adapter's ROM size.
    pub fn attach(config: &XgaConfig, rom: &[u8], trace_logger: TraceLogger) -> Result<Self, XgaError> {
        config.validate()?;
        if rom.is_empty() {
            return Err(XgaError::RomEmpty);
        }

        let rom_size = if config.integrated_vga {
            XGA_INTEGRATED_ROM_SIZE
        }
        else {
            XGA_ROM_SIZE
        };
        let mut rom_image = vec![0xFF; rom_size];
        let copy_len = rom.len().min(rom_size);
        rom_image[..copy_len].copy_from_slice(&rom[..copy_len]);

        let trace_logger = match config.trace_file.as_ref() {
            Some(path) if !trace_logger.is_some() => TraceLogger::from_filename(path),
            _ => trace_logger,
        };

        let field_size = (XGA_FIELD_W * XGA_FIELD_H) as usize;
        let mut card = XgaCard {
            xga_type: config.xga_type,
            bus: config.bus,
            integrated_vga: config.integrated_vga,
            instance_isa: config.instance,
            ext_mem_addr: config.ext_mem_addr,
            dma: config.dma,
            system_memory_kib: config.system_memory_kib,
            timings: match config.bus {
                XgaBus::Mca => XGA_MCA_TIMINGS,
                XgaBus::Isa => XGA_ISA_TIMINGS,
            },
            rom: rom_image,
            on: false,
            accel: AccelState::default(),
            vram: VideoMemory::new(config.vram_size()),
            ext: ExtRegisters::default(),
            dac: XgaDac::default(),
            cursor: HwCursor::default(),
            aperture: ApertureState::default(),
            pos: PosRegisters::new(config.xga_type),
            legacy: LegacyCrtcGuard::new(),
            crtc: XgaCrtc::default(),
            fullchange: 0,
            recalc_count: 0,
            system_clock_mhz: XGA_SYSTEM_CLOCK_MHZ,
            vga: None,
            frame_sink: None,
            buf: [vec![0; field_size], vec![0; field_size]],
            front_buf: 0,
            back_buf: 1,
            extents: DisplayExtents {
                apertures: Vec::new(),
                field_w: XGA_FIELD_W,
                field_h: XGA_FIELD_H,
                row_stride: XGA_FIELD_W as usize * std::mem::size_of::<u32>(),
            },
            frame_count: 0,
            trace_logger,
        };
        card.extents.apertures = card.get_display_apertures();

        match card.bus {
            XgaBus::Mca => card.attach_mca(),
            XgaBus::Isa => card.attach_isa(),
        }

        log::debug!(
            "{} attached on {:?} bus: {} KiB VRAM, linear base {:08X}, ROM at {:05X}",
            card.xga_type,
            card.bus,
            config.vram_kib,
            card.aperture.linear_base,
            card.aperture.rom_addr
        );
        Ok(card)
    }

    /// Attach a VGA to receive display memory accesses while the extended display is off, and
    /// the legacy register ports the card does not shadow.
    pub fn set_vga_passthrough(&mut self, vga: Box<dyn VgaPassthrough>) {
        self.vga = Some(vga);
    }

    pub fn set_frame_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.frame_sink = Some(sink);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.on
    }

    #[inline]
    pub fn xga_type(&self) -> XgaType {
        self.xga_type
    }

    /// Number of CRTC timing recalculations requested since attach.
    #[inline]
    pub fn recalc_count(&self) -> u64 {
        self.recalc_count
    }

    #[inline]
    pub fn vram(&self) -> &[u8] {
        self.vram.data()
    }

    #[inline]
    pub fn page_changed(&self, page: usize) -> bool {
        self.vram.page_changed(page)
    }

    #[inline]
    pub fn crtc(&self) -> &XgaCrtc {
        &self.crtc
    }

    #[inline]
    pub fn command(&self) -> CommandWord {
        self.accel.command
    }

    #[inline]
    pub fn endian_reverse(&self) -> bool {
        self.aperture.endian_reverse
    }

    /// Render every line for the next frame count worth of frames.
    pub fn force_redraw(&mut self) {
        self.fullchange = self.vram.change_frame_count();
    }

    /// The host's system clock rate changed.
    pub fn speed_changed(&mut self, system_clock_mhz: f64) {
        if system_clock_mhz > 0.0 {
            self.system_clock_mhz = system_clock_mhz;
        }
        self.recalculate_timings();
    }

    /// Returns true once after any change to the card's memory windows.
    pub fn take_mapping_dirty(&mut self) -> bool {
        std::mem::take(&mut self.aperture.mapping_dirty)
    }

    /// Current memory windows.
    pub fn mapping(&self) -> Vec<MemRangeDescriptor> {
        self.aperture.mapping_list()
    }

    /// Host address of the coprocessor register window, if mapped.
    pub fn register_window(&self) -> Option<usize> {
        self.aperture.memio_window.map(|window| window.address as usize)
    }

    /// Host address that pixel map base addresses are relative to.
    #[inline]
    pub fn pixel_map_origin(&self) -> u32 {
        self.aperture.map_window_base()
    }

    /// Enable or disable the extended display, telling the VGA to stand down or resume.
    fn set_on(&mut self, on: bool) {
        if self.on != on {
            log::debug!("XGA extended display {}", if on { "enabled" } else { "disabled" });
        }
        self.on = on;
        if let Some(vga) = self.vga.as_mut() {
            vga.set_enabled(!on);
        }
    }

    /// Card-level reset: both memory windows unmapped, display off, byte order cleared.
    fn reset_card(&mut self) {
        self.aperture.rom_window = None;
        self.aperture.memio_window = None;
        self.aperture.mapping_dirty = true;
        self.set_on(false);
        self.aperture.endian_reverse = false;
    }

    /// Addressing state used by coprocessor map accesses.
    #[inline]
    fn map_addressing(&self) -> MapAddressing {
        MapAddressing {
            endian_reverse: self.aperture.endian_reverse,
            access_mode: self.ext.access_mode,
            window_base: self.aperture.map_window_base(),
        }
    }

    /// Apply a write to the coprocessor register window.
    fn write_accel_register(&mut self, offset: u32, value: u32, len: u32, host: Option<&mut [u8]>) {
        match self.accel.write_register(offset, value, len) {
            AccelEvent::None => {}
            AccelEvent::Command => self.execute_command(host),
            AccelEvent::ShortStroke(vectors) => self.execute_short_strokes(vectors, host),
        }
    }

    fn graphics_misc(&self) -> u8 {
        match (&self.vga, self.integrated_vga) {
            (Some(vga), false) => vga.graphics_misc(),
            _ => self.legacy.gdc_misc,
        }
    }

    /// Copy the finished frame to the front buffer and hand it to the sink.
    fn blit(&mut self, width: u32, height: u32) {
        let back = std::mem::take(&mut self.buf[self.back_buf]);
        self.buf[self.front_buf].copy_from_slice(&back);
        self.buf[self.back_buf] = back;

        self.crtc.last_frame = (width, height);
        self.frame_count += 1;
        if let Some(sink) = self.frame_sink.as_mut() {
            sink.blit(width, height, &self.buf[self.front_buf], XGA_FIELD_W as usize);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_rom() -> Vec<u8> {
        (0..XGA_ROM_SIZE).map(|i| (i & 0xFF) as u8).collect()
    }

    pub(crate) fn mca_card() -> XgaCard {
        XgaCard::attach(&XgaConfig::default(), &test_rom(), TraceLogger::None).unwrap()
    }

    pub(crate) fn isa_card() -> XgaCard {
        let config = XgaConfig {
            bus: XgaBus::Isa,
            ..Default::default()
        };
        XgaCard::attach(&config, &test_rom(), TraceLogger::None).unwrap()
    }

    #[test]
    fn attach_pads_rom_and_sizes_vram() {
        let card = XgaCard::attach(&XgaConfig::default(), &[0x55, 0xAA], TraceLogger::None).unwrap();
        assert_eq!(card.rom.len(), XGA_ROM_SIZE);
        assert_eq!(&card.rom[..3], &[0x55, 0xAA, 0xFF]);
        assert_eq!(card.vram().len(), 0x100000);
        assert!(!card.is_on());
    }

    #[test]
    fn attach_rejects_bad_config() {
        let config = XgaConfig {
            vram_kib: 768,
            ..Default::default()
        };
        assert!(matches!(
            XgaCard::attach(&config, &test_rom(), TraceLogger::None),
            Err(XgaError::InvalidVramSize(768))
        ));
        assert!(matches!(
            XgaCard::attach(&XgaConfig::default(), &[], TraceLogger::None),
            Err(XgaError::RomEmpty)
        ));
    }

    #[test]
    fn missing_rom_is_reported() {
        let result = load_rom(Path::new("/nonexistent/xga/XGA.BIN"));
        assert!(matches!(result, Err(XgaError::RomNotFound(_))));
    }

    #[test]
    fn command_trace_goes_to_logger() {
        let mut card = XgaCard::attach(
            &XgaConfig::default(),
            &test_rom(),
            TraceLogger::Buffer(String::new()),
        )
        .unwrap();
        card.write_accel_register(accel::ACCEL_REG_COMMAND, 0x0300_0000, 4, None);
        let contents = card.trace_logger.contents().unwrap_or_default();
        assert!(contents.starts_with("CMD 03000000"));
    }
}
