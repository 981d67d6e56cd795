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

    xga_headless::mode.rs

    Display mode programming through the card's port and memory surface.

*/

use marty_xga::{
    bus::{DeviceRunTimeUnit, IoDevice, MemoryMappedDevice},
    config::XgaBus,
    devices::xga::{accel::*, ext_regs::*},
    XgaCard,
    XgaConfig,
};
use serde_derive::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};

/// Offset of the extended register data port within the port block.
const EXT_DATA: u16 = 0x0B;
const OP_MODE_EXTENDED: u8 = 0x04;

#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum ModeSelect {
    #[default]
    Vga640x480x8,
    Vga640x480x16,
    Xga1024x768x8,
}

/// CRTC register values for a display mode. Timing fields hold the raw register values,
/// one less than the count they program.
#[derive(Copy, Clone, Debug)]
pub struct ModeDesc {
    pub width: u32,
    pub height: u32,
    pub pixel_size: u8,
    pub clock_select: u8,
    pub interlace: bool,
    pub htotal: u16,
    pub hdisp: u16,
    pub vtotal: u16,
    pub vdispend: u16,
    pub vblankstart: u16,
    pub vsyncstart: u16,
}

impl ModeDesc {
    pub fn bytes_per_pixel(&self) -> u32 {
        if self.pixel_size == 4 {
            2
        }
        else {
            1
        }
    }
}

impl ModeSelect {
    pub fn desc(&self) -> ModeDesc {
        let vga_timing = ModeDesc {
            width: 640,
            height: 480,
            pixel_size: 3,
            clock_select: 0,
            interlace: false,
            htotal: 99,
            hdisp: 79,
            vtotal: 524,
            vdispend: 479,
            vblankstart: 479,
            vsyncstart: 489,
        };
        match self {
            ModeSelect::Vga640x480x8 => vga_timing,
            ModeSelect::Vga640x480x16 => ModeDesc {
                pixel_size: 4,
                ..vga_timing
            },
            ModeSelect::Xga1024x768x8 => ModeDesc {
                width: 1024,
                height: 768,
                pixel_size: 3,
                clock_select: 3,
                interlace: true,
                htotal: 157,
                hdisp: 127,
                vtotal: 816,
                vdispend: 767,
                vblankstart: 767,
                vsyncstart: 768,
            },
        }
    }
}

fn write_port(card: &mut XgaCard, port: u16, data: u8) {
    card.write_u8(port, data, DeviceRunTimeUnit::Microseconds(0.0));
}

fn write_index(card: &mut XgaCard, idx: u8, data: u8) {
    let base = card.ext_port_base();
    write_port(card, base + EXT_INDEX, idx);
    write_port(card, base + EXT_DATA, data);
}

fn write_index16(card: &mut XgaCard, idx_lo: u8, data: u16) {
    write_index(card, idx_lo, data as u8);
    write_index(card, idx_lo + 1, (data >> 8) as u8);
}

/// Configure the card through its POS registers the way the adapter setup program would,
/// enabling the extended function ports and register window.
pub fn enable_card(card: &mut XgaCard, config: &XgaConfig) {
    match config.bus {
        XgaBus::Mca => {
            card.mca_pos_write(0x104, 0x02);
            card.mca_pos_write(0x102, 0x01 | (config.instance << 1) | config.ext_mem_addr);
        }
        XgaBus::Isa => {
            // ISA cards come up configured from their option switches.
        }
    }
    log::debug!(
        "Extended ports at {:04X}, register window at {:X?}",
        card.ext_port_base(),
        card.register_window()
    );
}

/// Program display timing, palette and apertures, then switch on the extended display.
pub fn program_mode(card: &mut XgaCard, mode: &ModeDesc) {
    let base = card.ext_port_base();
    write_port(card, base + EXT_OP_MODE, OP_MODE_EXTENDED);
    write_index(card, REG_DISP_CNTL_2, 0x00);

    write_index(card, REG_DISP_CNTL_1, if mode.interlace { 0x09 } else { 0x01 });
    write_index16(card, REG_HTOTAL_LO, mode.htotal);
    write_index16(card, REG_HDISP_LO, mode.hdisp);
    write_index16(card, REG_VTOTAL_LO, mode.vtotal);
    write_index16(card, REG_VDISPEND_LO, mode.vdispend);
    write_index16(card, REG_VBLANKSTART_LO, mode.vblankstart);
    write_index16(card, REG_VSYNCSTART_LO, mode.vsyncstart);
    write_index16(card, REG_LINECMP_LO, 0x7FF);

    write_index(card, REG_DISP_START_LO, 0);
    write_index(card, REG_DISP_START_MID, 0);
    write_index(card, REG_DISP_START_HI, 0);
    write_index16(card, REG_PIXMAP_WIDTH_LO, (mode.width * mode.bytes_per_pixel() / 8) as u16);

    write_index(card, REG_CLK_SEL_2, 0x00);
    write_index(card, REG_CLK_SEL_1, mode.clock_select << 2);
    write_index(card, REG_BORDER_COLOR, 0x00);

    // Eight color bar entries, then a gray ramp.
    write_index(card, REG_DAC_MASK, 0xFF);
    write_index(card, REG_SPRITE_IDX_LO, 0x00);
    write_index(card, REG_SPRITE_IDX_HI, 0x00);
    for i in 0..=255u32 {
        let rgb = match i {
            0..=7 => [(i & 4) as u8 * 0x3F, (i & 2) as u8 * 0x7F, (i & 1) as u8 * 0xFF],
            _ => [i as u8; 3],
        };
        for component in rgb {
            write_index(card, REG_PALETTE_DATA, component);
        }
    }

    write_index(card, REG_DISP_CNTL_2, mode.pixel_size);
    write_port(card, base + EXT_APERTURE_CNTL, 0x00);

    log::debug!(
        "Programmed {}x{} ({} bytes per pixel), refresh {}Hz",
        mode.width,
        mode.height,
        mode.bytes_per_pixel(),
        marty_xga::videocard::VideoCard::get_refresh_rate(card)
    );
}

/// Fill the display with eight vertical color bars using coprocessor BitBLTs.
pub fn draw_test_pattern(card: &mut XgaCard, mode: &ModeDesc) -> Result<(), anyhow::Error> {
    let window = card
        .register_window()
        .ok_or_else(|| anyhow::anyhow!("Coprocessor register window is not mapped"))?;
    let origin = card.pixel_map_origin();

    let reg_u8 = |card: &mut XgaCard, reg: u32, data: u8| {
        card.mmio_write_u8(window + reg as usize, data, 0, None);
    };
    reg_u8(card, ACCEL_REG_MAP_INDEX, 1);
    reg_u8(card, ACCEL_REG_MAP_FORMAT, mode.pixel_size);
    reg_u8(card, ACCEL_REG_MIX, 0x03);
    reg_u8(card, ACCEL_REG_CC_COND, 0x04);

    let reg_u32 = |card: &mut XgaCard, reg: u32, data: u32| {
        card.mmio_write_u32(window + reg as usize, data, 0, None);
    };
    reg_u32(card, ACCEL_REG_MAP_BASE, origin);
    reg_u32(card, ACCEL_REG_MAP_SIZE, ((mode.height - 1) << 16) | (mode.width - 1));
    reg_u32(card, ACCEL_REG_PLANE_MASK, 0xFFFF_FFFF);

    let bar_w = mode.width / 8;
    let command = (Opcode::BitBlt as u32) << 24 | (PATTERN_FOREGROUND as u32) << 12 | 1 << 16;
    for bar in 0..8u32 {
        let color = if mode.pixel_size == 4 {
            let (r, g, b) = ((bar >> 2) & 1, (bar >> 1) & 1, bar & 1);
            (r * 0x1F) << 11 | (g * 0x3F) << 5 | (b * 0x1F)
        }
        else {
            bar
        };
        reg_u32(card, ACCEL_REG_FRGD_COLOR, color);
        reg_u32(card, ACCEL_REG_BLT_DIM, ((mode.height - 1) << 16) | (bar_w - 1));
        reg_u32(card, ACCEL_REG_DST_XY, bar * bar_w);
        reg_u32(card, ACCEL_REG_COMMAND, command);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use marty_xga::{devices::xga::XGA_ROM_SIZE, tracelogger::TraceLogger};

    fn attach(config: &XgaConfig) -> XgaCard {
        XgaCard::attach(config, &vec![0xFF; XGA_ROM_SIZE], TraceLogger::None).unwrap()
    }

    #[test]
    fn mca_card_is_enabled_through_pos() {
        let config = XgaConfig::default();
        let mut card = attach(&config);
        assert!(card.register_window().is_none());
        enable_card(&mut card, &config);
        assert_eq!(card.ext_port_base(), 0x2160);
        assert_eq!(card.register_window(), Some(0xDFF00));
    }

    #[test]
    fn program_mode_turns_display_on() {
        let config = XgaConfig::default();
        let mut card = attach(&config);
        enable_card(&mut card, &config);
        program_mode(&mut card, &ModeSelect::Vga640x480x8.desc());
        assert!(card.is_on());
        assert_eq!(card.crtc().h_disp, 640);
        assert_eq!(card.crtc().v_total, 525);
        assert_eq!(card.pixel_map_origin(), card.pixel_map_origin() & !0x3F_FFFF);
    }

    #[test]
    fn test_pattern_fills_bars() {
        let config = XgaConfig {
            bus: XgaBus::Isa,
            ..Default::default()
        };
        let mut card = attach(&config);
        enable_card(&mut card, &config);
        let mode = ModeSelect::Vga640x480x8.desc();
        program_mode(&mut card, &mode);
        draw_test_pattern(&mut card, &mode).unwrap();

        let vram = card.vram();
        assert_eq!(vram[0], 0);
        assert_eq!(vram[80], 1);
        assert_eq!(vram[639], 7);
        assert_eq!(vram[479 * 640 + 320], 4);
    }

    #[test]
    fn interlaced_mode_selects_fast_clock() {
        let config = XgaConfig::default();
        let mut card = attach(&config);
        enable_card(&mut card, &config);
        program_mode(&mut card, &ModeSelect::Xga1024x768x8.desc());
        assert!(card.crtc().interlace);
        assert_eq!(card.crtc().pixel_clock, marty_xga::devices::xga::PixelClock::Clock45);
    }
}
