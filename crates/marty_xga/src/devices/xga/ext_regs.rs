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

    devices::xga::ext_regs.rs

    The extended function port block (base 0x2100 + instance * 0x10) and
    the indexed display register file behind it.

*/

use super::*;

use modular_bitfield::{
    bitfield,
    prelude::{B2, B3, B4, B7},
};

pub const EXT_OP_MODE: u16 = 0x00;
pub const EXT_APERTURE_CNTL: u16 = 0x01;
pub const EXT_INTERRUPT_STATUS: u16 = 0x04;
pub const EXT_APERTURE_INDEX: u16 = 0x08;
pub const EXT_ACCESS_MODE: u16 = 0x09;
pub const EXT_INDEX: u16 = 0x0A;

pub const REG_BUS_WIDTH: u8 = 0x04;
pub const REG_HTOTAL_LO: u8 = 0x10;
pub const REG_HTOTAL_HI: u8 = 0x11;
pub const REG_HDISP_LO: u8 = 0x12;
pub const REG_HDISP_HI: u8 = 0x13;
pub const REG_VTOTAL_LO: u8 = 0x20;
pub const REG_VTOTAL_HI: u8 = 0x21;
pub const REG_VDISPEND_LO: u8 = 0x22;
pub const REG_VDISPEND_HI: u8 = 0x23;
pub const REG_VBLANKSTART_LO: u8 = 0x24;
pub const REG_VBLANKSTART_HI: u8 = 0x25;
pub const REG_VSYNCSTART_LO: u8 = 0x28;
pub const REG_VSYNCSTART_HI: u8 = 0x29;
pub const REG_LINECMP_LO: u8 = 0x2C;
pub const REG_LINECMP_HI: u8 = 0x2D;
pub const REG_CURSOR_X_LO: u8 = 0x30;
pub const REG_CURSOR_X_HI: u8 = 0x31;
pub const REG_CURSOR_HOTSPOT_X: u8 = 0x32;
pub const REG_CURSOR_Y_LO: u8 = 0x33;
pub const REG_CURSOR_Y_HI: u8 = 0x34;
pub const REG_CURSOR_HOTSPOT_Y: u8 = 0x35;
pub const REG_CURSOR_CONTROL: u8 = 0x36;
pub const REG_CURSOR_COLOR0: u8 = 0x38;
pub const REG_CURSOR_COLOR1: u8 = 0x3B;
pub const REG_DISP_START_LO: u8 = 0x40;
pub const REG_DISP_START_MID: u8 = 0x41;
pub const REG_DISP_START_HI: u8 = 0x42;
pub const REG_PIXMAP_WIDTH_LO: u8 = 0x43;
pub const REG_PIXMAP_WIDTH_HI: u8 = 0x44;
pub const REG_DISP_CNTL_1: u8 = 0x50;
pub const REG_DISP_CNTL_2: u8 = 0x51;
pub const REG_ID_LO: u8 = 0x52;
pub const REG_ID_HI: u8 = 0x53;
pub const REG_CLK_SEL_1: u8 = 0x54;
pub const REG_BORDER_COLOR: u8 = 0x55;
pub const REG_DIRECT_COLOR: u8 = 0x59;
pub const REG_SPRITE_IDX_LO: u8 = 0x60;
pub const REG_SPRITE_IDX_HI: u8 = 0x61;
pub const REG_SPRITE_PREFETCH_LO: u8 = 0x62;
pub const REG_SPRITE_PREFETCH_HI: u8 = 0x63;
pub const REG_DAC_MASK: u8 = 0x64;
pub const REG_PALETTE_DATA: u8 = 0x65;
pub const REG_PALETTE_SEQ: u8 = 0x66;
pub const REG_PALETTE_RED: u8 = 0x67;
pub const REG_PALETTE_BLUE: u8 = 0x68;
pub const REG_PALETTE_GREEN: u8 = 0x69;
pub const REG_SPRITE_DATA: u8 = 0x6A;
pub const REG_CLK_SEL_2: u8 = 0x70;
pub const REG_DMA_CHANNEL: u8 = 0x74;

#[bitfield]
#[derive(Copy, Clone, Debug, Default)]
pub struct DisplayControl1 {
    pub sync_control: B2,
    #[skip]
    unused0: bool,
    pub interlace: bool,
    #[skip]
    unused1: B2,
    pub vsync_negative: bool,
    pub hsync_negative: bool,
}

#[bitfield]
#[derive(Copy, Clone, Debug, Default)]
pub struct DisplayControl2 {
    pub pixel_size: B3,
    #[skip]
    unused: B3,
    pub row_count: B2,
}

#[bitfield]
#[derive(Copy, Clone, Debug, Default)]
pub struct ClockSelect1 {
    #[skip]
    unused0: B2,
    pub clock_select: B2,
    #[skip]
    unused1: B4,
}

#[bitfield]
#[derive(Copy, Clone, Debug, Default)]
pub struct ClockSelect2 {
    #[skip]
    unused: B7,
    pub alt_clock: bool,
}

#[derive(Clone)]
pub struct ExtRegisters {
    pub op_mode: u8,
    pub aperture_cntl: u8,
    pub access_mode: u8,
    pub ap_idx: u8,
    pub regs_idx: u8,
    /// Last value written to each index.
    pub regs: [u8; 256],

    pub htotal: u16,
    pub hdisp: u16,
    pub vtotal: u16,
    pub vdispend: u16,
    pub vblankstart: u16,
    pub vsyncstart: u16,
    pub linecmp: u16,
    pub disp_start_addr: u32,
    pub pix_map_width: u16,

    pub disp_cntl_1: DisplayControl1,
    pub disp_cntl_2: DisplayControl2,
    pub clk_sel_1: ClockSelect1,
    pub clk_sel_2: ClockSelect2,
    pub border_color: u8,
    pub direct_color: u8,
    pub sprite_pal_addr_idx: u16,
    pub sprite_pal_addr_idx_prefetch: u16,
}

impl Default for ExtRegisters {
    fn default() -> Self {
        Self {
            op_mode: 0,
            aperture_cntl: 0,
            access_mode: 0,
            ap_idx: 0,
            regs_idx: 0,
            regs: [0; 256],
            htotal: 0,
            hdisp: 0,
            vtotal: 0,
            vdispend: 0,
            vblankstart: 0,
            vsyncstart: 0,
            linecmp: 0,
            disp_start_addr: 0,
            pix_map_width: 0,
            disp_cntl_1: Default::default(),
            disp_cntl_2: Default::default(),
            clk_sel_1: Default::default(),
            clk_sel_2: Default::default(),
            border_color: 0,
            direct_color: 0,
            sprite_pal_addr_idx: 0,
            sprite_pal_addr_idx_prefetch: 0,
        }
    }
}

impl ExtRegisters {
    #[inline]
    pub fn op_mode_bits(&self) -> u8 {
        self.op_mode & 0x07
    }

    #[inline]
    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode::from_bits(self.disp_cntl_2.pixel_size())
    }

    #[inline]
    pub fn disp_cntl_1_byte(&self) -> u8 {
        self.disp_cntl_1.into_bytes()[0]
    }

    #[inline]
    pub fn disp_cntl_2_byte(&self) -> u8 {
        self.disp_cntl_2.into_bytes()[0]
    }

    /// The 16-bit CRTC timing register addressed by an index pair, if any.
    fn timing_register(&mut self, idx: u8) -> Option<&mut u16> {
        match idx & !1 {
            REG_HTOTAL_LO => Some(&mut self.htotal),
            REG_HDISP_LO => Some(&mut self.hdisp),
            REG_VTOTAL_LO => Some(&mut self.vtotal),
            REG_VDISPEND_LO => Some(&mut self.vdispend),
            REG_VBLANKSTART_LO => Some(&mut self.vblankstart),
            REG_VSYNCSTART_LO => Some(&mut self.vsyncstart),
            REG_LINECMP_LO => Some(&mut self.linecmp),
            _ => None,
        }
    }

    fn timing_value(&self, idx: u8) -> Option<u16> {
        match idx & !1 {
            REG_HTOTAL_LO => Some(self.htotal),
            REG_HDISP_LO => Some(self.hdisp),
            REG_VTOTAL_LO => Some(self.vtotal),
            REG_VDISPEND_LO => Some(self.vdispend),
            REG_VBLANKSTART_LO => Some(self.vblankstart),
            REG_VSYNCSTART_LO => Some(self.vsyncstart),
            REG_LINECMP_LO => Some(self.linecmp),
            _ => None,
        }
    }
}

#[inline]
fn set_byte(value: u32, byte: usize, data: u8) -> u32 {
    (value & !(0xFF << (byte * 8))) | (data as u32) << (byte * 8)
}

impl XgaCard {
    /// Write to the extended function port block. `offset` is the port address & 0x0F.
    pub(crate) fn ext_port_write(&mut self, offset: u16, data: u8) {
        match offset {
            EXT_OP_MODE => self.ext.op_mode = data,
            EXT_APERTURE_CNTL => {
                self.ext.aperture_cntl = data;
                self.update_mapping();
            }
            EXT_INTERRUPT_STATUS => {
                self.ext.access_mode &= !0x08;
                if self.ext.disp_cntl_2.pixel_size() == 4 {
                    self.ext.aperture_cntl = 0;
                }
            }
            EXT_APERTURE_INDEX => {
                self.ext.ap_idx = data;
                self.aperture.bank = if self.ext.op_mode_bits() < 4 {
                    0
                }
                else {
                    ((data & 0x3F) as u32) << 16
                };
            }
            EXT_ACCESS_MODE => self.ext.access_mode = data,
            EXT_INDEX => self.ext.regs_idx = data,
            0x0B..=0x0F => {
                let idx = self.ext.regs_idx;
                self.ext.regs[idx as usize] = data;
                self.write_ext_register(idx, data);
            }
            _ => {}
        }
    }

    pub(crate) fn ext_port_read(&mut self, offset: u16) -> u8 {
        match offset {
            EXT_OP_MODE => self.ext.op_mode,
            EXT_APERTURE_CNTL => self.ext.aperture_cntl,
            EXT_APERTURE_INDEX => self.ext.ap_idx,
            EXT_ACCESS_MODE => self.ext.access_mode,
            EXT_INDEX => self.ext.regs_idx,
            0x0B..=0x0F => self.read_ext_register(self.ext.regs_idx),
            _ => NO_IO_BYTE,
        }
    }

    fn write_ext_register(&mut self, idx: u8, data: u8) {
        if let Some(reg) = self.ext.timing_register(idx) {
            if idx & 1 == 0 {
                *reg = (*reg & 0xFF00) | data as u16;
            }
            else {
                *reg = (*reg & 0x00FF) | (data as u16) << 8;
                self.recalculate_timings();
            }
            return;
        }

        match idx {
            REG_CURSOR_X_LO => self.cursor.pos_x = (self.cursor.pos_x & 0x0700) | data as u16,
            REG_CURSOR_X_HI => self.cursor.pos_x = (self.cursor.pos_x & 0x00FF) | ((data & 0x07) as u16) << 8,
            REG_CURSOR_HOTSPOT_X => self.cursor.hotspot_x = data & 0x3F,
            REG_CURSOR_Y_LO => self.cursor.pos_y = (self.cursor.pos_y & 0x0700) | data as u16,
            REG_CURSOR_Y_HI => self.cursor.pos_y = (self.cursor.pos_y & 0x00FF) | ((data & 0x07) as u16) << 8,
            REG_CURSOR_HOTSPOT_Y => self.cursor.hotspot_y = data & 0x3F,
            REG_CURSOR_CONTROL => self.cursor.control = data,
            0x38..=0x3A => {
                let byte = (idx - REG_CURSOR_COLOR0) as usize;
                self.cursor.color0 = set_byte(self.cursor.color0, byte, data);
            }
            0x3B..=0x3D => {
                let byte = (idx - REG_CURSOR_COLOR1) as usize;
                self.cursor.color1 = set_byte(self.cursor.color1, byte, data);
            }
            REG_DISP_START_LO => self.ext.disp_start_addr = set_byte(self.ext.disp_start_addr, 0, data),
            REG_DISP_START_MID => self.ext.disp_start_addr = set_byte(self.ext.disp_start_addr, 1, data),
            REG_DISP_START_HI => {
                self.ext.disp_start_addr = set_byte(self.ext.disp_start_addr, 2, data & 0x07);
                self.recalculate_timings();
            }
            REG_PIXMAP_WIDTH_LO => self.ext.pix_map_width = (self.ext.pix_map_width & 0x0700) | data as u16,
            REG_PIXMAP_WIDTH_HI => {
                self.ext.pix_map_width = (self.ext.pix_map_width & 0x00FF) | ((data & 0x07) as u16) << 8
            }
            REG_DISP_CNTL_1 => {
                self.ext.disp_cntl_1 = DisplayControl1::from_bytes([data]);
                self.recalculate_timings();
            }
            REG_DISP_CNTL_2 => {
                self.ext.disp_cntl_2 = DisplayControl2::from_bytes([data]);
                self.set_on((data & 0x07) >= 3);
                self.recalculate_timings();
            }
            REG_CLK_SEL_1 => {
                self.ext.clk_sel_1 = ClockSelect1::from_bytes([data]);
                self.recalculate_timings();
            }
            REG_BORDER_COLOR => self.ext.border_color = data,
            REG_DIRECT_COLOR => self.ext.direct_color = data,
            REG_SPRITE_IDX_LO => {
                self.ext.sprite_pal_addr_idx = (self.ext.sprite_pal_addr_idx & 0x3F00) | data as u16;
                self.dac.set_index(data);
            }
            REG_SPRITE_IDX_HI => {
                self.ext.sprite_pal_addr_idx =
                    (self.ext.sprite_pal_addr_idx & 0x00FF) | ((data & 0x3F) as u16) << 8;
                self.cursor.sprite_pos = self.ext.sprite_pal_addr_idx & 0x1FF;
                self.cursor.update_data_on(
                    self.ext.op_mode_bits(),
                    self.ext.disp_cntl_2.pixel_size(),
                    self.ext.aperture_cntl,
                    self.aperture.endian_reverse,
                    self.ext.access_mode,
                );
            }
            REG_SPRITE_PREFETCH_LO => {
                self.ext.sprite_pal_addr_idx_prefetch = (self.ext.sprite_pal_addr_idx_prefetch & 0x3F00) | data as u16;
                self.dac.set_index(data);
            }
            REG_SPRITE_PREFETCH_HI => {
                self.ext.sprite_pal_addr_idx_prefetch =
                    (self.ext.sprite_pal_addr_idx_prefetch & 0x00FF) | ((data & 0x3F) as u16) << 8;
                self.cursor.sprite_pos_prefetch = self.ext.sprite_pal_addr_idx_prefetch & 0x1FF;
            }
            REG_DAC_MASK => self.dac.mask = data,
            REG_PALETTE_DATA => {
                self.fullchange = self.vram.change_frame_count();
                self.dac.write_data(data);
            }
            REG_PALETTE_SEQ => self.dac.pal_seq = data,
            REG_PALETTE_RED => self.dac.r = data,
            REG_PALETTE_BLUE => self.dac.b = data,
            REG_PALETTE_GREEN => self.dac.g = data,
            REG_SPRITE_DATA => self.cursor.write_sprite(data),
            REG_CLK_SEL_2 => {
                self.ext.clk_sel_2 = ClockSelect2::from_bytes([data]);
                self.recalculate_timings();
            }
            _ => {}
        }
    }

    fn read_ext_register(&mut self, idx: u8) -> u8 {
        if let Some(value) = self.ext.timing_value(idx) {
            return (value >> ((idx & 1) * 8)) as u8;
        }

        match idx {
            REG_BUS_WIDTH => match self.bus {
                XgaBus::Mca => 0x01,
                XgaBus::Isa => 0x10,
            },
            REG_CURSOR_X_LO => self.cursor.pos_x as u8,
            REG_CURSOR_X_HI => (self.cursor.pos_x >> 8) as u8,
            REG_CURSOR_HOTSPOT_X => self.cursor.hotspot_x,
            REG_CURSOR_Y_LO => self.cursor.pos_y as u8,
            REG_CURSOR_Y_HI => (self.cursor.pos_y >> 8) as u8,
            REG_CURSOR_HOTSPOT_Y => self.cursor.hotspot_y,
            REG_CURSOR_CONTROL => self.cursor.control,
            0x38..=0x3A => (self.cursor.color0 >> ((idx - REG_CURSOR_COLOR0) * 8)) as u8,
            0x3B..=0x3D => (self.cursor.color1 >> ((idx - REG_CURSOR_COLOR1) * 8)) as u8,
            0x40..=0x42 => (self.ext.disp_start_addr >> ((idx - REG_DISP_START_LO) * 8)) as u8,
            REG_PIXMAP_WIDTH_LO => self.ext.pix_map_width as u8,
            REG_PIXMAP_WIDTH_HI => (self.ext.pix_map_width >> 8) as u8,
            REG_DISP_CNTL_1 => self.ext.disp_cntl_1_byte() | 0x20,
            REG_DISP_CNTL_2 => self.ext.disp_cntl_2_byte(),
            REG_ID_LO => match self.xga_type {
                XgaType::Xga2 => 0xFA,
                XgaType::Xga1 => 0xEA,
            },
            REG_ID_HI => match self.xga_type {
                XgaType::Xga2 => 0x53,
                XgaType::Xga1 => 0x30,
            },
            REG_CLK_SEL_1 => self.ext.clk_sel_1.into_bytes()[0],
            REG_BORDER_COLOR => self.ext.border_color,
            REG_DIRECT_COLOR => self.ext.direct_color,
            REG_SPRITE_IDX_LO => self.ext.sprite_pal_addr_idx as u8,
            REG_SPRITE_IDX_HI => (self.ext.sprite_pal_addr_idx >> 8) as u8,
            REG_SPRITE_PREFETCH_LO => self.ext.sprite_pal_addr_idx_prefetch as u8,
            REG_SPRITE_PREFETCH_HI => (self.ext.sprite_pal_addr_idx_prefetch >> 8) as u8,
            REG_DAC_MASK => self.dac.mask,
            REG_PALETTE_DATA => self.dac.read_data(),
            REG_PALETTE_SEQ => self.dac.pal_seq,
            REG_PALETTE_RED => self.dac.r,
            REG_PALETTE_BLUE => self.dac.b,
            REG_PALETTE_GREEN => self.dac.g,
            REG_SPRITE_DATA => self.cursor.read_sprite_prefetch(),
            REG_CLK_SEL_2 => self.ext.clk_sel_2.into_bytes()[0],
            REG_DMA_CHANNEL => match self.bus {
                XgaBus::Mca => self.ext.regs[idx as usize],
                XgaBus::Isa => (self.dma << 1) | (self.dma != 0) as u8,
            },
            _ => self.ext.regs[idx as usize],
        }
    }
}
