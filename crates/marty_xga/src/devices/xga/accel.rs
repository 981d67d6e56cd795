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

    devices::xga::accel.rs

    Coprocessor register file. Registers are written through the memory
    mapped register window at any width; narrower writes merge into the
    addressed byte lanes.

*/

use modular_bitfield::{
    bitfield,
    prelude::{B2, B3, B4},
    BitfieldSpecifier,
};
use strum_macros::{Display, FromRepr};

use crate::devices::xga::pixel_map::PixelMap;

pub const ACCEL_REG_CONTROL: u32 = 0x11;
pub const ACCEL_REG_MAP_INDEX: u32 = 0x12;
pub const ACCEL_REG_MAP_BASE: u32 = 0x14;
pub const ACCEL_REG_MAP_SIZE: u32 = 0x18;
pub const ACCEL_REG_MAP_FORMAT: u32 = 0x1C;
pub const ACCEL_REG_ERROR_TERM: u32 = 0x20;
pub const ACCEL_REG_K1: u32 = 0x24;
pub const ACCEL_REG_K2: u32 = 0x28;
pub const ACCEL_REG_SHORT_STROKE: u32 = 0x2C;
pub const ACCEL_REG_MIX: u32 = 0x48;
pub const ACCEL_REG_BKGD_MIX: u32 = 0x49;
pub const ACCEL_REG_CC_COND: u32 = 0x4A;
pub const ACCEL_REG_COLOR_CMP: u32 = 0x4C;
pub const ACCEL_REG_PLANE_MASK: u32 = 0x50;
pub const ACCEL_REG_FRGD_COLOR: u32 = 0x58;
pub const ACCEL_REG_BKGD_COLOR: u32 = 0x5C;
pub const ACCEL_REG_BLT_DIM: u32 = 0x60;
pub const ACCEL_REG_MASK_ORIGIN: u32 = 0x6C;
pub const ACCEL_REG_SRC_XY: u32 = 0x70;
pub const ACCEL_REG_PAT_XY: u32 = 0x74;
pub const ACCEL_REG_DST_XY: u32 = 0x78;
pub const ACCEL_REG_COMMAND: u32 = 0x7C;

/// A pattern source of 8 selects the foreground color rather than a pattern map.
pub const PATTERN_FOREGROUND: u8 = 8;
/// A source select of 2 reads pixels from the source map.
pub const SOURCE_PIXEL_MAP: u8 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, BitfieldSpecifier)]
#[bits = 2]
pub enum DrawMode {
    DrawAll,
    FirstPixelNull,
    LastPixelNull,
    AreaBoundary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
pub enum Opcode {
    LineDrawRead = 3,
    ShortStrokeRead = 4,
    LineDrawWrite = 5,
    BitBlt = 8,
    InvertingBitBlt = 9,
    AreaFill = 10,
}

#[bitfield]
#[derive(Copy, Clone, Debug, Default)]
pub struct CommandWord {
    pub octant: B3,
    #[skip]
    unused0: bool,
    pub draw_mode: DrawMode,
    pub mask_mode: B2,
    #[skip]
    unused1: B4,
    pub pattern_map: B4,
    pub dest_map: B4,
    pub source_map: B4,
    pub opcode: B4,
    pub fg_source: B2,
    pub bg_source: B2,
}

impl CommandWord {
    #[inline]
    pub fn from_u32(value: u32) -> Self {
        CommandWord::from_bytes(value.to_le_bytes())
    }

    #[inline]
    pub fn to_u32(&self) -> u32 {
        u32::from_le_bytes(self.into_bytes())
    }

    #[inline]
    pub fn decoded_opcode(&self) -> Option<Opcode> {
        Opcode::from_repr(self.opcode())
    }

    #[inline]
    pub fn mask_enabled(&self) -> bool {
        self.mask_mode() != 0
    }
}

/// What the host should do after a register write.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccelEvent {
    None,
    Command,
    ShortStroke(u32),
}

#[derive(Clone, Debug, Default)]
pub struct AccelState {
    pub control: u8,
    pub map_index: usize,
    pub maps: [PixelMap; 4],
    pub bres_err_term: u32,
    pub bres_k1: u32,
    pub bres_k2: u32,
    pub short_stroke: u32,
    pub frgd_mix: u8,
    pub bkgd_mix: u8,
    pub cc_cond: u8,
    pub color_cmp: u32,
    pub plane_mask: u32,
    pub frgd_color: u32,
    pub bkgd_color: u32,
    pub blt_width: u16,
    pub blt_height: u16,
    pub mask_origin_x: u16,
    pub mask_origin_y: u16,
    pub src_x: u16,
    pub src_y: u16,
    pub pat_x: u16,
    pub pat_y: u16,
    pub dst_x: u16,
    pub dst_y: u16,
    pub command: CommandWord,
}

/// Merge `value` into the byte lanes of `old` starting at `lane`. Writes that are misaligned
/// or that would spill past a field of `field_bytes` bytes are ignored.
pub fn merge_lane(old: u32, lane: u32, len: u32, value: u32, field_bytes: u32) -> u32 {
    if len == 0 || lane % len != 0 || lane + len > field_bytes {
        return old;
    }
    let mask = if len >= 4 {
        u32::MAX
    }
    else {
        ((1u32 << (len * 8)) - 1) << (lane * 8)
    };
    (old & !mask) | ((value << (lane * 8)) & mask)
}

#[inline]
fn pack_pair(x: u16, y: u16) -> u32 {
    x as u32 | (y as u32) << 16
}

#[inline]
fn unpack_pair(value: u32) -> (u16, u16) {
    (value as u16, (value >> 16) as u16)
}

impl AccelState {
    /// Write a coprocessor register at `offset` (0x00-0x7F) with an access of `len` bytes.
    pub fn write_register(&mut self, offset: u32, value: u32, len: u32) -> AccelEvent {
        let offset = offset & 0x7F;
        match offset {
            ACCEL_REG_CONTROL => self.control = value as u8,
            ACCEL_REG_MAP_INDEX => self.map_index = (value & 0x03) as usize,
            0x14..=0x17 => {
                let map = &mut self.maps[self.map_index];
                map.base = merge_lane(map.base, offset - ACCEL_REG_MAP_BASE, len, value, 4);
            }
            0x18..=0x1B => {
                let map = &mut self.maps[self.map_index];
                let packed = merge_lane(pack_pair(map.width, map.height), offset - ACCEL_REG_MAP_SIZE, len, value, 4);
                (map.width, map.height) = unpack_pair(packed);
            }
            ACCEL_REG_MAP_FORMAT => self.maps[self.map_index].format = value as u8,
            0x20 | 0x21 => self.bres_err_term = write_bresenham(self.bres_err_term, offset & 1, value, len),
            0x24 | 0x25 => self.bres_k1 = write_bresenham(self.bres_k1, offset & 1, value, len),
            0x28 | 0x29 => self.bres_k2 = write_bresenham(self.bres_k2, offset & 1, value, len),
            0x2C..=0x2F => {
                self.short_stroke = merge_lane(self.short_stroke, offset - ACCEL_REG_SHORT_STROKE, len, value, 4);
                if offset == ACCEL_REG_SHORT_STROKE && len == 4 {
                    return AccelEvent::ShortStroke(self.short_stroke);
                }
            }
            ACCEL_REG_MIX => {
                self.frgd_mix = value as u8;
                if len >= 2 {
                    self.bkgd_mix = (value >> 8) as u8;
                }
                if len == 4 {
                    self.cc_cond = ((value >> 16) & 0x07) as u8;
                }
            }
            ACCEL_REG_BKGD_MIX => self.bkgd_mix = value as u8,
            ACCEL_REG_CC_COND => self.cc_cond = (value & 0x07) as u8,
            0x4C..=0x4F => {
                self.color_cmp = merge_lane(self.color_cmp, offset - ACCEL_REG_COLOR_CMP, len, value, 4);
            }
            0x50..=0x53 => {
                self.plane_mask = merge_lane(self.plane_mask, offset - ACCEL_REG_PLANE_MASK, len, value, 4);
            }
            0x58..=0x5B => {
                self.frgd_color = merge_lane(self.frgd_color, offset - ACCEL_REG_FRGD_COLOR, len, value, 4);
            }
            0x5C..=0x5F => {
                self.bkgd_color = merge_lane(self.bkgd_color, offset - ACCEL_REG_BKGD_COLOR, len, value, 4);
            }
            0x60..=0x63 => {
                let packed = merge_lane(
                    pack_pair(self.blt_width, self.blt_height),
                    offset - ACCEL_REG_BLT_DIM,
                    len,
                    value,
                    4,
                );
                (self.blt_width, self.blt_height) = unpack_pair(packed);
            }
            0x6C..=0x6F => {
                let packed = merge_lane(
                    pack_pair(self.mask_origin_x, self.mask_origin_y),
                    offset - ACCEL_REG_MASK_ORIGIN,
                    len,
                    value,
                    4,
                );
                (self.mask_origin_x, self.mask_origin_y) = unpack_pair(packed);
            }
            0x70..=0x73 => {
                let packed = merge_lane(pack_pair(self.src_x, self.src_y), offset - ACCEL_REG_SRC_XY, len, value, 4);
                (self.src_x, self.src_y) = unpack_pair(packed);
            }
            0x74..=0x77 => {
                let packed = merge_lane(pack_pair(self.pat_x, self.pat_y), offset - ACCEL_REG_PAT_XY, len, value, 4);
                (self.pat_x, self.pat_y) = unpack_pair(packed);
            }
            0x78..=0x7B => {
                let packed = merge_lane(pack_pair(self.dst_x, self.dst_y), offset - ACCEL_REG_DST_XY, len, value, 4);
                (self.dst_x, self.dst_y) = unpack_pair(packed);
            }
            0x7C..=0x7F => {
                let command = merge_lane(self.command.to_u32(), offset - ACCEL_REG_COMMAND, len, value, 4);
                self.command = CommandWord::from_u32(command);
                if Self::triggers_command(offset, len) {
                    return AccelEvent::Command;
                }
            }
            _ => {}
        }
        AccelEvent::None
    }

    /// A command starts when the write completes the top byte of the command register.
    #[inline]
    pub fn triggers_command(offset: u32, len: u32) -> bool {
        matches!((offset, len), (0x7C, 4) | (0x7E, 2) | (0x7F, 1))
    }

    /// Read back a coprocessor register byte. Only the control, error term and
    /// coordinate registers are readable.
    pub fn read_register(&self, offset: u32) -> u8 {
        match offset & 0x7F {
            ACCEL_REG_CONTROL => {
                // Bit 4 mirrors bit 3.
                let mut control = self.control & !0x10;
                if self.control & 0x08 != 0 {
                    control |= 0x10;
                }
                control
            }
            lane @ 0x20..=0x23 => (self.bres_err_term >> ((lane - 0x20) * 8)) as u8,
            lane @ 0x70..=0x73 => (pack_pair(self.src_x, self.src_y) >> ((lane - 0x70) * 8)) as u8,
            lane @ 0x74..=0x77 => (pack_pair(self.pat_x, self.pat_y) >> ((lane - 0x74) * 8)) as u8,
            lane @ 0x78..=0x7B => (pack_pair(self.dst_x, self.dst_y) >> ((lane - 0x78) * 8)) as u8,
            _ => 0,
        }
    }

    /// Map selected by a command nibble. Only four maps exist; higher selectors alias.
    #[inline]
    pub fn map(&self, selector: u8) -> PixelMap {
        self.maps[(selector & 0x03) as usize]
    }
}

/// Bresenham error and step constants are 14-bit signed values. A full-width write at the
/// base offset sign extends from bit 13; byte writes assemble the value one half at a time.
fn write_bresenham(old: u32, high: u32, value: u32, len: u32) -> u32 {
    match (high, len) {
        (0, 2..) => {
            let mut term = value & 0x3FFF;
            if value & 0x2000 != 0 {
                term |= !0x3FFF;
            }
            term
        }
        (0, _) => (old & 0x3F00) | (value & 0xFF),
        (_, 1) => {
            let mut term = (old & 0xFF) | ((value & 0x3F) << 8);
            if value & 0x20 != 0 {
                term |= !0x3FFF;
            }
            term
        }
        _ => old,
    }
}

/// Sign extend a 14-bit Bresenham constant into the integer domain.
#[inline]
pub fn sign_extend_14(value: u32) -> i32 {
    let mut result = value as i16 as i32;
    if value & 0x2000 != 0 {
        result |= !0x1FFF;
    }
    result
}

/// Destination coordinates are 13-bit values where 0x1800 and above are negative.
#[inline]
pub fn dest_coordinate(value: u16) -> i32 {
    let mut result = (value & 0x1FFF) as i32;
    if value >= 0x1800 {
        result |= !0x17FF;
    }
    result
}
