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

    devices::xga::aperture.rs

    Memory windows decoded by the XGA: the 64K banked aperture, the 1MB or
    4MB linear aperture, the boot ROM and the coprocessor register window.

*/

use super::*;

pub const BANKED_A000: u32 = 0xA0000;
pub const BANKED_B000: u32 = 0xB0000;
pub const BANKED_SIZE: u32 = 0x10000;
pub const LINEAR_1MB_SIZE: u32 = 0x100000;
pub const LINEAR_4MB_SIZE: u32 = 0x400000;
pub const LINEAR_DECODE_MASK: u32 = 0x3FFFFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub address: u32,
    pub size: u32,
}

impl Window {
    #[inline]
    pub fn new(address: u32, size: u32) -> Self {
        Self { address, size }
    }

    #[inline]
    pub fn contains(&self, address: usize) -> bool {
        address >= self.address as usize && address < self.address as usize + self.size as usize
    }

    #[inline]
    pub fn offset(&self, address: usize) -> u32 {
        (address as u32).wrapping_sub(self.address)
    }

    fn descriptor(&self, read_only: bool) -> MemRangeDescriptor {
        MemRangeDescriptor::new(self.address as usize, self.size as usize, read_only)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ApertureState {
    pub banked: Option<Window>,
    pub banked_mask: u32,
    pub bank: u32,
    pub linear: Option<Window>,
    pub base_addr_1mb: u32,
    pub linear_base: u32,
    /// Byte order of 16bpp pixels is swapped through the linear aperture.
    pub endian_reverse: bool,
    pub rom_addr: u32,
    pub rom_window: Option<Window>,
    pub memio_window: Option<Window>,
    pub ext_ports_enabled: bool,
    /// Set whenever a window moves; cleared by the host when it re-queries the mapping.
    pub mapping_dirty: bool,
}

impl ApertureState {
    /// Base of the 1MB region coprocessor pixel maps address as card memory.
    #[inline]
    pub fn map_window_base(&self) -> u32 {
        if self.base_addr_1mb != 0 {
            self.base_addr_1mb
        }
        else {
            self.linear_base
        }
    }

    pub fn mapping_list(&self) -> Vec<MemRangeDescriptor> {
        let mut list = Vec::new();
        if let Some(window) = self.memio_window {
            list.push(window.descriptor(false));
        }
        if let Some(window) = self.rom_window {
            list.push(window.descriptor(true));
        }
        if let Some(window) = self.banked {
            list.push(window.descriptor(false));
        }
        if let Some(window) = self.linear {
            list.push(window.descriptor(false));
        }
        list
    }

    /// Unmap the ROM and register windows.
    pub fn unmap_rom(&mut self) {
        self.rom_window = None;
        self.memio_window = None;
        self.mapping_dirty = true;
    }
}

impl XgaCard {
    /// Re-derive the banked and linear windows from the aperture control register.
    pub(crate) fn update_mapping(&mut self) {
        let op_mode = self.ext.op_mode_bits();
        if op_mode != 0 && op_mode < 4 {
            return;
        }

        match self.ext.aperture_cntl {
            cntl @ (1 | 2) => {
                let address = if cntl == 1 { BANKED_A000 } else { BANKED_B000 };
                self.aperture.banked = Some(Window::new(address, BANKED_SIZE));
                self.aperture.banked_mask = 0xFFFF;
                if !self.aperture.endian_reverse {
                    self.aperture.linear = None;
                }
            }
            0 => {
                self.aperture.banked = Some(Window::new(BANKED_A000, BANKED_SIZE));
                self.aperture.banked_mask = 0xFFFF;
                self.aperture.linear = Some(if self.aperture.base_addr_1mb != 0 {
                    Window::new(self.aperture.base_addr_1mb, LINEAR_1MB_SIZE)
                }
                else {
                    Window::new(self.aperture.linear_base, LINEAR_4MB_SIZE)
                });

                let vga_mapped_all = self.graphics_misc() & 0x0C == 0x0C;
                if vga_mapped_all && ((op_mode == 4 && self.on) || (op_mode == 0 && !self.on)) {
                    self.aperture.endian_reverse = true;
                }
            }
            _ => return,
        }

        trace!(
            self,
            "MAPPING aperture {} banked {:?} linear {:?} endian_reverse {}",
            self.ext.aperture_cntl,
            self.aperture.banked,
            self.aperture.linear,
            self.aperture.endian_reverse
        );
        self.aperture.mapping_dirty = true;
    }

    /// Translate a banked aperture address to a VRAM offset, or None if it falls outside VRAM.
    fn banked_offset(&self, address: usize) -> Option<usize> {
        let mut offset = ((address as u32) & self.aperture.banked_mask) as usize + self.aperture.bank as usize;
        if offset >= self.vram.size() {
            return None;
        }
        if self.ext.access_mode & 0x08 != 0 && self.ext.access_mode & 0x07 == 4 {
            offset ^= 1;
        }
        Some(offset)
    }

    fn linear_offset(&self, window: Window, address: usize) -> Option<usize> {
        let mut offset = (window.offset(address) & LINEAR_DECODE_MASK) as usize;
        if offset >= self.vram.size() {
            return None;
        }
        if self.aperture.endian_reverse
            && (self.ext.access_mode & 0x07 == 4 || self.ext.access_mode & 0x08 != 0)
            && self.accel.map(self.accel.command.dest_map()).format & 0x07 == 4
        {
            offset ^= 1;
        }
        Some(offset)
    }

    pub(crate) fn banked_read_u8(&mut self, address: usize) -> u8 {
        if !self.on {
            return match self.vga.as_mut() {
                Some(vga) => vga.mem_read(address),
                None => OPEN_BUS_BYTE,
            };
        }
        match self.banked_offset(address) {
            Some(offset) => self.vram.read_u8(offset),
            None => OPEN_BUS_BYTE,
        }
    }

    pub(crate) fn banked_write_u8(&mut self, address: usize, byte: u8) {
        if !self.on {
            if let Some(vga) = self.vga.as_mut() {
                vga.mem_write(address, byte);
            }
            return;
        }
        if let Some(offset) = self.banked_offset(address) {
            self.vram.write_u8(offset, byte);
        }
    }

    pub(crate) fn linear_read_u8(&mut self, window: Window, address: usize) -> u8 {
        if !self.on {
            return match self.vga.as_mut() {
                Some(vga) => vga.linear_read(address),
                None => OPEN_BUS_BYTE,
            };
        }
        match self.linear_offset(window, address) {
            Some(offset) => self.vram.read_u8(offset),
            None => OPEN_BUS_BYTE,
        }
    }

    pub(crate) fn linear_write_u8(&mut self, window: Window, address: usize, byte: u8) {
        if !self.on {
            if let Some(vga) = self.vga.as_mut() {
                vga.linear_write(address, byte);
            }
            return;
        }
        if let Some(offset) = self.linear_offset(window, address) {
            self.vram.write_u8(offset, byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::xga::{ext_regs::*, tests::mca_card};

    fn enable_display(card: &mut XgaCard) {
        card.ext_port_write(EXT_INDEX, REG_DISP_CNTL_2);
        card.ext_port_write(0x0B, 0x03);
    }

    #[test]
    fn aperture_control_selects_banked_window() {
        let mut card = mca_card();
        card.aperture.linear_base = 0x0040_0000;
        card.ext_port_write(EXT_OP_MODE, 0x04);

        card.ext_port_write(EXT_APERTURE_CNTL, 0x02);
        assert_eq!(card.aperture.banked, Some(Window::new(0xB0000, 0x10000)));
        assert_eq!(card.aperture.linear, None);
        assert!(card.take_mapping_dirty());
        assert!(!card.take_mapping_dirty());

        card.ext_port_write(EXT_APERTURE_CNTL, 0x00);
        assert_eq!(card.aperture.banked, Some(Window::new(0xA0000, 0x10000)));
        assert_eq!(card.aperture.linear, Some(Window::new(0x0040_0000, LINEAR_4MB_SIZE)));

        card.aperture.base_addr_1mb = 0x0030_0000;
        card.ext_port_write(EXT_APERTURE_CNTL, 0x00);
        assert_eq!(card.aperture.linear, Some(Window::new(0x0030_0000, LINEAR_1MB_SIZE)));
        assert_eq!(card.aperture.map_window_base(), 0x0030_0000);
    }

    #[test]
    fn vga_op_modes_leave_mapping_alone() {
        let mut card = mca_card();
        card.ext_port_write(EXT_OP_MODE, 0x01);
        card.ext_port_write(EXT_APERTURE_CNTL, 0x01);
        assert_eq!(card.aperture.banked, None);
        assert_eq!(card.ext.aperture_cntl, 0x01);
    }

    #[test]
    fn endian_reverse_latches_with_graphics_misc() {
        let mut card = mca_card();
        card.legacy.gdc_misc = 0x0C;
        card.ext_port_write(EXT_OP_MODE, 0x00);
        card.ext_port_write(EXT_APERTURE_CNTL, 0x00);
        assert!(card.endian_reverse());

        let mut card = mca_card();
        card.legacy.gdc_misc = 0x0C;
        card.ext_port_write(EXT_OP_MODE, 0x04);
        card.ext_port_write(EXT_APERTURE_CNTL, 0x00);
        assert!(!card.endian_reverse());
        enable_display(&mut card);
        card.ext_port_write(EXT_APERTURE_CNTL, 0x00);
        assert!(card.endian_reverse());
    }

    #[test]
    fn banked_access_uses_bank_and_marks_page() {
        let mut card = mca_card();
        enable_display(&mut card);
        card.ext_port_write(EXT_OP_MODE, 0x04);
        card.ext_port_write(EXT_APERTURE_CNTL, 0x01);
        card.ext_port_write(EXT_APERTURE_INDEX, 0x02);

        card.banked_write_u8(0xA0010, 0x5A);
        assert_eq!(card.vram()[0x2_0010], 0x5A);
        assert!(card.page_changed(0x20));
        assert_eq!(card.banked_read_u8(0xA0010), 0x5A);

        // Bank 0x10 lies beyond 1MB of VRAM.
        card.ext_port_write(EXT_APERTURE_INDEX, 0x10);
        card.banked_write_u8(0xA0000, 0x11);
        assert_eq!(card.banked_read_u8(0xA0000), 0xFF);
    }

    #[test]
    fn banked_motorola_mode_swaps_bytes() {
        let mut card = mca_card();
        enable_display(&mut card);
        card.ext_port_write(EXT_OP_MODE, 0x04);
        card.ext_port_write(EXT_APERTURE_CNTL, 0x01);
        card.ext_port_write(EXT_ACCESS_MODE, 0x0C);
        card.banked_write_u8(0xA0000, 0x12);
        assert_eq!(card.vram()[1], 0x12);
        assert_eq!(card.banked_read_u8(0xA0000), 0x12);
    }

    #[test]
    fn linear_access_is_relative_to_window() {
        let mut card = mca_card();
        enable_display(&mut card);
        let window = Window::new(0x0040_0000, LINEAR_4MB_SIZE);
        card.linear_write_u8(window, 0x0040_1234, 0x77);
        assert_eq!(card.vram()[0x1234], 0x77);
        assert_eq!(card.linear_read_u8(window, 0x0040_1234), 0x77);
        assert_eq!(card.linear_read_u8(window, 0x0050_0000), 0xFF);
    }

    #[test]
    fn display_off_without_vga_reads_open_bus() {
        let mut card = mca_card();
        card.banked_write_u8(0xA0000, 0x12);
        assert_eq!(card.vram()[0], 0);
        assert_eq!(card.banked_read_u8(0xA0000), 0xFF);
    }
}
