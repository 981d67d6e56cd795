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

    devices::xga::vga_compat.rs

    VGA compatibility. The card guards the legacy CRTC registers and shadows
    the few VGA registers it depends on; everything else goes to an attached
    VgaPassthrough.

*/

use super::*;

pub const VGA_PORT_FIRST: u16 = 0x3B0;
pub const VGA_PORT_LAST: u16 = 0x3DF;
pub const VGA_MISC_OUTPUT_W: u16 = 0x3C2;
pub const VGA_MISC_OUTPUT_R: u16 = 0x3CC;
pub const VGA_GDC_INDEX: u16 = 0x3CE;
pub const VGA_GDC_DATA: u16 = 0x3CF;
pub const VGA_CRTC_INDEX: u16 = 0x3D4;
pub const VGA_CRTC_DATA: u16 = 0x3D5;

pub const GDC_MISC: u8 = 0x06;
pub const CRTC_OVERFLOW: usize = 0x07;
pub const CRTC_VSYNC_END: usize = 0x11;

/// A VGA that owns legacy display memory and registers while the extended display is off.
pub trait VgaPassthrough {
    fn io_read(&mut self, port: u16) -> u8;
    fn io_write(&mut self, port: u16, data: u8);
    fn mem_read(&mut self, address: usize) -> u8;
    fn mem_write(&mut self, address: usize, data: u8);
    fn linear_read(&mut self, address: usize) -> u8 {
        self.mem_read(address)
    }
    fn linear_write(&mut self, address: usize, data: u8) {
        self.mem_write(address, data)
    }
    /// The extended display took over (false) or released (true) the screen.
    fn set_enabled(&mut self, enabled: bool);
    /// Current Graphics Controller Miscellaneous register.
    fn graphics_misc(&self) -> u8;
}

pub enum LegacyWrite {
    Consumed,
    Forward(u8),
}

#[derive(Clone, Debug)]
pub struct LegacyCrtcGuard {
    pub miscout: u8,
    pub crtcreg: u8,
    pub crtc: [u8; 64],
    pub gdc_index: u8,
    pub gdc_misc: u8,
}

impl Default for LegacyCrtcGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyCrtcGuard {
    pub fn new() -> Self {
        Self {
            miscout: 0x01,
            crtcreg: 0,
            crtc: [0; 64],
            gdc_index: 0,
            gdc_misc: 0,
        }
    }

    /// In monochrome addressing the 0x3Dx and 0x3Bx blocks trade places.
    pub fn remap_port(&self, port: u16) -> u16 {
        let block = port & 0xFFF0;
        if (block == 0x3D0 || block == 0x3B0) && self.miscout & 0x01 == 0 {
            port ^ 0x60
        }
        else {
            port
        }
    }

    fn locked(&self) -> bool {
        self.crtc[CRTC_VSYNC_END] & 0x80 != 0
    }

    pub fn write(&mut self, port: u16, data: u8) -> LegacyWrite {
        match port {
            VGA_CRTC_INDEX => {
                self.crtcreg = data & 0x3F;
            }
            VGA_CRTC_DATA => {
                let reg = self.crtcreg as usize;
                if reg & 0x20 != 0 {
                    return LegacyWrite::Consumed;
                }
                if reg < CRTC_OVERFLOW && self.locked() {
                    return LegacyWrite::Consumed;
                }
                let data = if reg == CRTC_OVERFLOW && self.locked() {
                    (self.crtc[CRTC_OVERFLOW] & !0x10) | (data & 0x10)
                }
                else {
                    data
                };
                self.crtc[reg] = data;
                return LegacyWrite::Forward(data);
            }
            VGA_MISC_OUTPUT_W => self.miscout = data,
            VGA_GDC_INDEX => self.gdc_index = data,
            VGA_GDC_DATA if self.gdc_index & 0x0F == GDC_MISC => self.gdc_misc = data,
            _ => {}
        }
        LegacyWrite::Forward(data)
    }

    /// Registers the guard answers itself. Everything else reads from the VGA.
    pub fn read(&self, port: u16) -> Option<u8> {
        match port {
            VGA_CRTC_INDEX => Some(self.crtcreg),
            VGA_CRTC_DATA if self.crtcreg & 0x20 != 0 => Some(NO_IO_BYTE),
            VGA_CRTC_DATA => Some(self.crtc[self.crtcreg as usize]),
            _ => None,
        }
    }
}

impl XgaCard {
    pub(crate) fn legacy_io_write(&mut self, port: u16, data: u8) {
        let port = self.legacy.remap_port(port);
        if let LegacyWrite::Forward(data) = self.legacy.write(port, data) {
            if let Some(vga) = self.vga.as_mut() {
                vga.io_write(port, data);
            }
        }
    }

    pub(crate) fn legacy_io_read(&mut self, port: u16) -> u8 {
        let port = self.legacy.remap_port(port);
        if let Some(byte) = self.legacy.read(port) {
            return byte;
        }
        match self.vga.as_mut() {
            Some(vga) => vga.io_read(port),
            None => NO_IO_BYTE,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::devices::xga::tests::mca_card;
    use std::{cell::RefCell, rc::Rc};

    #[derive(Default)]
    pub(crate) struct VgaLog {
        pub io_writes: Vec<(u16, u8)>,
        pub mem_writes: Vec<(usize, u8)>,
        pub enabled: Option<bool>,
    }

    pub(crate) struct MockVga {
        pub log: Rc<RefCell<VgaLog>>,
        pub gdc_misc: u8,
    }

    impl VgaPassthrough for MockVga {
        fn io_read(&mut self, port: u16) -> u8 {
            (port & 0xFF) as u8
        }
        fn io_write(&mut self, port: u16, data: u8) {
            self.log.borrow_mut().io_writes.push((port, data));
        }
        fn mem_read(&mut self, address: usize) -> u8 {
            (address & 0xFF) as u8
        }
        fn mem_write(&mut self, address: usize, data: u8) {
            self.log.borrow_mut().mem_writes.push((address, data));
        }
        fn set_enabled(&mut self, enabled: bool) {
            self.log.borrow_mut().enabled = Some(enabled);
        }
        fn graphics_misc(&self) -> u8 {
            self.gdc_misc
        }
    }

    pub(crate) fn attach_mock(card: &mut XgaCard, gdc_misc: u8) -> Rc<RefCell<VgaLog>> {
        let log = Rc::new(RefCell::new(VgaLog::default()));
        card.set_vga_passthrough(Box::new(MockVga {
            log: log.clone(),
            gdc_misc,
        }));
        log
    }

    #[test]
    fn crtc_lock_protects_low_registers() {
        let mut card = mca_card();
        let log = attach_mock(&mut card, 0);

        card.legacy_io_write(0x3D4, 0x11);
        card.legacy_io_write(0x3D5, 0x80);
        card.legacy_io_write(0x3D4, 0x02);
        card.legacy_io_write(0x3D5, 0x55);
        assert_eq!(card.legacy.crtc[2], 0);

        card.legacy_io_write(0x3D4, 0x07);
        card.legacy_io_write(0x3D5, 0xFF);
        assert_eq!(card.legacy.crtc[7], 0x10);
        assert_eq!(card.legacy_io_read(0x3D5), 0x10);

        let writes = &log.borrow().io_writes;
        assert!(!writes.contains(&(0x3D5, 0x55)));
        assert!(writes.contains(&(0x3D5, 0x10)));
    }

    #[test]
    fn crtc_index_bit_5_is_unimplemented() {
        let mut card = mca_card();
        card.legacy_io_write(0x3D4, 0xE1);
        assert_eq!(card.legacy_io_read(0x3D4), 0x21);
        card.legacy_io_write(0x3D5, 0x12);
        assert_eq!(card.legacy_io_read(0x3D5), 0xFF);
    }

    #[test]
    fn monochrome_addressing_swaps_port_blocks() {
        let mut card = mca_card();
        let log = attach_mock(&mut card, 0);
        card.legacy_io_write(0x3C2, 0x00);
        card.legacy_io_write(0x3B4, 0x0A);
        assert_eq!(card.legacy.crtcreg, 0x0A);
        // 0x3DA maps to 0x3BA, answered by the VGA.
        assert_eq!(card.legacy_io_read(0x3DA), 0xBA);
        assert!(log.borrow().io_writes.contains(&(0x3C2, 0x00)));
    }

    #[test]
    fn graphics_misc_is_shadowed() {
        let mut card = mca_card();
        card.legacy_io_write(0x3CE, 0x06);
        card.legacy_io_write(0x3CF, 0x0C);
        assert_eq!(card.legacy.gdc_misc, 0x0C);
        card.legacy_io_write(0x3CE, 0x05);
        card.legacy_io_write(0x3CF, 0x40);
        assert_eq!(card.legacy.gdc_misc, 0x0C);
    }

    #[test]
    fn display_on_toggles_vga() {
        let mut card = mca_card();
        let log = attach_mock(&mut card, 0);
        card.ext_port_write(ext_regs::EXT_INDEX, ext_regs::REG_DISP_CNTL_2);
        card.ext_port_write(0x0B, 0x03);
        assert_eq!(log.borrow().enabled, Some(false));
        card.ext_port_write(0x0B, 0x00);
        assert_eq!(log.borrow().enabled, Some(true));
    }

    #[test]
    fn memory_goes_to_vga_while_off() {
        let mut card = mca_card();
        let log = attach_mock(&mut card, 0);
        card.banked_write_u8(0xA0004, 0x77);
        assert_eq!(log.borrow().mem_writes, vec![(0xA0004, 0x77)]);
        assert_eq!(card.banked_read_u8(0xA0042), 0x42);
    }

    #[test]
    fn standalone_card_reads_graphics_misc_from_vga() {
        let mut card = mca_card();
        attach_mock(&mut card, 0x0C);
        card.ext_port_write(ext_regs::EXT_APERTURE_CNTL, 0x00);
        assert!(card.endian_reverse());
    }
}
