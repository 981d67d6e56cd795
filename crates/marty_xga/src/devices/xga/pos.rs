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

    devices::xga::pos.rs

    Programmable Option Select registers. The MCA card is configured by the
    system through POS; the ISA card emulates a subset at ports 0x100-0x10F.

*/

use super::*;

use super::aperture::Window;

pub const POS_PORT_BASE: u16 = 0x100;
pub const POS_MCA_PORT_COUNT: u16 = 8;
pub const POS_ISA_PORT_COUNT: u16 = 0x10;

pub const POS_ID_XGA: u8 = 0xDB;
pub const POS_ID_XGA2: u8 = 0xDA;
pub const POS_ID_HI: u8 = 0x8F;

/// Systems with at least this much memory need the 4MB aperture above 16MB.
pub const POS_HIGH_MEMORY_KIB: usize = 16384;

#[derive(Clone, Debug)]
pub struct PosRegisters {
    pub regs: [u8; 8],
    /// Instance decoded from POS register 2.
    pub instance: u8,
    /// Index for the integrated adapter's indexed POS views.
    pub pos_idx: u16,
    /// Instance most recently selected through ports 0x108-0x10F.
    pub instance_num: u8,
    pub isa_pos_enable: u8,
}

impl PosRegisters {
    pub fn new(xga_type: XgaType) -> Self {
        let mut regs = [0; 8];
        regs[0] = match xga_type {
            XgaType::Xga1 => POS_ID_XGA,
            XgaType::Xga2 => POS_ID_XGA2,
        };
        regs[1] = POS_ID_HI;
        Self {
            regs,
            instance: 0,
            pos_idx: 0,
            instance_num: 0,
            isa_pos_enable: 0,
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.regs[2] & 0x01 != 0
    }
}

impl XgaCard {
    /// Ports on which the extended function registers currently decode.
    #[inline]
    pub fn ext_port_base(&self) -> u16 {
        XGA_EXT_PORT_BASE + ((self.pos.instance as u16) << 4)
    }

    pub(crate) fn attach_mca(&mut self) {
        let rom_size = self.rom.len() as u32;
        self.aperture.rom_window = Some(Window::new(XGA_ROM_DEFAULT_ADDRESS, rom_size));
        self.aperture.mapping_dirty = true;
    }

    pub(crate) fn attach_isa(&mut self) {
        self.pos.regs[2] = 1 | (self.instance_isa << 1) | self.ext_mem_addr;
        self.pos.regs[4] = 1 | 2;
        self.decode_pos();
        self.aperture.ext_ports_enabled = true;

        self.aperture.rom_window = Some(if self.integrated_vga {
            Window::new(XGA_ROM_DEFAULT_ADDRESS, self.rom.len() as u32)
        }
        else {
            Window::new(self.aperture.rom_addr, XGA_ROM_SIZE as u32)
        });
        self.aperture.memio_window = Some(self.memio_window());
        self.aperture.mapping_dirty = true;
    }

    fn memio_window(&self) -> Window {
        Window::new(
            self.aperture.rom_addr + XGA_MEMIO_OFFSET + self.pos.instance as u32 * XGA_MEMIO_SIZE,
            XGA_MEMIO_SIZE,
        )
    }

    /// Derive instance, apertures and ROM address from the POS registers.
    fn decode_pos(&mut self) {
        let regs = self.pos.regs;
        self.pos.instance = (regs[2] & 0x0E) >> 1;
        self.aperture.base_addr_1mb = ((regs[5] & 0x0F) as u32) << 20;
        self.aperture.linear_base = (regs[4] & 0xFE) as u32 * 0x0100_0000 + ((self.pos.instance as u32) << 22);
        self.aperture.rom_addr = XGA_ROM_DEFAULT_ADDRESS + ((regs[2] & 0xF0) >> 4) as u32 * XGA_ROM_SIZE as u32;
    }

    pub fn mca_pos_read(&self, port: u16) -> u8 {
        let reg = (port & 0x07) as usize;
        let byte = self.pos.regs[reg];
        if reg == 3 {
            // The register window is always reported as enabled.
            byte | 0x01
        }
        else {
            byte
        }
    }

    pub fn mca_pos_write(&mut self, port: u16, data: u8) {
        if port < 0x102 {
            return;
        }

        self.aperture.ext_ports_enabled = false;
        self.aperture.unmap_rom();
        self.set_on(false);
        self.aperture.endian_reverse = false;

        self.pos.regs[(port & 0x07) as usize] = data;
        if self.pos.regs[4] & 0x01 == 0 && self.system_memory_kib >= POS_HIGH_MEMORY_KIB {
            self.pos.regs[4] |= 0x01;
        }

        if self.pos.enabled() {
            self.decode_pos();
            self.aperture.ext_ports_enabled = true;
            if self.pos.regs[3] & 0x01 != 0 {
                self.aperture.rom_window = Some(Window::new(self.aperture.rom_addr, XGA_ROM_SIZE as u32));
            }
            else {
                self.aperture.memio_window = Some(self.memio_window());
            }
            log::debug!(
                "XGA POS decode: instance {} linear {:08X} 1mb {:08X} ROM {:05X}",
                self.pos.instance,
                self.aperture.linear_base,
                self.aperture.base_addr_1mb,
                self.aperture.rom_addr
            );
        }
    }

    /// The card setup feedback bit.
    #[inline]
    pub fn mca_feedback(&self) -> u8 {
        self.pos.regs[2] & 0x01
    }

    pub fn mca_reset(&mut self) {
        self.set_on(false);
        self.mca_pos_write(0x102, 0);
    }

    /// Selecting an instance through 0x108-0x10F reports it back if it matches.
    fn isa_select_instance(&mut self, port: u16) -> u8 {
        self.pos.instance_num = (port & 0x07) as u8;
        let matched = if self.instance_isa == self.pos.instance_num {
            self.instance_isa
        }
        else {
            0
        };
        matched | self.pos.isa_pos_enable
    }

    pub fn isa_pos_read(&mut self, port: u16) -> u8 {
        if self.integrated_vga {
            match port {
                0x100 | 0x101 => {
                    if self.instance_isa == self.pos.instance_num {
                        self.pos.regs[(port & 0x07) as usize]
                    }
                    else {
                        NO_IO_BYTE
                    }
                }
                0x102 | 0x105 => self.pos.regs[(port & 0x07) as usize],
                0x103 => match self.pos.pos_idx & 0x03 {
                    0 => self.pos.regs[3],
                    _ => 0,
                },
                0x104 => match self.pos.pos_idx & 0x03 {
                    0 => self.pos.regs[4],
                    1 => self.pos.regs[0],
                    2 => self.pos.regs[1],
                    _ => 0,
                },
                0x106 => (self.pos.pos_idx >> 8) as u8,
                0x107 => self.pos.pos_idx as u8,
                0x108..=0x10F => self.isa_select_instance(port),
                _ => NO_IO_BYTE,
            }
        }
        else {
            match port {
                0x100 | 0x101 => self.pos.regs[(port & 0x07) as usize],
                0x103 => self.pos.regs[3] | 0x07 | (self.dma << 3),
                0x102 | 0x104..=0x107 => self.mca_pos_read(port),
                0x108..=0x10F => self.isa_select_instance(port),
                _ => NO_IO_BYTE,
            }
        }
    }

    pub fn isa_pos_write(&mut self, port: u16, data: u8) {
        match port {
            0x106 if self.integrated_vga => self.pos.pos_idx = (self.pos.pos_idx & 0x00FF) | (data as u16) << 8,
            0x107 if self.integrated_vga => self.pos.pos_idx = (self.pos.pos_idx & 0xFF00) | data as u16,
            0x108..=0x10F => {
                self.pos.instance_num = (port & 0x07) as u8;
                self.pos.isa_pos_enable = data & 0x08;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::xga::tests::{isa_card, mca_card, test_rom};

    #[test]
    fn mca_id_and_register_3() {
        let card = mca_card();
        assert_eq!(card.mca_pos_read(0x100), POS_ID_XGA);
        assert_eq!(card.mca_pos_read(0x101), POS_ID_HI);
        assert_eq!(card.mca_pos_read(0x103), 0x01);
        assert_eq!(card.mca_feedback(), 0);
        assert_eq!(card.aperture.rom_window, Some(Window::new(0xC0000, 0x2000)));
        assert!(!card.aperture.ext_ports_enabled);
    }

    #[test]
    fn mca_pos_write_decodes_windows() {
        let mut card = mca_card();
        card.mca_pos_write(0x100, 0x12);
        assert_eq!(card.pos.regs[0], POS_ID_XGA);

        card.mca_pos_write(0x104, 0x04);
        card.mca_pos_write(0x105, 0x03);
        // Enable, instance 2, ROM select 0xD.
        card.mca_pos_write(0x102, 0xD5);

        assert_eq!(card.mca_feedback(), 1);
        assert_eq!(card.pos.instance, 2);
        assert_eq!(card.aperture.linear_base, 0x0400_0000 + (2 << 22));
        assert_eq!(card.aperture.base_addr_1mb, 0x0030_0000);
        assert_eq!(card.aperture.rom_addr, 0xDA000);
        assert_eq!(card.aperture.rom_window, None);
        assert_eq!(card.aperture.memio_window, Some(Window::new(0xDA000 + 0x1C00 + 0x100, 0x80)));
        assert_eq!(card.ext_port_base(), 0x2120);
        assert!(card.aperture.ext_ports_enabled);

        card.mca_pos_write(0x103, 0x01);
        assert_eq!(card.aperture.rom_window, Some(Window::new(0xDA000, 0x2000)));
        assert_eq!(card.aperture.memio_window, None);
    }

    #[test]
    fn mca_high_memory_forces_4mb_aperture_bit() {
        let config = XgaConfig {
            system_memory_kib: 16384,
            ..Default::default()
        };
        let mut card = XgaCard::attach(&config, &test_rom(), TraceLogger::None).unwrap();
        card.mca_pos_write(0x104, 0x00);
        assert_eq!(card.pos.regs[4], 0x01);
    }

    #[test]
    fn mca_reset_disables_card() {
        let mut card = mca_card();
        card.mca_pos_write(0x102, 0x01);
        assert!(card.aperture.ext_ports_enabled);
        card.aperture.endian_reverse = true;
        card.mca_reset();
        assert_eq!(card.mca_feedback(), 0);
        assert!(!card.aperture.ext_ports_enabled);
        assert!(!card.endian_reverse());
        assert!(!card.is_on());
    }

    #[test]
    fn isa_attach_preprograms_pos() {
        let card = isa_card();
        assert_eq!(card.pos.regs[2], 0xFD);
        assert_eq!(card.pos.instance, 6);
        assert_eq!(card.aperture.linear_base, 0x0380_0000);
        assert_eq!(card.aperture.rom_addr, 0xDE000);
        assert_eq!(card.aperture.memio_window, Some(Window::new(0xDFF00, 0x80)));
        assert_eq!(card.ext_port_base(), 0x2160);
        assert!(card.aperture.ext_ports_enabled);
    }

    #[test]
    fn isa_pos_ports() {
        let mut card = isa_card();
        assert_eq!(card.isa_pos_read(0x100), POS_ID_XGA);
        // DMA channel 7 in bits 3-5, low bits forced.
        assert_eq!(card.isa_pos_read(0x103), 0x3F);
        assert_eq!(card.isa_pos_read(0x104), 0x03);

        assert_eq!(card.isa_pos_read(0x10E), 6);
        assert_eq!(card.isa_pos_read(0x10B), 0);
        card.isa_pos_write(0x10E, 0xFF);
        assert_eq!(card.isa_pos_read(0x10E), 0x0E);
    }

    #[test]
    fn integrated_pos_index_views() {
        let config = XgaConfig {
            bus: XgaBus::Isa,
            integrated_vga: true,
            ..Default::default()
        };
        let mut card = XgaCard::attach(&config, &test_rom(), TraceLogger::None).unwrap();
        assert_eq!(card.aperture.rom_window, Some(Window::new(0xC0000, 0x8000)));

        // Instance 0 is selected; the card is instance 6.
        assert_eq!(card.isa_pos_read(0x100), 0xFF);
        card.isa_pos_read(0x10E);
        assert_eq!(card.isa_pos_read(0x100), POS_ID_XGA);

        card.isa_pos_write(0x106, 0x00);
        card.isa_pos_write(0x107, 0x01);
        assert_eq!(card.isa_pos_read(0x104), POS_ID_XGA);
        assert_eq!(card.isa_pos_read(0x103), 0);
        card.isa_pos_write(0x107, 0x02);
        assert_eq!(card.isa_pos_read(0x104), POS_ID_HI);
        assert_eq!(card.isa_pos_read(0x107), 0x02);
    }
}
