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

    devices::xga::io.rs

    Port I/O dispatch for the XGA.

*/

use super::*;

use crate::bus::{IoDevice, NO_IO_BYTE};
use super::pos::{POS_ISA_PORT_COUNT, POS_MCA_PORT_COUNT, POS_PORT_BASE};
use super::vga_compat::{VGA_PORT_FIRST, VGA_PORT_LAST};

impl XgaCard {
    #[inline]
    fn is_ext_port(&self, port: u16) -> bool {
        let base = self.ext_port_base();
        self.aperture.ext_ports_enabled && port >= base && port < base + XGA_EXT_PORT_COUNT
    }

    #[inline]
    fn is_pos_port(&self, port: u16) -> bool {
        let count = match self.bus {
            XgaBus::Mca => POS_MCA_PORT_COUNT,
            XgaBus::Isa => POS_ISA_PORT_COUNT,
        };
        port >= POS_PORT_BASE && port < POS_PORT_BASE + count
    }

    /// Legacy VGA ports are serviced when a VGA sits behind the card.
    #[inline]
    fn services_legacy_ports(&self) -> bool {
        self.integrated_vga || self.vga.is_some()
    }
}

impl IoDevice for XgaCard {
    fn read_u8(&mut self, port: u16, _delta: DeviceRunTimeUnit) -> u8 {
        if self.is_ext_port(port) {
            let byte = self.ext_port_read(port & 0x0F);
            #[cfg(feature = "xga_trace")]
            trace!(self, "IN  {:04X} -> {:02X}", port, byte);
            byte
        }
        else if self.is_pos_port(port) {
            match self.bus {
                XgaBus::Mca => self.mca_pos_read(port),
                XgaBus::Isa => self.isa_pos_read(port),
            }
        }
        else if (VGA_PORT_FIRST..=VGA_PORT_LAST).contains(&port) && self.services_legacy_ports() {
            self.legacy_io_read(port)
        }
        else {
            NO_IO_BYTE
        }
    }

    fn write_u8(&mut self, port: u16, data: u8, _delta: DeviceRunTimeUnit) {
        if self.is_ext_port(port) {
            #[cfg(feature = "xga_trace")]
            trace!(self, "OUT {:04X} <- {:02X}", port, data);
            self.ext_port_write(port & 0x0F, data);
        }
        else if self.is_pos_port(port) {
            match self.bus {
                XgaBus::Mca => self.mca_pos_write(port, data),
                XgaBus::Isa => self.isa_pos_write(port, data),
            }
        }
        else if (VGA_PORT_FIRST..=VGA_PORT_LAST).contains(&port) && self.services_legacy_ports() {
            self.legacy_io_write(port, data);
        }
    }

    fn port_list(&self) -> Vec<(String, u16)> {
        let mut ports = Vec::new();

        let pos_count = match self.bus {
            XgaBus::Mca => POS_MCA_PORT_COUNT,
            XgaBus::Isa => POS_ISA_PORT_COUNT,
        };
        ports.extend((0..pos_count).map(|i| (format!("XGA POS {}", i), POS_PORT_BASE + i)));

        if self.aperture.ext_ports_enabled {
            let base = self.ext_port_base();
            ports.extend([
                ("XGA Operating Mode".to_string(), base),
                ("XGA Aperture Control".to_string(), base + 1),
                ("XGA Interrupt Status".to_string(), base + 4),
                ("XGA Aperture Index".to_string(), base + 8),
                ("XGA Memory Access Mode".to_string(), base + 9),
                ("XGA Index".to_string(), base + 0x0A),
            ]);
            ports.extend((0x0B..XGA_EXT_PORT_COUNT).map(|i| (format!("XGA Data {:X}", i - 0x0B), base + i)));
        }

        if self.services_legacy_ports() {
            ports.extend((VGA_PORT_FIRST..=VGA_PORT_LAST).map(|p| (format!("VGA {:03X}", p), p)));
        }
        ports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::xga::{
        tests::{isa_card, mca_card},
        vga_compat::tests::attach_mock,
    };

    const DELTA: DeviceRunTimeUnit = DeviceRunTimeUnit::SystemTicks(0);

    #[test]
    fn ext_ports_follow_instance() {
        let mut card = isa_card();
        card.write_u8(0x216A, 0x52, DELTA);
        assert_eq!(card.read_u8(0x216B, DELTA), 0xEA);
        // Another instance's ports are not decoded.
        assert_eq!(card.read_u8(0x210A, DELTA), NO_IO_BYTE);
    }

    #[test]
    fn mca_ext_ports_need_pos_enable() {
        let mut card = mca_card();
        card.write_u8(0x210A, 0x52, DELTA);
        assert_eq!(card.read_u8(0x210B, DELTA), NO_IO_BYTE);

        card.write_u8(0x102, 0x01, DELTA);
        card.write_u8(0x210A, 0x52, DELTA);
        assert_eq!(card.read_u8(0x210B, DELTA), 0xEA);
        assert_eq!(card.read_u8(0x100, DELTA), 0xDB);
    }

    #[test]
    fn port_list_reflects_configuration() {
        let card = mca_card();
        let ports = card.port_list();
        assert_eq!(ports.len(), 8);

        let mut card = isa_card();
        let ports: Vec<u16> = card.port_list().into_iter().map(|(_, p)| p).collect();
        assert!(ports.contains(&0x10F));
        assert!(ports.contains(&0x216F));
        assert!(!ports.contains(&0x3D4));

        attach_mock(&mut card, 0);
        let ports: Vec<u16> = card.port_list().into_iter().map(|(_, p)| p).collect();
        assert!(ports.contains(&0x3D4));
    }
}
