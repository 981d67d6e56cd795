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

    devices::xga::mmio.rs

    Memory-mapped access to the XGA's register window, boot ROM and display
    apertures.

*/

use super::*;

use crate::bus::MemoryMappedDevice;
use super::aperture::Window;
use super::vram::AccessWidth;

/// Which of the card's windows decodes an address. The register window is checked first as it
/// sits inside the ROM window.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Target {
    Memio(u32),
    Rom(usize),
    Banked,
    Linear(Window),
    None,
}

impl XgaCard {
    fn decode(&self, address: usize) -> Target {
        let ap = &self.aperture;
        if let Some(window) = ap.memio_window.filter(|w| w.contains(address)) {
            return Target::Memio(window.offset(address));
        }
        if let Some(window) = ap.rom_window.filter(|w| w.contains(address)) {
            return Target::Rom(window.offset(address) as usize & (self.rom.len() - 1));
        }
        if ap.banked.is_some_and(|w| w.contains(address)) {
            return Target::Banked;
        }
        if let Some(window) = ap.linear.filter(|w| w.contains(address)) {
            return Target::Linear(window);
        }
        Target::None
    }

    fn read_byte(&mut self, address: usize) -> u8 {
        match self.decode(address) {
            Target::Memio(offset) => self.accel.read_register(offset),
            Target::Rom(offset) => self.rom[offset],
            Target::Banked => self.banked_read_u8(address),
            Target::Linear(window) => self.linear_read_u8(window, address),
            Target::None => OPEN_BUS_BYTE,
        }
    }

    fn peek_byte(&self, address: usize) -> u8 {
        match self.decode(address) {
            Target::Memio(offset) => self.accel.read_register(offset),
            Target::Rom(offset) => self.rom[offset],
            Target::Banked if self.on => {
                let offset = ((address as u32) & self.aperture.banked_mask) as usize + self.aperture.bank as usize;
                if offset < self.vram.size() {
                    self.vram.read_u8(offset)
                }
                else {
                    OPEN_BUS_BYTE
                }
            }
            Target::Linear(window) if self.on => {
                let offset = (window.offset(address) & aperture::LINEAR_DECODE_MASK) as usize;
                if offset < self.vram.size() {
                    self.vram.read_u8(offset)
                }
                else {
                    OPEN_BUS_BYTE
                }
            }
            _ => OPEN_BUS_BYTE,
        }
    }

    fn write_byte(&mut self, address: usize, data: u8) {
        match self.decode(address) {
            Target::Banked => self.banked_write_u8(address, data),
            Target::Linear(window) => self.linear_write_u8(window, address, data),
            _ => {}
        }
    }

    /// Write `width` bytes of `data`. Register window writes are delivered whole so that the
    /// access width can trigger a command.
    fn write_wide(&mut self, address: usize, data: u32, width: AccessWidth, host: Option<&mut [u8]>) {
        if let Target::Memio(offset) = self.decode(address) {
            #[cfg(feature = "xga_trace")]
            trace!(self, "MEMIO W{} {:02X} <- {:08X}", width.bytes(), offset, data);
            self.write_accel_register(offset, data, width.bytes() as u32, host);
            return;
        }
        vram::write_le(width, data, |i, byte| self.write_byte(address + i, byte));
    }

    fn read_wide(&mut self, address: usize, width: AccessWidth) -> u32 {
        vram::read_le(width, |i| self.read_byte(address + i))
    }
}

impl MemoryMappedDevice for XgaCard {
    fn get_read_wait(&mut self, _address: usize, _cycles: u32) -> u32 {
        self.timings.read[0]
    }

    fn mmio_read_u8(&mut self, address: usize, _cycles: u32, _cpumem: Option<&[u8]>) -> (u8, u32) {
        (self.read_byte(address), self.timings.read[0])
    }

    fn mmio_read_u16(&mut self, address: usize, _cycles: u32, _cpumem: Option<&[u8]>) -> (u16, u32) {
        (self.read_wide(address, AccessWidth::Word) as u16, self.timings.read[1])
    }

    fn mmio_read_u32(&mut self, address: usize, _cycles: u32, _cpumem: Option<&[u8]>) -> (u32, u32) {
        (self.read_wide(address, AccessWidth::Dword), self.timings.read[2])
    }

    fn mmio_peek_u8(&self, address: usize, _cpumem: Option<&[u8]>) -> u8 {
        self.peek_byte(address)
    }

    fn mmio_peek_u16(&self, address: usize, _cpumem: Option<&[u8]>) -> u16 {
        u16::from_le_bytes([self.peek_byte(address), self.peek_byte(address + 1)])
    }

    fn get_write_wait(&mut self, _address: usize, _cycles: u32) -> u32 {
        self.timings.write[0]
    }

    fn mmio_write_u8(&mut self, address: usize, data: u8, _cycles: u32, cpumem: Option<&mut [u8]>) -> u32 {
        self.write_wide(address, data as u32, AccessWidth::Byte, cpumem);
        self.timings.write[0]
    }

    fn mmio_write_u16(&mut self, address: usize, data: u16, _cycles: u32, cpumem: Option<&mut [u8]>) -> u32 {
        self.write_wide(address, data as u32, AccessWidth::Word, cpumem);
        self.timings.write[1]
    }

    fn mmio_write_u32(&mut self, address: usize, data: u32, _cycles: u32, cpumem: Option<&mut [u8]>) -> u32 {
        self.write_wide(address, data, AccessWidth::Dword, cpumem);
        self.timings.write[2]
    }

    fn get_mapping(&self) -> Vec<MemRangeDescriptor> {
        self.mapping()
    }
}
