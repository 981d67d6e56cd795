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

    bus.rs

    Bus-facing traits and types implemented by the XGA core. The host
    emulator owns port and memory dispatch; the card answers through these
    traits.

*/

pub const NO_IO_BYTE: u8 = 0xFF; // This is the byte read from a unconnected IO address.
pub const OPEN_BUS_BYTE: u8 = 0xFF; // This is the byte read from an unmapped memory address.

#[derive(Copy, Clone, Debug)]
pub enum DeviceRunTimeUnit {
    SystemTicks(u32),
    Microseconds(f64),
}

#[derive(Clone, Debug)]
pub struct MemRangeDescriptor {
    pub address: usize,
    pub size: usize,
    pub cycle_cost: u32,
    pub read_only: bool,
    pub priority: u32,
}

impl MemRangeDescriptor {
    pub fn new(address: usize, size: usize, read_only: bool) -> Self {
        Self {
            address,
            size,
            cycle_cost: 0,
            read_only,
            priority: 1,
        }
    }
}

pub trait IoDevice {
    /// Read a byte from the specified port, given a delta time that may be used to 'catch up'
    /// the device state. The default implementation returns NO_IO_BYTE (0xFF).
    fn read_u8(&mut self, _port: u16, _delta: DeviceRunTimeUnit) -> u8 {
        NO_IO_BYTE
    }

    /// Write a byte to the specified port. The default implementation does nothing.
    fn write_u8(&mut self, _port: u16, _data: u8, _delta: DeviceRunTimeUnit) {}

    /// Return the number of waits (in system ticks) to be incurred by an immediate read from the
    /// specified port.
    fn read_wait(&mut self, _port: u16, _delta: DeviceRunTimeUnit) -> u32 {
        0
    }

    /// Return the number of waits (in system ticks) to be incurred by an immediate write to the
    /// specified port.
    fn write_wait(&mut self, _port: u16, _delta: DeviceRunTimeUnit) -> u32 {
        0
    }

    /// Return a list of ports the device should service, comprised of a vector of tuples of
    /// (port description, port number).
    fn port_list(&self) -> Vec<(String, u16)>;
}

/// A device that responds to memory accesses. `cpumem` is the host's system memory, used by
/// devices that may read or write physical memory outside of their own address space.
pub trait MemoryMappedDevice {
    fn get_read_wait(&mut self, address: usize, cycles: u32) -> u32;
    fn mmio_read_u8(&mut self, address: usize, cycles: u32, cpumem: Option<&[u8]>) -> (u8, u32);
    fn mmio_read_u16(&mut self, address: usize, cycles: u32, cpumem: Option<&[u8]>) -> (u16, u32);
    fn mmio_read_u32(&mut self, address: usize, cycles: u32, cpumem: Option<&[u8]>) -> (u32, u32) {
        let (lo_word, wait1) = self.mmio_read_u16(address, cycles, cpumem);
        let (ho_word, wait2) = self.mmio_read_u16(address + 2, cycles, cpumem);
        ((ho_word as u32) << 16 | lo_word as u32, wait1 + wait2)
    }
    fn mmio_peek_u8(&self, address: usize, cpumem: Option<&[u8]>) -> u8;
    fn mmio_peek_u16(&self, address: usize, cpumem: Option<&[u8]>) -> u16;

    fn get_write_wait(&mut self, address: usize, cycles: u32) -> u32;
    fn mmio_write_u8(&mut self, address: usize, data: u8, cycles: u32, cpumem: Option<&mut [u8]>) -> u32;
    fn mmio_write_u16(&mut self, address: usize, data: u16, cycles: u32, cpumem: Option<&mut [u8]>) -> u32;
    fn mmio_write_u32(&mut self, address: usize, data: u32, cycles: u32, mut cpumem: Option<&mut [u8]>) -> u32 {
        let wait1 = self.mmio_write_u16(address, data as u16, cycles, cpumem.as_deref_mut());
        let wait2 = self.mmio_write_u16(address + 2, (data >> 16) as u16, cycles, cpumem);
        wait1 + wait2
    }

    /// Return the list of address ranges this device currently decodes.
    fn get_mapping(&self) -> Vec<MemRangeDescriptor>;
}
