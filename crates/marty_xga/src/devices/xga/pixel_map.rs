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

    devices::xga::pixel_map.rs

    Pixel map descriptors and pixel addressing for coprocessor operations.
    A map whose base lies inside the card's 1MB window addresses private
    VRAM; any other map is read from and written to host memory.

*/

use crate::devices::xga::vram::VideoMemory;

pub const MAP_WINDOW_SIZE: u32 = 0x100000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelDepth {
    Bpp1,
    Bpp8,
    Bpp16,
    Unsupported(u8),
}

#[derive(Copy, Clone, Debug, Default)]
pub struct PixelMap {
    pub base:   u32,
    pub width:  u16,
    pub height: u16,
    pub format: u8,
}

impl PixelMap {
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        match self.format & 0x07 {
            0 => PixelDepth::Bpp1,
            3 => PixelDepth::Bpp8,
            4 => PixelDepth::Bpp16,
            n => PixelDepth::Unsupported(n),
        }
    }

    #[inline]
    pub fn packed(&self) -> bool {
        self.format & 0x08 != 0
    }

    /// The width register holds the last pixel index, so a row is one pixel wider.
    #[inline]
    pub fn row_pixels(&self) -> i32 {
        self.width as i32 + 1
    }
}

/// Card state that affects how map pixels are located.
#[derive(Copy, Clone, Debug, Default)]
pub struct MapAddressing {
    pub endian_reverse: bool,
    pub access_mode: u8,
    pub window_base: u32,
}

impl MapAddressing {
    #[inline]
    pub fn in_window(&self, base: u32) -> bool {
        base >= self.window_base && (base as u64) <= self.window_base as u64 + (MAP_WINDOW_SIZE as u64 - 1)
    }

    /// Bit index of pixel `x` within its byte for a 1bpp map.
    #[inline]
    fn bit_index(&self, map: &PixelMap, x: i32) -> u32 {
        if self.endian_reverse {
            7 - (x & 7) as u32
        }
        else if map.packed() && (self.access_mode & 0x08 == 0) {
            (x & 7) as u32
        }
        else {
            7 - (x & 7) as u32
        }
    }

    #[inline]
    fn swap_words(&self) -> bool {
        self.endian_reverse && ((self.access_mode & 0x07) == 4 || (self.access_mode & 0x08) != 0)
    }
}

/// Memory visible to a coprocessor operation: the card's VRAM and, optionally, host memory.
pub struct MapMemory<'a> {
    pub vram: &'a mut VideoMemory,
    pub host: Option<&'a mut [u8]>,
}

impl<'a> MapMemory<'a> {
    pub fn new(vram: &'a mut VideoMemory, host: Option<&'a mut [u8]>) -> Self {
        Self { vram, host }
    }

    fn read_byte(&self, private: bool, address: u32) -> u8 {
        if private {
            self.vram.read_u8(address as usize)
        }
        else {
            self.host
                .as_ref()
                .and_then(|mem| mem.get(address as usize).copied())
                .unwrap_or(0xFF)
        }
    }

    fn write_byte(&mut self, private: bool, address: u32, byte: u8) {
        if private {
            self.vram.write_u8(address as usize, byte);
        }
        else if let Some(slot) = self.host.as_mut().and_then(|mem| mem.get_mut(address as usize)) {
            *slot = byte;
        }
    }

    #[inline]
    fn offset(base: u32, row_bytes: i32, x_bytes: i32, y: i32) -> u32 {
        base.wrapping_add(y.wrapping_mul(row_bytes) as u32)
            .wrapping_add(x_bytes as u32)
    }

    pub fn read_pixel(&self, mode: &MapAddressing, map: &PixelMap, x: i32, y: i32) -> u32 {
        let private = mode.in_window(map.base);
        let w = map.row_pixels();
        match map.depth() {
            PixelDepth::Bpp1 => self.read_bit(mode, map, private, x, y),
            PixelDepth::Bpp8 => self.read_byte(private, Self::offset(map.base, w, x, y)) as u32,
            PixelDepth::Bpp16 => {
                let address = Self::offset(map.base, w << 1, x << 1, y);
                let word =
                    self.read_byte(private, address) as u32 | (self.read_byte(private, address.wrapping_add(1)) as u32) << 8;
                if mode.swap_words() {
                    word.swap_bytes() >> 16
                }
                else {
                    word
                }
            }
            PixelDepth::Unsupported(_) => 0,
        }
    }

    /// Pattern maps are always addressed as 1bpp, whatever their format says.
    pub fn read_pattern_pixel(&self, mode: &MapAddressing, map: &PixelMap, x: i32, y: i32) -> u32 {
        self.read_bit(mode, map, mode.in_window(map.base), x, y)
    }

    fn read_bit(&self, mode: &MapAddressing, map: &PixelMap, private: bool, x: i32, y: i32) -> u32 {
        let address = Self::offset(map.base, map.row_pixels() >> 3, x >> 3, y);
        let byte = self.read_byte(private, address);
        ((byte >> mode.bit_index(map, x)) & 1) as u32
    }

    pub fn write_pixel(&mut self, mode: &MapAddressing, map: &PixelMap, x: i32, y: i32, pixel: u32) {
        let private = mode.in_window(map.base);
        let w = map.row_pixels();
        match map.depth() {
            PixelDepth::Bpp1 => {
                let address = Self::offset(map.base, w >> 3, x >> 3, y);
                let mask = 1u8 << mode.bit_index(map, x);
                let byte = self.read_byte(private, address);
                let byte = if pixel & 1 != 0 { byte | mask } else { byte & !mask };
                self.write_byte(private, address, byte);
            }
            PixelDepth::Bpp8 => {
                self.write_byte(private, Self::offset(map.base, w, x, y), pixel as u8);
            }
            PixelDepth::Bpp16 => {
                let address = Self::offset(map.base, w << 1, x << 1, y);
                let word = if mode.swap_words() {
                    (pixel as u16).swap_bytes()
                }
                else {
                    pixel as u16
                };
                self.write_byte(private, address, word as u8);
                self.write_byte(private, address.wrapping_add(1), (word >> 8) as u8);
            }
            PixelDepth::Unsupported(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode() -> MapAddressing {
        MapAddressing {
            endian_reverse: false,
            access_mode: 0,
            window_base: 0,
        }
    }

    #[test]
    fn bpp8_pixels_address_rows() {
        let mut vram = VideoMemory::new(0x100000);
        let map = PixelMap {
            base: 0x1000,
            width: 639,
            height: 479,
            format: 0x03,
        };
        let mut mem = MapMemory::new(&mut vram, None);
        mem.write_pixel(&mode(), &map, 3, 2, 0x7E);
        assert_eq!(mem.read_pixel(&mode(), &map, 3, 2), 0x7E);
        assert_eq!(vram.read_u8(0x1000 + 2 * 640 + 3), 0x7E);
    }

    #[test]
    fn bpp1_bit_order_follows_packing() {
        let mut vram = VideoMemory::new(0x100000);
        let planar = PixelMap {
            base: 0,
            width: 15,
            height: 0,
            format: 0x00,
        };
        let packed = PixelMap { format: 0x08, ..planar };
        let mut mem = MapMemory::new(&mut vram, None);

        mem.write_pixel(&mode(), &planar, 0, 0, 1);
        assert_eq!(mem.vram.read_u8(0), 0x80);
        mem.write_pixel(&mode(), &packed, 9, 0, 1);
        assert_eq!(mem.vram.read_u8(1), 0x02);
        assert_eq!(mem.read_pattern_pixel(&mode(), &packed, 9, 0), 1);
        assert_eq!(mem.read_pixel(&mode(), &planar, 9, 0), 0);
    }

    #[test]
    fn bpp16_swaps_in_motorola_mode() {
        let mut vram = VideoMemory::new(0x100000);
        let map = PixelMap {
            base: 0,
            width: 7,
            height: 0,
            format: 0x04,
        };
        let swapped = MapAddressing {
            endian_reverse: true,
            access_mode: 0x04,
            window_base: 0,
        };
        let mut mem = MapMemory::new(&mut vram, None);
        mem.write_pixel(&swapped, &map, 1, 0, 0x1234);
        assert_eq!(mem.vram.read_u8(2), 0x12);
        assert_eq!(mem.vram.read_u8(3), 0x34);
        assert_eq!(mem.read_pixel(&swapped, &map, 1, 0), 0x1234);
        assert_eq!(mem.read_pixel(&mode(), &map, 1, 0), 0x3412);
    }

    #[test]
    fn maps_outside_window_use_host_memory() {
        let mut vram = VideoMemory::new(0x100000);
        let mut host = vec![0u8; 0x300000];
        let map = PixelMap {
            base: 0x200000,
            width: 3,
            height: 0,
            format: 0x03,
        };
        {
            let mut mem = MapMemory::new(&mut vram, Some(host.as_mut_slice()));
            mem.write_pixel(&mode(), &map, 1, 0, 0x99);
        }
        assert_eq!(host[0x200001], 0x99);
        assert_eq!(vram.read_u8(1), 0);

        let mem = MapMemory::new(&mut vram, None);
        assert_eq!(mem.read_pixel(&mode(), &map, 1, 0), 0xFF);
    }

    #[test]
    fn unsupported_formats_read_zero() {
        let mut vram = VideoMemory::new(0x100000);
        let map = PixelMap {
            base: 0,
            width: 7,
            height: 0,
            format: 0x02,
        };
        let mut mem = MapMemory::new(&mut vram, None);
        mem.write_pixel(&mode(), &map, 0, 0, 0xFF);
        assert_eq!(mem.read_pixel(&mode(), &map, 0, 0), 0);
        assert_eq!(mem.vram.read_u8(0), 0);
    }
}
