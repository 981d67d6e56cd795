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

    devices::xga::vram.rs

    XGA video memory arena with per-page change tracking, and the
    little-endian access helpers shared by every aperture path.

*/

pub const VRAM_PAGE_SHIFT: usize = 12;
pub const DEFAULT_CHANGE_FRAME_COUNT: u8 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccessWidth {
    Byte,
    Word,
    Dword,
}

impl AccessWidth {
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            AccessWidth::Byte => 1,
            AccessWidth::Word => 2,
            AccessWidth::Dword => 4,
        }
    }
}

/// Assemble a little-endian value of the given width, fetching byte `i` through `fetch`.
#[inline]
pub fn read_le(width: AccessWidth, mut fetch: impl FnMut(usize) -> u8) -> u32 {
    (0..width.bytes()).fold(0u32, |acc, i| acc | (fetch(i) as u32) << (i * 8))
}

/// Split `value` into little-endian bytes of the given width, storing byte `i` through `store`.
#[inline]
pub fn write_le(width: AccessWidth, value: u32, mut store: impl FnMut(usize, u8)) {
    for i in 0..width.bytes() {
        store(i, (value >> (i * 8)) as u8);
    }
}

pub struct VideoMemory {
    data: Vec<u8>,
    mask: usize,
    changed: Vec<u8>,
    change_frame_count: u8,
}

impl VideoMemory {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            mask: size - 1,
            changed: vec![0; size >> VRAM_PAGE_SHIFT],
            change_frame_count: DEFAULT_CHANGE_FRAME_COUNT,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn mask(&self) -> usize {
        self.mask
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn read_u8(&self, address: usize) -> u8 {
        self.data[address & self.mask]
    }

    /// Write a byte and stamp its page with the current change frame count.
    #[inline]
    pub fn write_u8(&mut self, address: usize, byte: u8) {
        let address = address & self.mask;
        self.data[address] = byte;
        self.changed[address >> VRAM_PAGE_SHIFT] = self.change_frame_count;
    }

    pub fn read(&self, address: usize, width: AccessWidth) -> u32 {
        read_le(width, |i| self.read_u8(address.wrapping_add(i)))
    }

    pub fn write(&mut self, address: usize, width: AccessWidth, value: u32) {
        write_le(width, value, |i, byte| self.write_u8(address.wrapping_add(i), byte));
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.changed.len()
    }

    /// Pages past the end of memory are never considered changed.
    #[inline]
    pub fn page_changed(&self, page: usize) -> bool {
        self.changed.get(page).is_some_and(|stamp| *stamp != 0)
    }

    #[inline]
    pub fn page_stamp(&self, page: usize) -> u8 {
        self.changed.get(page).copied().unwrap_or(0)
    }

    pub fn mark_page(&mut self, page: usize, stamp: u8) {
        if let Some(entry) = self.changed.get_mut(page) {
            *entry = stamp;
        }
    }

    /// Age every page by one frame.
    pub fn decay_pages(&mut self) {
        for stamp in self.changed.iter_mut() {
            *stamp = stamp.saturating_sub(1);
        }
    }

    #[inline]
    pub fn change_frame_count(&self) -> u8 {
        self.change_frame_count
    }

    pub fn set_change_frame_count(&mut self, count: u8) {
        self.change_frame_count = count;
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
        self.changed.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_write_stamps_one_page() {
        let mut vram = VideoMemory::new(0x100000);
        let x = 0x2345;
        vram.write_u8(x, 0xA5);

        assert_eq!(vram.read_u8(x), 0xA5);
        assert_eq!(vram.page_stamp(x >> 12), vram.change_frame_count());
        for page in (0..vram.page_count()).filter(|p| *p != (x >> 12)) {
            assert_eq!(vram.page_stamp(page), 0, "page {} should be untouched", page);
        }
    }

    #[test]
    fn addresses_wrap_at_vram_size() {
        let mut vram = VideoMemory::new(0x80000);
        vram.write_u8(0x80010, 0x42);
        assert_eq!(vram.read_u8(0x10), 0x42);
    }

    #[test]
    fn le_helpers_compose_bytes() {
        let mut vram = VideoMemory::new(0x80000);
        vram.write(0x100, AccessWidth::Dword, 0x1122_3344);
        assert_eq!(vram.data()[0x100..0x104], [0x44, 0x33, 0x22, 0x11]);
        assert_eq!(vram.read(0x101, AccessWidth::Word), 0x2233);
        assert_eq!(vram.read(0x100, AccessWidth::Byte), 0x44);
    }

    #[test]
    fn pages_decay_to_clean() {
        let mut vram = VideoMemory::new(0x80000);
        vram.set_change_frame_count(3);
        vram.write_u8(0x5000, 1);
        vram.decay_pages();
        assert!(vram.page_changed(5));
        vram.decay_pages();
        vram.decay_pages();
        assert!(!vram.page_changed(5));
        vram.decay_pages();
        assert_eq!(vram.page_stamp(5), 0);
        assert!(!vram.page_changed(vram.page_count()));
    }
}
