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

    devices::xga::dac.rs

    The XGA palette DAC. Palette entries are written and read as r, g, b
    byte triplets through the palette data register.

*/


pub const DAC_PALETTE_SIZE: usize = 256;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PaletteEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PaletteEntry {
    #[inline]
    pub fn to_rgb32(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

pub struct XgaDac {
    pub palette: [PaletteEntry; DAC_PALETTE_SIZE],
    /// Packed 0x00RRGGBB values, kept in step with `palette`.
    pub pallook: [u32; DAC_PALETTE_SIZE],
    pub mask: u8,
    pub addr: u8,
    /// Position within the current r, g, b triplet.
    pub pos: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub pal_seq: u8,
}

impl Default for XgaDac {
    fn default() -> Self {
        Self {
            palette: [PaletteEntry::default(); DAC_PALETTE_SIZE],
            pallook: [0; DAC_PALETTE_SIZE],
            mask: 0xFF,
            addr: 0,
            pos: 0,
            r: 0,
            g: 0,
            b: 0,
            pal_seq: 0,
        }
    }
}

impl XgaDac {
    pub fn set_index(&mut self, index: u8) {
        self.addr = index;
        self.pos = 0;
    }

    /// Accept one byte of a palette triplet. Returns true if the byte completed an entry.
    /// The caller forces a full redraw on every byte, not only on completed entries.
    pub fn write_data(&mut self, byte: u8) -> bool {
        match self.pos {
            0 => {
                self.r = byte;
                self.pos = 1;
                false
            }
            1 => {
                self.g = byte;
                self.pos = 2;
                false
            }
            _ => {
                self.b = byte;
                let entry = PaletteEntry {
                    r: self.r,
                    g: self.g,
                    b: self.b,
                };
                self.palette[self.addr as usize] = entry;
                self.pallook[self.addr as usize] = entry.to_rgb32();
                self.pos = 0;
                self.addr = self.addr.wrapping_add(1);
                true
            }
        }
    }

    pub fn read_data(&mut self) -> u8 {
        let entry = self.palette[self.addr as usize];
        match self.pos {
            0 => {
                self.pos = 1;
                entry.r
            }
            1 => {
                self.pos = 2;
                entry.g
            }
            _ => {
                self.pos = 0;
                self.addr = self.addr.wrapping_add(1);
                entry.b
            }
        }
    }

    #[inline]
    pub fn lookup(&self, index: u8) -> u32 {
        self.pallook[index as usize]
    }
}
