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

    devices::xga::render.rs

    Scanline rendering for the 8bpp palettized and 16bpp direct color modes.

*/

use super::*;

use lazy_static::lazy_static;
use super::vram::VRAM_PAGE_SHIFT;

lazy_static! {
    /// RGB565 to 0x00RRGGBB, low bits left clear.
    static ref RGB565_TABLE: Vec<u32> = (0..=0xFFFFu32)
        .map(|c| {
            let b = c & 0x1F;
            let g = (c >> 5) & 0x3F;
            let r = (c >> 11) & 0x1F;
            b << 3 | g << 10 | r << 19
        })
        .collect();
}

#[inline]
pub fn rgb565_to_rgb32(pixel: u16) -> u32 {
    RGB565_TABLE[pixel as usize]
}

impl XgaCard {
    /// Render the current display line into the back buffer, then draw overscan and the cursor.
    pub(crate) fn render_line(&mut self) {
        let row = (self.crtc.displine + XGA_Y_ADD) as usize;
        if row >= XGA_FIELD_H as usize {
            return;
        }

        match self.ext.display_mode() {
            DisplayMode::Bpp8 => self.render_8bpp(row),
            DisplayMode::Bpp16 => self.render_16bpp(row),
            _ => {}
        }

        self.render_overscan(row);

        if self.cursor.lines_remaining > 0 {
            let interlace = self.crtc.interlace;
            let start = row * XGA_FIELD_W as usize;
            let line = &mut self.buf[self.back_buf][start..start + XGA_FIELD_W as usize];
            self.cursor.draw_line(line, XGA_X_ADD, interlace);
            self.cursor.finish_line(interlace);
        }
    }

    /// A line is redrawn only when its pages changed or a full redraw is pending.
    fn line_dirty(&self) -> bool {
        let page = (self.crtc.ma >> VRAM_PAGE_SHIFT) as usize;
        self.vram.page_changed(page) || self.vram.page_changed(page + 1) || self.fullchange > 0
    }

    fn render_8bpp(&mut self, row: usize) {
        if !self.line_dirty() {
            return;
        }
        let mask = self.vram.mask() as u32;
        let start = row * XGA_FIELD_W as usize + XGA_X_ADD as usize;
        let end = (row + 1) * XGA_FIELD_W as usize;
        let line = &mut self.buf[self.back_buf][start..end];

        let mut x = 0;
        while x <= self.crtc.h_disp {
            for i in 0..8 {
                let byte = self.vram.read_u8(((self.crtc.ma + i) & mask) as usize);
                if let Some(pixel) = line.get_mut((x + i) as usize) {
                    *pixel = self.dac.lookup(byte);
                }
            }
            self.crtc.ma += 8;
            x += 8;
        }
        self.crtc.ma &= mask;
    }

    fn render_16bpp(&mut self, row: usize) {
        if !self.line_dirty() {
            return;
        }
        let mask = self.vram.mask() as u32;
        let start = row * XGA_FIELD_W as usize + XGA_X_ADD as usize;
        let end = (row + 1) * XGA_FIELD_W as usize;
        let line = &mut self.buf[self.back_buf][start..end];

        let mut x = 0;
        while x <= self.crtc.h_disp {
            for i in 0..8 {
                let addr = self.crtc.ma + ((x + i) << 1);
                let lo = self.vram.read_u8((addr & mask) as usize);
                let hi = self.vram.read_u8(((addr + 1) & mask) as usize);
                if let Some(pixel) = line.get_mut((x + i) as usize) {
                    *pixel = rgb565_to_rgb32(u16::from_le_bytes([lo, hi]));
                }
            }
            x += 8;
        }
        self.crtc.ma = (self.crtc.ma + (x << 1)) & mask;
    }

    fn render_overscan(&mut self, row: usize) {
        if self.crtc.h_disp == 0 {
            return;
        }
        let color = self.dac.lookup(self.ext.border_color);
        let start = row * XGA_FIELD_W as usize;
        let line = &mut self.buf[self.back_buf][start..start + XGA_FIELD_W as usize];

        for pixel in line.iter_mut().take(XGA_X_ADD as usize) {
            *pixel = color;
        }
        let right = (XGA_X_ADD + self.crtc.h_disp) as usize;
        for pixel in line.iter_mut().skip(right).take(XGA_OVERSCAN_RIGHT as usize) {
            *pixel = color;
        }
    }
}
