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

    devices::xga::cursor.rs

    The XGA 64x64 two bit per pixel hardware sprite.

*/

pub const CURSOR_SIZE: u32 = 64;
pub const SPRITE_DATA_SIZE: usize = 0x400;
pub const SPRITE_ADDR_MASK: u16 = 0x3FF;
/// Bytes of sprite data per cursor row.
pub const SPRITE_ROW_BYTES: u16 = 16;

/// Cursor position registers as captured at the start of a frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CursorLatch {
    pub x: u16,
    pub y: u16,
    pub xoff: u8,
    pub yoff: u8,
    pub ena: bool,
    pub addr: u16,
}

pub struct HwCursor {
    pub pos_x: u16,
    pub pos_y: u16,
    pub hotspot_x: u8,
    pub hotspot_y: u8,
    pub control: u8,
    pub color0: u32,
    pub color1: u32,
    pub sprite_data: Vec<u8>,
    pub sprite_pos: u16,
    pub sprite_pos_prefetch: u16,
    /// Set when the upper half of the sprite holds image data. Only the last 32 rows and
    /// columns are then shown.
    pub data_on: bool,
    pub latch: CursorLatch,
    /// Scanlines of the sprite left to draw this frame.
    pub lines_remaining: u32,
    pub oddeven: bool,
}

impl Default for HwCursor {
    fn default() -> Self {
        Self {
            pos_x: 0,
            pos_y: 0,
            hotspot_x: 0,
            hotspot_y: 0,
            control: 0,
            color0: 0,
            color1: 0,
            sprite_data: vec![0; SPRITE_DATA_SIZE],
            sprite_pos: 0,
            sprite_pos_prefetch: 0,
            data_on: false,
            latch: CursorLatch::default(),
            lines_remaining: 0,
            oddeven: false,
        }
    }
}

impl HwCursor {
    #[inline]
    pub fn enabled(&self) -> bool {
        self.control & 0x01 != 0
    }

    pub fn write_sprite(&mut self, byte: u8) {
        self.sprite_data[self.sprite_pos as usize] = byte;
        self.sprite_pos = (self.sprite_pos + 1) & SPRITE_ADDR_MASK;
    }

    pub fn read_sprite_prefetch(&mut self) -> u8 {
        let byte = self.sprite_data[self.sprite_pos_prefetch as usize];
        self.sprite_pos_prefetch = (self.sprite_pos_prefetch + 1) & SPRITE_ADDR_MASK;
        byte
    }

    /// Re-evaluate `data_on` after the sprite index high byte is written.
    pub fn update_data_on(
        &mut self,
        op_mode: u8,
        pixel_size: u8,
        aperture_cntl: u8,
        endian_reverse: bool,
        access_mode: u8,
    ) {
        let pos = self.sprite_pos;
        if pos <= 16 {
            if op_mode >= 5 || pos >= 1 || pixel_size > 3 {
                self.data_on = true;
            }
            else if aperture_cntl == 0 && endian_reverse && access_mode & 0x08 == 0 {
                self.data_on = false;
            }
        }
        else if pos <= 0x1FF {
            self.data_on = aperture_cntl != 0 && pos & 0x0F != 0;
        }
    }

    /// Capture the cursor registers for the coming frame.
    pub fn latch_frame(&mut self) {
        self.lines_remaining = 0;
        self.latch = CursorLatch {
            x: self.pos_x,
            y: self.pos_y,
            xoff: self.hotspot_x,
            yoff: self.hotspot_y,
            ena: self.enabled(),
            addr: 0,
        };
    }

    /// Begin drawing the sprite if `displine` is its first line in this field.
    pub fn check_start(&mut self, displine: u32, interlace: bool) {
        if !self.latch.ena {
            return;
        }
        let y = self.latch.y as u32;
        if displine == y {
            self.lines_remaining = CURSOR_SIZE - if self.data_on { 32 } else { 0 };
            self.oddeven = false;
        }
        if interlace && displine == y + 1 {
            self.lines_remaining = CURSOR_SIZE - if self.data_on { 33 } else { 1 };
            self.oddeven = true;
        }
    }

    /// Draw one sprite row into `line`, whose pixel 0 is the left edge of the overscan area.
    pub fn draw_line(&mut self, line: &mut [u32], x_add: u32, interlace: bool) {
        if interlace && self.oddeven {
            self.latch.addr = self.latch.addr.wrapping_add(SPRITE_ROW_BYTES);
        }

        let first = if self.data_on { 32 } else { 0 };
        let offset = self.latch.x as i32 - self.latch.xoff as i32 + x_add as i32;
        let mut dat = 0u8;

        for x in 0..CURSOR_SIZE {
            if x >= first {
                if x & 0x03 == 0 {
                    dat = self.sprite_data[(self.latch.addr & SPRITE_ADDR_MASK) as usize];
                }
                let comb = (dat >> ((x & 0x03) << 1)) & 0x03;
                let x_pos = offset + x as i32;
                if let Some(pixel) = usize::try_from(x_pos).ok().and_then(|i| line.get_mut(i)) {
                    match comb {
                        0 => *pixel = self.color0,
                        1 => *pixel = self.color1,
                        3 => *pixel ^= 0xFFFFFF,
                        _ => {}
                    }
                }
            }
            if x & 0x03 == 0x03 {
                self.latch.addr = self.latch.addr.wrapping_add(1);
            }
        }

        if interlace && !self.oddeven {
            self.latch.addr = self.latch.addr.wrapping_add(SPRITE_ROW_BYTES);
        }
    }

    /// Count down the rows left after drawing one.
    pub fn finish_line(&mut self, interlace: bool) {
        self.lines_remaining = self.lines_remaining.saturating_sub(1);
        if self.lines_remaining > 0 && interlace {
            self.lines_remaining -= 1;
        }
    }
}
