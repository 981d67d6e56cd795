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

    devices::xga::draw.rs

    Coprocessor drawing operations: Bresenham line draw, short stroke
    vectors and BitBLT. Every operation funnels its pixels through the same
    mask, color compare, mix and plane mask stages.

*/

use super::*;

use crate::devices::xga::{
    accel::{
        dest_coordinate,
        sign_extend_14,
        AccelState,
        CommandWord,
        DrawMode,
        Opcode,
        PATTERN_FOREGROUND,
        SOURCE_PIXEL_MAP,
    },
    pixel_map::{MapAddressing, MapMemory, PixelDepth, PixelMap},
    rop::{apply_plane_mask, apply_rop, color_compare},
};

/// Short stroke direction codes, counter-clockwise from +X. Positive Y is down.
const STROKE_DIRECTIONS: [(i32, i32); 8] = [(1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1), (1, 1)];

/// Snapshot of the coprocessor registers that stay fixed for the duration of an operation.
struct DrawContext {
    command: CommandWord,
    mode: MapAddressing,
    dst: PixelMap,
    src: PixelMap,
    mask: PixelMap,
    mask_x: i32,
    mask_y: i32,
    frgd_mix: u8,
    bkgd_mix: u8,
    cc_cond: u8,
    color_cmp: u32,
    plane_mask: u32,
    frgd_color: u32,
    bkgd_color: u32,
}

impl DrawContext {
    fn new(accel: &AccelState, mode: MapAddressing) -> Self {
        let command = accel.command;
        Self {
            command,
            mode,
            dst: accel.map(command.dest_map()),
            src: accel.map(command.source_map()),
            mask: accel.maps[0],
            mask_x: accel.mask_origin_x as i32,
            mask_y: accel.mask_origin_y as i32,
            frgd_mix: accel.frgd_mix,
            bkgd_mix: accel.bkgd_mix,
            cc_cond: accel.cc_cond,
            color_cmp: accel.color_cmp,
            plane_mask: accel.plane_mask,
            frgd_color: accel.frgd_color,
            bkgd_color: accel.bkgd_color,
        }
    }

    /// Map A (map 0) doubles as the mask map; its extent is inclusive.
    #[inline]
    fn inside_mask(&self, x: i32, y: i32) -> bool {
        if !self.command.mask_enabled() {
            return true;
        }
        x >= self.mask_x
            && x <= (self.mask.width & 0xFFF) as i32 + self.mask_x
            && y >= self.mask_y
            && y <= (self.mask.height & 0xFFF) as i32 + self.mask_y
    }

    #[inline]
    fn source_pixel(&self, mem: &MapMemory, foreground: bool, sx: i32, sy: i32) -> u32 {
        let (select, color) = if foreground {
            (self.command.fg_source(), self.frgd_color)
        }
        else {
            (self.command.bg_source(), self.bkgd_color)
        };
        if select == SOURCE_PIXEL_MAP {
            mem.read_pixel(&self.mode, &self.src, sx, sy)
        }
        else {
            color
        }
    }

    /// Run one destination pixel through the mask, color compare, mix and plane mask.
    /// Returns the value to store, or None if the pixel is suppressed.
    fn blend(&self, mem: &MapMemory, dx: i32, dy: i32, sx: i32, sy: i32, foreground: bool) -> Option<u32> {
        if !self.inside_mask(dx, dy) {
            return None;
        }
        let src = self.source_pixel(mem, foreground, sx, sy);
        let dest = mem.read_pixel(&self.mode, &self.dst, dx, dy);
        if !color_compare(self.cc_cond, dest, self.color_cmp) {
            return None;
        }
        let mix = if foreground { self.frgd_mix } else { self.bkgd_mix };
        Some(apply_plane_mask(apply_rop(mix, dest, src), dest, self.plane_mask))
    }

    #[inline]
    fn store(&self, mem: &mut MapMemory, dx: i32, dy: i32, pixel: u32) {
        mem.write_pixel(&self.mode, &self.dst, dx, dy, pixel);
    }
}

/// Drawing mode gate for line and stroke operations. `x` counts pixels drawn so far,
/// `y` counts pixels remaining.
#[inline]
fn draw_mode_allows(draw_mode: DrawMode, x: i32, y: i32) -> bool {
    match draw_mode {
        DrawMode::DrawAll => true,
        DrawMode::FirstPixelNull => x != 0,
        DrawMode::LastPixelNull => y != 0,
        DrawMode::AreaBoundary => false,
    }
}

/// Step `v` by `dir` while keeping the bits outside `wrap` fixed.
#[inline]
fn wrap_step(v: i32, dir: i32, wrap: i32) -> i32 {
    (v.wrapping_add(dir) & wrap) | (v & !wrap)
}

/// Bresenham line draw. The register file holds the line in major/minor axis form; octant
/// bit 0 selects an X-major line, which is drawn with the axes swapped and mapped back to
/// real coordinates for each pixel.
pub fn line_draw(accel: &mut AccelState, mem: &mut MapMemory, mode: MapAddressing) {
    let ctx = DrawContext::new(accel, mode);
    let octant = ctx.command.octant();

    let dminor = sign_extend_14(accel.bres_k1) >> 1;
    let destxtmp = sign_extend_14(accel.bres_k2);
    let dmajor = (-(destxtmp - (dminor << 1))) >> 1;
    let mut err = accel.bres_err_term as i16 as i32;

    let mut xdir = if octant & 0x04 != 0 { -1 } else { 1 };
    let mut ydir = if octant & 0x02 != 0 { -1 } else { 1 };
    let mut dx = dest_coordinate(accel.dst_x);
    let mut dy = dest_coordinate(accel.dst_y);

    let swapped = octant & 0x01 != 0;
    if swapped {
        std::mem::swap(&mut dx, &mut dy);
        std::mem::swap(&mut xdir, &mut ydir);
    }
    let real = |dx: i32, dy: i32| if swapped { (dy, dx) } else { (dx, dy) };

    if ctx.command.pattern_map() == PATTERN_FOREGROUND {
        let sx = (accel.src_x & 0xFFF) as i32;
        let sy = (accel.src_y & 0xFFF) as i32;
        let mut x = 0;
        let mut y = accel.blt_width as i32;

        loop {
            let (px, py) = real(dx, dy);
            if let Some(pixel) = ctx.blend(mem, px, py, sx, sy, true) {
                if draw_mode_allows(ctx.command.draw_mode(), x, y) {
                    ctx.store(mem, px, py, pixel);
                }
            }
            if y == 0 {
                break;
            }
            // A non-positive major step would never bring the error term back down.
            while err > 0 && dmajor > 0 {
                dy += ydir;
                err -= dmajor << 1;
            }
            dx += xdir;
            err += dminor << 1;
            x += 1;
            y -= 1;
        }
    }

    let (px, py) = real(dx, dy);
    accel.dst_x = px as u16;
    accel.dst_y = py as u16;
}

/// Draw one short stroke vector: bits 0-3 length, bit 4 draw enable, bits 5-7 direction.
pub fn short_stroke(accel: &mut AccelState, mem: &mut MapMemory, mode: MapAddressing, vector: u8) {
    let ctx = DrawContext::new(accel, mode);
    let (dirx, diry) = STROKE_DIRECTIONS[((vector >> 5) & 0x07) as usize];
    let draw = vector & 0x10 != 0;

    let mut dx = dest_coordinate(accel.dst_x);
    let mut dy = dest_coordinate(accel.dst_y);

    if ctx.command.pattern_map() == PATTERN_FOREGROUND {
        let sx = (accel.src_x & 0xFFF) as i32;
        let sy = (accel.src_y & 0xFFF) as i32;
        let mut x = 0;
        let mut y = (vector & 0x0F) as i32;

        loop {
            if let Some(pixel) = ctx.blend(mem, dx, dy, sx, sy, true) {
                if draw && draw_mode_allows(ctx.command.draw_mode(), x, y) {
                    ctx.store(mem, dx, dy, pixel);
                }
            }
            if y == 0 {
                break;
            }
            dx += dirx;
            dy += diry;
            x += 1;
            y -= 1;
        }
    }

    accel.dst_x = dx as u16;
    accel.dst_y = dy as u16;
}

/// Is the source (foreground pattern) or pattern map treated as a repeating tile?
fn tiled_pattern(accel: &AccelState, ctx: &DrawContext, h_disp: u32) -> bool {
    let command = ctx.command;
    let full_row = h_disp.checked_sub(1);
    let dst_width = Some(ctx.dst.width as u32);
    let src_width = ctx.src.width as u32;

    if command.pattern_map() == PATTERN_FOREGROUND {
        if ctx.src.height == 7 {
            return true;
        }
        return dst_width == full_row
            && src_width == 1
            && command.dest_map() == 1
            && command.source_map() == 2
            && ctx.mode.endian_reverse
            && ctx.dst.format >= 0x0B
            && ctx.src.format >= 0x0B;
    }

    let pattern = accel.map(command.pattern_map());
    if pattern.height == 7 {
        return true;
    }
    if dst_width != full_row {
        return false;
    }
    let px = accel.pat_x & 0xFFF;
    let py = accel.pat_y & 0xFFF;
    let common = command.dest_map() == 1
        && command.pattern_map() == 2
        && ctx.mode.endian_reverse
        && ctx.dst.format >= 0x0B
        && px <= 7
        && py <= 3;

    if Some(src_width) == full_row {
        common && command.source_map() == 1
    }
    else {
        common && command.source_map() == 0 && !(pattern.width >= 7 && command.mask_mode() == 1)
    }
}

/// Rectangular block transfer of (blt_width + 1) x (blt_height + 1) pixels. Octant bits 1 and
/// 2 select the Y and X directions.
pub fn bitblt(accel: &mut AccelState, mem: &mut MapMemory, mode: MapAddressing, h_disp: u32) {
    let ctx = DrawContext::new(accel, mode);
    let command = ctx.command;
    let pattern_select = command.pattern_map();
    if pattern_select == 0 {
        return;
    }

    let octant = command.octant();
    let xdir = if octant & 0x04 != 0 { -1 } else { 1 };
    let ydir = if octant & 0x02 != 0 { -1 } else { 1 };
    let tiled = tiled_pattern(accel, &ctx, h_disp);

    let row_width = (accel.blt_width & 0xFFF) as i32;
    let start_dx = dest_coordinate(accel.dst_x);
    let start_sx = (accel.src_x & 0xFFF) as i32;
    let start_px = (accel.pat_x & 0xFFF) as i32;

    let mut x = row_width;
    let mut y = (accel.blt_height & 0xFFF) as i32;
    let mut sx = start_sx;
    let mut sy = (accel.src_y & 0xFFF) as i32;
    let mut px = start_px;
    let mut py = (accel.pat_y & 0xFFF) as i32;
    let mut dx = start_dx;
    let mut dy = dest_coordinate(accel.dst_y);

    if pattern_select == PATTERN_FOREGROUND {
        let src_w = ctx.src.width as i32;
        let src_h = ctx.src.height as i32;
        loop {
            if let Some(pixel) = ctx.blend(mem, dx, dy, sx, sy, true) {
                ctx.store(mem, dx, dy, pixel);
            }
            sx = if tiled { wrap_step(sx, xdir, src_w) } else { sx + xdir };
            dx += xdir;
            x -= 1;
            if x < 0 {
                x = row_width;
                dx = start_dx;
                sx = start_sx;
                dy += ydir;
                sy = if tiled { wrap_step(sy, ydir, src_h) } else { sy + ydir };
                y -= 1;
                if y < 0 {
                    break;
                }
            }
        }
    }
    else {
        let pattern = accel.map(pattern_select);
        let pat_w = pattern.width as i32;
        let pat_h = pattern.height as i32;
        loop {
            let foreground = mem.read_pattern_pixel(&ctx.mode, &pattern, px, py) != 0;
            if let Some(pixel) = ctx.blend(mem, dx, dy, sx, sy, foreground) {
                ctx.store(mem, dx, dy, pixel);
            }
            sx += xdir;
            px = if tiled { wrap_step(px, xdir, pat_w) } else { px + xdir };
            dx += xdir;
            x -= 1;
            if x < 0 {
                y -= 1;
                x = row_width;
                dx = start_dx;
                sx = start_sx;
                px = start_px;
                sy += ydir;
                py = if tiled { wrap_step(py, ydir, pat_h) } else { py + ydir };
                dy += ydir;
                if y < 0 {
                    break;
                }
            }
        }
    }

    accel.dst_x = dx as u16;
    accel.dst_y = dy as u16;
}

impl XgaCard {
    /// Decode and run the operation in the command register.
    pub(crate) fn execute_command(&mut self, host: Option<&mut [u8]>) {
        let command = self.accel.command;
        trace!(
            self,
            "CMD {:08X} op:{:X} oct:{} pat:{} src:{} dst:{} fg:{} bg:{} mix:{:02X}/{:02X} cc:{} dst_xy:({},{}) blt:{}x{}",
            command.to_u32(),
            command.opcode(),
            command.octant(),
            command.pattern_map(),
            command.source_map(),
            command.dest_map(),
            command.fg_source(),
            command.bg_source(),
            self.accel.frgd_mix,
            self.accel.bkgd_mix,
            self.accel.cc_cond,
            self.accel.dst_x,
            self.accel.dst_y,
            self.accel.blt_width,
            self.accel.blt_height
        );

        let dst = self.accel.map(command.dest_map());
        if let PixelDepth::Unsupported(format) = dst.depth() {
            log::warn!("Coprocessor destination map uses unsupported pixel format {}", format);
        }

        let mode = self.map_addressing();
        let mut mem = MapMemory::new(&mut self.vram, host);
        match command.decoded_opcode() {
            Some(Opcode::LineDrawWrite) => line_draw(&mut self.accel, &mut mem, mode),
            Some(Opcode::BitBlt) => bitblt(&mut self.accel, &mut mem, mode, self.crtc.h_disp),
            Some(op) => log::trace!("Coprocessor operation {} ignored", op),
            None => log::warn!("Invalid coprocessor opcode: {:X}", command.opcode()),
        }
    }

    /// Run the four short stroke vectors packed into a register write, low byte first.
    pub(crate) fn execute_short_strokes(&mut self, vectors: u32, host: Option<&mut [u8]>) {
        trace!(self, "SSV {:08X} dst_xy:({},{})", vectors, self.accel.dst_x, self.accel.dst_y);
        let mode = self.map_addressing();
        let mut mem = MapMemory::new(&mut self.vram, host);
        for vector in vectors.to_le_bytes() {
            short_stroke(&mut self.accel, &mut mem, mode, vector);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::xga::{accel::*, vram::VideoMemory};

    const SRC_BASE: u32 = 0x1000;
    const DST_BASE: u32 = 0x8000;
    const PAT_BASE: u32 = 0x2000;

    fn mode() -> MapAddressing {
        MapAddressing::default()
    }

    fn define_map(accel: &mut AccelState, index: u32, base: u32, width: u16, height: u16, format: u8) {
        accel.write_register(ACCEL_REG_MAP_INDEX, index, 1);
        accel.write_register(ACCEL_REG_MAP_BASE, base, 4);
        accel.write_register(ACCEL_REG_MAP_SIZE, (height as u32) << 16 | width as u32, 4);
        accel.write_register(ACCEL_REG_MAP_FORMAT, format as u32, 1);
    }

    fn solid_setup() -> AccelState {
        let mut accel = AccelState::default();
        define_map(&mut accel, 1, DST_BASE, 63, 63, 0x03);
        define_map(&mut accel, 2, SRC_BASE, 63, 63, 0x03);
        accel.write_register(ACCEL_REG_MIX, 0x0004_0303, 4);
        accel.write_register(ACCEL_REG_PLANE_MASK, 0xFFFF_FFFF, 4);
        accel.write_register(ACCEL_REG_FRGD_COLOR, 0xFF, 4);
        accel
    }

    fn dst_pixel(vram: &VideoMemory, x: u32, y: u32) -> u8 {
        vram.read_u8((DST_BASE + y * 64 + x) as usize)
    }

    #[test]
    fn bitblt_copies_a_row() {
        let mut vram = VideoMemory::new(0x100000);
        for i in 0..8 {
            vram.write_u8(SRC_BASE as usize + i, i as u8 + 1);
        }
        let mut accel = solid_setup();
        accel.write_register(ACCEL_REG_BLT_DIM, 7, 4);
        accel.write_register(ACCEL_REG_SRC_XY, 0, 4);
        accel.write_register(ACCEL_REG_DST_XY, 0, 4);
        // BitBLT, foreground from source map 2 into map 1, pattern = foreground.
        let event = accel.write_register(ACCEL_REG_COMMAND, 0x2821_8000, 4);
        assert_eq!(event, AccelEvent::Command);

        let mut mem = MapMemory::new(&mut vram, None);
        bitblt(&mut accel, &mut mem, mode(), 0);

        let row: Vec<u8> = (0..8).map(|x| dst_pixel(&vram, x, 0)).collect();
        assert_eq!(row, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(dst_pixel(&vram, 8, 0), 0);
        assert_eq!(dst_pixel(&vram, 0, 1), 0);
        // The destination register is left at the start of the row past the block.
        assert_eq!((accel.dst_x, accel.dst_y), (0, 1));
    }

    #[test]
    fn bitblt_pattern_selects_colors() {
        let mut vram = VideoMemory::new(0x100000);
        vram.write_u8(PAT_BASE as usize, 0xAA);
        let mut accel = solid_setup();
        define_map(&mut accel, 3, PAT_BASE, 7, 7, 0x00);
        accel.write_register(ACCEL_REG_FRGD_COLOR, 0x11, 4);
        accel.write_register(ACCEL_REG_BKGD_COLOR, 0x22, 4);
        accel.write_register(ACCEL_REG_BLT_DIM, 7, 4);
        // Pattern from map 3, both sources fixed colors.
        accel.write_register(ACCEL_REG_COMMAND, 0x0801_3000, 4);

        let mut mem = MapMemory::new(&mut vram, None);
        bitblt(&mut accel, &mut mem, mode(), 0);

        let row: Vec<u8> = (0..8).map(|x| dst_pixel(&vram, x, 0)).collect();
        assert_eq!(row, [0x11, 0x22, 0x11, 0x22, 0x11, 0x22, 0x11, 0x22]);
    }

    #[test]
    fn bitblt_respects_mask_and_color_compare() {
        let mut vram = VideoMemory::new(0x100000);
        let mut accel = solid_setup();
        define_map(&mut accel, 0, 0, 3, 3, 0x03);
        accel.write_register(ACCEL_REG_MASK_ORIGIN, 0x0000_0002, 4);
        accel.write_register(ACCEL_REG_BLT_DIM, 9, 4);
        // Pattern = foreground color, mask map enabled.
        accel.write_register(ACCEL_REG_COMMAND, 0x0801_8040, 4);

        let mut mem = MapMemory::new(&mut vram, None);
        bitblt(&mut accel, &mut mem, mode(), 0);
        let row: Vec<u8> = (0..10).map(|x| dst_pixel(&vram, x, 0)).collect();
        assert_eq!(row, [0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]);

        // Condition "never" suppresses every write.
        vram.clear();
        accel.write_register(ACCEL_REG_CC_COND, 0, 1);
        accel.write_register(ACCEL_REG_DST_XY, 0, 4);
        accel.write_register(ACCEL_REG_COMMAND, 0x0801_8000, 4);
        let mut mem = MapMemory::new(&mut vram, None);
        bitblt(&mut accel, &mut mem, mode(), 0);
        assert!((0..10).all(|x| dst_pixel(&vram, x, 0) == 0));
    }

    #[test]
    fn bitblt_without_pattern_source_is_ignored() {
        let mut vram = VideoMemory::new(0x100000);
        let mut accel = solid_setup();
        accel.write_register(ACCEL_REG_BLT_DIM, 3, 4);
        accel.write_register(ACCEL_REG_DST_XY, 0x0001_0001, 4);
        accel.write_register(ACCEL_REG_COMMAND, 0x0801_0000, 4);

        let mut mem = MapMemory::new(&mut vram, None);
        bitblt(&mut accel, &mut mem, mode(), 0);
        assert_eq!(dst_pixel(&vram, 1, 1), 0);
        assert_eq!((accel.dst_x, accel.dst_y), (1, 1));
    }

    fn line_setup(draw_mode: u32, octant: u32) -> AccelState {
        let mut accel = solid_setup();
        accel.write_register(ACCEL_REG_K1, 14, 2);
        accel.write_register(ACCEL_REG_K2, 0, 2);
        accel.write_register(ACCEL_REG_ERROR_TERM, 7, 2);
        accel.write_register(ACCEL_REG_BLT_DIM, 7, 2);
        accel.write_register(ACCEL_REG_DST_XY, 0, 4);
        accel.write_register(ACCEL_REG_COMMAND, 0x0501_8000 | draw_mode << 4 | octant, 4);
        accel
    }

    #[test]
    fn line_draw_45_degrees() {
        let mut vram = VideoMemory::new(0x100000);
        let mut accel = line_setup(0, 0);
        let mut mem = MapMemory::new(&mut vram, None);
        line_draw(&mut accel, &mut mem, mode());

        for i in 0..8 {
            assert_eq!(dst_pixel(&vram, i, i), 0xFF, "pixel ({},{})", i, i);
        }
        assert_eq!(dst_pixel(&vram, 8, 8), 0);
        assert_eq!(dst_pixel(&vram, 1, 0), 0);
        assert_eq!((accel.dst_x, accel.dst_y), (7, 7));
    }

    #[test]
    fn line_draw_last_pixel_null() {
        let mut vram = VideoMemory::new(0x100000);
        let mut accel = line_setup(2, 0);
        let mut mem = MapMemory::new(&mut vram, None);
        line_draw(&mut accel, &mut mem, mode());

        assert_eq!(dst_pixel(&vram, 0, 0), 0xFF);
        assert_eq!(dst_pixel(&vram, 6, 6), 0xFF);
        assert_eq!(dst_pixel(&vram, 7, 7), 0);
    }

    #[test]
    fn line_draw_swapped_axes_restores_coordinates() {
        let mut vram = VideoMemory::new(0x100000);
        let mut accel = line_setup(0, 1);
        accel.write_register(ACCEL_REG_DST_XY, 0x0000_0005, 4);
        let mut mem = MapMemory::new(&mut vram, None);
        line_draw(&mut accel, &mut mem, mode());

        assert_eq!(dst_pixel(&vram, 5, 0), 0xFF);
        assert_eq!(dst_pixel(&vram, 12, 7), 0xFF);
        assert_eq!((accel.dst_x, accel.dst_y), (12, 7));
    }

    #[test]
    fn short_strokes_walk_in_direction() {
        let mut vram = VideoMemory::new(0x100000);
        let mut accel = solid_setup();
        accel.write_register(ACCEL_REG_DST_XY, 0x0005_0002, 4);
        accel.write_register(ACCEL_REG_COMMAND, 0x0401_8000, 4);

        let mut mem = MapMemory::new(&mut vram, None);
        // Draw 4 pixels toward +X, then move 2 pixels toward +Y without drawing.
        short_stroke(&mut accel, &mut mem, mode(), 0x13);
        short_stroke(&mut accel, &mut mem, mode(), 0xC2);

        for x in 2..=5 {
            assert_eq!(dst_pixel(&vram, x, 5), 0xFF);
        }
        assert_eq!(dst_pixel(&vram, 5, 6), 0);
        assert_eq!(dst_pixel(&vram, 5, 7), 0);
        assert_eq!((accel.dst_x, accel.dst_y), (5, 7));
    }
}
