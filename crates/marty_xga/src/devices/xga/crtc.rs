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

    devices::xga::crtc.rs

    XGA CRTC timing and the two-phase raster poll.

*/

use super::*;

use strum_macros::{Display, EnumIter};
use super::vram::VRAM_PAGE_SHIFT;

/// Raster lines beyond this wrap back to 0.
pub const XGA_MAX_DISPLINE: u32 = 1500;
/// Sentinel for "no line drawn yet this frame".
pub const XGA_NO_LINE: u32 = 2000;
/// Shortest blank period, in pixel clocks.
pub const XGA_MIN_HALF_CLOCKS: u32 = 8;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, EnumIter)]
pub enum PixelClock {
    #[default]
    #[strum(serialize = "25.175 MHz")]
    Clock25,
    #[strum(serialize = "28.322 MHz")]
    Clock28,
    #[strum(serialize = "41.539 MHz")]
    Clock41,
    #[strum(serialize = "44.9 MHz")]
    Clock45,
}

impl PixelClock {
    pub fn mhz(&self) -> f64 {
        match self {
            PixelClock::Clock25 => 25.175,
            PixelClock::Clock28 => 28.322,
            PixelClock::Clock41 => 41.539,
            PixelClock::Clock45 => 44.9,
        }
    }
}

#[derive(Clone, Debug)]
pub struct XgaCrtc {
    pub pixel_clock: PixelClock,

    pub v_total: u32,
    pub dispend: u32,
    pub v_syncstart: u32,
    pub split: u32,
    pub v_blankstart: u32,
    pub h_disp: u32,
    /// Pixel clocks per scanline.
    pub h_total: u32,
    pub rowoffset: u32,
    pub rowcount: u32,
    pub interlace: bool,
    pub ma_latch: u32,

    pub ma: u32,
    pub maback: u32,
    pub sc: u32,
    pub vc: u32,
    pub displine: u32,
    /// Set during the blank half of a scanline.
    pub linepos: bool,
    pub dispon: bool,
    pub h_disp_on: bool,
    pub oddeven: bool,
    pub firstline: u32,
    pub lastline: u32,

    pub clock_accumulator: f64,
    pub next_event_clocks: u32,
    /// Dimensions passed with the most recent frame hand-off.
    pub last_frame: (u32, u32),
}

impl Default for XgaCrtc {
    fn default() -> Self {
        Self {
            pixel_clock: PixelClock::default(),
            v_total: 0,
            dispend: 0,
            v_syncstart: 0,
            split: 0,
            v_blankstart: 0,
            h_disp: 0,
            h_total: 0,
            rowoffset: 0,
            rowcount: 0,
            interlace: false,
            ma_latch: 0,
            ma: 0,
            maback: 0,
            sc: 0,
            vc: 0,
            displine: 0,
            linepos: false,
            dispon: false,
            h_disp_on: false,
            oddeven: false,
            firstline: XGA_NO_LINE,
            lastline: 0,
            clock_accumulator: 0.0,
            next_event_clocks: XGA_MIN_HALF_CLOCKS,
            last_frame: (0, 0),
        }
    }
}

impl XgaCrtc {
    /// Derive raster parameters from the display registers.
    pub fn recalculate(&mut self, ext: &ExtRegisters) {
        self.v_total = ext.vtotal as u32 + 1;
        self.dispend = ext.vdispend as u32 + 1;
        self.v_syncstart = ext.vsyncstart as u32 + 1;
        self.split = ext.linecmp as u32 + 1;
        self.v_blankstart = ext.vblankstart as u32 + 1;

        self.h_disp = (ext.hdisp as u32 + 1) << 3;
        self.h_total = (ext.htotal as u32 + 1) << 3;
        self.rowoffset = ext.hdisp as u32 + 1;

        self.interlace = ext.disp_cntl_1.interlace();
        self.rowcount = ext.disp_cntl_2.row_count() as u32;

        if self.interlace {
            self.v_total >>= 1;
            self.dispend >>= 1;
            self.v_syncstart >>= 1;
            self.split >>= 1;
            self.v_blankstart >>= 1;
        }

        self.ma_latch = ext.disp_start_addr;

        match ext.clk_sel_1.clock_select() {
            0 if ext.clk_sel_2.alt_clock() => self.pixel_clock = PixelClock::Clock41,
            0 => self.pixel_clock = PixelClock::Clock25,
            1 => self.pixel_clock = PixelClock::Clock28,
            3 => self.pixel_clock = PixelClock::Clock45,
            // Select 2 is an external clock; keep whatever was last chosen.
            _ => {}
        }

        self.next_event_clocks = if self.linepos {
            self.blank_clocks()
        }
        else {
            self.active_clocks()
        };
    }

    /// Pixel clocks spent in the active half of a scanline.
    #[inline]
    pub fn active_clocks(&self) -> u32 {
        self.h_disp.max(XGA_MIN_HALF_CLOCKS)
    }

    /// Pixel clocks spent in the blank half of a scanline.
    #[inline]
    pub fn blank_clocks(&self) -> u32 {
        self.h_total.saturating_sub(self.h_disp).max(XGA_MIN_HALF_CLOCKS)
    }

    /// Frames per second at the current pixel clock.
    #[inline]
    pub fn refresh_rate(&self) -> u32 {
        let line_clocks = (self.active_clocks() + self.blank_clocks()) as f64;
        if self.v_total == 0 {
            return 0;
        }
        let lines = if self.interlace { self.v_total * 2 } else { self.v_total };
        (self.pixel_clock.mhz() * 1_000_000.0 / (line_clocks * lines as f64)).round() as u32
    }
}

impl XgaCard {
    pub(crate) fn recalculate_timings(&mut self) {
        self.recalc_count += 1;
        if self.on {
            self.crtc.recalculate(&self.ext);
            trace!(
                self,
                "RECALC h_disp {} h_total {} v_total {} dispend {} clock {}",
                self.crtc.h_disp,
                self.crtc.h_total,
                self.crtc.v_total,
                self.crtc.dispend,
                self.crtc.pixel_clock
            );
        }
    }

    /// Advance the raster by `clocks` pixel clocks, polling at each half-line boundary.
    pub(crate) fn run_clocks(&mut self, clocks: f64) {
        if !self.on {
            self.crtc.clock_accumulator = 0.0;
            return;
        }
        self.crtc.clock_accumulator += clocks;
        while self.crtc.clock_accumulator >= self.crtc.next_event_clocks as f64 {
            self.crtc.clock_accumulator -= self.crtc.next_event_clocks as f64;
            self.poll();
        }
    }

    /// Process one half of a scanline.
    pub(crate) fn poll(&mut self) {
        if !self.crtc.linepos {
            self.poll_active();
        }
        else {
            self.poll_blank();
        }
    }

    fn poll_active(&mut self) {
        let interlace = self.crtc.interlace;
        self.cursor.check_start(self.crtc.displine, interlace);

        self.crtc.next_event_clocks = self.crtc.blank_clocks();
        self.crtc.linepos = true;

        if self.crtc.dispon {
            self.crtc.h_disp_on = true;
            self.crtc.ma &= self.vram.mask() as u32;

            if self.crtc.firstline == XGA_NO_LINE {
                self.crtc.firstline = self.crtc.displine;
            }

            if self.cursor.lines_remaining > 0 {
                let page = (self.crtc.ma >> VRAM_PAGE_SHIFT) as usize;
                let stamp = if interlace { 3 } else { 2 };
                self.vram.mark_page(page, stamp);
                self.vram.mark_page(page + 1, stamp);
            }

            self.render_line();

            if self.crtc.lastline < self.crtc.displine {
                self.crtc.lastline = self.crtc.displine;
            }
        }

        self.crtc.displine += if interlace { 2 } else { 1 };
        if self.crtc.displine > XGA_MAX_DISPLINE {
            self.crtc.displine = 0;
        }
    }

    fn poll_blank(&mut self) {
        let mask = self.vram.mask() as u32;
        let crtc = &mut self.crtc;
        crtc.next_event_clocks = crtc.active_clocks();
        crtc.h_disp_on = false;
        crtc.linepos = false;

        if crtc.dispon {
            if crtc.sc == crtc.rowcount {
                crtc.sc = 0;
                let shift = if self.ext.disp_cntl_2.pixel_size() == 4 { 4 } else { 3 };
                crtc.maback += crtc.rowoffset << shift;
                if crtc.interlace {
                    crtc.maback += crtc.rowoffset << shift;
                }
                crtc.maback &= mask;
                crtc.ma = crtc.maback;
            }
            else {
                crtc.sc = (crtc.sc + 1) & 0x1F;
                crtc.ma = crtc.maback;
            }
        }

        crtc.vc = (crtc.vc + 1) & 0x7FF;

        if crtc.vc == crtc.split {
            let start = if crtc.interlace && crtc.oddeven {
                crtc.rowoffset << 1
            }
            else {
                0
            };
            crtc.maback = start << 2;
            crtc.ma = crtc.maback;
            crtc.sc = 0;
        }

        if crtc.vc == crtc.dispend {
            crtc.dispon = false;
            self.vram.decay_pages();
            self.fullchange = self.fullchange.saturating_sub(1);
        }

        if self.crtc.vc == self.crtc.v_syncstart {
            self.end_frame();
        }

        let crtc = &mut self.crtc;
        if crtc.vc == crtc.v_total {
            crtc.vc = 0;
            crtc.sc = 0;
            crtc.dispon = true;
            crtc.displine = if crtc.interlace && crtc.oddeven { 1 } else { 0 };
            self.cursor.latch_frame();
        }
    }

    /// Vertical sync: hand off the frame and reload the display start address.
    fn end_frame(&mut self) {
        let crtc = &mut self.crtc;
        crtc.dispon = false;

        if crtc.interlace && !crtc.oddeven {
            crtc.lastline += 1;
        }
        if crtc.interlace && crtc.oddeven {
            crtc.firstline = crtc.firstline.saturating_sub(1);
        }

        let width = crtc.h_disp;
        let height = crtc.lastline.saturating_sub(crtc.firstline);

        crtc.firstline = XGA_NO_LINE;
        crtc.lastline = 0;
        crtc.oddeven = !crtc.oddeven;

        let start = if crtc.interlace && crtc.oddeven {
            crtc.ma_latch + (crtc.rowoffset << 1)
        }
        else {
            crtc.ma_latch
        };
        crtc.maback = start << 2;
        crtc.ma = crtc.maback;

        let interlace = crtc.interlace;
        self.vram.set_change_frame_count(if interlace { 3 } else { 2 });
        self.blit(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::xga::{ext_regs::*, tests::mca_card};

    fn write_reg(card: &mut XgaCard, idx: u8, data: u8) {
        card.ext_port_write(EXT_INDEX, idx);
        card.ext_port_write(0x0B, data);
    }

    /// Program a small 64x16 8bpp mode.
    pub(crate) fn program_small_mode(card: &mut XgaCard) {
        write_reg(card, REG_DISP_CNTL_2, 0x03);
        write_reg(card, REG_HTOTAL_LO, 11);
        write_reg(card, REG_HTOTAL_HI, 0);
        write_reg(card, REG_HDISP_LO, 7);
        write_reg(card, REG_HDISP_HI, 0);
        write_reg(card, REG_VTOTAL_LO, 23);
        write_reg(card, REG_VTOTAL_HI, 0);
        write_reg(card, REG_VDISPEND_LO, 15);
        write_reg(card, REG_VDISPEND_HI, 0);
        write_reg(card, REG_VSYNCSTART_LO, 17);
        write_reg(card, REG_VSYNCSTART_HI, 0);
        write_reg(card, REG_LINECMP_LO, 0xFF);
        write_reg(card, REG_LINECMP_HI, 0x07);
    }

    #[test]
    fn recalc_derives_raster_parameters() {
        let mut card = mca_card();
        program_small_mode(&mut card);
        let crtc = card.crtc();
        assert_eq!(crtc.h_disp, 64);
        assert_eq!(crtc.h_total, 96);
        assert_eq!(crtc.rowoffset, 8);
        assert_eq!(crtc.v_total, 24);
        assert_eq!(crtc.dispend, 16);
        assert_eq!(crtc.v_syncstart, 18);
        assert_eq!(crtc.pixel_clock, PixelClock::Clock25);
        assert_eq!(crtc.active_clocks(), 64);
        assert_eq!(crtc.blank_clocks(), 32);
    }

    #[test]
    fn interlace_halves_vertical_timing() {
        let mut card = mca_card();
        program_small_mode(&mut card);
        write_reg(&mut card, REG_DISP_CNTL_1, 0x08);
        assert!(card.crtc().interlace);
        assert_eq!(card.crtc().v_total, 12);
        assert_eq!(card.crtc().dispend, 8);
    }

    #[test]
    fn clock_select() {
        let mut card = mca_card();
        program_small_mode(&mut card);
        write_reg(&mut card, REG_CLK_SEL_1, 0x04);
        assert_eq!(card.crtc().pixel_clock, PixelClock::Clock28);
        write_reg(&mut card, REG_CLK_SEL_1, 0x08);
        assert_eq!(card.crtc().pixel_clock, PixelClock::Clock28);
        write_reg(&mut card, REG_CLK_SEL_1, 0x0C);
        assert_eq!(card.crtc().pixel_clock, PixelClock::Clock45);
        write_reg(&mut card, REG_CLK_SEL_2, 0x80);
        write_reg(&mut card, REG_CLK_SEL_1, 0x00);
        assert_eq!(card.crtc().pixel_clock, PixelClock::Clock41);
    }

    #[test]
    fn recalc_is_skipped_while_off() {
        let mut card = mca_card();
        write_reg(&mut card, REG_HDISP_LO, 7);
        write_reg(&mut card, REG_HDISP_HI, 0);
        assert_eq!(card.recalc_count(), 1);
        assert_eq!(card.crtc().h_disp, 0);
    }

    #[test]
    fn frame_is_handed_off_at_vsync() {
        let mut card = mca_card();
        program_small_mode(&mut card);
        // Two fields: the first starts mid-frame, the second is complete.
        for _ in 0..(24 * 2 * 2) {
            card.poll();
        }
        assert!(card.frame_count >= 1);
        assert_eq!(card.crtc().last_frame, (64, 15));
        assert_eq!(card.vram.change_frame_count(), 2);
    }

    #[test]
    fn run_accumulates_pixel_clocks() {
        let mut card = mca_card();
        program_small_mode(&mut card);
        // One scanline is 96 pixel clocks: an active half of 64 and a blank half of 32.
        card.run_clocks(63.0);
        assert!(!card.crtc().linepos);
        card.run_clocks(1.0);
        assert!(card.crtc().linepos);
        card.run_clocks(32.0);
        assert!(!card.crtc().linepos);
        assert_eq!(card.crtc().vc, 1);
    }
}
