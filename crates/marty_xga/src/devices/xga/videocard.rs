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

    devices::xga::videocard.rs

    Implementation of the VideoCard trait for the XGA.

*/

use super::*;

use super::aperture::Window;
use const_format::formatcp;

macro_rules! push_reg_str {
    ($vec: expr, $reg: expr, $decorator: expr, $val: expr ) => {
        $vec.push((format!("{} {}", $decorator, $reg), VideoCardStateEntry::String(format!("{}", $val))))
    };
}

pub const XGA_APERTURE_CROPPED_W: u32 = 1024;
pub const XGA_APERTURE_CROPPED_H: u32 = 768;
pub const XGA_APERTURE_FULL_W: u32 = XGA_APERTURE_CROPPED_W + XGA_X_ADD + XGA_OVERSCAN_RIGHT;
pub const XGA_APERTURE_FULL_H: u32 = XGA_APERTURE_CROPPED_H + XGA_Y_ADD * 2;

const XGA_APERTURES: [DisplayAperture; 3] = [
    DisplayAperture {
        w: XGA_APERTURE_CROPPED_W,
        h: XGA_APERTURE_CROPPED_H,
        x: XGA_X_ADD,
        y: XGA_Y_ADD,
        debug: false,
    },
    DisplayAperture {
        w: XGA_APERTURE_FULL_W,
        h: XGA_APERTURE_FULL_H,
        x: 0,
        y: 0,
        debug: false,
    },
    DisplayAperture {
        w: XGA_FIELD_W,
        h: XGA_FIELD_H,
        x: 0,
        y: 0,
        debug: true,
    },
];

const CROPPED_STRING: &str = formatcp!("Cropped: {}x{}", XGA_APERTURE_CROPPED_W, XGA_APERTURE_CROPPED_H);
const FULL_STRING: &str = formatcp!("Full: {}x{}", XGA_APERTURE_FULL_W, XGA_APERTURE_FULL_H);
const DEBUG_STRING: &str = formatcp!("Debug: {}x{}", XGA_FIELD_W, XGA_FIELD_H);

const XGA_APERTURE_DESCS: [DisplayApertureDesc; 3] = [
    DisplayApertureDesc {
        name: CROPPED_STRING,
        aper_enum: DisplayApertureType::Cropped,
    },
    DisplayApertureDesc {
        name: FULL_STRING,
        aper_enum: DisplayApertureType::Full,
    },
    DisplayApertureDesc {
        name: DEBUG_STRING,
        aper_enum: DisplayApertureType::Debug,
    },
];

impl VideoCard for XgaCard {
    fn get_video_type(&self) -> VideoType {
        match self.xga_type {
            XgaType::Xga1 => VideoType::Xga,
            XgaType::Xga2 => VideoType::Xga2,
        }
    }

    fn get_display_mode(&self) -> DisplayMode {
        if self.on {
            self.ext.display_mode()
        }
        else {
            DisplayMode::Blanked
        }
    }

    fn get_display_size(&self) -> (u32, u32) {
        self.crtc.last_frame
    }

    fn get_display_extents(&self) -> &DisplayExtents {
        &self.extents
    }

    fn list_display_apertures(&self) -> Vec<DisplayApertureDesc> {
        XGA_APERTURE_DESCS.to_vec()
    }

    fn get_display_apertures(&self) -> Vec<DisplayAperture> {
        XGA_APERTURES.to_vec()
    }

    fn get_overscan_color(&self) -> u8 {
        self.ext.border_color
    }

    fn get_buf(&self, buf_select: BufferSelect) -> &[u8] {
        match buf_select {
            BufferSelect::Back => bytemuck::cast_slice(&self.buf[self.back_buf][..]),
            BufferSelect::Front => bytemuck::cast_slice(&self.buf[self.front_buf][..]),
        }
    }

    fn get_display_buf(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buf[self.front_buf][..])
    }

    fn get_scanline(&self) -> u32 {
        self.crtc.displine
    }

    fn get_refresh_rate(&self) -> u32 {
        self.crtc.refresh_rate()
    }

    fn get_start_address(&self) -> u32 {
        self.ext.disp_start_addr << 2
    }

    fn get_videocard_string_state(&self) -> VideoCardState {
        let mut map = HashMap::new();

        let mut general_vec = Vec::new();
        push_reg_str!(general_vec, "Type", "", self.xga_type);
        push_reg_str!(general_vec, "Bus", "", format!("{:?}", self.bus));
        push_reg_str!(general_vec, "Extended Display", "", self.on);
        push_reg_str!(general_vec, "Display Mode", "", self.get_display_mode());
        push_reg_str!(general_vec, "Op Mode", "", format!("{:02X}", self.ext.op_mode));
        push_reg_str!(general_vec, "Aperture Control", "", format!("{:02X}", self.ext.aperture_cntl));
        push_reg_str!(general_vec, "Access Mode", "", format!("{:02X}", self.ext.access_mode));
        map.insert("General".to_string(), general_vec);

        let window_str = |window: Option<Window>| match window {
            Some(w) => format!("{:08X}-{:08X}", w.address, w.address + w.size - 1),
            None => "Unmapped".to_string(),
        };
        let mut aperture_vec = Vec::new();
        push_reg_str!(aperture_vec, "Endian Reverse", "", self.aperture.endian_reverse);
        push_reg_str!(aperture_vec, "Banked", "", window_str(self.aperture.banked));
        push_reg_str!(aperture_vec, "Bank", "", format!("{:06X}", self.aperture.bank));
        push_reg_str!(aperture_vec, "Linear", "", window_str(self.aperture.linear));
        push_reg_str!(aperture_vec, "Linear Base", "", format!("{:08X}", self.aperture.linear_base));
        push_reg_str!(aperture_vec, "1MB Base", "", format!("{:08X}", self.aperture.base_addr_1mb));
        push_reg_str!(aperture_vec, "ROM", "", window_str(self.aperture.rom_window));
        push_reg_str!(aperture_vec, "Registers", "", window_str(self.aperture.memio_window));
        push_reg_str!(aperture_vec, "Ext Ports", "", match self.aperture.ext_ports_enabled {
            true => format!("{:04X}", self.ext_port_base()),
            false => "Disabled".to_string(),
        });
        map.insert("Aperture".to_string(), aperture_vec);

        let mut crtc_vec = Vec::new();
        push_reg_str!(crtc_vec, "Horizontal Total", "[10/11]", self.ext.htotal);
        push_reg_str!(crtc_vec, "Horizontal Display", "[12/13]", self.ext.hdisp);
        push_reg_str!(crtc_vec, "Vertical Total", "[20/21]", self.ext.vtotal);
        push_reg_str!(crtc_vec, "Vertical Display End", "[22/23]", self.ext.vdispend);
        push_reg_str!(crtc_vec, "Vertical Blank Start", "[24/25]", self.ext.vblankstart);
        push_reg_str!(crtc_vec, "Vertical Sync Start", "[28/29]", self.ext.vsyncstart);
        push_reg_str!(crtc_vec, "Line Compare", "[2C/2D]", self.ext.linecmp);
        push_reg_str!(crtc_vec, "Start Address", "[40-42]", format!("{:05X}", self.ext.disp_start_addr));
        push_reg_str!(crtc_vec, "Pixel Map Width", "[43/44]", self.ext.pix_map_width);
        push_reg_str!(crtc_vec, "Display Control 1", "[50]", format!("{:08b}", self.ext.disp_cntl_1_byte()));
        push_reg_str!(crtc_vec, "Display Control 2", "[51]", format!("{:08b}", self.ext.disp_cntl_2_byte()));
        push_reg_str!(crtc_vec, "Pixel Clock", "", self.crtc.pixel_clock);
        push_reg_str!(crtc_vec, "Interlace", "", self.crtc.interlace);
        map.insert("CRTC".to_string(), crtc_vec);

        let mut raster_vec = Vec::new();
        push_reg_str!(raster_vec, "Display Line", "", self.crtc.displine);
        push_reg_str!(raster_vec, "Vertical Counter", "", self.crtc.vc);
        push_reg_str!(raster_vec, "Row Scan", "", self.crtc.sc);
        push_reg_str!(raster_vec, "Memory Address", "", format!("{:05X}", self.crtc.ma));
        push_reg_str!(raster_vec, "Frame Count", "", self.frame_count);
        map.insert("Raster".to_string(), raster_vec);

        let mut cursor_vec = Vec::new();
        push_reg_str!(cursor_vec, "Position", "", format!("{},{}", self.cursor.pos_x, self.cursor.pos_y));
        push_reg_str!(cursor_vec, "Hotspot", "", format!("{},{}", self.cursor.hotspot_x, self.cursor.hotspot_y));
        push_reg_str!(cursor_vec, "Enabled", "", self.cursor.enabled());
        push_reg_str!(cursor_vec, "Data On", "", self.cursor.data_on);
        map.insert("Cursor".to_string(), cursor_vec);

        let command = self.accel.command;
        let mut accel_vec = Vec::new();
        push_reg_str!(accel_vec, "Command", "", format!("{:08X}", command.to_u32()));
        push_reg_str!(
            accel_vec,
            "Operation",
            "",
            command
                .decoded_opcode()
                .map(|op| op.to_string())
                .unwrap_or_else(|| format!("Invalid ({:X})", command.opcode()))
        );
        push_reg_str!(accel_vec, "Foreground Mix", "", format!("{:02X}", self.accel.frgd_mix));
        push_reg_str!(accel_vec, "Background Mix", "", format!("{:02X}", self.accel.bkgd_mix));
        push_reg_str!(accel_vec, "Destination", "", format!("{},{}", self.accel.dst_x, self.accel.dst_y));
        for (i, pixel_map) in self.accel.maps.iter().enumerate() {
            push_reg_str!(
                accel_vec,
                i,
                "Map",
                format!(
                    "{:08X} {}x{} fmt {:02X}",
                    pixel_map.base,
                    pixel_map.width as u32 + 1,
                    pixel_map.height as u32 + 1,
                    pixel_map.format
                )
            );
        }
        map.insert("Accelerator".to_string(), accel_vec);

        let dac_vec = self
            .dac
            .palette
            .iter()
            .enumerate()
            .take(16)
            .map(|(i, entry)| {
                (
                    format!("{}", i),
                    VideoCardStateEntry::Color(format!("{:06X}", entry.to_rgb32()), entry.r, entry.g, entry.b),
                )
            })
            .collect();
        map.insert("DAC".to_string(), dac_vec);

        map
    }

    fn run(&mut self, time: DeviceRunTimeUnit) {
        let elapsed_us = match time {
            DeviceRunTimeUnit::Microseconds(us) => us,
            DeviceRunTimeUnit::SystemTicks(ticks) => ticks as f64 / self.system_clock_mhz,
        };
        self.run_clocks(elapsed_us * self.crtc.pixel_clock.mhz());
    }

    fn debug_tick(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.poll();
        }
    }

    /// Reset drops the ROM and register windows and turns the extended display off. An ISA card
    /// has no POS setup cycle to bring the windows back, so its option-switch configuration is
    /// applied again immediately.
    fn reset(&mut self) {
        log::debug!("Resetting {}", self.xga_type);
        match self.bus {
            XgaBus::Mca => self.mca_reset(),
            XgaBus::Isa => {
                self.reset_card();
                self.attach_isa();
            }
        }
    }

    fn get_frame_count(&self) -> u64 {
        self.frame_count
    }

    fn dump_mem(&self, path: &Path) {
        let mut filename = path.to_path_buf();
        filename.push("xga_mem.bin");

        match fs::write(filename.clone(), self.vram.data()) {
            Ok(_) => {
                log::debug!("Wrote memory dump: {}", filename.display())
            }
            Err(e) => {
                log::error!("Failed to write memory dump '{}': {}", filename.display(), e)
            }
        }
    }

    fn write_trace_log(&mut self, msg: String) {
        self.trace_logger.print(msg);
    }

    fn trace_flush(&mut self) {
        self.trace_logger.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::xga::{
        ext_regs::*,
        tests::{isa_card, mca_card},
    };
    use std::{cell::RefCell, rc::Rc};

    struct CountingSink {
        frames: Rc<RefCell<Vec<(u32, u32)>>>,
    }

    impl FrameSink for CountingSink {
        fn blit(&mut self, width: u32, height: u32, frame: &[u32], stride: usize) {
            assert_eq!(stride, XGA_FIELD_W as usize);
            assert_eq!(frame.len(), (XGA_FIELD_W * XGA_FIELD_H) as usize);
            self.frames.borrow_mut().push((width, height));
        }
    }

    fn write_reg(card: &mut XgaCard, idx: u8, data: u8) {
        card.ext_port_write(EXT_INDEX, idx);
        card.ext_port_write(0x0B, data);
    }

    #[test]
    fn reports_type_and_mode() {
        let mut card = mca_card();
        assert_eq!(card.get_video_type(), VideoType::Xga);
        assert_eq!(card.get_display_mode(), DisplayMode::Blanked);
        write_reg(&mut card, REG_DISP_CNTL_2, 0x04);
        assert_eq!(card.get_display_mode(), DisplayMode::Bpp16);
        assert_eq!(card.list_display_apertures().len(), card.get_display_apertures().len());
        assert_eq!(card.get_display_buf().len(), (XGA_FIELD_W * XGA_FIELD_H * 4) as usize);

        let state = card.get_videocard_string_state();
        assert!(state.contains_key("CRTC"));
        assert!(state.contains_key("Accelerator"));
        assert!(state.contains_key("Aperture"));
    }

    #[test]
    fn run_delivers_frames_to_sink() {
        let mut card = mca_card();
        let frames = Rc::new(RefCell::new(Vec::new()));
        card.set_frame_sink(Box::new(CountingSink { frames: frames.clone() }));

        write_reg(&mut card, REG_DISP_CNTL_2, 0x03);
        write_reg(&mut card, REG_HTOTAL_LO, 11);
        write_reg(&mut card, REG_HTOTAL_HI, 0);
        write_reg(&mut card, REG_HDISP_LO, 7);
        write_reg(&mut card, REG_HDISP_HI, 0);
        write_reg(&mut card, REG_VTOTAL_LO, 23);
        write_reg(&mut card, REG_VTOTAL_HI, 0);
        write_reg(&mut card, REG_VDISPEND_LO, 15);
        write_reg(&mut card, REG_VDISPEND_HI, 0);
        write_reg(&mut card, REG_VSYNCSTART_LO, 17);
        write_reg(&mut card, REG_VSYNCSTART_HI, 0);
        write_reg(&mut card, REG_LINECMP_LO, 0xFF);
        write_reg(&mut card, REG_LINECMP_HI, 0x07);

        // 96 clocks per line at 25.175MHz, 24 lines per frame: about 91.5us per frame.
        for _ in 0..4 {
            card.run(DeviceRunTimeUnit::Microseconds(100.0));
        }
        assert!(card.get_frame_count() >= 3);
        assert_eq!(frames.borrow().len() as u64, card.get_frame_count());
        assert_eq!(card.get_display_size(), (64, 15));
    }

    #[test]
    fn system_ticks_are_converted() {
        let mut card = mca_card();
        write_reg(&mut card, REG_DISP_CNTL_2, 0x03);
        write_reg(&mut card, REG_HDISP_LO, 7);
        write_reg(&mut card, REG_HDISP_HI, 0);
        // 64 pixel clocks at 25.175MHz is about 2.54us, or 36.4 system ticks.
        card.run(DeviceRunTimeUnit::SystemTicks(36));
        assert!(!card.crtc().linepos);
        card.run(DeviceRunTimeUnit::SystemTicks(1));
        assert!(card.crtc().linepos);
    }

    #[test]
    fn isa_reset_restores_register_window() {
        let mut card = isa_card();
        write_reg(&mut card, REG_DISP_CNTL_2, 0x03);
        card.reset();
        assert!(!card.is_on());
        assert!(card.aperture.memio_window.is_some());
        assert!(card.aperture.ext_ports_enabled);
        assert!(card.take_mapping_dirty());
    }

    #[test]
    fn mca_reset_clears_pos_enable() {
        let mut card = mca_card();
        card.mca_pos_write(0x102, 0x01);
        card.reset();
        assert_eq!(card.mca_feedback(), 0);
        assert!(card.aperture.memio_window.is_none());
    }
}
