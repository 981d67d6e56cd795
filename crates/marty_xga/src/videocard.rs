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

    videocard.rs

    Defines the VideoCard trait and the types a frontend uses to present and
    inspect an adapter.

*/

use std::{collections::HashMap, path::Path};

use strum_macros::{Display, EnumIter};

use crate::bus::DeviceRunTimeUnit;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display)]
pub enum VideoType {
    #[default]
    None,
    #[strum(serialize = "XGA")]
    Xga,
    #[strum(serialize = "XGA-2")]
    Xga2,
}

/// Display modes selected by the low three bits of display control 2.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, EnumIter)]
pub enum DisplayMode {
    #[default]
    #[strum(serialize = "Blanked")]
    Blanked,
    #[strum(serialize = "2 bpp")]
    Bpp2,
    #[strum(serialize = "4 bpp")]
    Bpp4,
    #[strum(serialize = "8 bpp")]
    Bpp8,
    #[strum(serialize = "16 bpp")]
    Bpp16,
    #[strum(serialize = "Reserved")]
    Reserved,
}

impl DisplayMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => DisplayMode::Blanked,
            1 => DisplayMode::Bpp2,
            2 => DisplayMode::Bpp4,
            3 => DisplayMode::Bpp8,
            4 => DisplayMode::Bpp16,
            _ => DisplayMode::Reserved,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum VideoCardStateEntry {
    Value8(u8),
    Value16(u16),
    Value32(u32),
    String(String),
    Color(String, u8, u8, u8),
}

pub type VideoCardState = HashMap<String, Vec<(String, VideoCardStateEntry)>>;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DisplayApertureType {
    #[default]
    Cropped,
    Full,
    Debug,
}

#[derive(Copy, Clone, Debug)]
pub enum BufferSelect {
    Front,
    Back,
}

#[derive(Clone)]
pub struct DisplayApertureDesc {
    pub name: &'static str,
    pub aper_enum: DisplayApertureType,
}

/// A display aperture defines a visible subset rect of the total display field generated by a
/// video card. w and h provide the dimensions of this rect, and x and y the horizontal and
/// vertical offsets from the origin (0,0).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DisplayAperture {
    pub w: u32,
    pub h: u32,
    pub x: u32,
    pub y: u32,
    pub debug: bool,
}

#[derive(Clone, Debug)]
pub struct DisplayExtents {
    pub apertures: Vec<DisplayAperture>, // List of display aperture definitions.
    pub field_w: u32,                    // The total width of the video field
    pub field_h: u32,                    // The total height of the video field
    pub row_stride: usize,               // Number of bytes in frame buffer to skip to reach next row
}

/// Receives completed frames. The XGA hands off one frame per vertical sync.
pub trait FrameSink {
    /// `frame` is the full 32-bit XRGB field buffer; `width` and `height` describe the visible
    /// region starting at the top-left display offset, and `stride` is the field width in pixels.
    fn blit(&mut self, width: u32, height: u32, frame: &[u32], stride: usize);
}

pub trait VideoCard {
    /// Returns the type of the adapter.
    fn get_video_type(&self) -> VideoType;

    /// Returns the currently configured DisplayMode
    fn get_display_mode(&self) -> DisplayMode;

    /// Return the size (width, height) of the last rendered frame.
    fn get_display_size(&self) -> (u32, u32);

    /// Return the DisplayExtents struct corresponding to the last rendered frame.
    fn get_display_extents(&self) -> &DisplayExtents;

    /// Return a list of available display aperture names and types
    fn list_display_apertures(&self) -> Vec<DisplayApertureDesc>;

    /// Return a list of display aperture definitions
    fn get_display_apertures(&self) -> Vec<DisplayAperture>;

    /// Return the palette index of the active overscan color.
    fn get_overscan_color(&self) -> u8;

    /// Return the u8 slice representing the selected buffer type.
    fn get_buf(&self, buf_select: BufferSelect) -> &[u8];

    /// Return the u8 slice representing the front buffer of the device.
    fn get_display_buf(&self) -> &[u8];

    /// Get the current scanline being rendered.
    fn get_scanline(&self) -> u32;

    /// Get the current refresh rate from the adapter.
    fn get_refresh_rate(&self) -> u32;

    /// Get the current display start address, in bytes.
    fn get_start_address(&self) -> u32;

    /// Returns a hash map of vectors containing name and value pairs.
    ///
    /// This allows returning multiple categories of related registers.
    fn get_videocard_string_state(&self) -> VideoCardState;

    /// Runs the video card device for the specified period of time
    fn run(&mut self, time: DeviceRunTimeUnit);

    /// Advance the raster by the specified number of poll events, independent of machine state.
    fn debug_tick(&mut self, ticks: u32);

    /// Reset the video card
    fn reset(&mut self);

    /// Return the number of frames the video device has rendered
    fn get_frame_count(&self) -> u64;

    /// Dump graphics memory to disk
    fn dump_mem(&self, path: &Path);

    /// Write a string to the video device's trace log (if one is configured)
    fn write_trace_log(&mut self, msg: String);

    /// Flush the trace log (if one is configured)
    fn trace_flush(&mut self);
}
