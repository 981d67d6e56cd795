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

    devices::xga::rop.rs

    Mix (raster operation) and plane mask logic for the XGA coprocessor.

*/

use strum_macros::{Display, EnumIter, FromRepr};

/// The 22 defined coprocessor mixes, selected by the low five bits of a mix register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum Mix {
    Zeros = 0x00,
    And = 0x01,
    AndNotDest = 0x02,
    Source = 0x03,
    NotSourceAndDest = 0x04,
    Dest = 0x05,
    Xor = 0x06,
    Or = 0x07,
    Nor = 0x08,
    Xnor = 0x09,
    NotDest = 0x0A,
    SourceOrNotDest = 0x0B,
    NotSource = 0x0C,
    NotSourceOrDest = 0x0D,
    Nand = 0x0E,
    Ones = 0x0F,
    Maximum = 0x10,
    Minimum = 0x11,
    AddSaturate = 0x12,
    SubtractDest = 0x13,
    SubtractSource = 0x14,
    Average = 0x15,
}

impl Mix {
    /// Codes 0x16-0x1F are undefined and yield None.
    #[inline]
    pub fn from_code(code: u8) -> Option<Mix> {
        Mix::from_repr(code & 0x1F)
    }

    #[inline]
    pub fn apply(self, dest: u32, src: u32) -> u32 {
        match self {
            Mix::Zeros => 0,
            Mix::And => src & dest,
            Mix::AndNotDest => src & !dest,
            Mix::Source => src,
            Mix::NotSourceAndDest => !src & dest,
            Mix::Dest => dest,
            Mix::Xor => src ^ dest,
            Mix::Or => src | dest,
            Mix::Nor => !src & !dest,
            Mix::Xnor => src ^ !dest,
            Mix::NotDest => !dest,
            Mix::SourceOrNotDest => src | !dest,
            Mix::NotSource => !src,
            Mix::NotSourceOrDest => !src | dest,
            Mix::Nand => !src | !dest,
            Mix::Ones => !0,
            Mix::Maximum => src.max(dest),
            Mix::Minimum => src.min(dest),
            Mix::AddSaturate => (src as u64 + dest as u64).min(0xFF) as u32,
            Mix::SubtractDest => dest.saturating_sub(src),
            Mix::SubtractSource => src.saturating_sub(dest),
            Mix::Average => ((src as u64 + dest as u64) >> 1) as u32,
        }
    }
}

/// Apply the mix selected by `code`. Undefined codes leave the destination unchanged.
#[inline]
pub fn apply_rop(code: u8, dest: u32, src: u32) -> u32 {
    match Mix::from_code(code) {
        Some(mix) => mix.apply(dest, src),
        None => dest,
    }
}

/// Bits set in `plane_mask` take the new value, clear bits keep the old one.
#[inline]
pub fn apply_plane_mask(result: u32, old: u32, plane_mask: u32) -> u32 {
    (result & plane_mask) | (old & !plane_mask)
}

/// Evaluate a color compare condition. A false result suppresses the pixel write.
#[inline]
pub fn color_compare(condition: u8, dest: u32, compare: u32) -> bool {
    match condition & 0x07 {
        1 => dest > compare,
        2 => dest == compare,
        3 => dest < compare,
        4 => true,
        5 => dest >= compare,
        6 => dest != compare,
        7 => dest <= compare,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    const SAMPLES: [u32; 4] = [0x00, 0xFF, 0x55, 0xAA];

    #[test]
    fn boolean_mixes_match_truth_table() {
        for &d in SAMPLES.iter() {
            for &s in SAMPLES.iter() {
                assert_eq!(apply_rop(0x00, d, s), 0);
                assert_eq!(apply_rop(0x01, d, s), s & d);
                assert_eq!(apply_rop(0x02, d, s), s & !d);
                assert_eq!(apply_rop(0x03, d, s), s);
                assert_eq!(apply_rop(0x04, d, s), !s & d);
                assert_eq!(apply_rop(0x05, d, s), d);
                assert_eq!(apply_rop(0x06, d, s), s ^ d);
                assert_eq!(apply_rop(0x07, d, s), s | d);
                assert_eq!(apply_rop(0x08, d, s), !s & !d);
                assert_eq!(apply_rop(0x09, d, s), s ^ !d);
                assert_eq!(apply_rop(0x0A, d, s), !d);
                assert_eq!(apply_rop(0x0B, d, s), s | !d);
                assert_eq!(apply_rop(0x0C, d, s), !s);
                assert_eq!(apply_rop(0x0D, d, s), !s | d);
                assert_eq!(apply_rop(0x0E, d, s), !s | !d);
                assert_eq!(apply_rop(0x0F, d, s), !0);
            }
        }
    }

    #[test]
    fn arithmetic_mixes_saturate() {
        for &d in SAMPLES.iter() {
            for &s in SAMPLES.iter() {
                assert_eq!(apply_rop(0x10, d, s), s.max(d));
                assert_eq!(apply_rop(0x11, d, s), s.min(d));
                assert_eq!(apply_rop(0x12, d, s), (s + d).min(0xFF));
                assert_eq!(apply_rop(0x13, d, s), if d > s { d - s } else { 0 });
                assert_eq!(apply_rop(0x14, d, s), if s > d { s - d } else { 0 });
                assert_eq!(apply_rop(0x15, d, s), (s + d) >> 1);
            }
        }
        assert_eq!(apply_rop(0x12, 0xFF, 0xFF), 0xFF);
        assert_eq!(apply_rop(0x15, 0xFFFF_FFFF, 0xFFFF_FFFF), 0xFFFF_FFFF);
    }

    #[test]
    fn undefined_codes_keep_dest() {
        for code in 0x16..=0x1F {
            assert_eq!(apply_rop(code, 0x5A, 0xFF), 0x5A);
        }
        // Only the low five bits select the mix.
        assert_eq!(apply_rop(0x23, 0x00, 0x77), 0x77);
        assert_eq!(Mix::iter().count(), 22);
    }

    #[test]
    fn plane_mask_merges_old_bits() {
        assert_eq!(apply_plane_mask(0x0F, 0xF0, 0x00), 0xF0);
        // Mask 0x0F, old 0xF0, new 0x00.
        assert_eq!(apply_plane_mask(0x00, 0xF0, 0x0F), 0xF0);
        assert_eq!(apply_plane_mask(0x0F, 0xF0, 0xFF), 0x0F);
        assert_eq!(apply_plane_mask(0xAB, 0x12, 0xF0), 0xA2);
    }

    #[test]
    fn color_compare_conditions() {
        assert!(!color_compare(0, 1, 1));
        assert!(color_compare(1, 2, 1));
        assert!(color_compare(2, 1, 1));
        assert!(color_compare(3, 0, 1));
        assert!(color_compare(4, 0, 0));
        assert!(color_compare(5, 1, 1));
        assert!(color_compare(6, 0, 1));
        assert!(color_compare(7, 1, 1));
        assert!(!color_compare(7, 2, 1));
    }
}
