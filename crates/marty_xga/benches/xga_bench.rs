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

    benches::xga_bench.rs

    Benchmarks for the XGA coprocessor and raster.

*/

use marty_xga::{
    bus::{DeviceRunTimeUnit, IoDevice, MemoryMappedDevice},
    devices::xga::{accel::*, ext_regs::*, XGA_ROM_SIZE},
    tracelogger::TraceLogger,
    videocard::VideoCard,
    XgaBus,
    XgaCard,
    XgaConfig,
};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;

fn write_index(card: &mut XgaCard, idx: u8, data: u16) {
    let base = card.ext_port_base();
    let now = DeviceRunTimeUnit::Microseconds(0.0);
    card.write_u8(base + EXT_INDEX, idx, now);
    card.write_u8(base + 0x0B, data as u8, now);
    card.write_u8(base + EXT_INDEX, idx + 1, now);
    card.write_u8(base + 0x0B, (data >> 8) as u8, now);
}

/// An ISA card in a non-interlaced 1024x768 8bpp mode with linear memory enabled.
fn setup_card() -> XgaCard {
    let config = XgaConfig {
        bus: XgaBus::Isa,
        ..Default::default()
    };
    let mut card = XgaCard::attach(&config, &vec![0xFF; XGA_ROM_SIZE], TraceLogger::None).unwrap();
    let base = card.ext_port_base();
    let now = DeviceRunTimeUnit::Microseconds(0.0);

    card.write_u8(base + EXT_OP_MODE, 0x04, now);
    write_index(&mut card, REG_HTOTAL_LO, 167);
    write_index(&mut card, REG_HDISP_LO, 127);
    write_index(&mut card, REG_VTOTAL_LO, 805);
    write_index(&mut card, REG_VDISPEND_LO, 767);
    write_index(&mut card, REG_VSYNCSTART_LO, 770);
    write_index(&mut card, REG_LINECMP_LO, 0x7FF);
    card.write_u8(base + EXT_INDEX, REG_DISP_CNTL_2, now);
    card.write_u8(base + 0x0B, 0x03, now);
    card.write_u8(base + EXT_APERTURE_CNTL, 0x00, now);
    card
}

fn program_fill(card: &mut XgaCard) -> usize {
    let window = card.register_window().unwrap();
    let origin = card.pixel_map_origin();
    card.mmio_write_u8(window + ACCEL_REG_MAP_INDEX as usize, 1, 0, None);
    card.mmio_write_u32(window + ACCEL_REG_MAP_BASE as usize, origin, 0, None);
    card.mmio_write_u32(
        window + ACCEL_REG_MAP_SIZE as usize,
        ((HEIGHT - 1) << 16) | (WIDTH - 1),
        0,
        None,
    );
    card.mmio_write_u8(window + ACCEL_REG_MAP_FORMAT as usize, 0x03, 0, None);
    card.mmio_write_u8(window + ACCEL_REG_MIX as usize, 0x03, 0, None);
    card.mmio_write_u8(window + ACCEL_REG_CC_COND as usize, 0x04, 0, None);
    card.mmio_write_u32(window + ACCEL_REG_PLANE_MASK as usize, 0xFF, 0, None);
    card.mmio_write_u32(window + ACCEL_REG_FRGD_COLOR as usize, 0x2A, 0, None);
    card.mmio_write_u32(
        window + ACCEL_REG_BLT_DIM as usize,
        ((HEIGHT - 1) << 16) | (WIDTH - 1),
        0,
        None,
    );
    card.mmio_write_u32(window + ACCEL_REG_DST_XY as usize, 0, 0, None);
    window
}

pub fn xga_bench(c: &mut Criterion) {
    c.bench_function("xga_bench_bitblt_fill_1024x768", |b| {
        let mut card = setup_card();
        let window = program_fill(&mut card);
        let command = (Opcode::BitBlt as u32) << 24 | (PATTERN_FOREGROUND as u32) << 12 | 1 << 16;

        b.iter(|| {
            card.mmio_write_u32(window + ACCEL_REG_COMMAND as usize, black_box(command), 0, None);
        });
    });

    c.bench_function("xga_bench_raster_frame", |b| {
        let mut card = setup_card();
        card.force_redraw();

        b.iter(|| {
            let frame = card.get_frame_count();
            while card.get_frame_count() == frame {
                card.run(DeviceRunTimeUnit::Microseconds(1000.0));
            }
            card.force_redraw();
        });
    });
}

criterion_group!(benches, xga_bench);
criterion_main!(benches);
