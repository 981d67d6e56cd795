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

    error.rs

    Error type for XGA card attach and configuration.

*/

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum XgaError {
    #[error("XGA boot ROM '{0}' could not be found")]
    RomNotFound(PathBuf),
    #[error("XGA boot ROM '{0}' could not be read: {1}")]
    RomRead(PathBuf, String),
    #[error("XGA boot ROM image is empty")]
    RomEmpty,
    #[error("Invalid video memory size: {0} KiB (must be a power of two from 512 KiB to 4096 KiB)")]
    InvalidVramSize(usize),
    #[error("Invalid XGA instance: {0} (must be 0-7)")]
    InvalidInstance(u8),
    #[error("Invalid DMA channel: {0} (must be 0, 6 or 7)")]
    InvalidDmaChannel(u8),
    #[error("Invalid MMIO address selector: {0:#04X}")]
    InvalidMemioAddress(u8),
    #[error("Error parsing XGA configuration: {0}")]
    ConfigParse(String),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}
