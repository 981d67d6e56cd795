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

    config.rs

    XGA card configuration. Deserialized from TOML by the host and checked
    once at attach time.

*/

use std::path::PathBuf;

use serde_derive::Deserialize;
use strum_macros::{Display, EnumIter};

use crate::error::XgaError;

pub const DEFAULT_INSTANCE: u8 = 6;
pub const DEFAULT_EXT_MEM_ADDR: u8 = 0xF0;
pub const DEFAULT_DMA: u8 = 7;
pub const DEFAULT_VRAM_KIB: usize = 1024;
pub const DEFAULT_SYSTEM_MEMORY_KIB: usize = 16384;

const fn _default_instance() -> u8 {
    DEFAULT_INSTANCE
}
const fn _default_ext_mem_addr() -> u8 {
    DEFAULT_EXT_MEM_ADDR
}
const fn _default_dma() -> u8 {
    DEFAULT_DMA
}
const fn _default_vram_kib() -> usize {
    DEFAULT_VRAM_KIB
}
const fn _default_system_memory_kib() -> usize {
    DEFAULT_SYSTEM_MEMORY_KIB
}

#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq, Display, EnumIter)]
pub enum XgaType {
    #[default]
    #[strum(serialize = "XGA")]
    Xga1,
    #[strum(serialize = "XGA-2")]
    Xga2,
}

#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq, Display, EnumIter)]
pub enum XgaBus {
    #[default]
    Mca,
    Isa,
}

#[derive(Clone, Debug, Deserialize)]
pub struct XgaConfig {
    #[serde(default)]
    pub xga_type: XgaType,
    #[serde(default)]
    pub bus: XgaBus,
    #[serde(default = "_default_instance")]
    pub instance: u8,
    /// MMIO address selector for ISA cards. Bits 4-7 select a ROM window from C0000.
    #[serde(default = "_default_ext_mem_addr")]
    pub ext_mem_addr: u8,
    #[serde(default = "_default_dma")]
    pub dma: u8,
    #[serde(default = "_default_vram_kib")]
    pub vram_kib: usize,
    #[serde(default = "_default_system_memory_kib")]
    pub system_memory_kib: usize,
    #[serde(default)]
    pub rom_path: Option<PathBuf>,
    /// Combined VGA/XGA adapter (INMOS). Selects the alternate ISA POS layout.
    #[serde(default)]
    pub integrated_vga: bool,
    #[serde(default)]
    pub trace_file: Option<PathBuf>,
}

impl Default for XgaConfig {
    fn default() -> Self {
        Self {
            xga_type: Default::default(),
            bus: Default::default(),
            instance: DEFAULT_INSTANCE,
            ext_mem_addr: DEFAULT_EXT_MEM_ADDR,
            dma: DEFAULT_DMA,
            vram_kib: DEFAULT_VRAM_KIB,
            system_memory_kib: DEFAULT_SYSTEM_MEMORY_KIB,
            rom_path: None,
            integrated_vga: false,
            trace_file: None,
        }
    }
}

impl XgaConfig {
    pub fn from_toml_str(toml_string: &str) -> Result<Self, XgaError> {
        let config: XgaConfig = toml::from_str(toml_string).map_err(|e| XgaError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), XgaError> {
        if !self.vram_kib.is_power_of_two() || !(512..=4096).contains(&self.vram_kib) {
            return Err(XgaError::InvalidVramSize(self.vram_kib));
        }
        if self.instance > 7 {
            return Err(XgaError::InvalidInstance(self.instance));
        }
        if !matches!(self.dma, 0 | 6 | 7) {
            return Err(XgaError::InvalidDmaChannel(self.dma));
        }
        if self.ext_mem_addr & 0x0F != 0 || !(0x40..=0xF0).contains(&self.ext_mem_addr) {
            return Err(XgaError::InvalidMemioAddress(self.ext_mem_addr));
        }
        Ok(())
    }

    pub fn vram_size(&self) -> usize {
        self.vram_kib * 1024
    }
}
