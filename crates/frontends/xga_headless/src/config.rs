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

    xga_headless::config.rs

    Parse the headless configuration file and command line arguments.
    Command line arguments override values read from the TOML file.

*/

use std::path::{Path, PathBuf};

use bpaf::Bpaf;
use marty_xga::{XgaBus, XgaConfig, XgaType};
use serde_derive::Deserialize;

use crate::mode::ModeSelect;

pub const DEFAULT_CONFIG_FILE: &str = "./xga.toml";
pub const DEFAULT_FRAMES: u32 = 60;

const fn _default_frames() -> u32 {
    DEFAULT_FRAMES
}
const fn _default_true() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct HeadlessParams {
    #[serde(default)]
    pub mode: ModeSelect,
    #[serde(default = "_default_frames")]
    pub frames: u32,
    /// Draw a color bar test pattern with the coprocessor after the mode is set.
    #[serde(default = "_default_true")]
    pub test_pattern: bool,
    #[serde(default)]
    pub dump_dir: Option<PathBuf>,
}

impl Default for HeadlessParams {
    fn default() -> Self {
        Self {
            mode: Default::default(),
            frames: DEFAULT_FRAMES,
            test_pattern: true,
            dump_dir: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConfigFileParams {
    #[serde(default)]
    pub xga: XgaConfig,
    #[serde(default)]
    pub headless: HeadlessParams,
}

#[derive(Debug, Default, Bpaf)]
#[bpaf(options, version, generate(cli_args))]
pub struct CmdLineArgs {
    #[bpaf(long)]
    pub config_file: Option<PathBuf>,

    #[bpaf(long)]
    pub rom: Option<PathBuf>,

    #[bpaf(long)]
    pub mode: Option<ModeSelect>,

    #[bpaf(long)]
    pub frames: Option<u32>,

    #[bpaf(long)]
    pub dump_dir: Option<PathBuf>,

    #[bpaf(long)]
    pub trace_file: Option<PathBuf>,

    #[bpaf(long, switch)]
    pub isa: bool,

    #[bpaf(long, switch)]
    pub xga2: bool,

    #[bpaf(long, switch)]
    pub no_test_pattern: bool,
}

impl ConfigFileParams {
    pub fn from_toml_str(toml_string: &str) -> Result<Self, anyhow::Error> {
        let params: ConfigFileParams = toml::from_str(toml_string)?;
        Ok(params)
    }

    /// Apply command line arguments on top of the values read from the configuration file.
    pub fn overlay(&mut self, shell_args: CmdLineArgs) {
        if let Some(rom) = shell_args.rom {
            self.xga.rom_path = Some(rom);
        }
        if let Some(mode) = shell_args.mode {
            self.headless.mode = mode;
        }
        if let Some(frames) = shell_args.frames {
            self.headless.frames = frames;
        }
        if let Some(dump_dir) = shell_args.dump_dir {
            self.headless.dump_dir = Some(dump_dir);
        }
        if let Some(trace_file) = shell_args.trace_file {
            self.xga.trace_file = Some(trace_file);
        }
        if shell_args.isa {
            self.xga.bus = XgaBus::Isa;
        }
        if shell_args.xga2 {
            self.xga.xga_type = XgaType::Xga2;
        }
        self.headless.test_pattern &= !shell_args.no_test_pattern;
    }
}

pub fn get_config<P>(default_path: P) -> Result<ConfigFileParams, anyhow::Error>
where
    P: AsRef<Path>,
{
    let shell_args: CmdLineArgs = cli_args().run();

    // The configuration file path may be overridden by the command line.
    let config_path = shell_args
        .config_file
        .clone()
        .unwrap_or_else(|| default_path.as_ref().to_path_buf());

    let mut toml_args = match std::fs::read_to_string(&config_path) {
        Ok(toml_string) => ConfigFileParams::from_toml_str(&toml_string)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && shell_args.config_file.is_none() => {
            log::warn!("No configuration file at {}, using defaults.", config_path.display());
            ConfigFileParams::default()
        }
        Err(e) => return Err(e.into()),
    };

    log::debug!("toml_config: {:?}", toml_args);

    toml_args.overlay(shell_args);
    toml_args.xga.validate()?;
    Ok(toml_args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_tables() {
        let params = ConfigFileParams::from_toml_str(
            r#"
            [xga]
            bus = "Isa"
            instance = 2

            [headless]
            mode = "Xga1024x768x8"
            frames = 10
            "#,
        )
        .unwrap();
        assert_eq!(params.xga.bus, XgaBus::Isa);
        assert_eq!(params.xga.instance, 2);
        assert_eq!(params.headless.mode, ModeSelect::Xga1024x768x8);
        assert_eq!(params.headless.frames, 10);
        assert!(params.headless.test_pattern);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let params = ConfigFileParams::from_toml_str("").unwrap();
        assert_eq!(params.xga.bus, XgaBus::Mca);
        assert_eq!(params.headless.frames, DEFAULT_FRAMES);
        assert_eq!(params.headless.mode, ModeSelect::Vga640x480x8);
    }

    #[test]
    fn command_line_overrides_file() {
        let mut params = ConfigFileParams::from_toml_str("[headless]\nframes = 5\n").unwrap();
        params.overlay(CmdLineArgs {
            frames: Some(2),
            mode: Some(ModeSelect::Vga640x480x16),
            isa: true,
            xga2: true,
            no_test_pattern: true,
            ..Default::default()
        });
        assert_eq!(params.headless.frames, 2);
        assert_eq!(params.headless.mode, ModeSelect::Vga640x480x16);
        assert_eq!(params.xga.bus, XgaBus::Isa);
        assert_eq!(params.xga.xga_type, XgaType::Xga2);
        assert!(!params.headless.test_pattern);
    }
}
