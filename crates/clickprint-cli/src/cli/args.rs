//! Print-option values as they appear on the command line.

use clap::ValueEnum;
use clickprint_core::jobs::{ColorMode, Orientation, PageSelection, Sidedness};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorArg {
    Color,
    Bw,
}

impl From<ColorArg> for ColorMode {
    fn from(c: ColorArg) -> Self {
        match c {
            ColorArg::Color => ColorMode::Color,
            ColorArg::Bw => ColorMode::Bw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(o: OrientationArg) -> Self {
        match o {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SidesArg {
    Single,
    Double,
}

impl From<SidesArg> for Sidedness {
    fn from(s: SidesArg) -> Self {
        match s {
            SidesArg::Single => Sidedness::Single,
            SidesArg::Double => Sidedness::Double,
        }
    }
}

/// `--pages START-END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn selection(range: Option<PageRange>) -> PageSelection {
        match range {
            Some(r) => PageSelection::Range {
                start: r.start,
                end: r.end,
            },
            None => PageSelection::All,
        }
    }
}

pub fn parse_pages(s: &str) -> Result<PageRange, String> {
    let (a, b) = s
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got {:?}", s))?;
    let start: u32 = a
        .trim()
        .parse()
        .map_err(|_| format!("invalid start page {:?}", a))?;
    let end: u32 = b
        .trim()
        .parse()
        .map_err(|_| format!("invalid end page {:?}", b))?;
    if start == 0 || start > end {
        return Err(format!("page range {}-{} is empty or starts at 0", start, end));
    }
    Ok(PageRange { start, end })
}
