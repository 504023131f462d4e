//! Reference palette for garment color classification.

use serde::{Serialize, Serializer};
use std::fmt;

/// Consolidated color categories reported for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorName {
    Black,
    Gray,
    Red,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    White,
}

impl ColorName {
    pub const ALL: [ColorName; 10] = [
        ColorName::Black,
        ColorName::Gray,
        ColorName::Red,
        ColorName::Brown,
        ColorName::Orange,
        ColorName::Yellow,
        ColorName::Green,
        ColorName::Blue,
        ColorName::Purple,
        ColorName::White,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorName::Black => "Black",
            ColorName::Gray => "Gray",
            ColorName::Red => "Red",
            ColorName::Brown => "Brown",
            ColorName::Orange => "Orange",
            ColorName::Yellow => "Yellow",
            ColorName::Green => "Green",
            ColorName::Blue => "Blue",
            ColorName::Purple => "Purple",
            ColorName::White => "White",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColorName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A reference color on the 0-255 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorEntry {
    pub rgb: [f32; 3],
    pub name: ColorName,
}

const fn entry(r: f32, g: f32, b: f32, name: ColorName) -> ColorEntry {
    ColorEntry {
        rgb: [r, g, b],
        name,
    }
}

use ColorName::*;

pub const PALETTE_SIZE: usize = 61;

/// Entry order is significant: nearest-color ties resolve to the lower index.
pub static PALETTE: [ColorEntry; PALETTE_SIZE] = [
    // black & gray
    entry(0.0, 0.0, 0.0, Black),
    entry(51.0, 0.0, 25.0, Black),
    entry(32.0, 32.0, 32.0, Black),
    entry(64.0, 64.0, 64.0, Black),
    entry(96.0, 96.0, 96.0, Gray),
    // red
    entry(102.0, 0.0, 0.0, Red),
    entry(153.0, 0.0, 0.0, Red),
    entry(204.0, 0.0, 0.0, Red),
    entry(255.0, 0.0, 0.0, Red),
    entry(255.0, 51.0, 51.0, Red),
    entry(125.0, 35.0, 35.0, Red),
    // brown
    entry(51.0, 25.0, 0.0, Brown),
    entry(102.0, 51.0, 0.0, Brown),
    entry(153.0, 76.0, 0.0, Brown),
    // orange
    entry(204.0, 102.0, 0.0, Orange),
    entry(255.0, 128.0, 0.0, Orange),
    entry(230.0, 60.0, 10.0, Orange),
    // yellow
    entry(153.0, 153.0, 0.0, Yellow),
    entry(204.0, 204.0, 0.0, Yellow),
    entry(255.0, 255.0, 0.0, Yellow),
    entry(255.0, 255.0, 51.0, Yellow),
    entry(255.0, 255.0, 102.0, Yellow),
    entry(200.0, 200.0, 90.0, Yellow),
    // green
    entry(0.0, 102.0, 0.0, Green),
    entry(0.0, 153.0, 0.0, Green),
    entry(0.0, 204.0, 0.0, Green),
    entry(0.0, 255.0, 0.0, Green),
    entry(51.0, 255.0, 51.0, Green),
    entry(0.0, 51.0, 25.0, Green),
    entry(0.0, 102.0, 51.0, Green),
    entry(0.0, 153.0, 76.0, Green),
    entry(28.0, 72.0, 68.0, Green),
    entry(60.0, 90.0, 50.0, Green),
    entry(90.0, 202.0, 162.0, Green),
    // blue
    entry(0.0, 0.0, 102.0, Blue),
    entry(0.0, 0.0, 153.0, Blue),
    entry(0.0, 0.0, 204.0, Blue),
    entry(0.0, 0.0, 255.0, Blue),
    entry(51.0, 255.0, 255.0, Blue),
    entry(0.0, 25.0, 51.0, Blue),
    entry(0.0, 51.0, 102.0, Blue),
    entry(0.0, 76.0, 153.0, Blue),
    entry(0.0, 102.0, 204.0, Blue),
    entry(0.0, 128.255, 0.0, Blue),
    entry(50.0, 40.0, 102.0, Blue),
    entry(102.0, 150.0, 200.0, Blue),
    // purple
    entry(51.0, 0.0, 102.0, Purple),
    entry(76.0, 0.0, 153.0, Purple),
    entry(102.0, 0.0, 204.0, Purple),
    entry(127.0, 0.0, 255.0, Purple),
    entry(153.0, 51.0, 255.0, Purple),
    entry(178.0, 102.0, 255.0, Purple),
    entry(204.0, 153.0, 255.0, Purple),
    entry(120.0, 60.0, 120.0, Purple),
    entry(66.0, 28.0, 75.0, Purple),
    entry(189.0, 137.0, 183.0, Purple),
    // white & gray
    entry(255.0, 255.0, 255.0, White),
    entry(224.0, 224.0, 224.0, White),
    entry(192.0, 192.0, 192.0, White),
    entry(160.0, 160.0, 160.0, Gray),
    entry(128.0, 128.0, 128.0, Gray),
];

/// Code used when a region has no recognised color.
pub const UNKNOWN_CODE: u8 = 9;

/// Ordinal code for head and upper-body colors.
pub fn top_color_code(color: Option<ColorName>) -> u8 {
    match color {
        Some(Black) => 0,
        Some(Purple) => 1,
        Some(Green) => 2,
        Some(Blue) => 3,
        Some(Gray) => 4,
        Some(White) => 5,
        Some(Yellow) => 6,
        Some(Red) => 7,
        Some(Brown) => 8,
        _ => UNKNOWN_CODE,
    }
}

/// Ordinal code for lower-body colors. Deliberately not the same ordering as
/// [`top_color_code`].
pub fn bottom_color_code(color: Option<ColorName>) -> u8 {
    match color {
        Some(White) => 0,
        Some(Purple) => 1,
        Some(Black) => 2,
        Some(Green) => 3,
        Some(Gray) => 4,
        Some(Red) => 5,
        Some(Yellow) => 6,
        Some(Blue) => 7,
        Some(Brown) => 8,
        _ => UNKNOWN_CODE,
    }
}
