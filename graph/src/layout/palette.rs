use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Lane colors, cycled by branch index. Wraparound collisions are accepted.
pub const PALETTE: [Color; 9] = [
    Color::rgb(30, 144, 255),  // dodger blue
    Color::rgb(199, 21, 133),  // medium violet red
    Color::rgb(189, 183, 107), // dark khaki
    Color::rgb(144, 238, 144), // light green
    Color::rgb(148, 0, 211),   // dark violet
    Color::rgb(139, 69, 19),   // saddle brown
    Color::rgb(34, 139, 34),   // forest green
    Color::rgb(127, 255, 212), // aquamarine
    Color::rgb(138, 43, 226),  // blue violet
];

pub fn color_for(branch_index: usize) -> Color {
    PALETTE[branch_index % PALETTE.len()]
}
