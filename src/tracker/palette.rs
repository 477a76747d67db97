//! Display colors keyed by a track's display index.

use rand::Rng;

/// Opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
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

/// Fixed palette, handed out in birth order.
pub const PALETTE: [Color; 16] = [
    Color::rgb(255, 255, 255), // white
    Color::rgb(0, 255, 255),   // cyan
    Color::rgb(255, 128, 0),   // orange
    Color::rgb(153, 102, 51),  // brown
    Color::rgb(255, 0, 0),     // red
    Color::rgb(0, 255, 0),     // green
    Color::rgb(0, 0, 255),     // blue
    Color::rgb(255, 255, 0),   // yellow
    Color::rgb(255, 0, 255),   // magenta
    Color::rgb(128, 0, 128),   // purple
    Color::rgb(0, 255, 0),     // light green
    Color::rgb(85, 85, 85),    // dark gray
    Color::rgb(128, 128, 128), // gray
    Color::rgb(0, 250, 240),   // light blue
    Color::rgb(0, 0, 0),       // black
    Color::rgb(170, 170, 170), // light gray
];

/// Color for a display index; indices past the palette get a random color.
pub fn color_at(index: u32) -> Color {
    match PALETTE.get(index as usize) {
        Some(color) => *color,
        None => random_color(),
    }
}

fn random_color() -> Color {
    let mut rng = rand::thread_rng();
    Color::rgb(rng.r#gen(), rng.r#gen(), rng.r#gen())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_deterministic() {
        for i in 0..PALETTE.len() as u32 {
            assert_eq!(color_at(i), color_at(i));
        }
        assert_eq!(color_at(0), Color::rgb(255, 255, 255));
        assert_eq!(color_at(4), Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_past_palette_still_yields_color() {
        // Random, so only check it does not panic.
        let _ = color_at(PALETTE.len() as u32);
        let _ = color_at(u32::MAX);
    }
}
