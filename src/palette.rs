//! Branch color palettes.
//!
//! Four palettes per background, picked by stem length. On the dark
//! background the palettes are light and widen towards darker tones as the
//! tree grows; on the light background they mirror that towards lighter tones.

use crate::constants::PALETTE_THRESHOLDS;
use rand::Rng;

/// Canvas background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    /// Black canvas, light branches
    #[default]
    Dark,
    /// White canvas, dark branches
    Light,
}

impl Background {
    /// The other background
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Background::Dark => Background::Light,
            Background::Light => Background::Dark,
        }
    }

    /// Flip in place
    pub fn toggle(&mut self) {
        *self = self.toggled();
    }

    /// Gray level the canvas is cleared to
    #[must_use]
    pub fn clear_level(self) -> u8 {
        match self {
            Background::Dark => 0,
            Background::Light => 255,
        }
    }
}

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Inclusive min/max range per color channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub red: (u8, u8),
    pub green: (u8, u8),
    pub blue: (u8, u8),
}

const DARK_PALETTES: [Palette; 4] = [
    Palette::gray_band(230, 255),
    Palette::gray_band(150, 255),
    Palette::gray_band(100, 255),
    Palette::gray_band(25, 255),
];

const LIGHT_PALETTES: [Palette; 4] = [
    Palette::gray_band(0, 50),
    Palette::gray_band(0, 100),
    Palette::gray_band(0, 150),
    Palette::gray_band(0, 250),
];

impl Palette {
    /// Same range on all three channels
    #[must_use]
    pub const fn gray_band(min: u8, max: u8) -> Self {
        Self {
            red: (min, max),
            green: (min, max),
            blue: (min, max),
        }
    }

    /// Palette index (0..4) for a stem length
    #[must_use]
    pub fn index_for(stem_length: f64) -> usize {
        PALETTE_THRESHOLDS
            .iter()
            .position(|&threshold| stem_length < threshold)
            .unwrap_or(PALETTE_THRESHOLDS.len())
    }

    /// Palette for a stem length on the given background
    #[must_use]
    pub fn select(stem_length: f64, background: Background) -> Self {
        let index = Self::index_for(stem_length);
        match background {
            Background::Dark => DARK_PALETTES[index],
            Background::Light => LIGHT_PALETTES[index],
        }
    }

    /// Draw a color with each channel uniform in its own range
    pub fn random_color<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        Rgb {
            r: sample_channel(self.red, rng),
            g: sample_channel(self.green, rng),
            b: sample_channel(self.blue, rng),
        }
    }

    /// Whether a color lies inside every channel range
    #[must_use]
    pub fn contains(&self, color: Rgb) -> bool {
        in_range(self.red, color.r) && in_range(self.green, color.g) && in_range(self.blue, color.b)
    }
}

fn sample_channel<R: Rng + ?Sized>((min, max): (u8, u8), rng: &mut R) -> u8 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.gen_range(lo..=hi)
}

fn in_range((min, max): (u8, u8), value: u8) -> bool {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    (lo..=hi).contains(&value)
}
