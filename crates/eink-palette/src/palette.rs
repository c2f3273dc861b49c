//! Ordered ink palettes with deterministic nearest-color matching.

use std::collections::HashSet;

use crate::color::Rgb;
use crate::error::PaletteError;

/// An ordered set of inks a panel can show.
///
/// Matching uses squared Euclidean distance in sRGB bytes. When two entries
/// are equally close, the one that appears first wins, so the entry order
/// doubles as the tie-break preference.
///
/// # Example
///
/// ```
/// use eink_palette::{Palette, Rgb};
///
/// let palette = Palette::black_white_red();
/// // Greys split at the midpoint between black and white.
/// assert_eq!(palette.quantize(Rgb::new(127, 127, 127)), Rgb::BLACK);
/// assert_eq!(palette.quantize(Rgb::new(128, 128, 128)), Rgb::WHITE);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Create a palette from colors in preference order.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::EmptyPalette`] if `colors` is empty
    /// - [`PaletteError::DuplicateColor`] if a color repeats
    /// - [`PaletteError::TooManyColors`] if there are more than 256 entries
    pub fn new(colors: &[Rgb]) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }
        if colors.len() > 256 {
            return Err(PaletteError::TooManyColors(colors.len()));
        }

        let mut seen = HashSet::new();
        for (index, color) in colors.iter().enumerate() {
            if !seen.insert(*color) {
                return Err(PaletteError::DuplicateColor { index });
            }
        }

        Ok(Self {
            colors: colors.to_vec(),
        })
    }

    /// Black and white, in that preference order.
    pub fn black_white() -> Self {
        Self {
            colors: vec![Rgb::BLACK, Rgb::WHITE],
        }
    }

    /// The red/black/white panel inks, preferring black, then white, then red.
    pub fn black_white_red() -> Self {
        Self {
            colors: vec![Rgb::BLACK, Rgb::WHITE, Rgb::RED],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; empty palettes are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn color(&self, idx: usize) -> Rgb {
        self.colors[idx]
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn contains(&self, color: Rgb) -> bool {
        self.colors.contains(&color)
    }

    /// Index of the closest entry. Strict `<` keeps the earliest entry on ties.
    pub fn find_nearest(&self, color: Rgb) -> usize {
        let mut best_idx = 0;
        let mut best_dist = u32::MAX;
        for (idx, entry) in self.colors.iter().enumerate() {
            let dist = color.distance_sq(*entry);
            if dist < best_dist {
                best_dist = dist;
                best_idx = idx;
                if dist == 0 {
                    break;
                }
            }
        }
        best_idx
    }

    /// The closest entry itself.
    #[inline]
    pub fn quantize(&self, color: Rgb) -> Rgb {
        self.colors[self.find_nearest(color)]
    }
}
