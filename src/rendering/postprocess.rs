//! Whole-image transforms applied after drawing.
//!
//! Stages run in a fixed order: invert, e-ink flip, three-color
//! quantization. A disabled stage leaves the canvas untouched.

use eink_palette::{Palette, Rgb};

use super::canvas::{Canvas, PixelMode};
use crate::error::PostProcessError;
use crate::models::RenderConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostProcessor {
    pub invert: bool,
    pub eink_flip: bool,
    pub three_color: bool,
}

impl PostProcessor {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            invert: config.invert,
            eink_flip: config.eink_flip,
            three_color: config.three_color,
        }
    }

    pub fn is_identity(&self) -> bool {
        !(self.invert || self.eink_flip || self.three_color)
    }

    pub fn apply(&self, mut canvas: Canvas) -> Result<Canvas, PostProcessError> {
        if self.three_color && canvas.mode() == PixelMode::Mono {
            return Err(PostProcessError::ThreeColorOnMono);
        }

        if self.invert {
            invert(&mut canvas);
            tracing::debug!("Inverted canvas");
        }
        if self.eink_flip {
            eink_flip(&mut canvas);
            tracing::debug!("Applied e-ink polarity flip");
        }
        if self.three_color {
            quantize_three_color(&mut canvas)?;
            tracing::debug!("Quantized canvas to black/white/red");
        }

        Ok(canvas)
    }
}

/// Per-sample complement.
pub fn invert(canvas: &mut Canvas) {
    canvas.map_pixels(Rgb::complement);
}

/// Paper becomes ink and ink becomes paper.
///
/// Only full white counts as paper, so on an RGB canvas every non-white
/// pixel ends up white. On a 1-bit canvas this is the same as [`invert`].
pub fn eink_flip(canvas: &mut Canvas) {
    canvas.map_pixels(|c| if c == Rgb::WHITE { Rgb::BLACK } else { Rgb::WHITE });
}

/// Snap every pixel to the nearest of black, white and red.
///
/// Ties go to black, then white.
pub fn quantize_three_color(canvas: &mut Canvas) -> Result<(), PostProcessError> {
    if canvas.mode() == PixelMode::Mono {
        return Err(PostProcessError::ThreeColorOnMono);
    }
    let palette = Palette::black_white_red();
    canvas.map_pixels(|c| palette.quantize(c));
    Ok(())
}
