use eink_palette::{bilevel, Rgb};
use image::{DynamicImage, GrayImage, Luma, RgbImage};

use crate::models::{RenderConfig, SpritesMode};

/// Pixel depth of a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    /// One bit per pixel, stored as 0 (black) / 255 (white) samples
    Mono,
    /// 8-bit RGB
    Rgb,
}

impl From<SpritesMode> for PixelMode {
    fn from(mode: SpritesMode) -> Self {
        match mode {
            SpritesMode::Mono => PixelMode::Mono,
            SpritesMode::Rgb => PixelMode::Rgb,
        }
    }
}

/// In-memory picture being composed or adapted for a panel.
///
/// Mono canvases only ever hold the samples 0 and 255; every write goes
/// through a luma threshold to keep it that way.
#[derive(Debug, Clone, PartialEq)]
pub enum Canvas {
    Mono(GrayImage),
    Rgb(RgbImage),
}

impl Canvas {
    pub fn new(mode: PixelMode, width: u32, height: u32, background: Rgb) -> Self {
        match mode {
            PixelMode::Mono => {
                Canvas::Mono(GrayImage::from_pixel(width, height, Luma([level(background)])))
            }
            PixelMode::Rgb => {
                Canvas::Rgb(RgbImage::from_pixel(width, height, image::Rgb(background.to_bytes())))
            }
        }
    }

    /// Empty canvas at the configured size, filled with the background color
    pub fn blank(config: &RenderConfig) -> Self {
        Self::new(
            config.sprites_mode.into(),
            config.width,
            config.height,
            config.palette.background.to_rgb(),
        )
    }

    /// Wrap a decoded image. Images whose pixels are all pure black or pure
    /// white become mono canvases whatever their storage format.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        if let DynamicImage::ImageLuma8(grey) = &image {
            if grey.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255) {
                if let DynamicImage::ImageLuma8(grey) = image {
                    return Canvas::Mono(grey);
                }
            }
        }

        let rgb = image.into_rgb8();
        let bilevel = rgb
            .pixels()
            .all(|p| p.0 == [0, 0, 0] || p.0 == [255, 255, 255]);
        if bilevel {
            Canvas::Mono(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                Luma([rgb.get_pixel(x, y).0[0]])
            }))
        } else {
            Canvas::Rgb(rgb)
        }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Canvas::Mono(grey) => DynamicImage::ImageLuma8(grey),
            Canvas::Rgb(rgb) => DynamicImage::ImageRgb8(rgb),
        }
    }

    pub fn mode(&self) -> PixelMode {
        match self {
            Canvas::Mono(_) => PixelMode::Mono,
            Canvas::Rgb(_) => PixelMode::Rgb,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Canvas::Mono(img) => img.width(),
            Canvas::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Canvas::Mono(img) => img.height(),
            Canvas::Rgb(img) => img.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the canvas.
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        match self {
            Canvas::Mono(img) => {
                let v = img.get_pixel(x, y).0[0];
                Rgb::new(v, v, v)
            }
            Canvas::Rgb(img) => Rgb::from_bytes(img.get_pixel(x, y).0),
        }
    }

    /// Set a pixel; coordinates outside the canvas are ignored.
    pub fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        match self {
            Canvas::Mono(img) => img.put_pixel(x, y, Luma([level(color)])),
            Canvas::Rgb(img) => img.put_pixel(x, y, image::Rgb(color.to_bytes())),
        }
    }

    /// Fill the half-open rectangle `[x0, x1) x [y0, y1)`, clipped to the canvas.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(self.width() as i64);
        let y1 = y1.min(self.height() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                self.put(x, y, color);
            }
        }
    }

    /// Remap every pixel independently of its position.
    pub fn map_pixels(&mut self, f: impl Fn(Rgb) -> Rgb) {
        match self {
            Canvas::Mono(img) => {
                for p in img.pixels_mut() {
                    let v = p.0[0];
                    p.0[0] = level(f(Rgb::new(v, v, v)));
                }
            }
            Canvas::Rgb(img) => {
                for p in img.pixels_mut() {
                    p.0 = f(Rgb::from_bytes(p.0)).to_bytes();
                }
            }
        }
    }

    /// Grey samples, row-major
    pub fn luma_samples(&self) -> Vec<u8> {
        match self {
            Canvas::Mono(img) => img.as_raw().clone(),
            Canvas::Rgb(img) => img.pixels().map(|p| Rgb::from_bytes(p.0).luma()).collect(),
        }
    }

    /// Reduce to a mono canvas with Floyd–Steinberg error diffusion.
    /// Mono canvases are returned as they are.
    pub fn into_mono(self) -> Self {
        match self {
            Canvas::Mono(_) => self,
            Canvas::Rgb(_) => {
                let (w, h) = self.dimensions();
                let samples = bilevel::floyd_steinberg(&self.luma_samples(), w, h);
                Canvas::from_grey_samples(w, h, samples)
            }
        }
    }

    fn from_grey_samples(width: u32, height: u32, samples: Vec<u8>) -> Self {
        match GrayImage::from_raw(width, height, samples) {
            Some(img) => Canvas::Mono(img),
            None => Canvas::Mono(GrayImage::new(width, height)),
        }
    }
}

/// 1-bit level for a color: white at or above mid luma
fn level(color: Rgb) -> u8 {
    if color.luma() >= 128 {
        255
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_uses_config_size_and_background() {
        let config = RenderConfig {
            width: 250,
            height: 122,
            ..Default::default()
        };
        let canvas = Canvas::blank(&config);
        assert_eq!(canvas.mode(), PixelMode::Mono);
        assert_eq!(canvas.dimensions(), (250, 122));
        assert_eq!(canvas.get(0, 0), Rgb::WHITE);
    }

    #[test]
    fn test_mono_writes_are_thresholded() {
        let mut canvas = Canvas::new(PixelMode::Mono, 4, 1, Rgb::WHITE);
        canvas.put(0, 0, Rgb::new(100, 100, 100));
        canvas.put(1, 0, Rgb::new(200, 200, 200));
        canvas.put(9, 9, Rgb::BLACK);
        assert_eq!(canvas.get(0, 0), Rgb::BLACK);
        assert_eq!(canvas.get(1, 0), Rgb::WHITE);
        assert_eq!(canvas.luma_samples(), vec![0, 255, 255, 255]);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut canvas = Canvas::new(PixelMode::Rgb, 3, 3, Rgb::WHITE);
        canvas.fill_rect(-5, 1, 10, 2, Rgb::RED);
        assert_eq!(canvas.get(0, 1), Rgb::RED);
        assert_eq!(canvas.get(2, 1), Rgb::RED);
        assert_eq!(canvas.get(0, 0), Rgb::WHITE);
        assert_eq!(canvas.get(0, 2), Rgb::WHITE);
    }

    #[test]
    fn test_from_dynamic_detects_bilevel_rgb() {
        let mut rgb = RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255]));
        rgb.put_pixel(1, 1, image::Rgb([0, 0, 0]));
        let canvas = Canvas::from_dynamic(DynamicImage::ImageRgb8(rgb));
        assert_eq!(canvas.mode(), PixelMode::Mono);
        assert_eq!(canvas.get(1, 1), Rgb::BLACK);
    }

    #[test]
    fn test_from_dynamic_keeps_color() {
        let rgb = RgbImage::from_pixel(2, 2, image::Rgb([10, 100, 148]));
        let canvas = Canvas::from_dynamic(DynamicImage::ImageRgb8(rgb));
        assert_eq!(canvas.mode(), PixelMode::Rgb);
    }

    #[test]
    fn test_from_dynamic_grey_levels_are_not_mono() {
        let grey = GrayImage::from_pixel(2, 2, Luma([128]));
        let canvas = Canvas::from_dynamic(DynamicImage::ImageLuma8(grey));
        assert_eq!(canvas.mode(), PixelMode::Rgb);
        assert_eq!(canvas.get(0, 0), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_into_mono() {
        let canvas = Canvas::new(PixelMode::Rgb, 8, 8, Rgb::new(250, 250, 250));
        let mono = canvas.into_mono();
        assert_eq!(mono.mode(), PixelMode::Mono);
        assert_eq!(mono.dimensions(), (8, 8));
        assert!(mono.luma_samples().iter().all(|&v| v == 0 || v == 255));
    }
}
