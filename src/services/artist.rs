//! Landscape drawing.

use eink_palette::Rgb;
use thiserror::Error;

use super::weather::WeatherSnapshot;
use crate::models::RenderConfig;
use crate::rendering::Canvas;

/// Smallest canvas the horizon layout fits on
pub const MIN_SIZE: u32 = 16;

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("Canvas {width}x{height} is too small to draw on")]
    CanvasTooSmall { width: u32, height: u32 },

    #[error("Artist returned a {actual:?} canvas, expected {expected:?}")]
    SizeChanged {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Paints a weather landscape onto a blank canvas of the configured size.
/// Implementations must hand back a canvas of the same size.
pub trait LandscapeArtist {
    fn draw(
        &self,
        canvas: Canvas,
        config: &RenderConfig,
        weather: &WeatherSnapshot,
    ) -> Result<Canvas, DrawError>;
}

/// Ground line with soil below, temperature trace above and precipitation
/// falling from the trace. Cloud cover drifts along the top edge as smoke.
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizonArtist;

impl HorizonArtist {
    /// Row of the ground line; larger draw offsets move it up
    pub fn ground_line(config: &RenderConfig, height: u32) -> i64 {
        (height as i64 - config.draw_offset as i64).clamp(0, height as i64 - 1)
    }
}

impl LandscapeArtist for HorizonArtist {
    fn draw(
        &self,
        mut canvas: Canvas,
        config: &RenderConfig,
        weather: &WeatherSnapshot,
    ) -> Result<Canvas, DrawError> {
        let (width, height) = canvas.dimensions();
        if width < MIN_SIZE || height < MIN_SIZE {
            return Err(DrawError::CanvasTooSmall { width, height });
        }

        let palette = &config.palette;
        let ground = Self::ground_line(config, height);
        let w = width as i64;
        let h = height as i64;

        // soil
        canvas.fill_rect(0, ground, w, ground + 1, palette.foreground.to_rgb());
        let soil = palette.soil.to_rgb();
        for y in (ground + 2..h).step_by(3) {
            let shift = (y / 3) % 2 * 2;
            for x in (shift..w).step_by(4) {
                canvas.put(x, y, soil);
            }
        }

        let points: Vec<_> = weather.points().collect();
        let step = (w / points.len() as i64).max(1);
        let (lo, hi) = weather.temperature_range();
        let top = 4;
        let bottom = (ground - 4).max(top);
        let trace_y = |t: f64| -> i64 {
            if hi - lo < f64::EPSILON {
                return (top + bottom) / 2;
            }
            bottom - ((t - lo) / (hi - lo) * (bottom - top) as f64).round() as i64
        };

        // smoke, one puff per cloudy point
        let smoke = palette.smoke.to_rgb();
        for (i, point) in points.iter().enumerate() {
            let puff = (point.clouds as i64 * step / 100).min(step);
            let x0 = i as i64 * step;
            for x in (x0..x0 + puff).step_by(2) {
                canvas.put(x, 1, smoke);
                canvas.put(x + 1, 2, smoke);
            }
        }

        // temperature
        let foreground = palette.foreground.to_rgb();
        let anchors: Vec<(i64, i64)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as i64 * step + step / 2, trace_y(p.temperature)))
            .collect();
        if let &[(x, y)] = anchors.as_slice() {
            canvas.fill_rect(x - 1, y - 1, x + 2, y + 2, foreground);
        }
        for pair in anchors.windows(2) {
            draw_line(&mut canvas, pair[0], pair[1], foreground);
        }

        // precipitation
        let rain = palette.rain.to_rgb();
        let snow = palette.snow.to_rgb();
        for (point, &(x, y)) in points.iter().zip(&anchors) {
            let drops = (point.rain_mm * 4.0).ceil().min(step as f64) as i64;
            for d in 0..drops {
                let dx = x - drops + 2 * d;
                for dy in (y + 3..ground).step_by(4) {
                    canvas.put(dx, dy, rain);
                    canvas.put(dx, dy + 1, rain);
                }
            }
            let flakes = (point.snow_mm * 4.0).ceil().min(step as f64) as i64;
            for f in 0..flakes {
                let fx = x - flakes + 2 * f;
                for fy in (y + 4 + f % 3..ground).step_by(5) {
                    canvas.put(fx, fy, snow);
                }
            }
        }

        tracing::debug!(
            width,
            height,
            ground,
            points = points.len(),
            "Drew landscape"
        );
        Ok(canvas)
    }
}

/// Bresenham line between two points, inclusive
fn draw_line(canvas: &mut Canvas, from: (i64, i64), to: (i64, i64), color: Rgb) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        canvas.put(x, y, color);
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
