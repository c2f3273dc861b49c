//! Aligning a rendered image with a panel's native buffer.
//!
//! The landscape is drawn in landscape orientation while 2.13" panels
//! address their buffer in portrait, so frames are rotated first and then
//! cropped (or, when too small, resized) to the native size.

use std::fmt;

use eink_palette::bilevel;
use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::models::DisplayGeometry;
use crate::rendering::{Canvas, PixelMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    Clockwise90,
    #[default]
    CounterClockwise90,
}

/// Which part of an oversized axis is kept when cropping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Keep the low coordinates, trimming the far edge
    Start,
    Center,
    /// Keep the high coordinates, trimming the near edge
    End,
}

impl Anchor {
    fn offset(self, excess: u32) -> u32 {
        match self {
            Anchor::Start => 0,
            Anchor::Center => excess / 2,
            Anchor::End => excess,
        }
    }
}

/// How the panel is mounted relative to the rendered image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelMounting {
    pub rotation: Rotation,
    pub crop_x: Anchor,
    pub crop_y: Anchor,
}

impl Default for PanelMounting {
    fn default() -> Self {
        Self {
            rotation: Rotation::CounterClockwise90,
            crop_x: Anchor::Start,
            crop_y: Anchor::End,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for CropBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// What frame preparation had to do to the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Cropped(CropBox),
    Resized {
        from: (u32, u32),
        to: (u32, u32),
    },
    DepthConverted {
        from: PixelMode,
    },
    GeometryMismatch {
        expected: DisplayGeometry,
        actual: (u32, u32),
    },
}

impl Diagnostic {
    /// Resizing distorts the picture; the other adjustments are lossless
    /// with respect to the panel area.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            Diagnostic::Resized { .. } | Diagnostic::GeometryMismatch { .. }
        )
    }
}

/// Rotate by 90 degrees; width and height swap.
pub fn rotate(canvas: &Canvas, rotation: Rotation) -> Canvas {
    match (canvas, rotation) {
        (Canvas::Mono(img), Rotation::Clockwise90) => Canvas::Mono(imageops::rotate90(img)),
        (Canvas::Mono(img), Rotation::CounterClockwise90) => {
            Canvas::Mono(imageops::rotate270(img))
        }
        (Canvas::Rgb(img), Rotation::Clockwise90) => Canvas::Rgb(imageops::rotate90(img)),
        (Canvas::Rgb(img), Rotation::CounterClockwise90) => Canvas::Rgb(imageops::rotate270(img)),
    }
}

/// Window of native size inside an image at least as large in both axes.
pub fn crop_window(
    actual: (u32, u32),
    native: DisplayGeometry,
    mounting: &PanelMounting,
) -> Option<CropBox> {
    let (w, h) = actual;
    if w < native.width || h < native.height {
        return None;
    }
    Some(CropBox {
        x: mounting.crop_x.offset(w - native.width),
        y: mounting.crop_y.offset(h - native.height),
        width: native.width,
        height: native.height,
    })
}

pub fn crop(canvas: &Canvas, window: CropBox) -> Canvas {
    let CropBox {
        x,
        y,
        width,
        height,
    } = window;
    match canvas {
        Canvas::Mono(img) => Canvas::Mono(imageops::crop_imm(img, x, y, width, height).to_image()),
        Canvas::Rgb(img) => Canvas::Rgb(imageops::crop_imm(img, x, y, width, height).to_image()),
    }
}

/// Lanczos3 resize to exact dimensions. Mono canvases are thresholded
/// again afterwards so they stay 1-bit.
pub fn resize_exact(canvas: &Canvas, width: u32, height: u32) -> Canvas {
    match canvas {
        Canvas::Mono(img) => {
            let resized = imageops::resize(img, width, height, FilterType::Lanczos3);
            let samples = bilevel::threshold(resized.as_raw());
            match GrayImage::from_raw(width, height, samples) {
                Some(img) => Canvas::Mono(img),
                None => Canvas::Mono(resized),
            }
        }
        Canvas::Rgb(img) => {
            Canvas::Rgb(imageops::resize(img, width, height, FilterType::Lanczos3))
        }
    }
}

/// Turn a rendered image into a 1-bit frame of exactly the native size.
///
/// Steps: rotate, crop or resize, convert depth, then
/// [`enforce_native_size`].
pub fn prepare_frame(
    canvas: &Canvas,
    native: DisplayGeometry,
    mounting: &PanelMounting,
) -> (Canvas, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    let rotated = rotate(canvas, mounting.rotation);
    let rotated_size = rotated.dimensions();

    let mut frame = match crop_window(rotated_size, native, mounting) {
        _ if native.matches(rotated_size.0, rotated_size.1) => rotated,
        Some(window) => {
            tracing::info!(
                from = ?rotated_size,
                crop = %window,
                "Cropping frame to panel size"
            );
            diagnostics.push(Diagnostic::Cropped(window));
            crop(&rotated, window)
        }
        None => {
            let to = (native.width, native.height);
            tracing::warn!(
                from = ?rotated_size,
                to = ?to,
                "Image smaller than panel, resizing"
            );
            diagnostics.push(Diagnostic::Resized {
                from: rotated_size,
                to,
            });
            resize_exact(&rotated, native.width, native.height)
        }
    };

    if frame.mode() != PixelMode::Mono {
        tracing::debug!(from = ?frame.mode(), "Converting frame to 1-bit");
        diagnostics.push(Diagnostic::DepthConverted { from: frame.mode() });
        frame = frame.into_mono();
    }

    let (frame, mismatch) = enforce_native_size(frame, native);
    diagnostics.extend(mismatch);

    (frame, diagnostics)
}

/// Last check before the frame is packed: anything that is not a 1-bit
/// frame of exactly `native` size is logged as an error and forced into
/// shape.
pub fn enforce_native_size(
    frame: Canvas,
    native: DisplayGeometry,
) -> (Canvas, Option<Diagnostic>) {
    let actual = frame.dimensions();
    if native.matches(actual.0, actual.1) {
        return (frame.into_mono(), None);
    }

    tracing::error!(
        expected = %native,
        actual = ?actual,
        "Frame size does not match panel, forcing resize"
    );
    let forced = resize_exact(&frame, native.width, native.height).into_mono();
    (
        forced,
        Some(Diagnostic::GeometryMismatch {
            expected: native,
            actual,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use eink_palette::Rgb;
    use pretty_assertions::assert_eq;

    fn marked_canvas(mode: PixelMode, width: u32, height: u32) -> Canvas {
        let mut canvas = Canvas::new(mode, width, height, Rgb::WHITE);
        // top-left marker
        canvas.put(0, 0, Rgb::BLACK);
        canvas
    }

    #[test]
    fn test_rotate_ccw_moves_top_left_to_bottom_left() {
        let rotated = rotate(&marked_canvas(PixelMode::Mono, 4, 2), Rotation::CounterClockwise90);
        assert_eq!(rotated.dimensions(), (2, 4));
        assert_eq!(rotated.get(0, 3), Rgb::BLACK);
        assert_eq!(rotated.get(0, 0), Rgb::WHITE);
    }

    #[test]
    fn test_rotate_cw_moves_top_left_to_top_right() {
        let rotated = rotate(&marked_canvas(PixelMode::Mono, 4, 2), Rotation::Clockwise90);
        assert_eq!(rotated.dimensions(), (2, 4));
        assert_eq!(rotated.get(1, 0), Rgb::BLACK);
    }

    #[test]
    fn test_crop_window_anchors() {
        let native = DisplayGeometry::EPD_2IN13;
        let window = crop_window((128, 296), native, &PanelMounting::default()).unwrap();
        assert_eq!(
            window,
            CropBox {
                x: 0,
                y: 46,
                width: 122,
                height: 250
            }
        );

        let centered = PanelMounting {
            crop_x: Anchor::Center,
            crop_y: Anchor::Center,
            ..Default::default()
        };
        let window = crop_window((128, 296), native, &centered).unwrap();
        assert_eq!((window.x, window.y), (3, 23));

        assert!(crop_window((120, 300), native, &centered).is_none());
    }

    #[test]
    fn test_exact_fit_has_no_geometry_diagnostics() {
        let canvas = marked_canvas(PixelMode::Mono, 250, 122);
        let (frame, diagnostics) =
            prepare_frame(&canvas, DisplayGeometry::EPD_2IN13, &PanelMounting::default());

        assert_eq!(frame.dimensions(), (122, 250));
        assert!(diagnostics.is_empty());
        assert_eq!(frame, rotate(&canvas, Rotation::CounterClockwise90));
    }

    #[test]
    fn test_oversized_rgb_is_cropped_and_converted() {
        let canvas = Canvas::new(PixelMode::Rgb, 296, 128, Rgb::new(148, 82, 1));
        let (frame, diagnostics) =
            prepare_frame(&canvas, DisplayGeometry::EPD_2IN13, &PanelMounting::default());

        assert_eq!(frame.dimensions(), (122, 250));
        assert_eq!(frame.mode(), PixelMode::Mono);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::Cropped(CropBox {
                    x: 0,
                    y: 46,
                    width: 122,
                    height: 250
                }),
                Diagnostic::DepthConverted {
                    from: PixelMode::Rgb
                },
            ]
        );
        assert!(!diagnostics.iter().any(Diagnostic::is_degraded));
    }

    #[test]
    fn test_undersized_is_resized() {
        let canvas = marked_canvas(PixelMode::Mono, 200, 100);
        let (frame, diagnostics) =
            prepare_frame(&canvas, DisplayGeometry::EPD_2IN13, &PanelMounting::default());

        assert_eq!(frame.dimensions(), (122, 250));
        assert_eq!(frame.mode(), PixelMode::Mono);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::Resized {
                from: (100, 200),
                to: (122, 250)
            }]
        );
        assert!(diagnostics[0].is_degraded());
    }

    #[test]
    fn test_resize_keeps_mono_bilevel() {
        let mut canvas = Canvas::new(PixelMode::Mono, 10, 10, Rgb::WHITE);
        canvas.fill_rect(0, 0, 5, 10, Rgb::BLACK);
        let resized = resize_exact(&canvas, 17, 13);
        assert_eq!(resized.dimensions(), (17, 13));
        assert!(resized.luma_samples().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_enforce_native_size_forces_wrong_frame() {
        let frame = Canvas::new(PixelMode::Rgb, 100, 100, Rgb::WHITE);
        let (forced, diagnostic) = enforce_native_size(frame, DisplayGeometry::EPD_2IN13);

        assert_eq!(forced.dimensions(), (122, 250));
        assert_eq!(forced.mode(), PixelMode::Mono);
        assert_eq!(
            diagnostic,
            Some(Diagnostic::GeometryMismatch {
                expected: DisplayGeometry::EPD_2IN13,
                actual: (100, 100),
            })
        );
        assert!(diagnostic.as_ref().is_some_and(Diagnostic::is_degraded));
    }

    #[test]
    fn test_enforce_native_size_passes_matching_frame() {
        let frame = marked_canvas(PixelMode::Mono, 122, 250);
        let (kept, diagnostic) = enforce_native_size(frame.clone(), DisplayGeometry::EPD_2IN13);
        assert_eq!(diagnostic, None);
        assert_eq!(kept, frame);
    }
}
