//! Assertion helpers for tests.

use eink_palette::Rgb;
use landscape_ink::rendering::{Canvas, PixelMode};
use pretty_assertions::assert_eq;

use super::mock_driver::MockDriver;

/// Assert the canvas is 1-bit
pub fn assert_mono(canvas: &Canvas) {
    assert_eq!(canvas.mode(), PixelMode::Mono, "Expected a 1-bit canvas");
    assert!(
        canvas.luma_samples().iter().all(|&v| v == 0 || v == 255),
        "Mono canvas holds grey samples"
    );
}

/// Assert every pixel is one of the given colors
pub fn assert_colors_within(canvas: &Canvas, allowed: &[Rgb]) {
    for y in 0..canvas.height() {
        for x in 0..canvas.width() {
            let c = canvas.get(x, y);
            assert!(
                allowed.contains(&c),
                "Pixel ({x}, {y}) is {c}, expected one of {allowed:?}"
            );
        }
    }
}

/// Assert the driver saw exactly these calls, in order
pub fn assert_calls(driver: &MockDriver, expected: &[&str]) {
    assert_eq!(driver.calls(), expected);
}

/// Pixel-wise complement check between two canvases of equal size
pub fn assert_complement(a: &Canvas, b: &Canvas) {
    assert_eq!(a.dimensions(), b.dimensions());
    for y in 0..a.height() {
        for x in 0..a.width() {
            assert_eq!(
                a.get(x, y),
                b.get(x, y).complement(),
                "Pixel ({x}, {y}) is not complemented"
            );
        }
    }
}
