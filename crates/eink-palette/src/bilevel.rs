//! 1-bit reduction and frame packing.
//!
//! Grey levels are reduced with serpentine Floyd–Steinberg error diffusion.
//! Bilevel samples use `0` for black and `255` for white throughout.
//!
//! Packed frames follow the layout shared by monochrome e-paper controllers
//! and 1-bit grayscale PNG rows: one bit per pixel, most significant bit
//! first, every row padded to a whole number of bytes, and a set bit meaning
//! white.

/// Bytes needed for one packed row of `width` pixels.
#[inline]
pub fn row_bytes(width: u32) -> usize {
    (width as usize).div_ceil(8)
}

/// Reduce 8-bit grey samples to bilevel `0`/`255` with Floyd–Steinberg
/// error diffusion.
///
/// Inputs that are already bilevel come back unchanged, since their
/// quantization error is zero everywhere.
///
/// # Panics
///
/// Panics if `grey.len() != width * height`.
pub fn floyd_steinberg(grey: &[u8], width: u32, height: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    assert_eq!(grey.len(), w * h, "sample count must equal width * height");

    let mut buffer: Vec<i16> = grey.iter().map(|&v| v as i16).collect();

    for y in 0..h {
        if y % 2 == 0 {
            for x in 0..w {
                diffuse_pixel(x, y, &mut buffer, w, h, true);
            }
        } else {
            for x in (0..w).rev() {
                diffuse_pixel(x, y, &mut buffer, w, h, false);
            }
        }
    }

    buffer.iter().map(|&v| v.clamp(0, 255) as u8).collect()
}

/// Quantize one pixel and push its error onto unvisited neighbours.
#[inline]
fn diffuse_pixel(x: usize, y: usize, buffer: &mut [i16], w: usize, h: usize, going_right: bool) {
    let idx = y * w + x;
    let old_val = buffer[idx];
    let new_val: i16 = if old_val >= 128 { 255 } else { 0 };
    let error = old_val - new_val;
    buffer[idx] = new_val;

    // Left-to-right:      Right-to-left:
    //     X   7/16        7/16   X
    // 3/16 5/16 1/16      1/16 5/16 3/16
    if going_right {
        if x + 1 < w {
            buffer[idx + 1] += error * 7 / 16;
        }
        if y + 1 < h {
            if x > 0 {
                buffer[idx + w - 1] += error * 3 / 16;
            }
            buffer[idx + w] += error * 5 / 16;
            if x + 1 < w {
                buffer[idx + w + 1] += error / 16;
            }
        }
    } else {
        if x > 0 {
            buffer[idx - 1] += error * 7 / 16;
        }
        if y + 1 < h {
            if x + 1 < w {
                buffer[idx + w + 1] += error * 3 / 16;
            }
            buffer[idx + w] += error * 5 / 16;
            if x > 0 {
                buffer[idx + w - 1] += error / 16;
            }
        }
    }
}

/// Reduce grey samples to bilevel with a plain threshold (`>= 128` is white).
pub fn threshold(grey: &[u8]) -> Vec<u8> {
    grey.iter()
        .map(|&v| if v >= 128 { 255 } else { 0 })
        .collect()
}

/// Pack bilevel samples (row-major, `0` = black, anything else = white) into
/// MSB-first rows padded to whole bytes.
///
/// # Panics
///
/// Panics if `width` is zero or does not divide `samples.len()`.
pub fn pack_rows(samples: &[u8], width: u32) -> Vec<u8> {
    let w = width as usize;
    assert!(w > 0, "width must be positive");
    assert_eq!(samples.len() % w, 0, "sample count must be a multiple of width");

    let height = samples.len() / w;
    let mut packed = Vec::with_capacity(row_bytes(width) * height);

    for row in samples.chunks(w) {
        let mut byte = 0u8;
        for (i, &v) in row.iter().enumerate() {
            if v != 0 {
                byte |= 0x80 >> (i % 8);
            }
            if i % 8 == 7 || i == row.len() - 1 {
                packed.push(byte);
                byte = 0;
            }
        }
    }

    packed
}
