//! eink-palette: fixed color palettes and 1-bit buffers for e-paper panels
//!
//! Small e-paper panels accept either pure black/white frames or, on the
//! red/black/white variants, exactly three inks. This crate holds the pieces
//! shared by the render and display stages:
//!
//! - [`Rgb`]: an 8-bit sRGB color with hex parsing
//! - [`Palette`]: an ordered, duplicate-free set of inks with deterministic
//!   nearest-color matching (ties go to the earlier entry)
//! - [`bilevel`]: Floyd–Steinberg reduction of grey levels to 1-bit and the
//!   row-packed frame layout panels expect
//!
//! # Quick Start
//!
//! ```
//! use eink_palette::{Palette, Rgb};
//!
//! let palette = Palette::black_white_red();
//! let idx = palette.find_nearest(Rgb::new(200, 30, 20));
//! assert_eq!(palette.color(idx), Rgb::RED);
//! ```
//!
//! # Frame layout
//!
//! ```
//! use eink_palette::bilevel::pack_rows;
//!
//! // 10 pixels wide, 1 row: rows are padded to whole bytes, MSB first,
//! // a set bit means a white pixel.
//! let row = [255u8, 0, 255, 0, 255, 0, 255, 0, 255, 255];
//! let packed = pack_rows(&row, 10);
//! assert_eq!(packed, vec![0b1010_1010, 0b1100_0000]);
//! ```

pub mod bilevel;
pub mod color;
pub mod error;
pub mod palette;

pub use color::Rgb;
pub use error::{PaletteError, ParseColorError};
pub use palette::Palette;
