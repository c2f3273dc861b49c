use std::fmt;
use std::path::{Path, PathBuf};

use eink_palette::Rgb;
use serde::Deserialize;

use crate::error::ConfigError;

/// Value the API key holds until a real secret is supplied.
pub const PLACEHOLDER_API_KEY: &str = "000000000000000000";

/// How sprites and palette colors are authored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpritesMode {
    /// 1-bit black/white canvas
    Mono,
    /// 8-bit RGB canvas
    Rgb,
}

impl fmt::Display for SpritesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpritesMode::Mono => write!(f, "mono"),
            SpritesMode::Rgb => write!(f, "rgb"),
        }
    }
}

/// A palette entry: a 1-bit level for mono presets, an RGB triple otherwise.
///
/// In YAML, `0`/`255` and `black`/`white` are levels; `"#RRGGBB"` strings and
/// `[r, g, b]` lists are RGB colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawColor")]
pub enum PaletteColor {
    Level(MonoLevel),
    Rgb(Rgb),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonoLevel {
    Black,
    White,
}

impl PaletteColor {
    pub const BLACK: Self = PaletteColor::Level(MonoLevel::Black);
    pub const WHITE: Self = PaletteColor::Level(MonoLevel::White);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        PaletteColor::Rgb(Rgb::new(r, g, b))
    }

    /// The color a canvas pixel gets when painted with this entry.
    pub fn to_rgb(self) -> Rgb {
        match self {
            PaletteColor::Level(MonoLevel::Black) => Rgb::BLACK,
            PaletteColor::Level(MonoLevel::White) => Rgb::WHITE,
            PaletteColor::Rgb(c) => c,
        }
    }

    pub fn fits(self, mode: SpritesMode) -> bool {
        matches!(
            (self, mode),
            (PaletteColor::Level(_), SpritesMode::Mono) | (PaletteColor::Rgb(_), SpritesMode::Rgb)
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColor {
    Level(u8),
    Triple([u8; 3]),
    Text(String),
}

impl TryFrom<RawColor> for PaletteColor {
    type Error = String;

    fn try_from(raw: RawColor) -> Result<Self, Self::Error> {
        match raw {
            RawColor::Level(0) => Ok(PaletteColor::BLACK),
            RawColor::Level(255) => Ok(PaletteColor::WHITE),
            RawColor::Level(v) => Err(format!("mono level must be 0 or 255, got {v}")),
            RawColor::Triple(bytes) => Ok(PaletteColor::Rgb(Rgb::from_bytes(bytes))),
            RawColor::Text(s) => match s.trim().to_lowercase().as_str() {
                "black" => Ok(PaletteColor::BLACK),
                "white" => Ok(PaletteColor::WHITE),
                _ => s
                    .parse::<Rgb>()
                    .map(PaletteColor::Rgb)
                    .map_err(|e| format!("invalid color {s:?}: {e}")),
            },
        }
    }
}

/// Colors for each semantic role the landscape uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColorPalette {
    pub soil: PaletteColor,
    pub smoke: PaletteColor,
    pub background: PaletteColor,
    pub foreground: PaletteColor,
    pub rain: PaletteColor,
    pub snow: PaletteColor,
}

impl ColorPalette {
    /// Black ink on white paper.
    pub const MONO: Self = Self {
        soil: PaletteColor::BLACK,
        smoke: PaletteColor::BLACK,
        background: PaletteColor::WHITE,
        foreground: PaletteColor::BLACK,
        rain: PaletteColor::BLACK,
        snow: PaletteColor::BLACK,
    };

    pub fn roles(&self) -> [(&'static str, PaletteColor); 6] {
        [
            ("soil", self.soil),
            ("smoke", self.smoke),
            ("background", self.background),
            ("foreground", self.foreground),
            ("rain", self.rain),
            ("snow", self.snow),
        ]
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::MONO
    }
}

/// Location the forecast is requested for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Fully-resolved rendering configuration.
///
/// Built once per run by [`PresetCatalog::resolve`](super::PresetCatalog::resolve)
/// and then only passed around by shared reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Display label
    pub title: String,
    pub work_dir: PathBuf,
    pub out_filename: String,
    /// Output extension, with or without the leading dot
    pub out_file_ext: String,
    pub template_path: PathBuf,
    pub sprites_dir: PathBuf,
    pub sprites_mode: SpritesMode,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Vertical baseline shift; larger values move the ground line up
    pub draw_offset: i32,
    pub palette: ColorPalette,
    pub invert: bool,
    pub eink_flip: bool,
    pub three_color: bool,

    /// OpenWeatherMap API key; only ever set from secrets
    #[serde(skip)]
    pub api_key: String,
    #[serde(skip)]
    pub location: Option<Location>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Base".to_string(),
            work_dir: PathBuf::from("tmp"),
            out_filename: "landscape".to_string(),
            out_file_ext: ".bmp".to_string(),
            template_path: PathBuf::from("assets/template_wb.bmp"),
            sprites_dir: PathBuf::from("assets/sprite"),
            sprites_mode: SpritesMode::Mono,
            width: 296,
            height: 128,
            draw_offset: 65,
            palette: ColorPalette::MONO,
            invert: false,
            eink_flip: false,
            three_color: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
            location: None,
        }
    }
}

impl RenderConfig {
    /// Output file path: `work_dir/out_filename.ext`
    pub fn output_path(&self) -> PathBuf {
        let ext = self.out_file_ext.trim_start_matches('.');
        if ext.is_empty() {
            self.work_dir.join(&self.out_filename)
        } else {
            self.work_dir.join(format!("{}.{}", self.out_filename, ext))
        }
    }

    /// Output extension without the leading dot, lowercased
    pub fn output_format(&self) -> String {
        self.out_file_ext.trim_start_matches('.').to_lowercase()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Check everything that can be checked without touching the network or
    /// the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingSecret("OWM_KEY"));
        }
        if self.api_key == PLACEHOLDER_API_KEY {
            return Err(ConfigError::PlaceholderSecret("OWM_KEY"));
        }
        if self.location.is_none() {
            return Err(ConfigError::MissingSecret("OWM_LAT"));
        }
        self.validate_layout()
    }

    /// Checks that do not involve secrets
    pub fn validate_layout(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.three_color && self.sprites_mode == SpritesMode::Mono {
            return Err(ConfigError::IncoherentFlags(
                "three_color requires rgb sprites mode",
            ));
        }
        // flip leaves only black and white, so red could never appear
        if self.three_color && self.eink_flip {
            return Err(ConfigError::IncoherentFlags(
                "eink_flip cannot be combined with three_color",
            ));
        }
        for (role, color) in self.palette.roles() {
            if !color.fits(self.sprites_mode) {
                return Err(ConfigError::PaletteMode {
                    role,
                    mode: self.sprites_mode,
                });
            }
        }
        Ok(())
    }
}

/// Partial palette: only the roles that are set replace the parent's
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaletteOverride {
    pub soil: Option<PaletteColor>,
    pub smoke: Option<PaletteColor>,
    pub background: Option<PaletteColor>,
    pub foreground: Option<PaletteColor>,
    pub rain: Option<PaletteColor>,
    pub snow: Option<PaletteColor>,
}

impl PaletteOverride {
    /// Override every role
    pub fn all(palette: ColorPalette) -> Self {
        Self {
            soil: Some(palette.soil),
            smoke: Some(palette.smoke),
            background: Some(palette.background),
            foreground: Some(palette.foreground),
            rain: Some(palette.rain),
            snow: Some(palette.snow),
        }
    }

    fn apply_to(&self, palette: &mut ColorPalette) {
        merge(&mut palette.soil, &self.soil);
        merge(&mut palette.smoke, &self.smoke);
        merge(&mut palette.background, &self.background);
        merge(&mut palette.foreground, &self.foreground);
        merge(&mut palette.rain, &self.rain);
        merge(&mut palette.snow, &self.snow);
    }
}

/// One level of overrides; `None` fields keep the parent's value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigOverride {
    pub title: Option<String>,
    pub work_dir: Option<PathBuf>,
    pub out_filename: Option<String>,
    pub out_file_ext: Option<String>,
    pub template_path: Option<PathBuf>,
    pub sprites_dir: Option<PathBuf>,
    pub sprites_mode: Option<SpritesMode>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub draw_offset: Option<i32>,
    pub palette: PaletteOverride,
    pub invert: Option<bool>,
    pub eink_flip: Option<bool>,
    pub three_color: Option<bool>,
}

impl ConfigOverride {
    pub fn apply_to(&self, config: &mut RenderConfig) {
        merge(&mut config.title, &self.title);
        merge(&mut config.work_dir, &self.work_dir);
        merge(&mut config.out_filename, &self.out_filename);
        merge(&mut config.out_file_ext, &self.out_file_ext);
        merge(&mut config.template_path, &self.template_path);
        merge(&mut config.sprites_dir, &self.sprites_dir);
        merge(&mut config.sprites_mode, &self.sprites_mode);
        merge(&mut config.width, &self.width);
        merge(&mut config.height, &self.height);
        merge(&mut config.draw_offset, &self.draw_offset);
        self.palette.apply_to(&mut config.palette);
        merge(&mut config.invert, &self.invert);
        merge(&mut config.eink_flip, &self.eink_flip);
        merge(&mut config.three_color, &self.three_color);
    }
}

fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}
