use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::config::{
    ColorPalette, ConfigOverride, PaletteColor, PaletteOverride, RenderConfig, SpritesMode,
};
use super::secrets::Secrets;
use crate::error::ConfigError;

/// A named specialization of the base record or of another variant
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigVariant {
    /// Variant this one inherits from; `None` inherits the base record
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(flatten)]
    pub overrides: ConfigOverride,
}

/// Base record plus named variants, loaded from presets.yaml or built in
#[derive(Debug, Clone, Deserialize)]
pub struct PresetCatalog {
    #[serde(default)]
    pub base: RenderConfig,

    #[serde(default)]
    pub variants: BTreeMap<String, ConfigVariant>,

    /// Variant used when none is requested
    #[serde(default = "default_variant")]
    pub default_variant: String,
}

fn default_variant() -> String {
    "bw".to_string()
}

impl PresetCatalog {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            variants = catalog.variants.len(),
            "Loaded preset catalog"
        );
        Ok(catalog)
    }

    /// Load presets from a file if one is given, otherwise use the built-in set
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    /// Variant names from the requested one up to the base-most ancestor.
    pub fn lineage(&self, name: &str) -> Result<Vec<&str>, ConfigError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = name;

        loop {
            let (key, variant) = self
                .variants
                .get_key_value(current)
                .ok_or_else(|| ConfigError::UnknownVariant(current.to_string()))?;
            if !seen.insert(key.as_str()) {
                return Err(ConfigError::InheritanceCycle(name.to_string()));
            }
            chain.push(key.as_str());

            match &variant.parent {
                Some(parent) => current = parent.as_str(),
                None => break,
            }
        }

        Ok(chain)
    }

    /// Merge a variant over the base without secrets or validation.
    ///
    /// Overrides are applied from the base-most ancestor down to `name`, so
    /// the closest level wins on conflict. The display stage uses this to find
    /// the artifact path without needing an API key.
    pub fn merged(&self, name: &str) -> Result<RenderConfig, ConfigError> {
        let lineage = self.lineage(name)?;
        let mut config = self.base.clone();
        for level in lineage.iter().rev() {
            self.variants[*level].overrides.apply_to(&mut config);
        }
        Ok(config)
    }

    /// Produce the final configuration for a run.
    ///
    /// Fails before any rendering work if the API key is missing or still the
    /// placeholder, or if flags and palette do not fit the sprites mode.
    pub fn resolve(&self, name: &str, secrets: &Secrets) -> Result<RenderConfig, ConfigError> {
        let mut config = self.merged(name)?;
        secrets.apply_to(&mut config)?;
        config.validate()?;

        tracing::info!(
            variant = name,
            title = %config.title,
            width = config.width,
            height = config.height,
            mode = %config.sprites_mode,
            invert = config.invert,
            eink_flip = config.eink_flip,
            three_color = config.three_color,
            "Resolved configuration"
        );

        Ok(config)
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        let mut variants = BTreeMap::new();

        variants.insert(
            "bw".to_string(),
            ConfigVariant {
                parent: None,
                overrides: ConfigOverride {
                    title: Some("BW".to_string()),
                    work_dir: Some(PathBuf::from("tmp")),
                    out_filename: Some("landscape_wb".to_string()),
                    out_file_ext: Some(".bmp".to_string()),
                    template_path: Some(PathBuf::from("assets/template_wb.bmp")),
                    sprites_dir: Some(PathBuf::from("assets/sprite")),
                    // Landscape 250x122 becomes the panel's 122x250 after rotation
                    width: Some(250),
                    height: Some(122),
                    draw_offset: Some(50),
                    invert: Some(false),
                    eink_flip: Some(false),
                    ..Default::default()
                },
            },
        );

        variants.insert(
            "eink".to_string(),
            ConfigVariant {
                parent: Some("bw".to_string()),
                overrides: ConfigOverride {
                    title: Some("BW EINK".to_string()),
                    out_filename: Some("landscape_eink".to_string()),
                    invert: Some(false),
                    eink_flip: Some(true),
                    ..Default::default()
                },
            },
        );

        variants.insert(
            "bwi".to_string(),
            ConfigVariant {
                parent: Some("bw".to_string()),
                overrides: ConfigOverride {
                    title: Some("BW inverted".to_string()),
                    out_filename: Some("landscape_wbi".to_string()),
                    invert: Some(true),
                    eink_flip: Some(false),
                    ..Default::default()
                },
            },
        );

        variants.insert(
            "rgb-white".to_string(),
            ConfigVariant {
                parent: None,
                overrides: ConfigOverride {
                    title: Some("Color, white BG".to_string()),
                    work_dir: Some(PathBuf::from("tmp")),
                    out_filename: Some("landscape_rgb_w".to_string()),
                    out_file_ext: Some(".png".to_string()),
                    template_path: Some(PathBuf::from("assets/template_rgb.bmp")),
                    sprites_dir: Some(PathBuf::from("assets/sprite_rgb")),
                    sprites_mode: Some(SpritesMode::Rgb),
                    palette: PaletteOverride::all(ColorPalette {
                        soil: PaletteColor::rgb(148, 82, 1),
                        smoke: PaletteColor::rgb(127, 127, 127),
                        background: PaletteColor::rgb(255, 255, 255),
                        foreground: PaletteColor::rgb(0, 0, 0),
                        rain: PaletteColor::rgb(10, 100, 148),
                        snow: PaletteColor::rgb(194, 194, 194),
                    }),
                    invert: Some(false),
                    eink_flip: Some(false),
                    ..Default::default()
                },
            },
        );

        variants.insert(
            "rgb-black".to_string(),
            ConfigVariant {
                parent: Some("rgb-white".to_string()),
                overrides: ConfigOverride {
                    title: Some("Color, black BG".to_string()),
                    out_filename: Some("landscape_rgb_b".to_string()),
                    palette: PaletteOverride::all(ColorPalette {
                        soil: PaletteColor::rgb(148, 82, 1),
                        smoke: PaletteColor::rgb(127, 127, 127),
                        background: PaletteColor::rgb(0, 0, 0),
                        foreground: PaletteColor::rgb(255, 255, 255),
                        rain: PaletteColor::rgb(122, 213, 255),
                        snow: PaletteColor::rgb(255, 255, 255),
                    }),
                    ..Default::default()
                },
            },
        );

        variants.insert(
            "bwr".to_string(),
            ConfigVariant {
                parent: Some("rgb-white".to_string()),
                overrides: ConfigOverride {
                    title: Some("Black, White, Red E-Ink".to_string()),
                    out_filename: Some("landscape_bwr".to_string()),
                    out_file_ext: Some(".png".to_string()),
                    sprites_dir: Some(PathBuf::from("assets/sprite_rgb")),
                    sprites_mode: Some(SpritesMode::Rgb),
                    // Chosen so each role lands on a distinct panel ink
                    palette: PaletteOverride::all(ColorPalette {
                        soil: PaletteColor::rgb(100, 50, 0),
                        smoke: PaletteColor::rgb(150, 150, 150),
                        background: PaletteColor::rgb(255, 255, 255),
                        foreground: PaletteColor::rgb(0, 0, 0),
                        rain: PaletteColor::rgb(0, 0, 255),
                        snow: PaletteColor::rgb(255, 255, 255),
                    }),
                    three_color: Some(true),
                    invert: Some(false),
                    eink_flip: Some(false),
                    ..Default::default()
                },
            },
        );

        Self {
            base: RenderConfig::default(),
            variants,
            default_variant: default_variant(),
        }
    }
}
