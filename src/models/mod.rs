pub mod config;
pub mod display_geometry;
pub mod presets;
pub mod secrets;

pub use config::{
    ColorPalette, ConfigOverride, Location, MonoLevel, PaletteColor, PaletteOverride,
    RenderConfig, SpritesMode, PLACEHOLDER_API_KEY,
};
pub use display_geometry::DisplayGeometry;
pub use presets::{ConfigVariant, PresetCatalog};
pub use secrets::Secrets;
