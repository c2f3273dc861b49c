use std::path::PathBuf;

use thiserror::Error;

use crate::display::driver::DriverError;
use crate::models::SpritesMode;
use crate::services::artist::DrawError;
use crate::services::weather::WeatherError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing secret: {0}")]
    MissingSecret(&'static str),

    #[error("Secret {0} still holds its placeholder value")]
    PlaceholderSecret(&'static str),

    #[error("Unknown configuration variant: {0}")]
    UnknownVariant(String),

    #[error("Configuration variant {0} inherits from itself")]
    InheritanceCycle(String),

    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Incoherent post-processing flags: {0}")]
    IncoherentFlags(&'static str),

    #[error("Palette color {role} does not match sprites mode {mode}")]
    PaletteMode {
        role: &'static str,
        mode: SpritesMode,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum PostProcessError {
    #[error("Three-color quantization needs an rgb canvas, got a 1-bit canvas")]
    ThreeColorOnMono,
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to create working directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("No e-paper driver available (tried: {})", .tried.join(", "))]
    DriverUnavailable { tried: Vec<String> },

    #[error("Rendered image not found at {0}; did the render step run?")]
    MissingArtifact(PathBuf),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Display {step} failed: {source}")]
    Device {
        step: &'static str,
        source: DriverError,
    },

    #[error("Transfer interrupted")]
    Interrupted,
}

/// Errors from the render half of the pipeline (everything before the
/// file boundary).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Draw error: {0}")]
    Draw(#[from] DrawError),

    #[error("Post-processing error: {0}")]
    PostProcess(#[from] PostProcessError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}
