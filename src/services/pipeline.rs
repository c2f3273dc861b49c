//! Render orchestration: weather, canvas, drawing, post-processing, file.

use std::path::PathBuf;

use super::artist::{DrawError, LandscapeArtist};
use super::weather::WeatherSource;
use crate::error::PipelineError;
use crate::models::RenderConfig;
use crate::rendering::{persist, Canvas, PostProcessor};

pub struct RenderPipeline<W, A> {
    weather: W,
    artist: A,
}

impl<W: WeatherSource, A: LandscapeArtist> RenderPipeline<W, A> {
    pub fn new(weather: W, artist: A) -> Self {
        Self { weather, artist }
    }

    /// Build the post-processed canvas for a configuration.
    ///
    /// The configuration is validated before the weather source is asked
    /// for anything.
    pub fn render(&self, config: &RenderConfig) -> Result<Canvas, PipelineError> {
        config.validate()?;

        let snapshot = self.weather.fetch(config)?;
        let canvas = Canvas::blank(config);
        let expected = canvas.dimensions();

        let drawn = self.artist.draw(canvas, config, &snapshot)?;
        let actual = drawn.dimensions();
        if actual != expected {
            return Err(DrawError::SizeChanged { expected, actual }.into());
        }

        let processor = PostProcessor::from_config(config);
        let processed = processor.apply(drawn)?;
        tracing::debug!(
            title = %config.title,
            invert = processor.invert,
            eink_flip = processor.eink_flip,
            three_color = processor.three_color,
            "Rendered canvas"
        );
        Ok(processed)
    }

    /// Render and write the image; returns the path written.
    pub fn save_image(&self, config: &RenderConfig) -> Result<PathBuf, PipelineError> {
        let canvas = self.render(config)?;
        let path = persist(&canvas, config)?;
        tracing::info!(title = %config.title, path = %path.display(), "Image ready");
        Ok(path)
    }
}
