//! File-backed stand-in for a 2.13" black/white panel.
//!
//! Every frame pushed with `display` lands in the output directory as a
//! 1-bit PNG (`frame-001.png`, `frame-002.png`, ...), which makes the
//! transfer path usable without SPI hardware.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::driver::{DriverError, DriverRegistry, EpdDriver, ProbeError};
use crate::models::DisplayGeometry;

/// Driver names of the 2.13" panel revisions, in probing order
pub const PANEL_REVISIONS: [&str; 4] = ["epd2in13_V3", "epd2in13_V2", "epd2in13", "epd2in13_V4"];

#[derive(Debug)]
pub struct SimulatedPanel {
    dir: PathBuf,
    geometry: DisplayGeometry,
    initialized: bool,
    frames: usize,
}

impl SimulatedPanel {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_geometry(dir, DisplayGeometry::EPD_2IN13)
    }

    pub fn with_geometry(dir: impl Into<PathBuf>, geometry: DisplayGeometry) -> Self {
        Self {
            dir: dir.into(),
            geometry,
            initialized: false,
            frames: 0,
        }
    }

    /// The output directory must already exist.
    pub fn probe(dir: &Path) -> Result<Box<dyn EpdDriver>, ProbeError> {
        if !dir.is_dir() {
            return Err(ProbeError::NotPresent(format!(
                "simulator directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Box::new(Self::new(dir)))
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    fn frame_path(&self, n: usize) -> PathBuf {
        self.dir.join(format!("frame-{n:03}.png"))
    }

    fn require_init(&self) -> Result<(), DriverError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DriverError::Device("panel not initialized".to_string()))
        }
    }

    fn encode(&self, buffer: &[u8]) -> Result<Vec<u8>, DriverError> {
        let mut out = Cursor::new(Vec::new());
        {
            let mut encoder =
                png::Encoder::new(&mut out, self.geometry.width, self.geometry.height);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::One);
            let mut writer = encoder
                .write_header()
                .map_err(|e| DriverError::Device(e.to_string()))?;
            writer
                .write_image_data(buffer)
                .map_err(|e| DriverError::Device(e.to_string()))?;
        }
        Ok(out.into_inner())
    }
}

impl EpdDriver for SimulatedPanel {
    fn init(&mut self) -> Result<(), DriverError> {
        self.initialized = true;
        tracing::debug!(dir = %self.dir.display(), "Simulated panel initialized");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DriverError> {
        self.require_init()
    }

    fn width(&self) -> u32 {
        self.geometry.width
    }

    fn height(&self) -> u32 {
        self.geometry.height
    }

    fn display(&mut self, buffer: &[u8]) -> Result<(), DriverError> {
        self.require_init()?;
        let expected = self.geometry.frame_bytes();
        if buffer.len() != expected {
            return Err(DriverError::BufferSize {
                expected,
                actual: buffer.len(),
            });
        }

        let data = self.encode(buffer)?;
        let path = self.frame_path(self.frames + 1);
        std::fs::write(&path, data)?;
        self.frames += 1;
        tracing::info!(path = %path.display(), "Simulated panel wrote frame");
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DriverError> {
        self.initialized = false;
        tracing::debug!("Simulated panel asleep");
        Ok(())
    }

    fn exit(&mut self) -> Result<(), DriverError> {
        self.initialized = false;
        tracing::debug!("Simulated panel released");
        Ok(())
    }
}

impl DriverRegistry {
    /// Every panel revision backed by a simulator writing into `dir`
    pub fn simulated(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        PANEL_REVISIONS.into_iter().fold(Self::new(), |registry, name| {
            let dir = dir.clone();
            registry.with_candidate(name, move || SimulatedPanel::probe(&dir))
        })
    }

    /// Panel revisions with no driver linked in; discovery reports each
    /// as not present.
    pub fn hardware() -> Self {
        PANEL_REVISIONS.into_iter().fold(Self::new(), |registry, name| {
            registry.with_candidate(name, move || {
                Err(ProbeError::NotPresent(format!(
                    "{name}: no SPI driver in this build, use --simulate"
                )))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_requires_init() {
        let tmp = tempfile::tempdir().unwrap();
        let mut panel = SimulatedPanel::new(tmp.path());
        let buffer = vec![0xFF; DisplayGeometry::EPD_2IN13.frame_bytes()];
        assert!(matches!(panel.display(&buffer), Err(DriverError::Device(_))));
    }

    #[test]
    fn test_display_writes_frame() {
        let tmp = tempfile::tempdir().unwrap();
        let mut panel = SimulatedPanel::new(tmp.path());
        panel.init().unwrap();
        panel.clear().unwrap();

        let buffer = vec![0xFF; DisplayGeometry::EPD_2IN13.frame_bytes()];
        panel.display(&buffer).unwrap();

        let path = tmp.path().join("frame-001.png");
        let img = image::open(&path).unwrap().into_luma8();
        assert_eq!(img.dimensions(), (122, 250));
        assert!(img.pixels().all(|p| p.0[0] == 255));
        assert_eq!(panel.frames_written(), 1);
    }

    #[test]
    fn test_display_rejects_wrong_buffer_size() {
        let tmp = tempfile::tempdir().unwrap();
        let mut panel = SimulatedPanel::new(tmp.path());
        panel.init().unwrap();
        assert!(matches!(
            panel.display(&[0u8; 10]),
            Err(DriverError::BufferSize {
                expected: 4000,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_probe_needs_directory() {
        assert!(SimulatedPanel::probe(Path::new("/nonexistent/sim")).is_err());
    }

    #[test]
    fn test_simulated_registry_binds_first_revision() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = DriverRegistry::simulated(tmp.path());
        assert_eq!(registry.names(), PANEL_REVISIONS.to_vec());
        assert_eq!(registry.discover().unwrap().name, "epd2in13_V3");
    }

    #[test]
    fn test_hardware_registry_is_unavailable() {
        let registry = DriverRegistry::hardware();
        assert!(registry.discover().is_err());
    }
}
