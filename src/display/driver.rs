//! E-paper driver seam and ordered driver discovery.

use std::time::Duration;

use eink_palette::bilevel;
use thiserror::Error;

use crate::error::DisplayError;
use crate::rendering::Canvas;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Panel stayed busy for {0:?}")]
    Busy(Duration),

    #[error("Frame buffer is {actual} bytes, panel expects {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("{0}")]
    Device(String),
}

/// Operations every e-paper panel driver exposes.
///
/// Calls arrive in the order `init`, `clear`, `get_buffer`, `display`,
/// `sleep`; `exit` releases the hardware and may come at any point.
pub trait EpdDriver: Send {
    fn init(&mut self) -> Result<(), DriverError>;

    fn clear(&mut self) -> Result<(), DriverError>;

    /// Native buffer width in pixels
    fn width(&self) -> u32;

    /// Native buffer height in pixels
    fn height(&self) -> u32;

    /// Pack a canvas of native size into the panel's frame format.
    ///
    /// The default packs 1-bit rows MSB-first with set bits meaning white
    /// and each row padded to a whole byte.
    fn get_buffer(&self, canvas: &Canvas) -> Vec<u8> {
        let mono = canvas.clone().into_mono();
        bilevel::pack_rows(&mono.luma_samples(), mono.width())
    }

    fn display(&mut self, buffer: &[u8]) -> Result<(), DriverError>;

    fn sleep(&mut self) -> Result<(), DriverError>;

    fn exit(&mut self) -> Result<(), DriverError>;
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Driver not present: {0}")]
    NotPresent(String),

    #[error("Driver lacks {0}")]
    MissingCapability(&'static str),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

type Probe = Box<dyn Fn() -> Result<Box<dyn EpdDriver>, ProbeError> + Send + Sync>;

struct Candidate {
    name: String,
    probe: Probe,
}

/// A driver that passed its probe
pub struct BoundDriver {
    pub name: String,
    pub driver: Box<dyn EpdDriver>,
}

impl std::fmt::Debug for BoundDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundDriver")
            .field("name", &self.name)
            .field("width", &self.driver.width())
            .field("height", &self.driver.height())
            .finish()
    }
}

/// Ordered list of driver candidates. The first one whose probe succeeds
/// is used; there is no fallback once the list is exhausted.
#[derive(Default)]
pub struct DriverRegistry {
    candidates: Vec<Candidate>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidate<F>(mut self, name: impl Into<String>, probe: F) -> Self
    where
        F: Fn() -> Result<Box<dyn EpdDriver>, ProbeError> + Send + Sync + 'static,
    {
        self.candidates.push(Candidate {
            name: name.into(),
            probe: Box::new(probe),
        });
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn discover(&self) -> Result<BoundDriver, DisplayError> {
        for candidate in &self.candidates {
            match (candidate.probe)().and_then(check_capabilities) {
                Ok(driver) => {
                    tracing::info!(
                        driver = %candidate.name,
                        width = driver.width(),
                        height = driver.height(),
                        "Bound e-paper driver"
                    );
                    return Ok(BoundDriver {
                        name: candidate.name.clone(),
                        driver,
                    });
                }
                Err(e) => {
                    tracing::warn!(driver = %candidate.name, error = %e, "Driver probe failed");
                }
            }
        }

        Err(DisplayError::DriverUnavailable {
            tried: self.candidates.iter().map(|c| c.name.clone()).collect(),
        })
    }
}

fn check_capabilities(driver: Box<dyn EpdDriver>) -> Result<Box<dyn EpdDriver>, ProbeError> {
    if driver.width() == 0 {
        return Err(ProbeError::MissingCapability("width"));
    }
    if driver.height() == 0 {
        return Err(ProbeError::MissingCapability("height"));
    }
    Ok(driver)
}
