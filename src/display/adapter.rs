//! Pushes a rendered image file to an e-paper panel.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::driver::{BoundDriver, DriverError, DriverRegistry, EpdDriver};
use super::geometry::{prepare_frame, Diagnostic, PanelMounting};
use crate::error::DisplayError;
use crate::models::DisplayGeometry;
use crate::rendering::Canvas;

/// Panel settle time between pushing a frame and putting the panel to sleep
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Idle,
    DriverBound,
    Initialized,
    Cleared,
    ImageLoaded,
    GeometryReconciled,
    Transferred,
    Slept,
    Error,
}

/// Shared flag for stopping a transfer from another thread.
///
/// The adapter only looks at it between steps; a step already talking to
/// the panel always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct AdapterOptions {
    pub mounting: PanelMounting,
    pub settle: Duration,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            mounting: PanelMounting::default(),
            settle: DEFAULT_SETTLE,
        }
    }
}

/// Outcome of a successful transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReport {
    pub driver: String,
    pub native: DisplayGeometry,
    pub diagnostics: Vec<Diagnostic>,
    pub state: AdapterState,
}

impl TransferReport {
    pub fn is_degraded(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_degraded)
    }
}

pub struct DisplayAdapter {
    registry: DriverRegistry,
    options: AdapterOptions,
    cancel: CancelToken,
    state: AdapterState,
}

impl DisplayAdapter {
    pub fn new(registry: DriverRegistry, options: AdapterOptions) -> Self {
        Self {
            registry,
            options,
            cancel: CancelToken::new(),
            state: AdapterState::Idle,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Bind a driver, then run init, clear, load, reconcile, transfer,
    /// settle and sleep. Any failure after binding releases the driver
    /// with `exit` before the error is returned.
    pub fn show(&mut self, image_path: &Path) -> Result<TransferReport, DisplayError> {
        let bound = self.bind()?;
        self.show_bound(bound, image_path)
    }

    /// Discover a driver without touching the panel.
    ///
    /// Lets a caller fail on a missing panel before doing expensive work,
    /// then hand the driver to [`DisplayAdapter::show_bound`] or
    /// [`DisplayAdapter::release`].
    pub fn bind(&mut self) -> Result<BoundDriver, DisplayError> {
        self.state = AdapterState::Idle;
        if let Err(e) = self.checkpoint() {
            self.state = AdapterState::Error;
            return Err(e);
        }

        match self.registry.discover() {
            Ok(bound) => {
                self.enter(AdapterState::DriverBound);
                Ok(bound)
            }
            Err(e) => {
                self.state = AdapterState::Error;
                Err(e)
            }
        }
    }

    /// Run the transfer on a driver returned by [`DisplayAdapter::bind`]
    pub fn show_bound(
        &mut self,
        mut bound: BoundDriver,
        image_path: &Path,
    ) -> Result<TransferReport, DisplayError> {
        self.enter(AdapterState::DriverBound);

        let mut diagnostics = Vec::new();
        match self.transfer(bound.driver.as_mut(), image_path, &mut diagnostics) {
            Ok(native) => {
                tracing::info!(
                    driver = %bound.name,
                    native = %native,
                    degraded = diagnostics.iter().any(Diagnostic::is_degraded),
                    "Display updated"
                );
                Ok(TransferReport {
                    driver: bound.name,
                    native,
                    diagnostics,
                    state: self.state,
                })
            }
            Err(e) => {
                tracing::error!(driver = %bound.name, state = ?self.state, error = %e, "Display transfer failed");
                self.state = AdapterState::Error;
                exit_quietly(&mut bound);
                Err(e)
            }
        }
    }

    /// Give back a bound driver that will not be used
    pub fn release(&mut self, mut bound: BoundDriver) {
        tracing::debug!(driver = %bound.name, "Releasing unused driver");
        exit_quietly(&mut bound);
        self.state = AdapterState::Idle;
    }

    fn transfer(
        &mut self,
        driver: &mut dyn EpdDriver,
        image_path: &Path,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<DisplayGeometry, DisplayError> {
        if !image_path.is_file() {
            return Err(DisplayError::MissingArtifact(image_path.to_path_buf()));
        }

        self.checkpoint()?;
        driver.init().map_err(device("init"))?;
        self.enter(AdapterState::Initialized);

        self.checkpoint()?;
        driver.clear().map_err(device("clear"))?;
        self.enter(AdapterState::Cleared);

        let native = DisplayGeometry::new(driver.width(), driver.height());

        self.checkpoint()?;
        let image = image::open(image_path).map_err(|source| DisplayError::Decode {
            path: image_path.to_path_buf(),
            source,
        })?;
        let canvas = Canvas::from_dynamic(image);
        tracing::debug!(
            path = %image_path.display(),
            width = canvas.width(),
            height = canvas.height(),
            mode = ?canvas.mode(),
            "Loaded image"
        );
        self.enter(AdapterState::ImageLoaded);

        self.checkpoint()?;
        let (frame, frame_diagnostics) = prepare_frame(&canvas, native, &self.options.mounting);
        diagnostics.extend(frame_diagnostics);
        self.enter(AdapterState::GeometryReconciled);

        self.checkpoint()?;
        let buffer = driver.get_buffer(&frame);
        driver.display(&buffer).map_err(device("display"))?;
        self.enter(AdapterState::Transferred);

        if !self.options.settle.is_zero() {
            tracing::debug!(settle = ?self.options.settle, "Waiting for panel to settle");
            std::thread::sleep(self.options.settle);
        }

        self.checkpoint()?;
        driver.sleep().map_err(device("sleep"))?;
        self.enter(AdapterState::Slept);

        Ok(native)
    }

    fn checkpoint(&self) -> Result<(), DisplayError> {
        if self.cancel.is_cancelled() {
            tracing::warn!(state = ?self.state, "Transfer cancelled");
            return Err(DisplayError::Interrupted);
        }
        Ok(())
    }

    fn enter(&mut self, state: AdapterState) {
        tracing::debug!(from = ?self.state, to = ?state, "Display adapter state");
        self.state = state;
    }
}

fn exit_quietly(bound: &mut BoundDriver) {
    if let Err(e) = bound.driver.exit() {
        tracing::warn!(driver = %bound.name, error = %e, "Driver cleanup failed");
    }
}

fn device(step: &'static str) -> impl Fn(DriverError) -> DisplayError {
    move |source| DisplayError::Device { step, source }
}
