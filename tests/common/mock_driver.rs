//! Recording e-paper driver for adapter tests.

use std::sync::{Arc, Mutex};

use landscape_ink::display::{CancelToken, DriverError, DriverRegistry, EpdDriver};

/// Driver that records every call. Clones share the same log, so a test can
/// keep one handle while the registry hands another to the adapter.
#[derive(Clone)]
pub struct MockDriver {
    width: u32,
    height: u32,
    calls: Arc<Mutex<Vec<String>>>,
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_on: Option<&'static str>,
    cancel_after: Option<(&'static str, CancelToken)>,
}

impl MockDriver {
    /// 2.13" panel geometry
    pub fn new() -> Self {
        Self::with_size(122, 250)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Arc::new(Mutex::new(Vec::new())),
            frames: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
            cancel_after: None,
        }
    }

    /// Make one step return a device error
    pub fn failing_on(mut self, step: &'static str) -> Self {
        self.fail_on = Some(step);
        self
    }

    /// Trip the token right after a step succeeds
    pub fn cancelling_after(mut self, step: &'static str, token: CancelToken) -> Self {
        self.cancel_after = Some((step, token));
        self
    }

    /// Registry with this driver as its only candidate
    pub fn registry(&self, name: &str) -> DriverRegistry {
        let driver = self.clone();
        DriverRegistry::new().with_candidate(name, move || {
            Ok(Box::new(driver.clone()) as Box<dyn EpdDriver>)
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().unwrap().clone()
    }

    fn record(&self, step: &'static str) -> Result<(), DriverError> {
        self.calls.lock().unwrap().push(step.to_string());
        if self.fail_on == Some(step) {
            return Err(DriverError::Device(format!("{step} rejected by mock")));
        }
        if let Some((after, token)) = &self.cancel_after {
            if *after == step {
                token.cancel();
            }
        }
        Ok(())
    }
}

impl EpdDriver for MockDriver {
    fn init(&mut self) -> Result<(), DriverError> {
        self.record("init")
    }

    fn clear(&mut self) -> Result<(), DriverError> {
        self.record("clear")
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn display(&mut self, buffer: &[u8]) -> Result<(), DriverError> {
        self.record("display")?;
        self.frames.lock().unwrap().push(buffer.to_vec());
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DriverError> {
        self.record("sleep")
    }

    fn exit(&mut self) -> Result<(), DriverError> {
        self.record("exit")
    }
}
