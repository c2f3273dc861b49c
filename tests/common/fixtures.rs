//! Test fixtures and constants.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use landscape_ink::models::{PresetCatalog, RenderConfig, Secrets};
use landscape_ink::rendering::{save_canvas, Canvas};
use landscape_ink::services::{WeatherError, WeatherPoint, WeatherSnapshot, WeatherSource};

/// Well-formed key that is not the placeholder
pub const FAKE_API_KEY: &str = "0123456789abcdef0123456789abcdef";

pub fn secrets() -> Secrets {
    Secrets {
        owm_key: Some(FAKE_API_KEY.to_string()),
        owm_lat: Some(50.45),
        owm_lon: Some(30.52),
    }
}

/// Resolve a built-in variant with test secrets, writing into `work_dir`
pub fn resolved(variant: &str, work_dir: &Path) -> RenderConfig {
    let mut config = PresetCatalog::default()
        .resolve(variant, &secrets())
        .unwrap_or_else(|e| panic!("variant {variant} should resolve: {e}"));
    config.work_dir = work_dir.to_path_buf();
    config
}

fn point(hour: u32, temperature: f64, clouds: u8, rain_mm: f64, snow_mm: f64) -> WeatherPoint {
    WeatherPoint {
        time: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
        temperature,
        clouds,
        wind_speed: 2.5,
        rain_mm,
        snow_mm,
    }
}

/// A day of mixed weather: mild start, rain, cold night with snow
pub fn sample_snapshot() -> WeatherSnapshot {
    WeatherSnapshot {
        current: point(0, 4.0, 40, 0.0, 0.0),
        forecast: vec![
            point(3, 6.5, 80, 1.2, 0.0),
            point(6, 8.0, 100, 2.0, 0.0),
            point(9, 5.0, 60, 0.0, 0.0),
            point(12, 1.0, 20, 0.0, 0.5),
            point(15, -2.0, 0, 0.0, 1.5),
            point(18, -3.5, 10, 0.0, 0.0),
            point(21, -1.0, 30, 0.0, 0.0),
        ],
    }
}

/// Weather source returning a fixed snapshot and counting fetches
#[derive(Clone)]
pub struct FixedWeather {
    snapshot: WeatherSnapshot,
    fetches: Arc<AtomicUsize>,
}

impl FixedWeather {
    pub fn new(snapshot: WeatherSnapshot) -> Self {
        Self {
            snapshot,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn sample() -> Self {
        Self::new(sample_snapshot())
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl WeatherSource for FixedWeather {
    fn fetch(&self, _config: &RenderConfig) -> Result<WeatherSnapshot, WeatherError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot.clone())
    }
}

/// Save a canvas as an image file inside `dir`
pub fn write_image(dir: &Path, name: &str, canvas: &Canvas) -> PathBuf {
    let path = dir.join(name);
    save_canvas(canvas, &path).unwrap();
    path
}
