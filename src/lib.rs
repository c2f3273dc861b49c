//! landscape-ink - weather landscapes for e-paper panels
//!
//! Resolves a preset configuration, renders a landscape from a weather
//! forecast into an image file and pushes that file to a 2.13" panel.
//! This library exposes modules for integration testing.

pub mod display;
pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
