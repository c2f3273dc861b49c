pub mod adapter;
pub mod driver;
pub mod geometry;
pub mod simulator;

pub use adapter::{AdapterOptions, AdapterState, CancelToken, DisplayAdapter, TransferReport};
pub use driver::{BoundDriver, DriverError, DriverRegistry, EpdDriver, ProbeError};
pub use geometry::{Anchor, CropBox, Diagnostic, PanelMounting, Rotation};
pub use simulator::SimulatedPanel;
