pub mod canvas;
pub mod persist;
pub mod postprocess;

pub use canvas::{Canvas, PixelMode};
pub use persist::{persist, save_canvas};
pub use postprocess::PostProcessor;
