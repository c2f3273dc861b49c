pub mod artist;
pub mod pipeline;
pub mod weather;

pub use artist::{DrawError, HorizonArtist, LandscapeArtist};
pub use pipeline::RenderPipeline;
pub use weather::{OpenWeatherMap, WeatherError, WeatherPoint, WeatherSnapshot, WeatherSource};
