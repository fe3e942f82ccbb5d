mod choropleth;
mod geometry;
mod projection;

pub use choropleth::ChoroplethMap;
pub use projection::Viewport;
