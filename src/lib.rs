// Split large rasters into a regular tile grid and merge them back

pub mod border;
pub mod config;
pub mod error;
pub mod grid;
pub mod parallel;
pub mod tiled;

// Re-export commonly used types
pub use config::{Extent, GridSpec, RemainderPolicy, TilingConfig};
pub use error::{Result, TilingError};
pub use grid::{GridLayout, TileBounds};
pub use parallel::{ordered_map, Execution};
pub use tiled::TiledImage;
