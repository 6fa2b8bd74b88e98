use thiserror::Error;

#[derive(Error, Debug)]
pub enum TilingError {
    #[error("Unsupported image shape {0:?} (expected 2 or 3 non-empty dimensions)")]
    InvalidShape(Vec<usize>),

    #[error("Invalid tiling configuration: {0}")]
    Config(String),

    #[error("Tile shape {found:?} does not match the grid tile shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        found: Vec<usize>,
    },

    #[error("Tile index ({row}, {col}) is outside the {rows}x{cols} grid")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Tile grid is {found:?}, expected {expected:?}")]
    GridMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Expected {expected} tiles to merge, got {found}")]
    TileCountMismatch { expected: usize, found: usize },

    #[error("Tile {index} has shape {found:?}, first tile has shape {expected:?}")]
    NonUniformTiles {
        index: usize,
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, TilingError>;
