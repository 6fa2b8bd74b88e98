use crate::error::{Result, TilingError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A pair of per-axis values: rows (X) then columns (Y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extent {
    pub rows: usize,
    pub cols: usize,
}

impl Extent {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }
}

impl From<usize> for Extent {
    fn from(size: usize) -> Self {
        Self::square(size)
    }
}

impl From<(usize, usize)> for Extent {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self::new(rows, cols)
    }
}

/// How the tile grid is derived from the image extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GridSpec {
    /// Fixed tile height/width; the number of tiles follows.
    TileSize(Extent),
    /// Fixed number of tiles per axis; the tile size follows.
    TileCount(Extent),
}

/// What happens to the part of the image that does not fill a whole tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RemainderPolicy {
    /// Ceiling division: the last tile is zero-padded and kept.
    #[default]
    Keep,
    /// Floor division: the partial tile is dropped and its data is lost.
    Truncate,
}

impl RemainderPolicy {
    /// Divide `len` by `by` according to the policy.
    pub fn divide(self, len: usize, by: usize) -> usize {
        match self {
            RemainderPolicy::Keep => len.div_ceil(by),
            RemainderPolicy::Truncate => len / by,
        }
    }
}

impl From<bool> for RemainderPolicy {
    fn from(keep_rest: bool) -> Self {
        if keep_rest {
            RemainderPolicy::Keep
        } else {
            RemainderPolicy::Truncate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TilingConfig {
    pub grid: Option<GridSpec>,
    pub remainder: RemainderPolicy,
    /// Border (rows, cols) added on both sides before tiling.
    pub offset: Extent,
    /// Context pixels added around every tile.
    pub overlay: usize,
}

impl TilingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tile_size(mut self, size: impl Into<Extent>) -> Self {
        self.grid = Some(GridSpec::TileSize(size.into()));
        self
    }

    pub fn with_tile_count(mut self, count: impl Into<Extent>) -> Self {
        self.grid = Some(GridSpec::TileCount(count.into()));
        self
    }

    pub fn with_remainder(mut self, remainder: impl Into<RemainderPolicy>) -> Self {
        self.remainder = remainder.into();
        self
    }

    pub fn with_offset(mut self, offset: impl Into<Extent>) -> Self {
        self.offset = offset.into();
        self
    }

    pub fn with_overlay(mut self, overlay: usize) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn validate(&self) -> Result<GridSpec> {
        let grid = self.grid.ok_or_else(|| {
            TilingError::Config("either a tile size or a number of tiles must be given".into())
        })?;

        match grid {
            GridSpec::TileSize(size) if size.rows == 0 || size.cols == 0 => Err(
                TilingError::Config(format!("tile size {}x{} must be positive", size.rows, size.cols)),
            ),
            GridSpec::TileCount(count) if count.rows == 0 || count.cols == 0 => {
                Err(TilingError::Config(format!(
                    "number of tiles {}x{} must be positive",
                    count.rows, count.cols
                )))
            }
            _ => Ok(grid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_grid_is_rejected() {
        let err = TilingConfig::new().with_overlay(2).validate().unwrap_err();
        assert!(matches!(err, TilingError::Config(_)));
    }

    #[test]
    fn test_zero_tile_size_is_rejected() {
        let config = TilingConfig::new().with_tile_size((4, 0));
        assert!(matches!(config.validate(), Err(TilingError::Config(_))));

        let config = TilingConfig::new().with_tile_count(0);
        assert!(matches!(config.validate(), Err(TilingError::Config(_))));
    }

    #[test]
    fn test_scalar_and_pair_extents() {
        let config = TilingConfig::new().with_tile_size(3);
        assert_eq!(config.validate().unwrap(), GridSpec::TileSize(Extent::new(3, 3)));

        let config = TilingConfig::new().with_tile_count((2, 5));
        assert_eq!(config.validate().unwrap(), GridSpec::TileCount(Extent::new(2, 5)));
    }

    #[test]
    fn test_remainder_policy() {
        assert_eq!(RemainderPolicy::from(true), RemainderPolicy::Keep);
        assert_eq!(RemainderPolicy::from(false), RemainderPolicy::Truncate);
        assert_eq!(RemainderPolicy::Keep.divide(5, 2), 3);
        assert_eq!(RemainderPolicy::Truncate.divide(5, 2), 2);
        assert_eq!(RemainderPolicy::Keep.divide(4, 2), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() {
        let json = r#"{"grid": {"tile_size": {"rows": 256, "cols": 128}}, "remainder": "truncate", "overlay": 8}"#;
        let config: TilingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.grid, Some(GridSpec::TileSize(Extent::new(256, 128))));
        assert_eq!(config.remainder, RemainderPolicy::Truncate);
        assert_eq!(config.offset, Extent::default());
        assert_eq!(config.overlay, 8);
    }
}
