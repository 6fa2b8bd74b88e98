use crate::config::{Extent, GridSpec, RemainderPolicy, TilingConfig};
use crate::error::{Result, TilingError};
use log::debug;

/// Where a tile sits relative to the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBounds {
    // Core bounds: the part of the source this tile owns on merge
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,

    // Read bounds: source pixels that appear in the tile, overlay included
    pub read_row_min: usize,
    pub read_row_max: usize,
    pub read_col_min: usize,
    pub read_col_max: usize,

    // Tile rows/cols filled from mirrored offset, overlay or zero slack
    pub pad_top: usize,
    pub pad_bottom: usize,
    pub pad_left: usize,
    pub pad_right: usize,
}

impl TileBounds {
    pub fn height(&self) -> usize {
        self.row_max - self.row_min
    }

    pub fn width(&self) -> usize {
        self.col_max - self.col_min
    }

    pub fn read_height(&self) -> usize {
        self.read_row_max - self.read_row_min
    }

    pub fn read_width(&self) -> usize {
        self.read_col_max - self.read_col_min
    }

    /// True when the tile holds no source pixels of its own.
    pub fn is_empty(&self) -> bool {
        self.height() == 0 || self.width() == 0
    }
}

/// Resolved tile grid geometry for one source extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    /// Source extent (X, Y).
    pub source: Extent,
    pub offset: Extent,
    pub overlay: usize,
    pub remainder: RemainderPolicy,
    /// Tile size without overlay (X_sub, Y_sub).
    pub tile: Extent,
    /// Grid dimensions (X_num, Y_num).
    pub count: Extent,
}

impl GridLayout {
    pub fn resolve(source: Extent, config: &TilingConfig) -> Result<Self> {
        let spec = config.validate()?;
        let remainder = config.remainder;
        let tiled = Extent::new(
            source.rows + 2 * config.offset.rows,
            source.cols + 2 * config.offset.cols,
        );

        let (tile, count) = match spec {
            GridSpec::TileSize(tile) => {
                let count = Extent::new(
                    remainder.divide(tiled.rows, tile.rows),
                    remainder.divide(tiled.cols, tile.cols),
                );
                (tile, count)
            }
            GridSpec::TileCount(count) => {
                let tile = Extent::new(
                    remainder.divide(tiled.rows, count.rows),
                    remainder.divide(tiled.cols, count.cols),
                );
                (tile, count)
            }
        };

        if tile.rows == 0 || tile.cols == 0 || count.rows == 0 || count.cols == 0 {
            return Err(TilingError::Config(format!(
                "{}x{} extent yields an empty grid ({}x{} tiles of {}x{})",
                tiled.rows, tiled.cols, count.rows, count.cols, tile.rows, tile.cols
            )));
        }

        debug!(
            "GridLayout: {}x{} source, offset={:?}, overlay={}, {:?} → {}x{} tiles of {}x{}",
            source.rows,
            source.cols,
            (config.offset.rows, config.offset.cols),
            config.overlay,
            remainder,
            count.rows,
            count.cols,
            tile.rows,
            tile.cols
        );

        Ok(Self {
            source,
            offset: config.offset,
            overlay: config.overlay,
            remainder,
            tile,
            count,
        })
    }

    pub fn total_tiles(&self) -> usize {
        self.count.rows * self.count.cols
    }

    /// Tile height/width including the overlay border on both sides.
    pub fn tile_shape(&self) -> Extent {
        Extent::new(
            self.tile.rows + 2 * self.overlay,
            self.tile.cols + 2 * self.overlay,
        )
    }

    /// Source extent plus offset border on both sides.
    pub fn tiled_extent(&self) -> Extent {
        Extent::new(
            self.source.rows + 2 * self.offset.rows,
            self.source.cols + 2 * self.offset.cols,
        )
    }

    /// Size of the padded canvas the tiles are cut from.
    pub fn canvas_extent(&self) -> Extent {
        Extent::new(
            self.tile.rows * self.count.rows + 2 * self.overlay,
            self.tile.cols * self.count.cols + 2 * self.overlay,
        )
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.count.rows && col < self.count.cols
    }

    pub fn check_index(&self, row: usize, col: usize) -> Result<()> {
        if self.contains(row, col) {
            Ok(())
        } else {
            Err(TilingError::IndexOutOfBounds {
                row,
                col,
                rows: self.count.rows,
                cols: self.count.cols,
            })
        }
    }

    pub fn iter(&self) -> TileIterator<'_> {
        TileIterator::new(self)
    }

    pub fn tile_bounds(&self, row: usize, col: usize) -> Result<TileBounds> {
        self.check_index(row, col)?;

        let (row_min, row_max, read_row_min, read_row_max, pad_top, pad_bottom) = axis_bounds(
            row,
            self.tile.rows,
            self.offset.rows,
            self.overlay,
            self.source.rows,
        );
        let (col_min, col_max, read_col_min, read_col_max, pad_left, pad_right) = axis_bounds(
            col,
            self.tile.cols,
            self.offset.cols,
            self.overlay,
            self.source.cols,
        );

        Ok(TileBounds {
            row_min,
            row_max,
            col_min,
            col_max,
            read_row_min,
            read_row_max,
            read_col_min,
            read_col_max,
            pad_top,
            pad_bottom,
            pad_left,
            pad_right,
        })
    }
}

/// Bounds of tile `index` along one axis, in source coordinates clipped to `[0, len)`.
fn axis_bounds(
    index: usize,
    tile: usize,
    offset: usize,
    overlay: usize,
    len: usize,
) -> (usize, usize, usize, usize, usize, usize) {
    let clip = |v: isize| v.clamp(0, len as isize) as usize;

    let core_start = (index * tile) as isize - offset as isize;
    let read_start = core_start - overlay as isize;
    let span = tile + 2 * overlay;

    let core_min = clip(core_start);
    let core_max = clip(core_start + tile as isize);
    let read_min = clip(read_start);
    let read_max = clip(read_start + span as isize);

    let pad_before = (read_min as isize - read_start).clamp(0, span as isize) as usize;
    let pad_after = span - pad_before - (read_max - read_min);

    (core_min, core_max, read_min, read_max, pad_before, pad_after)
}

pub struct TileIterator<'a> {
    layout: &'a GridLayout,
    current_idx: usize,
}

impl<'a> TileIterator<'a> {
    fn new(layout: &'a GridLayout) -> Self {
        Self {
            layout,
            current_idx: 0,
        }
    }
}

impl<'a> Iterator for TileIterator<'a> {
    type Item = ((usize, usize), TileBounds);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_idx >= self.layout.total_tiles() {
            return None;
        }
        let row = self.current_idx / self.layout.count.cols;
        let col = self.current_idx % self.layout.count.cols;
        self.current_idx += 1;
        let bounds = self.layout.tile_bounds(row, col).ok()?;
        Some(((row, col), bounds))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.layout.total_tiles() - self.current_idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileIterator<'_> {}
