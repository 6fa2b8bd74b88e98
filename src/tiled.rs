use crate::border::mirror_pad;
use crate::config::{Extent, TilingConfig};
use crate::error::{Result, TilingError};
use crate::grid::GridLayout;
use crate::parallel::{ordered_map, Execution};
use log::{debug, info};
use ndarray::{
    concatenate, s, Array3, Array5, ArrayBase, ArrayView2, ArrayView3, ArrayView5, ArrayViewD,
    ArrayViewMut3, Axis, Data, Dimension, Ix2, Ix3, Ix5,
};
use num_traits::Zero;

/// View a rank-2 (single channel) or rank-3 (channel-last) array as rank 3.
fn as_rank3<T>(view: ArrayViewD<'_, T>) -> Option<ArrayView3<'_, T>> {
    match view.ndim() {
        2 => view.insert_axis(Axis(2)).into_dimensionality::<Ix3>().ok(),
        3 => view.into_dimensionality::<Ix3>().ok(),
        _ => None,
    }
}

/// An image split into a regular grid of equally sized tiles.
///
/// Tiles are stored as a 5D array `(X_num, Y_num, tile_h, tile_w, Z)` where
/// `tile_h = X_sub + 2 * overlay` and `tile_w = Y_sub + 2 * overlay`.
#[derive(Debug, Clone)]
pub struct TiledImage<T> {
    config: TilingConfig,
    layout: GridLayout,
    channels: usize,
    data: Array5<T>,
}

impl<T> TiledImage<T>
where
    T: Clone + Zero,
{
    /// Pad `image` and split it into tiles.
    ///
    /// `image` must be 2D `(X, Y)` or channel-last 3D `(X, Y, Z)`.
    pub fn new<S, D>(image: &ArrayBase<S, D>, config: &TilingConfig) -> Result<Self>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        let shape = image.shape().to_vec();
        if shape.contains(&0) {
            return Err(TilingError::InvalidShape(shape));
        }
        let source = as_rank3(image.view().into_dyn()).ok_or(TilingError::InvalidShape(shape))?;
        let (rows, cols, channels) = source.dim();

        let layout = GridLayout::resolve(Extent::new(rows, cols), config)?;
        let canvas = build_canvas(source, &layout);
        let data = split(&canvas, &layout);

        info!(
            "Tiled {}x{}x{} image into {}x{} tiles of {}x{} (overlay {})",
            rows,
            cols,
            channels,
            layout.count.rows,
            layout.count.cols,
            layout.tile.rows,
            layout.tile.cols,
            layout.overlay
        );

        Ok(Self {
            config: config.clone(),
            layout,
            channels,
            data,
        })
    }

    /// Replace tile `(row, col)`.
    ///
    /// The replacement must have the stored tile shape, overlay border
    /// included: `(X_sub + 2 * overlay, Y_sub + 2 * overlay, Z)`. 2D data
    /// counts as a single channel.
    pub fn set_tile<S, D>(&mut self, row: usize, col: usize, tile: &ArrayBase<S, D>) -> Result<()>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        self.layout.check_index(row, col)?;

        let expected = self.tile_dim();
        let found = tile.shape().to_vec();
        let view = as_rank3(tile.view().into_dyn())
            .filter(|v| v.dim() == expected)
            .ok_or(TilingError::ShapeMismatch { expected, found })?;

        self.data.slice_mut(s![row, col, .., .., ..]).assign(&view);
        Ok(())
    }

    /// Merge a flat, row-major list of 3D tiles back into one image.
    pub fn merge<U, S>(&self, tiles: &[ArrayBase<S, Ix3>]) -> Result<Array3<U>>
    where
        U: Clone,
        S: Data<Elem = U>,
    {
        let views: Vec<ArrayView3<'_, U>> = tiles.iter().map(|t| t.view()).collect();
        self.merge_views(&views)
    }

    /// Merge a flat, row-major list of 2D tiles, restoring a single channel axis.
    pub fn merge_2d<U, S>(&self, tiles: &[ArrayBase<S, Ix2>]) -> Result<Array3<U>>
    where
        U: Clone,
        S: Data<Elem = U>,
    {
        let views: Vec<ArrayView3<'_, U>> = tiles
            .iter()
            .map(|t| t.view().insert_axis(Axis(2)))
            .collect();
        self.merge_views(&views)
    }

    /// Merge a 5D tile grid shaped like [`TiledImage::grid`].
    pub fn merge_grid<U, S>(&self, grid: &ArrayBase<S, Ix5>) -> Result<Array3<U>>
    where
        U: Clone,
        S: Data<Elem = U>,
    {
        let (grid_rows, grid_cols, ..) = grid.dim();
        let expected = (self.layout.count.rows, self.layout.count.cols);
        if (grid_rows, grid_cols) != expected {
            return Err(TilingError::GridMismatch {
                expected,
                found: (grid_rows, grid_cols),
            });
        }

        let views: Vec<ArrayView3<'_, U>> = self
            .list_tile_indices()
            .into_iter()
            .map(|(i, j)| grid.slice(s![i, j, .., .., ..]))
            .collect();
        self.merge_views(&views)
    }

    /// Reassemble the stored tiles into the original image.
    pub fn image(&self) -> Result<Array3<T>> {
        self.merge_grid(&self.data)
    }

    fn merge_views<U: Clone>(&self, tiles: &[ArrayView3<'_, U>]) -> Result<Array3<U>> {
        let layout = &self.layout;
        let expected = layout.total_tiles();
        if tiles.len() != expected {
            return Err(TilingError::TileCountMismatch {
                expected,
                found: tiles.len(),
            });
        }

        let first = tiles[0].dim();
        if let Some((index, tile)) = tiles.iter().enumerate().find(|(_, t)| t.dim() != first) {
            return Err(TilingError::NonUniformTiles {
                index,
                expected: first,
                found: tile.dim(),
            });
        }

        // Geometry scales with the ratio of returned to stored tile size
        let (tile_h, tile_w, _) = first;
        let base = layout.tile_shape();
        let scale_rows = |v: usize| v * tile_h / base.rows;
        let scale_cols = |v: usize| v * tile_w / base.cols;

        let trim_rows = scale_rows(layout.overlay).min(tile_h / 2);
        let trim_cols = scale_cols(layout.overlay).min(tile_w / 2);
        let cores: Vec<ArrayView3<'_, U>> = tiles
            .iter()
            .map(|t| {
                t.slice(s![
                    trim_rows..tile_h - trim_rows,
                    trim_cols..tile_w - trim_cols,
                    ..
                ])
            })
            .collect();

        let strips = cores
            .chunks(layout.count.cols)
            .map(|row| concatenate(Axis(1), row))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let strip_views: Vec<ArrayView3<'_, U>> = strips.iter().map(|strip| strip.view()).collect();
        let canvas = concatenate(Axis(0), &strip_views)?;

        let (canvas_h, canvas_w, _) = canvas.dim();
        let row_start = scale_rows(layout.offset.rows).min(canvas_h);
        let col_start = scale_cols(layout.offset.cols).min(canvas_w);
        let row_end = (row_start + scale_rows(layout.source.rows)).min(canvas_h);
        let col_end = (col_start + scale_cols(layout.source.cols)).min(canvas_w);

        debug!(
            "Merged {} tiles of {}x{} into {}x{} canvas, cropping rows {}..{} cols {}..{}",
            tiles.len(),
            tile_h,
            tile_w,
            canvas_h,
            canvas_w,
            row_start,
            row_end,
            col_start,
            col_end
        );

        Ok(canvas
            .slice(s![row_start..row_end, col_start..col_end, ..])
            .to_owned())
    }
}

impl<T> TiledImage<T> {
    pub fn config(&self) -> &TilingConfig {
        &self.config
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Source extent `(X, Y, Z)`.
    pub fn extent(&self) -> (usize, usize, usize) {
        (self.layout.source.rows, self.layout.source.cols, self.channels)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Stored tile shape `(tile_h, tile_w, Z)`, overlay included.
    pub fn tile_dim(&self) -> (usize, usize, usize) {
        let shape = self.layout.tile_shape();
        (shape.rows, shape.cols, self.channels)
    }

    pub fn grid(&self) -> ArrayView5<'_, T> {
        self.data.view()
    }

    pub fn into_grid(self) -> Array5<T> {
        self.data
    }

    pub fn get_tile(&self, row: usize, col: usize) -> Result<ArrayView3<'_, T>> {
        self.layout.check_index(row, col)?;
        Ok(self.data.slice(s![row, col, .., .., ..]))
    }

    pub fn get_tile_mut(&mut self, row: usize, col: usize) -> Result<ArrayViewMut3<'_, T>> {
        self.layout.check_index(row, col)?;
        Ok(self.data.slice_mut(s![row, col, .., .., ..]))
    }

    /// Grid coordinates in the order used by [`TiledImage::list_tiles`].
    pub fn list_tile_indices(&self) -> Vec<(usize, usize)> {
        let (rows, cols) = (self.layout.count.rows, self.layout.count.cols);
        (0..rows)
            .flat_map(|i| (0..cols).map(move |j| (i, j)))
            .collect()
    }

    /// All tiles in row-major order.
    pub fn list_tiles(&self) -> Vec<ArrayView3<'_, T>> {
        self.list_tile_indices()
            .into_iter()
            .map(|(i, j)| self.data.slice(s![i, j, .., .., ..]))
            .collect()
    }

    /// All tiles in row-major order as 2D planes.
    ///
    /// Only the first channel is returned; other channels are silently
    /// dropped for multi-channel images.
    pub fn list_tiles_2d(&self) -> Vec<ArrayView2<'_, T>> {
        self.list_tile_indices()
            .into_iter()
            .map(|(i, j)| self.data.slice(s![i, j, .., .., 0]))
            .collect()
    }

    /// Map `f` over every tile; results follow [`TiledImage::list_tile_indices`].
    pub fn apply<U, F>(&self, f: F, execution: Execution) -> Result<Vec<U>>
    where
        T: Sync,
        U: Send,
        F: Fn(ArrayView3<'_, T>) -> U + Send + Sync,
    {
        ordered_map(self.list_tiles(), f, execution)
    }

    /// Like [`TiledImage::apply`] over the first channel of each tile.
    pub fn apply_2d<U, F>(&self, f: F, execution: Execution) -> Result<Vec<U>>
    where
        T: Sync,
        U: Send,
        F: Fn(ArrayView2<'_, T>) -> U + Send + Sync,
    {
        ordered_map(self.list_tiles_2d(), f, execution)
    }
}

/// Mirror-pad the source by offset and overlay, then place it on a zeroed
/// canvas covering the whole grid.
fn build_canvas<T: Clone + Zero>(source: ArrayView3<'_, T>, layout: &GridLayout) -> Array3<T> {
    let pad_rows = layout.offset.rows + layout.overlay;
    let pad_cols = layout.offset.cols + layout.overlay;
    let extended = mirror_pad(source, pad_rows, pad_cols);

    let canvas_extent = layout.canvas_extent();
    let mut canvas = Array3::zeros((canvas_extent.rows, canvas_extent.cols, source.dim().2));

    // Ragged grids leave zero slack; truncated grids drop the tail
    let rows = extended.dim().0.min(canvas_extent.rows);
    let cols = extended.dim().1.min(canvas_extent.cols);
    canvas
        .slice_mut(s![..rows, ..cols, ..])
        .assign(&extended.slice(s![..rows, ..cols, ..]));

    debug!(
        "Canvas {}x{} from {}x{} mirrored extent (pad {}x{})",
        canvas_extent.rows,
        canvas_extent.cols,
        extended.dim().0,
        extended.dim().1,
        pad_rows,
        pad_cols
    );
    canvas
}

/// Cut the canvas into the 5D tile grid at stride `(X_sub, Y_sub)`.
fn split<T: Clone + Zero>(canvas: &Array3<T>, layout: &GridLayout) -> Array5<T> {
    let shape = layout.tile_shape();
    let (canvas_h, canvas_w, channels) = canvas.dim();
    let mut data = Array5::zeros((
        layout.count.rows,
        layout.count.cols,
        shape.rows,
        shape.cols,
        channels,
    ));

    for i in 0..layout.count.rows {
        for j in 0..layout.count.cols {
            let r0 = i * layout.tile.rows;
            let c0 = j * layout.tile.cols;
            let r1 = (r0 + shape.rows).min(canvas_h);
            let c1 = (c0 + shape.cols).min(canvas_w);
            data.slice_mut(s![i, j, ..r1 - r0, ..c1 - c0, ..])
                .assign(&canvas.slice(s![r0..r1, c0..c1, ..]));
        }
    }
    data
}
