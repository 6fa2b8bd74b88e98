use ndarray::{s, Array3, ArrayView3, Axis};
use num_traits::Zero;

/// Fold an index that may lie outside `[0, len)` back inside by symmetric
/// reflection: the edge pixel is repeated (`-1 → 0`, `len → len - 1`).
pub fn mirror_index(index: isize, len: usize) -> usize {
    debug_assert!(len > 0);
    let period = 2 * len as isize;
    let folded = index.rem_euclid(period) as usize;
    if folded < len {
        folded
    } else {
        2 * len - 1 - folded
    }
}

/// Extend `source` by `pad_rows` rows above and below and `pad_cols` columns
/// on each side, filling the border with mirrored content.
///
/// Rows are filled first (over the interior columns only), then columns over
/// the full height, so corner cells are reflections of already-filled border
/// rows along the column axis.
pub fn mirror_pad<T>(source: ArrayView3<'_, T>, pad_rows: usize, pad_cols: usize) -> Array3<T>
where
    T: Clone + Zero,
{
    let (rows, cols, channels) = source.dim();
    let mut out = Array3::zeros((rows + 2 * pad_rows, cols + 2 * pad_cols, channels));
    if rows == 0 || cols == 0 {
        return out;
    }

    out.slice_mut(s![pad_rows..pad_rows + rows, pad_cols..pad_cols + cols, ..])
        .assign(&source);

    let interior = pad_cols..pad_cols + cols;
    for k in 0..pad_rows {
        let above = mirror_index(-(k as isize) - 1, rows);
        let below = mirror_index((rows + k) as isize, rows);
        out.slice_mut(s![pad_rows - 1 - k, interior.clone(), ..])
            .assign(&source.index_axis(Axis(0), above));
        out.slice_mut(s![pad_rows + rows + k, interior.clone(), ..])
            .assign(&source.index_axis(Axis(0), below));
    }

    for k in 0..pad_cols {
        let left = pad_cols + mirror_index(-(k as isize) - 1, cols);
        let right = pad_cols + mirror_index((cols + k) as isize, cols);
        let (left_col, right_col) = (
            out.index_axis(Axis(1), left).to_owned(),
            out.index_axis(Axis(1), right).to_owned(),
        );
        out.index_axis_mut(Axis(1), pad_cols - 1 - k).assign(&left_col);
        out.index_axis_mut(Axis(1), pad_cols + cols + k).assign(&right_col);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    fn grid(rows: usize, cols: usize) -> Array3<i32> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as i32).insert_axis(Axis(2))
    }

    fn plane(a: &Array3<i32>) -> Array2<i32> {
        a.index_axis(Axis(2), 0).to_owned()
    }

    #[test]
    fn test_mirror_index() {
        assert_eq!(mirror_index(-1, 4), 0);
        assert_eq!(mirror_index(-2, 4), 1);
        assert_eq!(mirror_index(4, 4), 3);
        assert_eq!(mirror_index(5, 4), 2);
        assert_eq!(mirror_index(2, 4), 2);
        // wider than the image keeps folding
        assert_eq!(mirror_index(-5, 4), 3);
        assert_eq!(mirror_index(8, 4), 0);
        assert_eq!(mirror_index(-3, 1), 0);
    }

    #[test]
    fn test_no_padding_is_identity() {
        let src = grid(3, 2);
        assert_eq!(mirror_pad(src.view(), 0, 0), src);
    }

    #[test]
    fn test_one_pixel_every_edge_and_corner() {
        let padded = mirror_pad(grid(3, 3).view(), 1, 1);
        assert_eq!(
            plane(&padded),
            arr2(&[
                [0, 0, 1, 2, 2],
                [0, 0, 1, 2, 2],
                [3, 3, 4, 5, 5],
                [6, 6, 7, 8, 8],
                [6, 6, 7, 8, 8],
            ])
        );
    }

    #[test]
    fn test_multi_pixel_every_edge_and_corner() {
        let padded = mirror_pad(grid(3, 3).view(), 2, 2);
        assert_eq!(
            plane(&padded),
            arr2(&[
                [4, 3, 3, 4, 5, 5, 4],
                [1, 0, 0, 1, 2, 2, 1],
                [1, 0, 0, 1, 2, 2, 1],
                [4, 3, 3, 4, 5, 5, 4],
                [7, 6, 6, 7, 8, 8, 7],
                [7, 6, 6, 7, 8, 8, 7],
                [4, 3, 3, 4, 5, 5, 4],
            ])
        );
    }

    #[test]
    fn test_asymmetric_padding() {
        let padded = mirror_pad(grid(2, 3).view(), 0, 1);
        assert_eq!(plane(&padded), arr2(&[[0, 0, 1, 2, 2], [3, 3, 4, 5, 5]]));

        let padded = mirror_pad(grid(2, 3).view(), 1, 0);
        assert_eq!(plane(&padded), arr2(&[[0, 1, 2], [0, 1, 2], [3, 4, 5], [3, 4, 5]]));
    }

    #[test]
    fn test_padding_wider_than_image() {
        let padded = mirror_pad(grid(1, 2).view(), 0, 3);
        assert_eq!(plane(&padded), arr2(&[[1, 1, 0, 0, 1, 1, 0, 0]]));
    }

    #[test]
    fn test_channels_are_mirrored_together() {
        let src = Array3::from_shape_fn((2, 2, 2), |(r, c, z)| (r * 2 + c) as i32 * 10 + z as i32);
        let padded = mirror_pad(src.view(), 1, 1);
        assert_eq!(padded.dim(), (4, 4, 2));
        assert_eq!(padded[[0, 0, 0]], 0);
        assert_eq!(padded[[0, 0, 1]], 1);
        assert_eq!(padded[[3, 3, 1]], 31);
    }
}
