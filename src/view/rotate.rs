//! Circular rotation of panoramas and pixelwise differences.

use crate::util::HomingResult;
use crate::view::PanoramicView;

/// Number of columns a rotation by `offset_deg` shifts a panorama of `width`
/// columns covering `vis_deg` degrees, reduced into `[0, width)`.
///
/// The shift is `round(width * offset_deg / vis_deg)`; positive offsets move
/// content towards higher column indices.
pub fn column_shift(width: usize, offset_deg: i32, vis_deg: i32) -> usize {
    if width == 0 || vis_deg == 0 {
        return 0;
    }
    let raw = (width as f64 * f64::from(offset_deg) / f64::from(vis_deg)).round() as i64;
    raw.rem_euclid(width as i64) as usize
}

/// Rotates a panorama horizontally by `offset_deg`, wrapping columns around.
///
/// Output column `x` holds input column `(x - shift) mod width`, so every row
/// of the output is a cyclic permutation of the same input row.
pub fn rotate(view: &PanoramicView, offset_deg: i32, vis_deg: i32) -> PanoramicView {
    let width = view.width();
    let shift = column_shift(width, offset_deg, vis_deg);
    if shift == 0 {
        return view.clone();
    }
    let mut data = Vec::with_capacity(view.len());
    for row in view.rows() {
        data.extend_from_slice(&row[width - shift..]);
        data.extend_from_slice(&row[..width - shift]);
    }
    PanoramicView {
        data,
        width,
        height: view.height(),
    }
}

/// Elementwise squared difference of two equally shaped views.
#[derive(Clone, Debug, PartialEq)]
pub struct DifferenceImage {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl DifferenceImage {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major squared differences.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Sum of squared differences divided by the pixel count.
    pub fn mean(&self) -> f32 {
        let sum: f64 = self.data.iter().map(|&v| f64::from(v)).sum();
        (sum / self.data.len() as f64) as f32
    }
}

/// Computes `(a - b)^2` per pixel.
pub fn image_difference(a: &PanoramicView, b: &PanoramicView) -> HomingResult<DifferenceImage> {
    a.ensure_same_shape(b)?;
    let data = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&p, &q)| {
            let d = f32::from(p) - f32::from(q);
            d * d
        })
        .collect();
    Ok(DifferenceImage {
        data,
        width: a.width(),
        height: a.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::HomingError;

    fn ramp(width: usize, height: usize) -> PanoramicView {
        let data = (0..width * height).map(|i| (i * 7 % 251) as u8).collect();
        PanoramicView::new(data, width, height).unwrap()
    }

    #[test]
    fn column_shift_rounds_and_wraps() {
        assert_eq!(column_shift(90, 4, 360), 1);
        assert_eq!(column_shift(90, 2, 360), 1);
        assert_eq!(column_shift(90, 360, 360), 0);
        assert_eq!(column_shift(90, -4, 360), 89);
        assert_eq!(column_shift(4, 90, 360), 1);
    }

    #[test]
    fn rotate_moves_columns_right() {
        let view = PanoramicView::new(vec![1, 2, 3, 4, 5, 6, 7, 8], 4, 2).unwrap();
        let rotated = rotate(&view, 90, 360);
        assert_eq!(rotated.data(), &[4, 1, 2, 3, 8, 5, 6, 7]);
    }

    #[test]
    fn rotate_full_turn_is_identity() {
        let view = ramp(90, 17);
        assert_eq!(rotate(&view, 0, 360), view);
        assert_eq!(rotate(&view, 360, 360), view);
    }

    #[test]
    fn rotate_preserves_row_multisets() {
        let view = ramp(12, 3);
        let rotated = rotate(&view, 150, 360);
        for (a, b) in view.rows().zip(rotated.rows()) {
            let mut a = a.to_vec();
            let mut b = b.to_vec();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn image_difference_squares_and_checks_shape() {
        let a = PanoramicView::new(vec![10, 20], 2, 1).unwrap();
        let b = PanoramicView::new(vec![13, 16], 2, 1).unwrap();
        let diff = image_difference(&a, &b).unwrap();
        assert_eq!(diff.data(), &[9.0, 16.0]);
        assert!((diff.mean() - 12.5).abs() < 1e-6);

        let c = PanoramicView::new(vec![0; 2], 1, 2).unwrap();
        assert_eq!(
            image_difference(&a, &c).err(),
            Some(HomingError::ShapeMismatch {
                expected: (2, 1),
                got: (1, 2),
            })
        );
    }
}
