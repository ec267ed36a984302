//! Pixel mismatch kernels.
//!
//! A kernel sums squared differences between two equally long byte slices.
//! `rolled_mse` builds the Perfect Memory mismatch on top of it: the query is
//! rotated by a column shift without materializing a rotated copy, by splitting
//! each row into the two contiguous segments the cyclic shift produces.

use crate::util::HomingResult;
use crate::view::PanoramicView;

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

/// Sum of squared differences over byte slices.
pub trait DiffKernel {
    /// Returns `sum((a[i] - b[i])^2)` over the common length of the slices.
    fn sum_sq_diff(a: &[u8], b: &[u8]) -> f32;
}

#[cfg(not(feature = "simd"))]
pub(crate) use scalar::ScalarKernel as ActiveKernel;
#[cfg(feature = "simd")]
pub(crate) use simd::SimdKernel as ActiveKernel;

/// Mean squared difference between `query` rotated right by `shift` columns
/// and `stored`.
///
/// Output column `x` of the rotated query is query column `(x - shift) mod w`,
/// matching [`crate::view::rotate`].
pub fn rolled_mse<K: DiffKernel>(
    query: &PanoramicView,
    stored: &PanoramicView,
    shift: usize,
) -> HomingResult<f32> {
    query.ensure_same_shape(stored)?;
    let width = query.width();
    let shift = shift % width;
    let split = width - shift;

    let mut total = 0.0f64;
    for (q_row, s_row) in query.rows().zip(stored.rows()) {
        let head = K::sum_sq_diff(&q_row[split..], &s_row[..shift]);
        let tail = K::sum_sq_diff(&q_row[..split], &s_row[shift..]);
        total += f64::from(head) + f64::from(tail);
    }
    Ok((total / query.len() as f64) as f32)
}
