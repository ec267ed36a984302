//! Scalar reference kernel.

use crate::kernel::DiffKernel;

/// Integer-accumulating scalar kernel.
pub struct ScalarKernel;

impl DiffKernel for ScalarKernel {
    fn sum_sq_diff(a: &[u8], b: &[u8]) -> f32 {
        let sum: u64 = a
            .iter()
            .zip(b)
            .map(|(&p, &q)| {
                let d = i32::from(p) - i32::from(q);
                (d * d) as u64
            })
            .sum();
        sum as f32
    }
}
