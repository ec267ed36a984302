#![cfg(feature = "simd")]

use homing::kernel::scalar::ScalarKernel;
use homing::kernel::simd::SimdKernel;
use homing::kernel::{rolled_mse, DiffKernel};
use homing::PanoramicView;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn simd_kernel_matches_scalar_on_odd_lengths() {
    let mut rng = StdRng::seed_from_u64(17);
    for len in [0usize, 1, 7, 8, 9, 63, 90, 1530] {
        let a: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        let b: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        let scalar = ScalarKernel::sum_sq_diff(&a, &b);
        let simd = SimdKernel::sum_sq_diff(&a, &b);
        assert!((scalar - simd).abs() <= scalar * 1e-6 + 1e-3, "len {len}");
    }
}

#[test]
fn rolled_mse_agrees_across_kernels() {
    let mut rng = StdRng::seed_from_u64(23);
    let make = |rng: &mut StdRng| {
        let data = (0..90 * 17).map(|_| rng.random::<u8>()).collect();
        PanoramicView::new(data, 90, 17).unwrap()
    };
    let query = make(&mut rng);
    let stored = make(&mut rng);
    for shift in [0, 1, 13, 45, 89] {
        let scalar = rolled_mse::<ScalarKernel>(&query, &stored, shift).unwrap();
        let simd = rolled_mse::<SimdKernel>(&query, &stored, shift).unwrap();
        assert!((scalar - simd).abs() < 1e-2, "shift {shift}");
    }
}
