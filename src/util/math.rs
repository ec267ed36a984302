//! Integer heading arithmetic.

/// Wraps a heading in degrees into `[0, vis_deg)`.
pub(crate) fn wrap_heading(heading: i32, vis_deg: i32) -> i32 {
    heading.rem_euclid(vis_deg)
}

/// Circular distance between two headings in a field of view of `vis_deg`.
pub fn angular_error(a: i32, b: i32, vis_deg: i32) -> i32 {
    let diff = (a - b).rem_euclid(vis_deg);
    diff.min(vis_deg - diff)
}

/// Rounds `value` to the nearest multiple of `step` (half away from zero).
pub(crate) fn quantize(value: f64, step: i32) -> i32 {
    let step = f64::from(step);
    ((value / step).round() * step) as i32
}
