//! Heading decision and confidence from a familiarity profile.

use crate::heading::Rff;
use crate::util::{HomingError, HomingResult};

/// Heading with the highest familiarity; ties go to the lowest heading.
pub fn most_familiar_heading(rff: &Rff) -> HomingResult<i32> {
    rff.max()
        .map(|(heading, _)| heading)
        .ok_or(HomingError::EmptyDatabase {
            context: "familiarity profile",
        })
}

/// Ratio of the peak familiarity to the average familiarity.
///
/// A strictly positive profile gives `max / mean`. Any other profile is first
/// shifted so its minimum sits at zero, giving `(max - min) / (mean - min)`;
/// this covers negated mismatches, log probabilities and raw logits alike. A
/// constant profile has strength 1. The result is finite and never below 1.
pub fn signal_strength(rff: &Rff) -> HomingResult<f32> {
    let values = rff.values();
    if values.is_empty() {
        return Err(HomingError::EmptyDatabase {
            context: "familiarity profile",
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(HomingError::DegenerateProfile {
            reason: "non-finite familiarity",
        });
    }

    let (mut min, mut max, mut sum) = (f64::INFINITY, f64::NEG_INFINITY, 0.0f64);
    for &v in values {
        let v = f64::from(v);
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    let mean = sum / values.len() as f64;
    if max == min {
        return Ok(1.0);
    }

    let ratio = if min > 0.0 {
        max / mean
    } else {
        (max - min) / (mean - min)
    };
    let ratio = ratio.max(1.0) as f32;
    if !ratio.is_finite() {
        return Err(HomingError::DegenerateProfile {
            reason: "familiarity ratio overflows",
        });
    }
    Ok(ratio)
}
