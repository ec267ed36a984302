//! Heading-indexed score profiles.

use crate::heading::HeadingDomain;

/// Scalar scores keyed by heading, kept sorted by ascending heading.
///
/// Keys are distinct and lie in `[0, vis_deg)`. The order makes every
/// arg-min/arg-max deterministic: ties resolve to the lowest heading.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadingProfile {
    headings: Vec<i32>,
    values: Vec<f32>,
}

/// Rotational image difference function: mismatch per heading, lower is better.
pub type Ridf = HeadingProfile;

/// Rotational familiarity function: familiarity per heading, higher is better.
pub type Rff = HeadingProfile;

impl HeadingProfile {
    /// Builds a profile from one value per rotation offset.
    ///
    /// `values[k]` is the score after rotating by `k * rot_deg`; it is stored
    /// under heading `(k * rot_deg + query_heading) mod vis_deg`.
    pub(crate) fn from_offsets(
        domain: &HeadingDomain,
        query_heading: i32,
        values: Vec<f32>,
    ) -> Self {
        debug_assert_eq!(values.len(), domain.len());
        let mut pairs: Vec<(i32, f32)> = domain
            .offsets()
            .zip(values)
            .map(|(offset, value)| (domain.wrap(offset + query_heading), value))
            .collect();
        pairs.sort_by_key(|&(heading, _)| heading);
        let (headings, values) = pairs.into_iter().unzip();
        Self { headings, values }
    }

    /// Builds a profile from explicit `(heading, value)` pairs.
    ///
    /// Pairs are sorted by heading; when a heading repeats, the last value wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i32, f32)>,
    {
        let mut pairs: Vec<(i32, f32)> = pairs.into_iter().collect();
        pairs.sort_by_key(|&(heading, _)| heading);
        let mut headings: Vec<i32> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f32> = Vec::with_capacity(pairs.len());
        for (heading, value) in pairs {
            if headings.last() == Some(&heading) {
                if let Some(last) = values.last_mut() {
                    *last = value;
                }
                continue;
            }
            headings.push(heading);
            values.push(value);
        }
        Self { headings, values }
    }

    /// Number of headings in the profile.
    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    /// Headings in ascending order.
    pub fn headings(&self) -> &[i32] {
        &self.headings
    }

    /// Values aligned with `headings()`.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Iterates `(heading, value)` pairs by ascending heading.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f32)> + '_ {
        self.headings.iter().copied().zip(self.values.iter().copied())
    }

    /// Returns the value stored under `heading`.
    pub fn get(&self, heading: i32) -> Option<f32> {
        self.headings
            .binary_search(&heading)
            .ok()
            .map(|idx| self.values[idx])
    }

    /// Lowest value and its heading; ties go to the lowest heading.
    pub fn min(&self) -> Option<(i32, f32)> {
        let mut best: Option<(i32, f32)> = None;
        for (heading, value) in self.iter() {
            match best {
                Some((_, b)) if value >= b => {}
                _ => best = Some((heading, value)),
            }
        }
        best
    }

    /// Highest value and its heading; ties go to the lowest heading.
    pub fn max(&self) -> Option<(i32, f32)> {
        let mut best: Option<(i32, f32)> = None;
        for (heading, value) in self.iter() {
            match best {
                Some((_, b)) if value <= b => {}
                _ => best = Some((heading, value)),
            }
        }
        best
    }

    /// Arithmetic mean of the values.
    pub fn mean(&self) -> Option<f32> {
        if self.values.is_empty() {
            return None;
        }
        let sum: f64 = self.values.iter().map(|&v| f64::from(v)).sum();
        Some((sum / self.values.len() as f64) as f32)
    }

    /// Flips the sign of every value, turning mismatch into familiarity.
    pub fn negated(&self) -> Self {
        Self {
            headings: self.headings.clone(),
            values: self.values.iter().map(|v| -v).collect(),
        }
    }
}
