//! Heading accuracy against the route's recorded headings.

use crate::database::Route;
use crate::util::{angular_error, HomingError, HomingResult};

/// A decided heading at a map position.
pub trait HeadingSample {
    fn position(&self) -> (i32, i32);
    fn heading(&self) -> i32;
}

/// Heading recorded at the route view nearest to `(x, y)`.
pub fn ground_truth_heading(route: &Route, x: i32, y: i32) -> HomingResult<i32> {
    route.heading_at(route.nearest(x, y)?)
}

fn errors<'a, R, F>(
    records: &'a [R],
    route: &'a Route,
    err: F,
) -> impl Iterator<Item = HomingResult<i32>> + 'a
where
    R: HeadingSample,
    F: Fn(i32, i32) -> i32 + 'a,
{
    records.iter().map(move |record| {
        let (x, y) = record.position();
        let truth = ground_truth_heading(route, x, y)?;
        Ok(err(truth, record.heading()))
    })
}

fn mean_of<I: Iterator<Item = HomingResult<i32>>>(values: I) -> HomingResult<f64> {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for value in values {
        sum += f64::from(value?);
        count += 1;
    }
    if count == 0 {
        return Err(HomingError::EmptyDatabase {
            context: "evaluation records",
        });
    }
    Ok(sum / count as f64)
}

/// Mean of `|truth - heading|` in degrees, without wrap-around.
pub fn mean_absolute_error<R: HeadingSample>(records: &[R], route: &Route) -> HomingResult<f64> {
    mean_of(errors(records, route, |truth, heading| (truth - heading).abs()))
}

/// Mean circular distance between decided and true headings.
pub fn mean_angular_error<R: HeadingSample>(records: &[R], route: &Route) -> HomingResult<f64> {
    let vis_deg = route.domain().vis_deg();
    mean_of(errors(records, route, move |truth, heading| {
        angular_error(truth, heading, vis_deg)
    }))
}

/// Fraction of records within `threshold` degrees of ground truth, measured
/// around the heading circle.
pub fn percent_correct<R: HeadingSample>(
    records: &[R],
    route: &Route,
    threshold: i32,
) -> HomingResult<f64> {
    let vis_deg = route.domain().vis_deg();
    mean_of(errors(records, route, move |truth, heading| {
        i32::from(angular_error(truth, heading, vis_deg) <= threshold)
    }))
}
