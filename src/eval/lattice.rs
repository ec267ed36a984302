//! Sample coordinates for grid sweeps.

use crate::database::Route;
use crate::util::{HomingError, HomingResult};

/// Inclusive rectangular sweep area in map units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min: (i32, i32),
    pub max: (i32, i32),
}

impl Bounds {
    /// Creates bounds; each `min` coordinate must not exceed its `max`.
    pub fn new(min: (i32, i32), max: (i32, i32)) -> HomingResult<Self> {
        if min.0 > max.0 || min.1 > max.1 {
            return Err(HomingError::config(format!(
                "bounds min ({}, {}) exceeds max ({}, {})",
                min.0, min.1, max.0, max.1
            )));
        }
        Ok(Self { min, max })
    }

    /// Route extent with the minimum floored and the maximum ceiled to
    /// multiples of 10.
    pub fn around_route(route: &Route) -> HomingResult<Self> {
        let mut views = route.iter();
        let first = views.next().ok_or(HomingError::EmptyDatabase {
            context: "route bounds",
        })?;
        let (mut min, mut max) = ((first.x, first.y), (first.x, first.y));
        for view in views {
            min = (min.0.min(view.x), min.1.min(view.y));
            max = (max.0.max(view.x), max.1.max(view.y));
        }
        Ok(Self {
            min: (floor10(min.0), floor10(min.1)),
            max: (ceil10(max.0), ceil10(max.1)),
        })
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.min.0..=self.max.0).contains(&x) && (self.min.1..=self.max.1).contains(&y)
    }
}

fn floor10(v: i32) -> i32 {
    v.div_euclid(10) * 10
}

fn ceil10(v: i32) -> i32 {
    -(-v).div_euclid(10) * 10
}

/// Row-major list of `(x, y)` sample coordinates.
///
/// Coordinates start at the lower bound and advance by `spacing` while they
/// stay within the upper bound. With a corridor, each row keeps only the
/// samples within `corridor` of the x position of the route view nearest to
/// that row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lattice {
    points: Vec<(i32, i32)>,
}

impl Lattice {
    pub fn new(
        bounds: &Bounds,
        spacing: i32,
        corridor: Option<i32>,
        route: &Route,
    ) -> HomingResult<Self> {
        if spacing <= 0 {
            return Err(HomingError::config(format!(
                "lattice spacing must be > 0, got {spacing}"
            )));
        }
        if let Some(c) = corridor {
            if c < 0 {
                return Err(HomingError::config(format!(
                    "corridor half-width must be >= 0, got {c}"
                )));
            }
        }
        let step = spacing as usize;
        let mut points = Vec::new();
        for y in (bounds.min.1..=bounds.max.1).step_by(step) {
            let window = match corridor {
                Some(c) => {
                    let idx = route.nearest_by_y(y)?;
                    let (rx, _) = route.position_at(idx)?;
                    Some((rx - c, rx + c))
                }
                None => None,
            };
            for x in (bounds.min.0..=bounds.max.0).step_by(step) {
                if window.map_or(true, |(lo, hi)| (lo..=hi).contains(&x)) {
                    points.push((x, y));
                }
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[(i32, i32)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoredView;
    use crate::heading::HeadingDomain;

    fn route(points: &[(i32, i32)]) -> Route {
        let views = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| StoredView {
                filename: format!("r{i}.png"),
                x,
                y,
                heading: 0,
                grid_index: None,
            })
            .collect();
        Route::new(HeadingDomain::full(90).unwrap(), views)
    }

    #[test]
    fn around_route_rounds_outward_to_tens() {
        let bounds = Bounds::around_route(&route(&[(13, -7), (41, 22)])).unwrap();
        assert_eq!(bounds.min, (10, -10));
        assert_eq!(bounds.max, (50, 30));
        assert!(Bounds::around_route(&route(&[])).is_err());
    }

    #[test]
    fn lattice_is_inclusive_and_row_major() {
        let bounds = Bounds::new((0, 0), (10, 10)).unwrap();
        let lattice = Lattice::new(&bounds, 10, None, &route(&[])).unwrap();
        assert_eq!(lattice.points(), &[(0, 0), (10, 0), (0, 10), (10, 10)]);
    }

    #[test]
    fn corridor_keeps_samples_near_the_route() {
        let bounds = Bounds::new((0, 0), (40, 10)).unwrap();
        let lattice = Lattice::new(&bounds, 10, Some(10), &route(&[(0, 0), (30, 10)])).unwrap();
        assert_eq!(
            lattice.points(),
            &[(0, 0), (10, 0), (20, 10), (30, 10), (40, 10)]
        );
    }

    #[test]
    fn rejects_bad_parameters() {
        let bounds = Bounds::new((0, 0), (10, 10)).unwrap();
        assert!(Lattice::new(&bounds, 0, None, &route(&[])).is_err());
        assert!(Lattice::new(&bounds, 10, Some(-1), &route(&[])).is_err());
        assert!(Bounds::new((5, 0), (0, 0)).is_err());
        assert!(matches!(
            Lattice::new(&bounds, 10, Some(5), &route(&[])),
            Err(HomingError::EmptyDatabase { .. })
        ));
    }
}
