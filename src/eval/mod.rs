//! Policy evaluation over a spatial grid and along the route.
//!
//! A grid sweep samples query positions on a [`Lattice`], matches the grid
//! view recorded at each position against the route memory and emits one
//! [`GridEvaluationRecord`] per sample. Samples are independent; with the
//! `rayon` feature and `SweepConfig::parallel` they run on the rayon pool.
//! Any failure aborts the sweep and no records are returned. The reported
//! error is the one at the lowest `(y, x)` sample, whether or not the sweep ran
//! in parallel.

mod lattice;
mod metrics;
mod route;

pub use lattice::{Bounds, Lattice};
pub use metrics::{
    ground_truth_heading, mean_absolute_error, mean_angular_error, percent_correct,
    HeadingSample,
};
pub use route::{evaluate_route, RouteEvaluationRecord};

use crate::database::{Grid, ImageStore, Route};
use crate::matching::FamiliarityModel;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{HomingError, HomingResult};
use crate::view::ViewConfig;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Decided heading at one grid sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridEvaluationRecord {
    #[serde(rename = "X_COOR")]
    pub x: i32,
    #[serde(rename = "Y_COOR")]
    pub y: i32,
    #[serde(rename = "HEADING")]
    pub heading: i32,
}

impl HeadingSample for GridEvaluationRecord {
    fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn heading(&self) -> i32 {
        self.heading
    }
}

/// Grid sweep parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepConfig {
    /// Lattice step in map units.
    pub spacing: i32,
    /// Sweep area; `None` uses [`Bounds::around_route`].
    pub bounds: Option<Bounds>,
    /// Half-width of the sampling band around the route, in map units.
    pub corridor: Option<i32>,
    /// Run samples on the rayon pool when the `rayon` feature is enabled.
    pub parallel: bool,
    pub view: ViewConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            spacing: 10,
            bounds: None,
            corridor: None,
            parallel: true,
            view: ViewConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Builds the sample lattice for `route`.
    pub fn lattice(&self, route: &Route) -> HomingResult<Lattice> {
        let bounds = match self.bounds {
            Some(bounds) => bounds,
            None => Bounds::around_route(route)?,
        };
        Lattice::new(&bounds, self.spacing, self.corridor, route)
    }
}

/// Sweeps the grid and returns records sorted row-major by `(y, x)`.
pub fn evaluate_grid<M, S>(
    model: &M,
    store: &S,
    grid: &Grid,
    route: &Route,
    cfg: &SweepConfig,
) -> HomingResult<Vec<GridEvaluationRecord>>
where
    M: FamiliarityModel + Sync + ?Sized,
    S: ImageStore + Sync + ?Sized,
{
    evaluate_grid_cancellable(model, store, grid, route, cfg, &AtomicBool::new(false))
}

/// Like [`evaluate_grid`], but checks `cancel` before every sample.
///
/// Once the flag is observed set, the sweep fails with
/// [`HomingError::Cancelled`] and all finished samples are discarded.
pub fn evaluate_grid_cancellable<M, S>(
    model: &M,
    store: &S,
    grid: &Grid,
    route: &Route,
    cfg: &SweepConfig,
    cancel: &AtomicBool,
) -> HomingResult<Vec<GridEvaluationRecord>>
where
    M: FamiliarityModel + Sync + ?Sized,
    S: ImageStore + Sync + ?Sized,
{
    let lattice = cfg.lattice(route)?;
    let _span = trace_span!("grid_sweep", samples = lattice.len()).entered();

    let sample = |&(x, y): &(i32, i32)| -> HomingResult<GridEvaluationRecord> {
        if cancel.load(Ordering::Relaxed) {
            return Err(HomingError::Cancelled);
        }
        let query = grid.view_at(x, y)?.load(store, &cfg.view)?;
        let result = model.match_view(&query, 0)?;
        trace_debug!(
            "grid_sample",
            x = x,
            y = y,
            heading = result.heading,
            matched_index = result.matched_index
        );
        Ok(GridEvaluationRecord {
            x,
            y,
            heading: result.heading,
        })
    };

    // Lattice points are in (y, x) order, so the first error is the lowest one.
    #[cfg(feature = "rayon")]
    let records: HomingResult<Vec<GridEvaluationRecord>> = if cfg.parallel {
        use rayon::prelude::*;
        let samples: Vec<HomingResult<GridEvaluationRecord>> =
            lattice.points().par_iter().map(sample).collect();
        samples.into_iter().collect()
    } else {
        lattice.points().iter().map(sample).collect()
    };
    #[cfg(not(feature = "rayon"))]
    let records: HomingResult<Vec<GridEvaluationRecord>> =
        lattice.points().iter().map(sample).collect();

    let mut records = records?;
    records.sort_by_key(|r| (r.y, r.x));
    trace_event!("grid_sweep_done", records = records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryImageStore, StoredView};
    use crate::heading::HeadingDomain;
    use crate::matching::PerfectMemory;
    use crate::util::Missing;
    use crate::view::{PanoramicView, RawImage};

    fn stored(name: &str, x: i32, y: i32) -> StoredView {
        StoredView {
            filename: name.to_owned(),
            x,
            y,
            heading: 0,
            grid_index: None,
        }
    }

    fn stripe_raw(lit: usize) -> RawImage {
        let data = (0..8).map(|i| if i % 4 == lit { 200 } else { 10 }).collect();
        RawImage::gray(data, 4, 2).unwrap()
    }

    fn setup(grid_points: &[(i32, i32)]) -> (PerfectMemory, MemoryImageStore, Grid, Route) {
        let mut store = MemoryImageStore::new();
        store.insert("route.png", stripe_raw(0));
        let mut views = Vec::new();
        for (i, &(x, y)) in grid_points.iter().enumerate() {
            let name = format!("g{i}.png");
            store.insert(name.clone(), stripe_raw(i % 4));
            views.push(stored(&name, x, y));
        }
        let domain = HeadingDomain::full(90).unwrap();
        let route = Route::new(domain, vec![stored("route.png", 0, 0)]);
        let memory = vec![PanoramicView::new(stripe_raw(0).data().to_vec(), 4, 2).unwrap()];
        let pm = PerfectMemory::new(domain, memory).unwrap();
        (pm, store, Grid::new(views).unwrap(), route)
    }

    fn cfg() -> SweepConfig {
        SweepConfig {
            spacing: 10,
            bounds: Some(Bounds::new((0, 0), (10, 10)).unwrap()),
            corridor: None,
            parallel: false,
            view: ViewConfig {
                width: 4,
                height: 2,
            },
        }
    }

    #[test]
    fn sweep_emits_sorted_records() {
        let (pm, store, grid, route) = setup(&[(10, 10), (0, 0), (10, 0), (0, 10)]);
        let records = evaluate_grid(&pm, &store, &grid, &route, &cfg()).unwrap();
        let coords: Vec<_> = records.iter().map(|r| (r.x, r.y)).collect();
        assert_eq!(coords, vec![(0, 0), (10, 0), (0, 10), (10, 10)]);
        // Bright column L needs a shift of 4 - L to line up with the route view.
        let headings: Vec<_> = records.iter().map(|r| r.heading).collect();
        assert_eq!(headings, vec![270, 180, 90, 0]);
    }

    #[test]
    fn missing_grid_view_fails_the_sweep() {
        let (pm, store, grid, route) = setup(&[(0, 0), (10, 0), (0, 10)]);
        let err = evaluate_grid(&pm, &store, &grid, &route, &cfg()).unwrap_err();
        assert_eq!(
            err,
            HomingError::NotFound(Missing::GridCoordinate { x: 10, y: 10 })
        );
    }

    #[test]
    fn cancelled_sweep_returns_no_records() {
        let (pm, store, grid, route) = setup(&[(10, 10), (0, 0), (10, 0), (0, 10)]);
        let cancel = AtomicBool::new(true);
        let err =
            evaluate_grid_cancellable(&pm, &store, &grid, &route, &cfg(), &cancel).unwrap_err();
        assert_eq!(err, HomingError::Cancelled);
    }
}
