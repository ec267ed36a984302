//! Route and grid view databases.
//!
//! A database is a read-only collection of `StoredView` records. A `Route`
//! keeps traversal order; a `Grid` is keyed by map-unit position. Images are
//! referenced by filename and fetched through an [`ImageStore`].

mod records;
mod store;

pub use records::{load_grid, load_grid_from_reader, load_route, load_route_from_reader};
pub use store::{ImageStore, MemoryImageStore};

#[cfg(feature = "image-io")]
pub use store::DirImageStore;

use crate::heading::HeadingDomain;
use crate::util::{HomingError, HomingResult, Missing};
use crate::view::{preprocess, PanoramicView, ViewConfig};
use std::collections::BTreeMap;

/// One recorded snapshot: image reference, position and heading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredView {
    /// Image filename relative to the database's image store.
    pub filename: String,
    /// Position in map units (millimetres / 10).
    pub x: i32,
    pub y: i32,
    /// Heading quantized to the domain step, in `[0, vis_deg)`.
    pub heading: i32,
    /// `(Grid X, Grid Y)` indices when the database provides them.
    pub grid_index: Option<(i32, i32)>,
}

impl StoredView {
    /// Fetches and preprocesses this view's image.
    pub fn load<S: ImageStore + ?Sized>(
        &self,
        store: &S,
        cfg: &ViewConfig,
    ) -> HomingResult<PanoramicView> {
        let raw = store.load(&self.filename)?;
        preprocess(&raw, cfg)
    }
}

/// Ordered sequence of views along a travelled path.
#[derive(Clone, Debug)]
pub struct Route {
    domain: HeadingDomain,
    views: Vec<StoredView>,
}

impl Route {
    /// Creates a route; headings are wrapped into the domain.
    pub fn new(domain: HeadingDomain, mut views: Vec<StoredView>) -> Self {
        for view in &mut views {
            view.heading = domain.wrap(view.heading);
        }
        Self { domain, views }
    }

    pub fn domain(&self) -> &HeadingDomain {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Views in traversal order.
    pub fn views(&self) -> &[StoredView] {
        &self.views
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredView> + '_ {
        self.views.iter()
    }

    /// Returns the view at `index`.
    pub fn view(&self, index: usize) -> HomingResult<&StoredView> {
        self.views
            .get(index)
            .ok_or(HomingError::NotFound(Missing::RouteIndex {
                index,
                len: self.views.len(),
            }))
    }

    /// Stored heading at `index`.
    pub fn heading_at(&self, index: usize) -> HomingResult<i32> {
        self.view(index).map(|v| v.heading)
    }

    /// Position `(x, y)` at `index`.
    pub fn position_at(&self, index: usize) -> HomingResult<(i32, i32)> {
        self.view(index).map(|v| (v.x, v.y))
    }

    /// Index of the view closest to `(x, y)`; ties go to the lowest index.
    pub fn nearest(&self, x: i32, y: i32) -> HomingResult<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (idx, view) in self.views.iter().enumerate() {
            let dx = i64::from(view.x) - i64::from(x);
            let dy = i64::from(view.y) - i64::from(y);
            let dist = dx * dx + dy * dy;
            match best {
                Some((_, b)) if dist >= b => {}
                _ => best = Some((idx, dist)),
            }
        }
        best.map(|(idx, _)| idx).ok_or(HomingError::EmptyDatabase {
            context: "nearest route view",
        })
    }

    /// Index of the view whose `y` is closest to `y`; ties go to the lowest index.
    pub fn nearest_by_y(&self, y: i32) -> HomingResult<usize> {
        self.views
            .iter()
            .enumerate()
            .min_by_key(|(idx, view)| ((i64::from(view.y) - i64::from(y)).abs(), *idx))
            .map(|(idx, _)| idx)
            .ok_or(HomingError::EmptyDatabase {
                context: "nearest route row",
            })
    }

    /// Loads and preprocesses every route image in traversal order.
    pub fn load_views<S: ImageStore + Sync + ?Sized>(
        &self,
        store: &S,
        cfg: &ViewConfig,
    ) -> HomingResult<Vec<PanoramicView>> {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            self.views
                .par_iter()
                .map(|view| view.load(store, cfg))
                .collect()
        }
        #[cfg(not(feature = "rayon"))]
        {
            self.views.iter().map(|view| view.load(store, cfg)).collect()
        }
    }
}

/// Spatial collection of views keyed by map-unit position.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    views: Vec<StoredView>,
    by_position: BTreeMap<(i32, i32), usize>,
    by_index: BTreeMap<(i32, i32), usize>,
}

impl Grid {
    /// Builds a grid; positions (and grid indices, when present) must be unique.
    pub fn new(views: Vec<StoredView>) -> HomingResult<Self> {
        let mut by_position = BTreeMap::new();
        let mut by_index = BTreeMap::new();
        for (idx, view) in views.iter().enumerate() {
            if by_position.insert((view.x, view.y), idx).is_some() {
                return Err(duplicate(view, format!("position ({}, {})", view.x, view.y)));
            }
            if let Some(key) = view.grid_index {
                if by_index.insert(key, idx).is_some() {
                    return Err(duplicate(view, format!("grid index ({}, {})", key.0, key.1)));
                }
            }
        }
        Ok(Self {
            views,
            by_position,
            by_index,
        })
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Views in load order.
    pub fn views(&self) -> &[StoredView] {
        &self.views
    }

    /// View recorded at map position `(x, y)`.
    pub fn view_at(&self, x: i32, y: i32) -> HomingResult<&StoredView> {
        self.by_position
            .get(&(x, y))
            .map(|&idx| &self.views[idx])
            .ok_or(HomingError::NotFound(Missing::GridCoordinate { x, y }))
    }

    /// View recorded at `(Grid X, Grid Y)`.
    pub fn view_at_index(&self, grid_x: i32, grid_y: i32) -> HomingResult<&StoredView> {
        self.by_index
            .get(&(grid_x, grid_y))
            .map(|&idx| &self.views[idx])
            .ok_or(HomingError::NotFound(Missing::GridIndex { grid_x, grid_y }))
    }

    /// Whether a view exists at `(x, y)`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.by_position.contains_key(&(x, y))
    }
}

fn duplicate(view: &StoredView, what: String) -> HomingError {
    HomingError::Data {
        source_name: view.filename.clone(),
        line: None,
        reason: format!("duplicate grid {what}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(filename: &str, x: i32, y: i32, heading: i32) -> StoredView {
        StoredView {
            filename: filename.to_owned(),
            x,
            y,
            heading,
            grid_index: None,
        }
    }

    #[test]
    fn nearest_prefers_lowest_index_on_ties() {
        let route = Route::new(
            HeadingDomain::full(90).unwrap(),
            vec![sv("a", 0, 0, 0), sv("b", 10, 0, 90), sv("c", 20, 0, 180)],
        );
        assert_eq!(route.nearest(5, 0).unwrap(), 0);
        assert_eq!(route.nearest(15, 3).unwrap(), 1);
        assert_eq!(route.nearest(19, 0).unwrap(), 2);
    }

    #[test]
    fn accessors_report_missing_indices() {
        let route = Route::new(HeadingDomain::full(90).unwrap(), vec![sv("a", 1, 2, 450)]);
        assert_eq!(route.heading_at(0).unwrap(), 90);
        assert_eq!(route.position_at(0).unwrap(), (1, 2));
        assert_eq!(
            route.heading_at(3).unwrap_err(),
            HomingError::NotFound(Missing::RouteIndex { index: 3, len: 1 })
        );
    }

    #[test]
    fn empty_route_has_no_nearest() {
        let route = Route::new(HeadingDomain::full(90).unwrap(), Vec::new());
        assert!(matches!(
            route.nearest(0, 0),
            Err(HomingError::EmptyDatabase { .. })
        ));
    }

    #[test]
    fn grid_lookup_and_duplicates() {
        let grid = Grid::new(vec![sv("g0", 0, 0, 0), sv("g1", 10, 0, 0)]).unwrap();
        assert_eq!(grid.view_at(10, 0).unwrap().filename, "g1");
        assert_eq!(
            grid.view_at(10, 10).unwrap_err(),
            HomingError::NotFound(Missing::GridCoordinate { x: 10, y: 10 })
        );
        assert!(Grid::new(vec![sv("g0", 0, 0, 0), sv("g1", 0, 0, 0)]).is_err());
    }
}
