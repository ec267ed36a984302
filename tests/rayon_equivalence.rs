#![cfg(feature = "rayon")]

use homing::database::StoredView;
use homing::view::rotate;
use homing::{
    evaluate_grid, Bounds, Grid, HeadingDomain, HomingError, MemoryImageStore, Missing,
    PanoramicView, PerfectMemory, RawImage, Route, SweepConfig, ViewConfig,
};

const WIDTH: usize = 45;
const HEIGHT: usize = 6;

fn make_scene(seed: usize) -> PanoramicView {
    let data = (0..WIDTH * HEIGHT)
        .map(|i| {
            let (x, y) = (i % WIDTH, i / WIDTH);
            (((x * 11) ^ (y * 3) ^ (x * y) ^ (seed * 37)) & 0xFF) as u8
        })
        .collect();
    PanoramicView::new(data, WIDTH, HEIGHT).unwrap()
}

fn stored(filename: String, x: i32, y: i32, heading: i32) -> StoredView {
    StoredView {
        filename,
        x,
        y,
        heading,
        grid_index: None,
    }
}

struct Fixture {
    pm: PerfectMemory,
    store: MemoryImageStore,
    grid: Grid,
    route: Route,
    cfg: SweepConfig,
}

/// Six route views and a 6x5 grid; grid cells listed in `holes` have no entry.
fn fixture(holes: &[(usize, usize)]) -> Fixture {
    let domain = HeadingDomain::full(8).unwrap();
    let mut store = MemoryImageStore::new();

    let mut route_views = Vec::new();
    for i in 0..6 {
        let name = format!("route_{i}.png");
        let heading = 48 * i as i32;
        let view = rotate(&make_scene(i), heading, 360);
        store.insert(name.clone(), RawImage::gray(view.data().to_vec(), WIDTH, HEIGHT).unwrap());
        route_views.push(stored(name, 10 * i as i32, 0, heading));
    }
    let route = Route::new(domain, route_views);

    let mut grid_views = Vec::new();
    for gy in 0..5 {
        for gx in 0..6 {
            if holes.contains(&(gx, gy)) {
                continue;
            }
            let name = format!("grid_{gx}_{gy}.png");
            let scene = make_scene(gx + 7 * gy);
            store.insert(
                name.clone(),
                RawImage::gray(scene.data().to_vec(), WIDTH, HEIGHT).unwrap(),
            );
            grid_views.push(stored(name, 10 * gx as i32, 10 * gy as i32, 0));
        }
    }
    let grid = Grid::new(grid_views).unwrap();

    let view = ViewConfig {
        width: WIDTH,
        height: HEIGHT,
    };
    let pm = PerfectMemory::from_route(&route, &store, &view).unwrap();
    let cfg = SweepConfig {
        spacing: 10,
        bounds: Some(Bounds::new((0, 0), (50, 40)).unwrap()),
        corridor: None,
        parallel: false,
        view,
    };
    Fixture {
        pm,
        store,
        grid,
        route,
        cfg,
    }
}

#[test]
fn parallel_sweep_matches_sequential() {
    let f = fixture(&[]);
    let par_cfg = SweepConfig {
        parallel: true,
        ..f.cfg
    };

    let sequential = evaluate_grid(&f.pm, &f.store, &f.grid, &f.route, &f.cfg).unwrap();
    let parallel = evaluate_grid(&f.pm, &f.store, &f.grid, &f.route, &par_cfg).unwrap();
    assert_eq!(sequential.len(), 30);
    assert_eq!(sequential, parallel);
}

#[test]
fn parallel_sweep_reports_the_lowest_failing_sample() {
    // (40, 10) precedes (10, 30) in (y, x) order even though its x is larger.
    let f = fixture(&[(1, 3), (4, 1), (5, 4)]);
    let par_cfg = SweepConfig {
        parallel: true,
        ..f.cfg
    };
    let expected = || HomingError::NotFound(Missing::GridCoordinate { x: 40, y: 10 });

    let sequential = evaluate_grid(&f.pm, &f.store, &f.grid, &f.route, &f.cfg);
    assert_eq!(sequential, Err(expected()));
    for _ in 0..8 {
        let parallel = evaluate_grid(&f.pm, &f.store, &f.grid, &f.route, &par_cfg);
        assert_eq!(parallel, Err(expected()));
    }
}
