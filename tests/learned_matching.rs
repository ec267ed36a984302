use homing::database::StoredView;
use homing::matching::DenseLayer;
use homing::view::rotate;
use homing::{
    evaluate_grid, Bounds, FamiliarityModel, Grid, HeadingDomain, LearnedMatcher,
    MemoryImageStore, Mlp, PanoramicView, RawImage, Route, SweepConfig, ViewConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WIDTH: usize = 8;
const HEIGHT: usize = 3;
const HEADINGS: [i32; 4] = [0, 90, 180, 270];

fn scene(rng: &mut StdRng) -> PanoramicView {
    let data = (0..WIDTH * HEIGHT)
        .map(|_| rng.random_range(16..=255u8))
        .collect();
    PanoramicView::new(data, WIDTH, HEIGHT).unwrap()
}

fn raw(view: &PanoramicView) -> RawImage {
    RawImage::gray(view.data().to_vec(), WIDTH, HEIGHT).unwrap()
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

/// Identity hidden layer; the on-route logit is the normalized correlation
/// with `target`, so the score peaks where a rotated query equals `target`.
fn correlating_mlp(target: &PanoramicView) -> Mlp {
    let n = target.len();
    let identity = (0..n * n)
        .map(|i| if i / n == i % n { 1.0 } else { 0.0 })
        .collect();
    let hidden = DenseLayer::new(n, n, identity, vec![0.0; n]).unwrap();

    let pixels: Vec<f32> = target.data().iter().map(|&v| f32::from(v) / 255.0).collect();
    let norm2: f32 = pixels.iter().map(|p| p * p).sum();
    let mut weights = vec![0.0; n];
    weights.extend(pixels.iter().map(|p| p / norm2));
    let output = DenseLayer::new(n, 2, weights, vec![0.0, 0.0]).unwrap();
    Mlp::new(vec![hidden], output).unwrap()
}

/// Four scenes; route view `k` is scene `k` turned to `HEADINGS[k]`.
fn scenes_and_memory() -> (Vec<PanoramicView>, Vec<PanoramicView>) {
    let mut rng = StdRng::seed_from_u64(17);
    let scenes: Vec<PanoramicView> = (0..4).map(|_| scene(&mut rng)).collect();
    let memory = scenes
        .iter()
        .zip(HEADINGS)
        .map(|(scene, heading)| rotate(scene, heading, 360))
        .collect();
    (scenes, memory)
}

#[test]
fn mlp_matcher_recovers_heading_and_index() {
    let (scenes, memory) = scenes_and_memory();
    let mlp = correlating_mlp(&memory[2]);
    assert_eq!(mlp.input_size(), WIDTH * HEIGHT);
    let matcher = LearnedMatcher::new(HeadingDomain::full(90).unwrap(), mlp, memory).unwrap();
    assert_eq!(matcher.cache().len(), 4);

    let result = matcher.match_view(&scenes[2], 0).unwrap();
    assert_eq!(result.heading, 180);
    assert_eq!(result.matched_index, 2);
    assert!(result.confidence.is_finite() && result.confidence >= 1.0);

    let analysis = matcher.analyze_view(&scenes[2], 0).unwrap();
    assert_eq!(analysis.result, result);
    assert!(analysis.rff.values().iter().all(|&v| v <= 0.0));
    assert_eq!(analysis.matched_ridf.min().map(|(h, _)| h), Some(180));
}

#[test]
fn mlp_matcher_drives_a_grid_sweep() {
    let (scenes, memory) = scenes_and_memory();
    let domain = HeadingDomain::full(90).unwrap();
    let mut store = MemoryImageStore::new();

    let mut route_views = Vec::new();
    for (k, view) in memory.iter().enumerate() {
        let name = format!("route_{k}.png");
        store.insert(name.clone(), raw(view));
        route_views.push(stored(name, 10 * k as i32, 0, HEADINGS[k]));
    }
    let route = Route::new(domain, route_views);

    let positions = [(0, 0), (10, 0), (0, 10), (10, 10)];
    let mut grid_views = Vec::new();
    for (k, &(x, y)) in positions.iter().enumerate() {
        let name = format!("grid_{x}_{y}.png");
        store.insert(name.clone(), raw(&scenes[k]));
        grid_views.push(stored(name, x, y, 0));
    }
    let grid = Grid::new(grid_views).unwrap();

    let view = ViewConfig {
        width: WIDTH,
        height: HEIGHT,
    };
    let matcher =
        LearnedMatcher::from_route(&route, &store, &view, correlating_mlp(&memory[2])).unwrap();
    let cfg = SweepConfig {
        spacing: 10,
        bounds: Some(Bounds::new((0, 0), (10, 10)).unwrap()),
        corridor: None,
        parallel: false,
        view,
    };
    let records = evaluate_grid(&matcher, &store, &grid, &route, &cfg).unwrap();

    let coords: Vec<_> = records.iter().map(|r| (r.x, r.y)).collect();
    assert_eq!(coords, positions);
    // Scene 2 sits at (0, 10).
    assert_eq!(records[2].heading, 180);
}
