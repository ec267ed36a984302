//! Homing is a visual route-following library built around rotational image
//! matching.
//!
//! A query panorama is rotated through every candidate heading and compared
//! against a memorized route of panoramas. The comparison yields a
//! rotational familiarity profile, from which the most familiar heading, the
//! best matching route view and a confidence ratio are taken. Two matching
//! strategies share the [`FamiliarityModel`] contract: pixel-distance
//! [`PerfectMemory`] and embedding-distance [`LearnedMatcher`]. The
//! [`eval`] module sweeps a spatial grid of recorded views and scores the
//! decisions against the route's recorded headings.
//!
//! Optional features: `rayon` (parallel sweeps and route loading), `simd`
//! (vectorized pixel kernel), `image-io` (PNG/JPEG decoding and a directory
//! image store) and `tracing` (spans and events).

pub mod database;
pub mod eval;
pub mod heading;
pub mod kernel;
pub mod matching;
mod trace;
pub mod util;
pub mod view;

pub use database::{Grid, ImageStore, MemoryImageStore, Route, StoredView};
pub use eval::{
    evaluate_grid, evaluate_grid_cancellable, evaluate_route, Bounds, GridEvaluationRecord,
    RouteEvaluationRecord, SweepConfig,
};
pub use heading::{HeadingDomain, HeadingProfile, Rff, Ridf};
pub use matching::{
    FamiliarityModel, LearnedMatcher, LearnedScorer, MatchResult, Mlp, PerfectMemory,
    RouteFamiliarity,
};
pub use util::{HomingError, HomingResult, Missing};
pub use view::{PanoramicView, RawImage, ViewConfig};

#[cfg(feature = "image-io")]
pub use database::DirImageStore;
