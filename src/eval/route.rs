//! Route sweep: re-query stored route views with their recorded heading.

use crate::database::{ImageStore, Route};
use crate::eval::HeadingSample;
use crate::matching::FamiliarityModel;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{HomingError, HomingResult};
use crate::view::ViewConfig;
use serde::{Deserialize, Serialize};

/// Decision for one route view queried against the whole route.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteEvaluationRecord {
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub heading: i32,
    pub matched_index: usize,
    pub confidence: f32,
}

impl HeadingSample for RouteEvaluationRecord {
    fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn heading(&self) -> i32 {
        self.heading
    }
}

/// Queries every `step`-th route view, using its stored heading as the query
/// heading.
pub fn evaluate_route<M, S>(
    model: &M,
    store: &S,
    route: &Route,
    view: &ViewConfig,
    step: usize,
) -> HomingResult<Vec<RouteEvaluationRecord>>
where
    M: FamiliarityModel + ?Sized,
    S: ImageStore + ?Sized,
{
    if step == 0 {
        return Err(HomingError::config("route sweep step must be > 0"));
    }
    if route.is_empty() {
        return Err(HomingError::EmptyDatabase {
            context: "route sweep",
        });
    }
    let _span = trace_span!("route_sweep", views = route.len(), step = step).entered();

    let mut records = Vec::with_capacity(route.len().div_ceil(step));
    for (index, stored) in route.iter().enumerate().step_by(step) {
        let query = stored.load(store, view)?;
        let result = model.match_view(&query, stored.heading)?;
        trace_debug!(
            "route_sample",
            index = index,
            heading = result.heading,
            matched_index = result.matched_index
        );
        records.push(RouteEvaluationRecord {
            index,
            x: stored.x,
            y: stored.y,
            heading: result.heading,
            matched_index: result.matched_index,
            confidence: result.confidence,
        });
    }
    trace_event!("route_sweep_done", records = records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryImageStore, StoredView};
    use crate::heading::HeadingDomain;
    use crate::matching::PerfectMemory;
    use crate::view::RawImage;

    fn three_view_route() -> (Route, MemoryImageStore, ViewConfig) {
        let domain = HeadingDomain::full(90).unwrap();
        let mut store = MemoryImageStore::new();
        let mut views = Vec::new();
        for i in 0..3usize {
            let name = format!("r{i}.png");
            let data = (0..8).map(|p| ((p * 31 + i * 97) % 251) as u8).collect();
            store.insert(name.clone(), RawImage::gray(data, 4, 2).unwrap());
            views.push(StoredView {
                filename: name,
                x: 10 * i as i32,
                y: 0,
                heading: 90 * i as i32,
                grid_index: None,
            });
        }
        let route = Route::new(domain, views);
        let cfg = ViewConfig {
            width: 4,
            height: 2,
        };
        (route, store, cfg)
    }

    #[test]
    fn route_views_match_themselves_at_their_heading() {
        let (route, store, cfg) = three_view_route();
        let pm = PerfectMemory::from_route(&route, &store, &cfg).unwrap();

        let records = evaluate_route(&pm, &store, &route, &cfg, 2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, 0);
        assert_eq!(records[1].index, 2);
        for record in &records {
            assert_eq!(record.matched_index, record.index);
            assert_eq!(record.heading, 90 * record.index as i32);
        }
        assert!(evaluate_route(&pm, &store, &route, &cfg, 0).is_err());
    }

    #[test]
    fn exact_matches_survive_a_json_round_trip() {
        let (route, store, cfg) = three_view_route();
        let pm = PerfectMemory::from_route(&route, &store, &cfg).unwrap();
        let records = evaluate_route(&pm, &store, &route, &cfg, 1).unwrap();
        assert!(records.iter().all(|r| r.confidence.is_finite() && r.confidence >= 1.0));

        let json = serde_json::to_string(&records).unwrap();
        assert!(!json.contains("null"));
        let decoded: Vec<RouteEvaluationRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.len(), records.len());
        for (back, record) in decoded.iter().zip(&records) {
            assert_eq!(
                (back.index, back.x, back.y, back.heading, back.matched_index),
                (record.index, record.x, record.y, record.heading, record.matched_index)
            );
            assert!((back.confidence - record.confidence).abs() <= 1e-6 * record.confidence);
        }
    }
}
