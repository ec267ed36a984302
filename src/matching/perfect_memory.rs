//! Perfect Memory: pixel-distance matching against every stored route view.

use crate::database::{ImageStore, Route};
use crate::heading::{HeadingDomain, HeadingProfile, Ridf};
use crate::kernel::{rolled_mse, ActiveKernel};
use crate::matching::{BestMatch, FamiliarityModel, RouteFamiliarity};
use crate::trace::trace_span;
use crate::util::{HomingError, HomingResult, Missing};
use crate::view::{column_shift, PanoramicView, ViewConfig};

/// Route memory holding every preprocessed route view.
///
/// The mismatch at a heading is the mean squared pixel difference between the
/// rotated query and a stored view. Familiarity is the negated smallest
/// mismatch over all stored views at that heading.
#[derive(Clone, Debug)]
pub struct PerfectMemory {
    domain: HeadingDomain,
    memory: Vec<PanoramicView>,
}

impl PerfectMemory {
    /// Creates a memory from preprocessed views in route order.
    ///
    /// All views must share one shape.
    pub fn new(domain: HeadingDomain, memory: Vec<PanoramicView>) -> HomingResult<Self> {
        if let Some(first) = memory.first() {
            for view in &memory[1..] {
                first.ensure_same_shape(view)?;
            }
        }
        Ok(Self { domain, memory })
    }

    /// Loads and preprocesses every route image once.
    pub fn from_route<S: ImageStore + Sync + ?Sized>(
        route: &Route,
        store: &S,
        cfg: &ViewConfig,
    ) -> HomingResult<Self> {
        let memory = route.load_views(store, cfg)?;
        Self::new(*route.domain(), memory)
    }

    /// Memorized views in route order.
    pub fn memory(&self) -> &[PanoramicView] {
        &self.memory
    }

    fn mismatch_by_offset(
        &self,
        query: &PanoramicView,
        stored: &PanoramicView,
    ) -> HomingResult<Vec<f32>> {
        let width = query.width();
        let vis_deg = self.domain.vis_deg();
        self.domain
            .offsets()
            .map(|offset| {
                let shift = column_shift(width, offset, vis_deg);
                rolled_mse::<ActiveKernel>(query, stored, shift)
            })
            .collect()
    }
}

impl FamiliarityModel for PerfectMemory {
    fn domain(&self) -> &HeadingDomain {
        &self.domain
    }

    fn route_len(&self) -> usize {
        self.memory.len()
    }

    fn route_view(&self, index: usize) -> HomingResult<&PanoramicView> {
        self.memory
            .get(index)
            .ok_or(HomingError::NotFound(Missing::RouteIndex {
                index,
                len: self.memory.len(),
            }))
    }

    fn ridf(
        &self,
        query: &PanoramicView,
        stored: &PanoramicView,
        query_heading: i32,
    ) -> HomingResult<Ridf> {
        let values = self.mismatch_by_offset(query, stored)?;
        Ok(HeadingProfile::from_offsets(
            &self.domain,
            query_heading,
            values,
        ))
    }

    fn route_familiarity(
        &self,
        query: &PanoramicView,
        query_heading: i32,
    ) -> HomingResult<RouteFamiliarity> {
        if self.memory.is_empty() {
            return Err(HomingError::EmptyDatabase {
                context: "perfect memory route",
            });
        }
        let _span = trace_span!("route_familiarity", views = self.memory.len()).entered();

        let mut best_per_offset = vec![f32::INFINITY; self.domain.len()];
        let mut best = BestMatch::default();
        for (idx, stored) in self.memory.iter().enumerate() {
            let mismatch = self.mismatch_by_offset(query, stored)?;
            for (slot, &value) in best_per_offset.iter_mut().zip(&mismatch) {
                best.offer(value, idx);
                if value < *slot {
                    *slot = value;
                }
            }
        }

        let ridf = HeadingProfile::from_offsets(&self.domain, query_heading, best_per_offset);
        let matched_index = best.index().ok_or(HomingError::EmptyDatabase {
            context: "perfect memory route",
        })?;
        Ok(RouteFamiliarity {
            rff: ridf.negated(),
            matched_index,
        })
    }
}
