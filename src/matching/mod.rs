//! Rotational matching of a query view against a memorized route.
//!
//! A strategy scores every candidate heading of a query against every stored
//! route view. Per-view scores form a RIDF; aggregating them across the route
//! per heading gives the familiarity profile (rFF) and the index of the route
//! view that explains the query best. Two strategies share the
//! [`FamiliarityModel`] contract: [`PerfectMemory`] compares pixels directly,
//! [`LearnedMatcher`] compares embeddings produced by a [`LearnedScorer`].

mod decision;
mod learned;
mod mlp;
mod perfect_memory;

pub use decision::{most_familiar_heading, signal_strength};
pub use learned::{EmbeddingCache, LearnedMatcher, LearnedScorer};
pub use mlp::{DenseLayer, Mlp};
pub use perfect_memory::PerfectMemory;

use crate::heading::{HeadingDomain, Rff, Ridf};
use crate::util::HomingResult;
use crate::view::{rotate, PanoramicView};

/// Familiarity profile of a query against a whole route.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteFamiliarity {
    /// Familiarity per heading, higher is better.
    pub rff: Rff,
    /// Route index of the view with the globally smallest mismatch.
    pub matched_index: usize,
}

/// Decision for one query view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    /// Most familiar heading in degrees.
    pub heading: i32,
    /// Route index of the best matching stored view.
    pub matched_index: usize,
    /// Signal strength of the familiarity profile, finite and at least 1.
    pub confidence: f32,
}

/// Detailed breakdown of a single query, for inspection and plotting.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewAnalysis {
    pub result: MatchResult,
    /// Familiarity profile the decision was taken from.
    pub rff: Rff,
    /// Query rotated so that its chosen heading faces forward.
    pub aligned: PanoramicView,
    /// RIDF of the aligned query against the matched route view, keyed from
    /// the chosen heading.
    pub matched_ridf: Ridf,
}

/// Strategy-agnostic matching contract.
pub trait FamiliarityModel {
    /// Heading domain shared by every profile this model produces.
    fn domain(&self) -> &HeadingDomain;

    /// Number of memorized route views.
    fn route_len(&self) -> usize;

    /// Memorized view at `index`, already preprocessed.
    fn route_view(&self, index: usize) -> HomingResult<&PanoramicView>;

    /// Mismatch per heading between `query` and one stored view.
    ///
    /// The query is rotated by each offset `k * rot_deg`; the mismatch is stored
    /// under `(offset + query_heading) mod vis_deg`. The result always has
    /// `vis_deg / rot_deg` entries.
    fn ridf(
        &self,
        query: &PanoramicView,
        stored: &PanoramicView,
        query_heading: i32,
    ) -> HomingResult<Ridf>;

    /// Familiarity profile of `query` against the whole route.
    fn route_familiarity(
        &self,
        query: &PanoramicView,
        query_heading: i32,
    ) -> HomingResult<RouteFamiliarity>;

    /// Heading with the highest familiarity.
    fn most_familiar_heading(&self, rff: &Rff) -> HomingResult<i32> {
        most_familiar_heading(rff)
    }

    /// Confidence scalar of a familiarity profile.
    fn signal_strength(&self, rff: &Rff) -> HomingResult<f32> {
        signal_strength(rff)
    }

    /// Full decision for one query view.
    fn match_view(&self, query: &PanoramicView, query_heading: i32) -> HomingResult<MatchResult> {
        let familiarity = self.route_familiarity(query, query_heading)?;
        Ok(MatchResult {
            heading: self.most_familiar_heading(&familiarity.rff)?,
            matched_index: familiarity.matched_index,
            confidence: self.signal_strength(&familiarity.rff)?,
        })
    }

    /// Matches `query` and re-scores it against its best route view after
    /// turning it to the chosen heading.
    fn analyze_view(&self, query: &PanoramicView, query_heading: i32) -> HomingResult<ViewAnalysis> {
        let familiarity = self.route_familiarity(query, query_heading)?;
        let result = MatchResult {
            heading: self.most_familiar_heading(&familiarity.rff)?,
            matched_index: familiarity.matched_index,
            confidence: self.signal_strength(&familiarity.rff)?,
        };
        let vis_deg = self.domain().vis_deg();
        let aligned = rotate(query, result.heading - query_heading, vis_deg);
        let matched = self.route_view(result.matched_index)?;
        let matched_ridf = self.ridf(&aligned, matched, result.heading)?;
        Ok(ViewAnalysis {
            result,
            rff: familiarity.rff,
            aligned,
            matched_ridf,
        })
    }
}

impl<M: FamiliarityModel + ?Sized> FamiliarityModel for Box<M> {
    fn domain(&self) -> &HeadingDomain {
        (**self).domain()
    }

    fn route_len(&self) -> usize {
        (**self).route_len()
    }

    fn route_view(&self, index: usize) -> HomingResult<&PanoramicView> {
        (**self).route_view(index)
    }

    fn ridf(
        &self,
        query: &PanoramicView,
        stored: &PanoramicView,
        query_heading: i32,
    ) -> HomingResult<Ridf> {
        (**self).ridf(query, stored, query_heading)
    }

    fn route_familiarity(
        &self,
        query: &PanoramicView,
        query_heading: i32,
    ) -> HomingResult<RouteFamiliarity> {
        (**self).route_familiarity(query, query_heading)
    }

    fn most_familiar_heading(&self, rff: &Rff) -> HomingResult<i32> {
        (**self).most_familiar_heading(rff)
    }

    fn signal_strength(&self, rff: &Rff) -> HomingResult<f32> {
        (**self).signal_strength(rff)
    }
}

/// Tracks the globally smallest mismatch over `(route index, heading)`.
///
/// Candidates must be offered in route order and, within a view, by ascending
/// heading; only strictly smaller values replace the current best, so ties keep
/// the lowest route index, then the lowest heading.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BestMatch {
    best: Option<(f32, usize)>,
}

impl BestMatch {
    pub(crate) fn offer(&mut self, mismatch: f32, index: usize) {
        match self.best {
            Some((b, _)) if mismatch >= b => {}
            _ => self.best = Some((mismatch, index)),
        }
    }

    pub(crate) fn index(&self) -> Option<usize> {
        self.best.map(|(_, idx)| idx)
    }
}
