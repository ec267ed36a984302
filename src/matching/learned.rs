//! Learned strategy: familiarity from a trained scorer and its embeddings.
//!
//! Familiarity at a heading is the scorer's route score for the query rotated
//! to that heading. Mismatch between views is the Euclidean distance between
//! their embeddings. Route view embeddings are computed once, when the matcher
//! is built, and reused for every query.

use crate::database::{ImageStore, Route};
use crate::heading::{HeadingDomain, HeadingProfile, Ridf};
use crate::matching::{BestMatch, FamiliarityModel, RouteFamiliarity};
use crate::trace::trace_span;
use crate::util::{HomingError, HomingResult, Missing};
use crate::view::{rotate, PanoramicView, ViewConfig};

/// Trained model consulted by [`LearnedMatcher`].
pub trait LearnedScorer {
    /// Route-likeness of a preprocessed view, higher is more familiar.
    fn score(&self, view: &PanoramicView) -> HomingResult<f32>;

    /// Latent representation of a preprocessed view.
    fn embed(&self, view: &PanoramicView) -> HomingResult<Vec<f32>>;
}

impl<S: LearnedScorer + ?Sized> LearnedScorer for &S {
    fn score(&self, view: &PanoramicView) -> HomingResult<f32> {
        (**self).score(view)
    }

    fn embed(&self, view: &PanoramicView) -> HomingResult<Vec<f32>> {
        (**self).embed(view)
    }
}

/// One embedding per route view, in route order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmbeddingCache {
    embeddings: Vec<Vec<f32>>,
}

impl EmbeddingCache {
    /// Embeds every view; all embeddings must share one length.
    pub fn build<S: LearnedScorer + ?Sized>(
        scorer: &S,
        views: &[PanoramicView],
    ) -> HomingResult<Self> {
        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(views.len());
        for view in views {
            let embedding = scorer.embed(view)?;
            if let Some(first) = embeddings.first() {
                if first.len() != embedding.len() {
                    return Err(HomingError::EmbeddingMismatch {
                        expected: first.len(),
                        got: embedding.len(),
                    });
                }
            }
            embeddings.push(embedding);
        }
        Ok(Self { embeddings })
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Embedding of route view `index`.
    pub fn get(&self, index: usize) -> Option<&[f32]> {
        self.embeddings.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.embeddings.iter().map(Vec::as_slice)
    }
}

/// Euclidean distance between two embeddings of equal length.
pub(crate) fn embedding_distance(a: &[f32], b: &[f32]) -> HomingResult<f32> {
    if a.len() != b.len() {
        return Err(HomingError::EmbeddingMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    let sum: f32 = a
        .iter()
        .zip(b)
        .map(|(&p, &q)| {
            let d = p - q;
            d * d
        })
        .sum();
    Ok(sum.sqrt())
}

/// Matcher backed by a [`LearnedScorer`] and a precomputed embedding cache.
#[derive(Clone, Debug)]
pub struct LearnedMatcher<S> {
    domain: HeadingDomain,
    scorer: S,
    memory: Vec<PanoramicView>,
    cache: EmbeddingCache,
}

impl<S: LearnedScorer> LearnedMatcher<S> {
    /// Builds the matcher and embeds every route view up front.
    pub fn new(domain: HeadingDomain, scorer: S, memory: Vec<PanoramicView>) -> HomingResult<Self> {
        let cache = EmbeddingCache::build(&scorer, &memory)?;
        Ok(Self {
            domain,
            scorer,
            memory,
            cache,
        })
    }

    /// Loads and preprocesses every route image, then embeds it.
    pub fn from_route<I: ImageStore + Sync + ?Sized>(
        route: &Route,
        store: &I,
        cfg: &ViewConfig,
        scorer: S,
    ) -> HomingResult<Self> {
        let memory = route.load_views(store, cfg)?;
        Self::new(*route.domain(), scorer, memory)
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Cached route embeddings.
    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    fn rotations<'a>(
        &'a self,
        query: &'a PanoramicView,
    ) -> impl Iterator<Item = PanoramicView> + 'a {
        let vis_deg = self.domain.vis_deg();
        self.domain
            .offsets()
            .map(move |offset| rotate(query, offset, vis_deg))
    }
}

impl<S: LearnedScorer> FamiliarityModel for LearnedMatcher<S> {
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
        query.ensure_same_shape(stored)?;
        let target = self.scorer.embed(stored)?;
        let values = self
            .rotations(query)
            .map(|rotated| embedding_distance(&self.scorer.embed(&rotated)?, &target))
            .collect::<HomingResult<Vec<f32>>>()?;
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
        if self.cache.is_empty() {
            return Err(HomingError::EmptyDatabase {
                context: "learned matcher route",
            });
        }
        let _span = trace_span!("route_familiarity", views = self.cache.len()).entered();

        let mut scores = Vec::with_capacity(self.domain.len());
        let mut distances: Vec<Vec<f32>> = Vec::with_capacity(self.domain.len());
        for rotated in self.rotations(query) {
            scores.push(self.scorer.score(&rotated)?);
            let embedding = self.scorer.embed(&rotated)?;
            let row = self
                .cache
                .iter()
                .map(|stored| embedding_distance(&embedding, stored))
                .collect::<HomingResult<Vec<f32>>>()?;
            distances.push(row);
        }

        let mut best = BestMatch::default();
        for idx in 0..self.cache.len() {
            for row in &distances {
                best.offer(row[idx], idx);
            }
        }
        let matched_index = best.index().ok_or(HomingError::EmptyDatabase {
            context: "learned matcher route",
        })?;

        Ok(RouteFamiliarity {
            rff: HeadingProfile::from_offsets(&self.domain, query_heading, scores),
            matched_index,
        })
    }
}
