//! Discrete heading domain and per-heading score profiles.

mod profile;

pub use profile::{HeadingProfile, Rff, Ridf};

use crate::util::math::{quantize, wrap_heading};
use crate::util::{HomingError, HomingResult};

/// Circular heading domain `[0, vis_deg)` sampled every `rot_deg` degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadingDomain {
    vis_deg: i32,
    rot_deg: i32,
}

impl HeadingDomain {
    /// Creates a domain; `rot_deg` must be positive and divide `vis_deg`.
    pub fn new(vis_deg: i32, rot_deg: i32) -> HomingResult<Self> {
        if vis_deg <= 0 {
            return Err(HomingError::config(format!(
                "vis_deg must be > 0, got {vis_deg}"
            )));
        }
        if rot_deg <= 0 {
            return Err(HomingError::config(format!(
                "rot_deg must be > 0, got {rot_deg}"
            )));
        }
        if vis_deg % rot_deg != 0 {
            return Err(HomingError::config(format!(
                "vis_deg {vis_deg} is not a multiple of rot_deg {rot_deg}"
            )));
        }
        Ok(Self { vis_deg, rot_deg })
    }

    /// Full 360 degree domain with the given step.
    pub fn full(rot_deg: i32) -> HomingResult<Self> {
        Self::new(360, rot_deg)
    }

    /// Horizontal field of view in degrees.
    pub fn vis_deg(&self) -> i32 {
        self.vis_deg
    }

    /// Rotation step in degrees.
    pub fn rot_deg(&self) -> i32 {
        self.rot_deg
    }

    /// Number of candidate headings, `vis_deg / rot_deg`.
    pub fn len(&self) -> usize {
        (self.vis_deg / self.rot_deg) as usize
    }

    /// Never true for a validated domain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the candidate rotation offsets `0, rot_deg, ...`.
    pub fn offsets(&self) -> impl Iterator<Item = i32> {
        let rot = self.rot_deg;
        (0..self.vis_deg / rot).map(move |k| k * rot)
    }

    /// Wraps any integer heading into `[0, vis_deg)`.
    pub fn wrap(&self, heading: i32) -> i32 {
        wrap_heading(heading, self.vis_deg)
    }

    /// Rounds a heading to the nearest step and wraps it into the domain.
    pub fn quantize(&self, heading_deg: f64) -> i32 {
        self.wrap(quantize(heading_deg, self.rot_deg))
    }
}
