//! Seams to the page hosting a sequence.
//!
//! The engine never owns these collaborators; each lifecycle call borrows the
//! host for its duration.

use crate::{config::Target, error::ScrubResult, value::PropertyMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PinId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct ElementId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct PinRequest {
    pub trigger: Target,
    pub start: String,
    pub length_in_scroll_units: f64,
}

/// Observes scroll within a pinned region. The host forwards each update to
/// [`crate::ScrollEngine::on_progress`].
pub trait ProgressSource {
    fn viewport_height(&self) -> f64;
    fn create_pin(&mut self, request: &PinRequest) -> ScrubResult<PinId>;
    fn destroy_pin(&mut self, pin: PinId);
}

/// The media being scrubbed. Readiness is announced through
/// [`crate::ScrollEngine::on_media_ready`].
pub trait DurationProvider {
    fn is_ready(&self) -> bool;
    fn duration(&self) -> Option<f64>;
    fn set_position(&mut self, secs: f64);
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StyleWrite {
    pub element: ElementId,
    pub props: PropertyMap,
}

pub trait ElementHost {
    fn resolve(&mut self, target: &Target) -> Option<ElementId>;
    /// Applies one update's writes together, before the next frame is painted.
    fn commit(&mut self, writes: &[StyleWrite]);
}

pub trait Host: ProgressSource + DurationProvider + ElementHost {}

impl<T> Host for T where T: ProgressSource + DurationProvider + ElementHost {}
