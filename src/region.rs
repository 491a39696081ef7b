//! Pinned-region sizing and the raw -> content progress remap.
//!
//! One second of media maps to one viewport height of scroll. An optional
//! tail extends the pinned region past the end of the media so end states can
//! settle while the user keeps scrolling.

use crate::{
    config::Target,
    error::{ScrubError, ScrubResult},
};

pub fn usable_duration(duration_secs: Option<f64>) -> Option<f64> {
    duration_secs.filter(|d| d.is_finite() && *d > 0.0)
}

/// `duration * viewport * (1 + tail_fraction)` scroll units.
pub fn compute_region_length(
    duration_secs: f64,
    viewport_height: f64,
    tail_fraction: f64,
) -> ScrubResult<f64> {
    if usable_duration(Some(duration_secs)).is_none() {
        return Err(ScrubError::not_ready(format!(
            "media duration {duration_secs} cannot size a region"
        )));
    }
    if !viewport_height.is_finite() || viewport_height <= 0.0 {
        return Err(ScrubError::not_ready(format!(
            "viewport height {viewport_height} cannot size a region"
        )));
    }
    if !tail_fraction.is_finite() || tail_fraction < 0.0 {
        return Err(ScrubError::invalid("tail fraction must be >= 0"));
    }
    Ok(duration_secs * viewport_height * (1.0 + tail_fraction))
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct RegionPlan {
    pub duration_secs: f64,
    pub viewport_height: f64,
    pub media_units: f64,
    pub total_units: f64,
}

impl RegionPlan {
    pub fn new(duration_secs: f64, viewport_height: f64, tail_fraction: f64) -> ScrubResult<Self> {
        let media_units = compute_region_length(duration_secs, viewport_height, 0.0)?;
        let total_units = compute_region_length(duration_secs, viewport_height, tail_fraction)?;
        Ok(Self {
            duration_secs,
            viewport_height,
            media_units,
            total_units,
        })
    }

    /// Raw progress at which the media reaches its end; 1.0 without a tail.
    pub fn video_end_fraction(&self) -> f64 {
        if self.total_units <= self.media_units {
            1.0
        } else {
            self.media_units / self.total_units
        }
    }

    pub fn has_tail(&self) -> bool {
        self.total_units > self.media_units
    }

    pub fn content_progress(&self, raw: f64) -> f64 {
        to_content_progress(raw, self.video_end_fraction())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScrollRegion {
    pub trigger: Target,
    pub start: String,
    pub plan: RegionPlan,
}

impl ScrollRegion {
    pub fn length_in_scroll_units(&self) -> f64 {
        self.plan.total_units
    }
}

/// Maps raw region progress onto the media's own [0,1] span.
///
/// Pure and total: non-finite input reads as 0, output is always in [0,1].
pub fn to_content_progress(raw: f64, video_end_fraction: f64) -> f64 {
    let raw = if raw.is_finite() { raw } else { 0.0 };
    if !(video_end_fraction.is_finite() && video_end_fraction > 0.0) || video_end_fraction >= 1.0 {
        return raw.clamp(0.0, 1.0);
    }
    if raw >= video_end_fraction {
        return 1.0;
    }
    (raw / video_end_fraction).clamp(0.0, 1.0)
}
