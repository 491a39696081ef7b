use crate::host::DurationProvider;

/// Scrubs the media position directly from content progress.
#[derive(Clone, Debug, Default)]
pub struct PlaybackDriver {
    duration_secs: Option<f64>,
    last_position: Option<f64>,
}

impl PlaybackDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, duration_secs: f64) {
        self.duration_secs = Some(duration_secs);
        self.last_position = None;
    }

    pub fn disarm(&mut self) {
        self.duration_secs = None;
        self.last_position = None;
    }

    pub fn position_for(&self, content_progress: f64) -> Option<f64> {
        let p = if content_progress.is_finite() {
            content_progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.duration_secs.map(|d| p * d)
    }

    /// Assigns `content_progress * duration` to the media. Does nothing until
    /// armed; an unchanged position is not written again.
    pub fn seek<M>(&mut self, content_progress: f64, media: &mut M) -> Option<f64>
    where
        M: DurationProvider + ?Sized,
    {
        let pos = self.position_for(content_progress)?;
        if self.last_position != Some(pos) {
            media.set_position(pos);
            self.last_position = Some(pos);
        }
        Some(pos)
    }
}
