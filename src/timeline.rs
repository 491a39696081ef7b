use crate::{
    anim_ease::Ease,
    config::{Animation, Band, GroupConfig, Target},
    error::{ScrubError, ScrubResult},
    region::usable_duration,
    value::{self, Lerp, PropValue, PropertyMap},
};

/// One property transition resolved onto the content timeline (seconds).
#[derive(Clone, Debug, PartialEq)]
struct Segment {
    start: f64,
    length: f64,
    ease: Ease,
    from: PropValue, // value the property had when this transition starts
    to: PropValue,
}

#[derive(Clone, Debug, PartialEq)]
struct PropertyTrack {
    name: String,
    initial: PropValue,
    segments: Vec<Segment>, // sorted by start
}

impl PropertyTrack {
    fn value_at(&self, t: f64) -> PropValue {
        Self::eval(&self.initial, &self.segments, t)
    }

    fn eval(initial: &PropValue, segments: &[Segment], t: f64) -> PropValue {
        let idx = segments.partition_point(|s| s.start <= t);
        if idx == 0 {
            return initial.clone();
        }
        let s = &segments[idx - 1];
        if s.length <= 0.0 || t >= s.start + s.length {
            return s.to.clone();
        }
        let u = (t - s.start) / s.length;
        PropValue::lerp(&s.from, &s.to, s.ease.apply(u))
    }

    /// Value with every transition that starts at or before `t` completed.
    fn settled_at(&self, t: f64) -> PropValue {
        let idx = self.segments.partition_point(|s| s.start <= t);
        match idx {
            0 => self.initial.clone(),
            _ => self.segments[idx - 1].to.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum TrackKind {
    Band(Band),
    Keyframes(Vec<PropertyTrack>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub group: usize,
    pub target: Target,
    pub baseline: PropertyMap,
    kind: TrackKind,
}

impl Track {
    fn compile(group: usize, cfg: &GroupConfig, duration_secs: f64) -> Self {
        let baseline = cfg.baseline();
        let kind = match &cfg.animation {
            Animation::Band(band) => TrackKind::Band(*band),
            Animation::Keyframes(keys) => {
                let mut resolved: Vec<_> = keys
                    .iter()
                    .map(|k| (k.at.resolve(duration_secs), k))
                    .collect();
                resolved.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut props: Vec<PropertyTrack> = Vec::new();
                for (start, key) in resolved {
                    let length = key.transition.resolve(duration_secs);
                    for (name, to) in &key.props {
                        let idx = match props.iter().position(|p| &p.name == name) {
                            Some(idx) => idx,
                            None => {
                                // Validation guarantees an initial value.
                                let initial =
                                    baseline.get(name).cloned().unwrap_or_else(|| to.clone());
                                props.push(PropertyTrack {
                                    name: name.clone(),
                                    initial,
                                    segments: Vec::new(),
                                });
                                props.len() - 1
                            }
                        };
                        let track = &mut props[idx];
                        let from = track.value_at(start);
                        track.segments.push(Segment {
                            start,
                            length,
                            ease: key.ease,
                            from,
                            to: to.clone(),
                        });
                    }
                }
                TrackKind::Keyframes(props)
            }
        };

        Self {
            group,
            target: cfg.target.clone(),
            baseline,
            kind,
        }
    }

    pub fn sample(&self, p: f64, duration_secs: f64) -> PropertyMap {
        let mut out = self.baseline.clone();
        if p <= 0.0 {
            return out;
        }
        match &self.kind {
            TrackKind::Band(band) => {
                if let Some(opacity) = band_opacity(band, p) {
                    out.insert(value::OPACITY.to_string(), PropValue::Number(opacity));
                    out.insert(value::VISIBILITY.to_string(), PropValue::visible());
                }
            }
            TrackKind::Keyframes(props) => {
                for prop in props {
                    let v = if p >= 1.0 {
                        prop.settled_at(duration_secs)
                    } else {
                        prop.value_at(p * duration_secs)
                    };
                    out.insert(prop.name.clone(), v);
                }
            }
        }
        out
    }
}

/// Opacity inside the band, `None` outside it.
pub fn band_opacity(band: &Band, p: f64) -> Option<f64> {
    if p < band.appear_at || p > band.disappear_at {
        return None;
    }
    if band.fade <= 0.0 {
        return Some(1.0);
    }
    let fade_in = (p - band.appear_at) / band.fade;
    let fade_out = (band.disappear_at - p) / band.fade;
    Some(fade_in.min(fade_out).clamp(0.0, 1.0))
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TrackState {
    pub group: usize,
    pub target: Target,
    pub props: PropertyMap,
}

/// Every configured group resolved against a known media duration.
///
/// Sampling is a pure function of content progress, so seeking backwards
/// gives the same result as scrubbing forward to the same point.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    duration_secs: f64,
    tracks: Vec<Track>,
}

impl Timeline {
    #[tracing::instrument(skip(groups), fields(groups = groups.len()))]
    pub fn compile(groups: &[GroupConfig], duration_secs: f64) -> ScrubResult<Self> {
        let Some(duration_secs) = usable_duration(Some(duration_secs)) else {
            return Err(ScrubError::not_ready(
                "timeline needs a positive, finite duration",
            ));
        };
        let tracks = groups
            .iter()
            .enumerate()
            .map(|(i, g)| Track::compile(i, g, duration_secs))
            .collect();
        tracing::debug!(duration_secs, "timeline compiled");
        Ok(Self {
            duration_secs,
            tracks,
        })
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn sample(&self, content_progress: f64) -> Vec<TrackState> {
        let p = clamp_progress(content_progress);
        self.tracks
            .iter()
            .map(|t| TrackState {
                group: t.group,
                target: t.target.clone(),
                props: t.sample(p, self.duration_secs),
            })
            .collect()
    }
}

fn clamp_progress(p: f64) -> f64 {
    if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 }
}
