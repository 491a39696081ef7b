use std::path::Path;

use anyhow::Context as _;

use crate::{
    anim_ease::Ease,
    error::{ScrubError, ScrubResult},
    value::{self, PropValue, PropertyMap},
};

/// Transition length used when a keyframe does not specify one.
pub const DEFAULT_TRANSITION_SECS: f64 = 0.5;
/// Ramp length for band groups that do not specify one.
pub const DEFAULT_FADE: f64 = 0.1;

/// How the host finds an element: a ref handed over by the page, or a selector.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Ref(String),
    Selector(String),
}

impl Target {
    pub fn name(&self) -> &str {
        match self {
            Self::Ref(s) | Self::Selector(s) => s,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ref(s) => write!(f, "ref:{s}"),
            Self::Selector(s) => write!(f, "selector:{s}"),
        }
    }
}

/// Where a keyframe sits on the content timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Normalized content progress in [0,1].
    Progress(f64),
    /// Percentage of the media duration in [0,100].
    Percent(f64),
    /// Absolute media time.
    Seconds(f64),
}

impl Anchor {
    pub fn validate(self) -> ScrubResult<()> {
        let ok = match self {
            Self::Progress(p) => (0.0..=1.0).contains(&p),
            Self::Percent(p) => (0.0..=100.0).contains(&p),
            Self::Seconds(s) => s.is_finite() && s >= 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(ScrubError::invalid(format!(
                "keyframe anchor {self:?} is out of range"
            )))
        }
    }

    pub fn resolve(self, duration_secs: f64) -> f64 {
        match self {
            Self::Progress(p) => p * duration_secs,
            Self::Percent(p) => p / 100.0 * duration_secs,
            Self::Seconds(s) => s,
        }
    }
}

/// Transition length of a keyframe.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    Seconds(f64),
    Progress(f64),
}

impl Default for Span {
    fn default() -> Self {
        Self::Seconds(DEFAULT_TRANSITION_SECS)
    }
}

impl Span {
    pub fn validate(self) -> ScrubResult<()> {
        let ok = match self {
            Self::Seconds(s) => s.is_finite() && s >= 0.0,
            Self::Progress(p) => (0.0..=1.0).contains(&p),
        };
        if ok {
            Ok(())
        } else {
            Err(ScrubError::invalid(format!(
                "transition length {self:?} must be >= 0"
            )))
        }
    }

    pub fn resolve(self, duration_secs: f64) -> f64 {
        match self {
            Self::Seconds(s) => s,
            Self::Progress(p) => p * duration_secs,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyframeConfig {
    pub at: Anchor,
    pub props: PropertyMap,
    #[serde(default)]
    pub transition: Span,
    #[serde(default)]
    pub ease: Ease,
}

/// A visibility window in content-progress units with linear fade ramps.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Band {
    pub appear_at: f64,
    pub disappear_at: f64,
    #[serde(default = "default_fade")]
    pub fade: f64,
}

fn default_fade() -> f64 {
    DEFAULT_FADE
}

impl Band {
    pub fn validate(&self) -> ScrubResult<()> {
        for (name, v) in [("appear_at", self.appear_at), ("disappear_at", self.disappear_at)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ScrubError::invalid(format!(
                    "band {name} must be within [0,1], got {v}"
                )));
            }
        }
        if self.disappear_at <= self.appear_at {
            return Err(ScrubError::invalid(
                "band disappear_at must be greater than appear_at",
            ));
        }
        if !self.fade.is_finite() || self.fade < 0.0 {
            return Err(ScrubError::invalid("band fade must be >= 0"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    Band(Band),
    Keyframes(Vec<KeyframeConfig>),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupConfig {
    pub target: Target,
    /// Baseline applied before the first update and whenever no keyframe is active.
    #[serde(default)]
    pub initial: PropertyMap,
    #[serde(flatten)]
    pub animation: Animation,
}

impl GroupConfig {
    pub fn band(target: Target, band: Band) -> Self {
        Self {
            target,
            initial: PropertyMap::new(),
            animation: Animation::Band(band),
        }
    }

    pub fn keyframes(target: Target, initial: PropertyMap, keys: Vec<KeyframeConfig>) -> Self {
        Self {
            target,
            initial,
            animation: Animation::Keyframes(keys),
        }
    }

    /// Initial state with the band defaults (`opacity: 0`, `visibility: hidden`)
    /// filled in where the configuration leaves them out.
    pub fn baseline(&self) -> PropertyMap {
        let mut out = self.initial.clone();
        if matches!(self.animation, Animation::Band(_)) {
            out.entry(value::OPACITY.to_string())
                .or_insert(PropValue::Number(0.0));
            out.entry(value::VISIBILITY.to_string())
                .or_insert_with(PropValue::hidden);
        }
        out
    }

    pub fn validate(&self) -> ScrubResult<()> {
        if self.target.name().trim().is_empty() {
            return Err(ScrubError::invalid("group target must be non-empty"));
        }
        value::validate_map(&self.initial)?;

        match &self.animation {
            Animation::Band(band) => band.validate(),
            Animation::Keyframes(keys) => {
                if keys.is_empty() {
                    return Err(ScrubError::invalid(format!(
                        "group '{}' has no keyframes",
                        self.target
                    )));
                }
                for key in keys {
                    key.at.validate()?;
                    key.transition.validate()?;
                    if key.props.is_empty() {
                        return Err(ScrubError::invalid(format!(
                            "group '{}' has a keyframe without properties",
                            self.target
                        )));
                    }
                    value::validate_map(&key.props)?;
                    if let Some(name) = key.props.keys().find(|k| !self.initial.contains_key(*k)) {
                        return Err(ScrubError::invalid(format!(
                            "group '{}' animates '{name}' without an initial value",
                            self.target
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

fn default_trigger() -> Target {
    Target::Ref("container".to_string())
}

fn default_start() -> String {
    "top top".to_string()
}

/// Declarative description of one pinned scroll sequence.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SequenceConfig {
    #[serde(default = "default_trigger")]
    pub trigger: Target,
    /// Start condition forwarded to the pin, e.g. `"top top"`.
    #[serde(default = "default_start")]
    pub start: String,
    /// Extra scroll after the media ends, as a fraction of the media length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_fraction: Option<f64>,
    /// Extra scroll after the media ends, in viewport heights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_viewports: Option<f64>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            trigger: default_trigger(),
            start: default_start(),
            tail_fraction: None,
            tail_viewports: None,
            groups: Vec::new(),
        }
    }
}

impl SequenceConfig {
    pub fn from_json_str(s: &str) -> ScrubResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_path(path: &Path) -> ScrubResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read sequence config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> ScrubResult<()> {
        if self.trigger.name().trim().is_empty() {
            return Err(ScrubError::invalid("trigger must be non-empty"));
        }
        if self.start.trim().is_empty() {
            return Err(ScrubError::invalid("start condition must be non-empty"));
        }
        match (self.tail_fraction, self.tail_viewports) {
            (Some(_), Some(_)) => {
                return Err(ScrubError::invalid(
                    "set at most one of tail_fraction and tail_viewports",
                ));
            }
            (Some(v), None) | (None, Some(v)) if !v.is_finite() || v < 0.0 => {
                return Err(ScrubError::invalid("tail length must be >= 0"));
            }
            _ => {}
        }
        for group in &self.groups {
            group.validate()?;
        }
        Ok(())
    }

    /// Tail length as a fraction of the media scroll length for a given duration.
    pub fn tail_fraction_for(&self, duration_secs: f64) -> f64 {
        match (self.tail_fraction, self.tail_viewports) {
            (Some(f), _) => f,
            (None, Some(vp)) if duration_secs > 0.0 => vp / duration_secs,
            _ => 0.0,
        }
    }
}
