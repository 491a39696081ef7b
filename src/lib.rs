#![forbid(unsafe_code)]

pub mod anim_ease;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod playback;
pub mod region;
pub mod timeline;
pub mod value;

pub use anim_ease::Ease;
pub use config::{
    Anchor, Animation, Band, GroupConfig, KeyframeConfig, SequenceConfig, Span, Target,
};
pub use engine::{EngineState, FrameReport, ScrollEngine};
pub use error::{ScrubError, ScrubResult};
pub use host::{
    DurationProvider, ElementHost, ElementId, Host, PinId, PinRequest, ProgressSource, StyleWrite,
};
pub use playback::PlaybackDriver;
pub use region::{RegionPlan, ScrollRegion, compute_region_length, to_content_progress};
pub use timeline::{Timeline, TrackState};
pub use value::{PropValue, PropertyMap, Unit};
