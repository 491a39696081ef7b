use crate::{
    config::SequenceConfig,
    error::{ScrubError, ScrubResult},
    host::{
        DurationProvider, ElementHost, ElementId, Host, PinId, PinRequest, ProgressSource,
        StyleWrite,
    },
    playback::PlaybackDriver,
    region::{RegionPlan, ScrollRegion, usable_duration},
    timeline::Timeline,
    value::PropertyMap,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum EngineState {
    Uninitialized,
    AwaitingDuration,
    /// Region sized and pinned, no progress received yet.
    Armed,
    Active,
    TornDown,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub content_progress: f64,
    pub media_position: Option<f64>,
    pub style_writes: usize,
}

/// Drives one pinned scroll sequence: media scrubbing plus keyframed element state.
#[derive(Debug)]
pub struct ScrollEngine {
    config: SequenceConfig,
    state: EngineState,
    elements: Vec<Option<ElementId>>, // per group; None when the target did not resolve
    applied: Vec<Option<PropertyMap>>, // last written state per group
    region: Option<ScrollRegion>,
    pin: Option<PinId>,
    timeline: Option<Timeline>,
    playback: PlaybackDriver,
}

impl ScrollEngine {
    pub fn new(config: SequenceConfig) -> ScrubResult<Self> {
        config.validate()?;
        let groups = config.groups.len();
        Ok(Self {
            config,
            state: EngineState::Uninitialized,
            elements: vec![None; groups],
            applied: vec![None; groups],
            region: None,
            pin: None,
            timeline: None,
            playback: PlaybackDriver::new(),
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn region(&self) -> Option<&ScrollRegion> {
        self.region.as_ref()
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    pub fn pin(&self) -> Option<PinId> {
        self.pin
    }

    /// Mounts the sequence: writes initial states for the targets that resolve,
    /// and arms right away when the media already knows its duration.
    #[tracing::instrument(skip_all)]
    pub fn attach<H>(&mut self, host: &mut H) -> ScrubResult<()>
    where
        H: Host + ?Sized,
    {
        if self.state != EngineState::Uninitialized {
            return Err(ScrubError::lifecycle(format!(
                "attach called in state {:?}",
                self.state
            )));
        }

        self.resolve_pending(host, false);
        self.state = EngineState::AwaitingDuration;
        self.try_arm(host, "attach");
        Ok(())
    }

    /// Readiness signal from the media. Safe to call at any time; only the
    /// first usable duration arms the engine.
    #[tracing::instrument(skip_all)]
    pub fn on_media_ready<H>(&mut self, host: &mut H)
    where
        H: Host + ?Sized,
    {
        match self.state {
            EngineState::AwaitingDuration | EngineState::Armed | EngineState::Active => {
                self.try_arm(host, "ready event");
            }
            EngineState::Uninitialized | EngineState::TornDown => {
                tracing::debug!(state = ?self.state, "ignoring media readiness");
            }
        }
    }

    // Targets still unresolved get their baseline as soon as they show up.
    // Missing at arm time means the group is skipped until the next re-size.
    fn resolve_pending<H>(&mut self, host: &mut H, arming: bool)
    where
        H: ElementHost + ?Sized,
    {
        let mut writes = Vec::new();
        for (i, group) in self.config.groups.iter().enumerate() {
            if self.elements[i].is_some() {
                continue;
            }
            let Some(element) = host.resolve(&group.target) else {
                let err = ScrubError::missing_target(group.target.to_string());
                if arming {
                    tracing::warn!(group = i, %err, "skipping group");
                } else {
                    tracing::debug!(group = i, %err, "target not mounted yet");
                }
                continue;
            };
            let baseline = group.baseline();
            writes.push(StyleWrite {
                element,
                props: baseline.clone(),
            });
            self.elements[i] = Some(element);
            self.applied[i] = Some(baseline);
        }
        if !writes.is_empty() {
            host.commit(&writes);
        }
    }

    fn try_arm<H>(&mut self, host: &mut H, source: &'static str)
    where
        H: Host + ?Sized,
    {
        let duration = if host.is_ready() {
            usable_duration(host.duration())
        } else {
            None
        };
        let Some(duration) = duration else {
            tracing::debug!(source, "media duration not available yet");
            return;
        };

        if let Some(region) = &self.region
            && region.plan.duration_secs == duration
        {
            tracing::debug!(source, duration, "already armed for this duration");
            return;
        }

        if let Err(err) = self.arm(host, duration) {
            if err.is_recoverable() {
                tracing::debug!(source, %err, "arming deferred");
            } else {
                tracing::warn!(source, %err, "arming failed");
            }
        } else {
            tracing::info!(source, duration, "scroll sequence armed");
        }
    }

    fn arm<H>(&mut self, host: &mut H, duration: f64) -> ScrubResult<()>
    where
        H: Host + ?Sized,
    {
        let tail = self.config.tail_fraction_for(duration);
        let plan = RegionPlan::new(duration, host.viewport_height(), tail)?;
        let timeline = Timeline::compile(&self.config.groups, duration)?;

        self.resolve_pending(host, true);

        let region = ScrollRegion {
            trigger: self.config.trigger.clone(),
            start: self.config.start.clone(),
            plan,
        };
        // On a re-size the old pin stays live until its replacement exists.
        let pin = host.create_pin(&PinRequest {
            trigger: region.trigger.clone(),
            start: region.start.clone(),
            length_in_scroll_units: region.length_in_scroll_units(),
        })?;
        if let Some(old) = self.pin.replace(pin) {
            host.destroy_pin(old);
        }

        tracing::debug!(
            media_units = plan.media_units,
            total_units = plan.total_units,
            video_end = plan.video_end_fraction(),
            "region sized"
        );
        self.region = Some(region);
        self.timeline = Some(timeline);
        self.playback.arm(duration);
        self.state = EngineState::Armed;
        Ok(())
    }

    /// Scroll update from the pin. Returns `None` while the engine is not armed.
    pub fn on_progress<H>(&mut self, raw_progress: f64, host: &mut H) -> Option<FrameReport>
    where
        H: DurationProvider + ElementHost + ?Sized,
    {
        if !matches!(self.state, EngineState::Armed | EngineState::Active) {
            tracing::trace!(state = ?self.state, "progress before arming");
            return None;
        }
        let content_progress = self.region.as_ref()?.plan.content_progress(raw_progress);
        let media_position = self.playback.seek(content_progress, host);
        let style_writes = self.apply_at(content_progress, host);
        self.state = EngineState::Active;
        tracing::trace!(raw_progress, content_progress, style_writes, "frame");
        Some(FrameReport {
            content_progress,
            media_position,
            style_writes,
        })
    }

    /// Writes the element states implied by `content_progress`, skipping
    /// properties whose value is unchanged. Returns the number of elements written.
    pub fn apply_at<H>(&mut self, content_progress: f64, host: &mut H) -> usize
    where
        H: ElementHost + ?Sized,
    {
        let Some(timeline) = &self.timeline else {
            return 0;
        };

        let mut writes = Vec::new();
        for state in timeline.sample(content_progress) {
            let Some(element) = self.elements[state.group] else {
                continue;
            };
            let applied = self.applied[state.group].get_or_insert_with(PropertyMap::new);
            let changed: PropertyMap = state
                .props
                .into_iter()
                .filter(|(k, v)| applied.get(k) != Some(v))
                .collect();
            if changed.is_empty() {
                continue;
            }
            applied.extend(changed.iter().map(|(k, v)| (k.clone(), v.clone())));
            writes.push(StyleWrite {
                element,
                props: changed,
            });
        }

        if !writes.is_empty() {
            host.commit(&writes);
        }
        writes.len()
    }

    /// Unmounts: releases the pin and stops reacting to readiness or progress.
    #[tracing::instrument(skip_all)]
    pub fn detach<H>(&mut self, host: &mut H)
    where
        H: ProgressSource + ?Sized,
    {
        if self.state == EngineState::TornDown {
            return;
        }
        if let Some(pin) = self.pin.take() {
            host.destroy_pin(pin);
        }
        self.region = None;
        self.timeline = None;
        self.playback.disarm();
        self.elements.iter_mut().for_each(|e| *e = None);
        self.applied.iter_mut().for_each(|a| *a = None);
        self.state = EngineState::TornDown;
        tracing::info!("scroll sequence torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Band, GroupConfig, Target};

    #[derive(Default)]
    struct Stub {
        ready: bool,
        duration: Option<f64>,
        pins: Vec<PinRequest>,
        destroyed: Vec<PinId>,
        commits: Vec<Vec<StyleWrite>>,
    }

    impl ProgressSource for Stub {
        fn viewport_height(&self) -> f64 {
            800.0
        }

        fn create_pin(&mut self, request: &PinRequest) -> ScrubResult<PinId> {
            self.pins.push(request.clone());
            Ok(PinId(self.pins.len() as u64))
        }

        fn destroy_pin(&mut self, pin: PinId) {
            self.destroyed.push(pin);
        }
    }

    impl DurationProvider for Stub {
        fn is_ready(&self) -> bool {
            self.ready
        }

        fn duration(&self) -> Option<f64> {
            self.duration
        }

        fn set_position(&mut self, _secs: f64) {}
    }

    impl ElementHost for Stub {
        fn resolve(&mut self, target: &Target) -> Option<ElementId> {
            (target.name() != "missing").then_some(ElementId(target.name().len() as u64))
        }

        fn commit(&mut self, writes: &[StyleWrite]) {
            self.commits.push(writes.to_vec());
        }
    }

    fn engine() -> ScrollEngine {
        ScrollEngine::new(SequenceConfig {
            groups: vec![GroupConfig::band(
                Target::Selector(".hero-title".to_string()),
                Band {
                    appear_at: 0.06,
                    disappear_at: 0.2,
                    fade: 0.1,
                },
            )],
            ..SequenceConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn arms_immediately_when_media_is_ready() {
        let mut host = Stub {
            ready: true,
            duration: Some(10.0),
            ..Stub::default()
        };
        let mut e = engine();
        e.attach(&mut host).unwrap();
        assert_eq!(e.state(), EngineState::Armed);
        assert_eq!(host.pins.len(), 1);
        assert_eq!(host.pins[0].length_in_scroll_units, 8000.0);
    }

    #[test]
    fn waits_for_readiness_then_arms_once() {
        let mut host = Stub::default();
        let mut e = engine();
        e.attach(&mut host).unwrap();
        assert_eq!(e.state(), EngineState::AwaitingDuration);
        assert!(e.on_progress(0.5, &mut host).is_none());

        host.ready = true;
        host.duration = Some(10.0);
        e.on_media_ready(&mut host);
        e.on_media_ready(&mut host);
        assert_eq!(e.state(), EngineState::Armed);
        assert_eq!(host.pins.len(), 1);
    }

    #[test]
    fn attach_twice_is_rejected() {
        let mut host = Stub::default();
        let mut e = engine();
        e.attach(&mut host).unwrap();
        assert!(matches!(
            e.attach(&mut host),
            Err(ScrubError::Lifecycle(_))
        ));
    }

    #[test]
    fn detach_releases_pin_and_ignores_late_readiness() {
        let mut host = Stub {
            ready: true,
            duration: Some(4.0),
            ..Stub::default()
        };
        let mut e = engine();
        e.attach(&mut host).unwrap();
        e.detach(&mut host);
        e.detach(&mut host);
        assert_eq!(host.destroyed, vec![PinId(1)]);

        e.on_media_ready(&mut host);
        assert_eq!(host.pins.len(), 1);
        assert!(e.on_progress(0.5, &mut host).is_none());
        assert_eq!(e.state(), EngineState::TornDown);
    }
}
