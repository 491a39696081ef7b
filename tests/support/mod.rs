#![allow(dead_code)]

use std::collections::BTreeMap;

use scrubline::{
    DurationProvider, ElementHost, ElementId, PinId, PinRequest, ProgressSource, PropertyMap,
    ScrubError, ScrubResult, SequenceConfig, StyleWrite, Target,
};

pub fn hero_config() -> SequenceConfig {
    SequenceConfig::from_json_str(include_str!("../data/hero_sequence.json")).unwrap()
}

/// In-memory page: records pins, media seeks and the live style of every element.
#[derive(Debug)]
pub struct Page {
    pub ready: bool,
    pub duration: Option<f64>,
    pub viewport: f64,
    pub unresolvable: Vec<String>,
    pub refuse_pins: bool,
    pub pins_created: Vec<(PinId, PinRequest)>,
    pub pins_destroyed: Vec<PinId>,
    pub position: Option<f64>,
    pub position_writes: usize,
    pub styles: BTreeMap<ElementId, PropertyMap>,
    pub ids: BTreeMap<Target, ElementId>,
    pub commits: Vec<Vec<StyleWrite>>,
}

impl Page {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            ready: duration.is_some(),
            duration,
            viewport: 800.0,
            unresolvable: Vec::new(),
            refuse_pins: false,
            pins_created: Vec::new(),
            pins_destroyed: Vec::new(),
            position: None,
            position_writes: 0,
            styles: BTreeMap::new(),
            ids: BTreeMap::new(),
            commits: Vec::new(),
        }
    }

    pub fn load_metadata(&mut self, duration: f64) {
        self.ready = true;
        self.duration = Some(duration);
    }

    pub fn live_pins(&self) -> Vec<PinId> {
        self.pins_created
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| !self.pins_destroyed.contains(id))
            .collect()
    }

    pub fn style(&self, target: &Target) -> &PropertyMap {
        &self.styles[&self.ids[target]]
    }

    pub fn opacity(&self, selector: &str) -> f64 {
        self.style(&Target::Selector(selector.to_string()))["opacity"]
            .as_number()
            .unwrap()
    }

    pub fn visibility(&self, selector: &str) -> String {
        self.style(&Target::Selector(selector.to_string()))["visibility"].to_string()
    }
}

impl ProgressSource for Page {
    fn viewport_height(&self) -> f64 {
        self.viewport
    }

    fn create_pin(&mut self, request: &PinRequest) -> ScrubResult<PinId> {
        if self.refuse_pins {
            return Err(ScrubError::lifecycle("scroll container is detached"));
        }
        let id = PinId(self.pins_created.len() as u64 + 1);
        self.pins_created.push((id, request.clone()));
        Ok(id)
    }

    fn destroy_pin(&mut self, pin: PinId) {
        self.pins_destroyed.push(pin);
    }
}

impl DurationProvider for Page {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_position(&mut self, secs: f64) {
        self.position = Some(secs);
        self.position_writes += 1;
    }
}

impl ElementHost for Page {
    fn resolve(&mut self, target: &Target) -> Option<ElementId> {
        if self.unresolvable.iter().any(|n| n == target.name()) {
            return None;
        }
        let next = ElementId(self.ids.len() as u64 + 1);
        Some(*self.ids.entry(target.clone()).or_insert(next))
    }

    fn commit(&mut self, writes: &[StyleWrite]) {
        for w in writes {
            self.styles
                .entry(w.element)
                .or_default()
                .extend(w.props.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        self.commits.push(writes.to_vec());
    }
}
