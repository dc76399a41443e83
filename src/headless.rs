//! In-memory collaborators for native runs and tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::catalog::Token;
use crate::surface::{BestTimeStore, Celebration, Handle, Position, Surface, Visual};
use crate::tone::{AudioSink, Cue, ToneSpec};

#[derive(Clone, Debug, PartialEq)]
pub struct Placed {
    pub token: Token,
    pub at: Position,
    pub size: f64,
    /// Last visual requested for this token.
    pub visual: Option<Visual>,
}

/// Surface that only remembers what it was asked to show.
#[derive(Debug)]
pub struct HeadlessSurface {
    area: (f64, f64),
    next_handle: u32,
    placed: BTreeMap<Handle, Placed>,
    label: String,
    celebrations: Vec<Celebration>,
    feedback: Vec<(Handle, Visual)>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

impl HeadlessSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            area: (width, height),
            next_handle: 1,
            placed: BTreeMap::new(),
            label: String::new(),
            celebrations: Vec::new(),
            feedback: Vec::new(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.placed.len()
    }

    pub fn placed(&self, handle: Handle) -> Option<&Placed> {
        self.placed.get(&handle)
    }

    /// Tokens on screen in placement order.
    pub fn tokens(&self) -> Vec<Token> {
        self.placed.values().map(|p| p.token).collect()
    }

    pub fn handles(&self) -> Vec<Handle> {
        self.placed.keys().copied().collect()
    }

    pub fn handles_of(&self, token: Token) -> Vec<Handle> {
        self.placed
            .iter()
            .filter(|(_, p)| p.token == token)
            .map(|(h, _)| *h)
            .collect()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn celebrations(&self) -> &[Celebration] {
        &self.celebrations
    }

    pub fn feedback(&self) -> &[(Handle, Visual)] {
        &self.feedback
    }
}

impl Surface for HeadlessSurface {
    fn place_token(&mut self, token: Token, at: Position, size: f64) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        self.placed.insert(handle, Placed { token, at, size, visual: None });
        handle
    }

    fn remove_token(&mut self, handle: Handle) {
        self.placed.remove(&handle);
    }

    fn client_area(&self) -> (f64, f64) {
        self.area
    }

    fn set_label(&mut self, markup: &str) {
        self.label = markup.to_string();
    }

    fn pulse_celebration(&mut self, celebration: &Celebration) {
        self.celebrations.push(celebration.clone());
    }

    fn show_feedback(&mut self, handle: Handle, visual: Visual) {
        if let Some(p) = self.placed.get_mut(&handle) {
            p.visual = Some(visual);
        }
        self.feedback.push((handle, visual));
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    times: HashMap<String, u64>,
}

impl BestTimeStore for MemoryStore {
    fn best_time(&self, key: &str) -> Option<u64> {
        self.times.get(key).copied()
    }

    fn set_best_time(&mut self, key: &str, seconds: u64) {
        self.times.insert(key.to_string(), seconds);
    }
}

/// Audio sink that records every cue. Clones share the same log, so a test
/// can keep one while the synthesizer owns another.
#[derive(Clone, Default)]
pub struct RecordingSink {
    played: Rc<RefCell<Vec<(Cue, Vec<ToneSpec>)>>>,
}

impl RecordingSink {
    pub fn cues(&self) -> Vec<Cue> {
        self.played.borrow().iter().map(|(c, _)| *c).collect()
    }

    pub fn last_tones(&self) -> Option<Vec<ToneSpec>> {
        self.played.borrow().last().map(|(_, t)| t.clone())
    }

    pub fn clear(&self) {
        self.played.borrow_mut().clear();
    }
}

impl AudioSink for RecordingSink {
    fn play(&mut self, cue: Cue, tones: &[ToneSpec]) {
        self.played.borrow_mut().push((cue, tones.to_vec()));
    }
}
