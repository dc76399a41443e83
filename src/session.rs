use rand::rngs::StdRng;

use crate::catalog::{Catalog, Token};
use crate::surface::{BestTimeStore, Celebration, Surface};
use crate::tone::{Cue, ToneSynth};

/// Everything an engine may touch while handling one event.
///
/// Built by the mode manager for the duration of a single call, so engines
/// never hold references to each other or to shared globals.
pub struct Session<'a> {
    pub surface: &'a mut dyn Surface,
    pub audio: &'a mut ToneSynth,
    pub store: &'a mut dyn BestTimeStore,
    pub catalog: &'a Catalog,
    pub rng: &'a mut StdRng,
    /// Host clock in milliseconds. While a timer fires this is its due time.
    pub now_ms: f64,
}

impl Session<'_> {
    pub fn play(&mut self, cue: Cue) {
        self.audio.play_cue(cue);
    }

    /// Plays the cue the catalog assigns to `token`.
    pub fn play_token(&mut self, token: Token) {
        let cue = self.catalog.cue_for(token);
        self.audio.play_cue(cue);
    }

    pub fn celebrate(&mut self) {
        self.surface.pulse_celebration(&Celebration::message(Celebration::WELL_DONE));
    }
}
