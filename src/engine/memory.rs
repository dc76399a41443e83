//! Memory pairs: flip two cards, keep them if they match.

use rand::seq::SliceRandom;

use super::instance::grid;
use super::timers::{Scheduled, Timers};
use super::{Completion, RoundEngine, best_suffix, elapsed_secs};
use crate::catalog::{Token, random_distinct};
use crate::config::MemoryConfig;
use crate::error::GameError;
use crate::mode::GameMode;
use crate::session::Session;
use crate::surface::{BestTimeStore, Handle, Visual, record_best_time};
use crate::tone::Cue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    FaceDown,
    Flipped,
    Matched,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Card {
    handle: Handle,
    token: Token,
    face: Face,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Action {
    Compare,
    Fade(Handle, Handle),
    Remove(Handle, Handle),
    FlipBack(Handle, Handle),
    Finish,
    Summary,
    Teardown,
}

pub struct MemoryPairs {
    config: MemoryConfig,
    cards: Vec<Card>,
    /// Face-up cards waiting for comparison, at most two.
    pending: Vec<Handle>,
    matched_pairs: usize,
    started_at: f64,
    /// Clock reading at the final match.
    stopped_at: Option<f64>,
    completion: Option<Completion>,
    timers: Timers<Action>,
    running: bool,
}

impl MemoryPairs {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            cards: Vec::new(),
            pending: Vec::with_capacity(2),
            matched_pairs: 0,
            started_at: 0.0,
            stopped_at: None,
            completion: None,
            timers: Timers::default(),
            running: false,
        }
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> usize {
        self.config.pairs
    }

    pub fn face_of(&self, handle: Handle) -> Option<Face> {
        self.card(handle).map(|c| c.face)
    }

    fn card(&self, handle: Handle) -> Option<&Card> {
        self.cards.iter().find(|c| c.handle == handle)
    }

    fn set_face(&mut self, s: &mut Session<'_>, handle: Handle, face: Face, visual: Visual) {
        if let Some(card) = self.cards.iter_mut().find(|c| c.handle == handle) {
            card.face = face;
            s.surface.show_feedback(handle, visual);
        }
    }

    fn clear_cards(&mut self, s: &mut Session<'_>) {
        for card in self.cards.drain(..) {
            s.surface.remove_token(card.handle);
        }
        self.pending.clear();
    }

    fn deal(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        let catalog = s.catalog;
        let picks = random_distinct(catalog.all_tokens(), self.config.pairs, &[], s.rng)?;
        let mut deck: Vec<Token> = picks.iter().chain(picks.iter()).copied().collect();
        deck.shuffle(s.rng);

        let columns = self
            .config
            .columns
            .unwrap_or_else(|| (deck.len() as f64).sqrt().ceil() as usize)
            .max(1);
        let rows = deck.len().div_ceil(columns);
        let spots = grid(s.surface.client_area(), columns, rows, self.config.card_size, self.config.spacing);
        for (token, at) in deck.into_iter().zip(spots) {
            let handle = s.surface.place_token(token, at, self.config.card_size);
            s.surface.show_feedback(handle, Visual::FaceDown);
            self.cards.push(Card { handle, token, face: Face::FaceDown });
        }
        Ok(())
    }

    fn update_label(&self, s: &mut Session<'_>) {
        s.surface.set_label(&format!(
            "🧠 Find the pairs! {}/{}{}",
            self.matched_pairs,
            self.config.pairs,
            best_suffix(&*s.store, &self.config.best_time_key)
        ));
    }

    fn compare(&mut self, s: &mut Session<'_>) {
        let pair: Vec<Handle> = self.pending.drain(..).collect();
        let &[a, b] = pair.as_slice() else {
            return;
        };
        let (Some(first), Some(second)) = (self.card(a).copied(), self.card(b).copied()) else {
            return;
        };

        if first.token == second.token {
            self.set_face(s, a, Face::Matched, Visual::Matched);
            self.set_face(s, b, Face::Matched, Visual::Matched);
            s.play(Cue::Success);
            self.matched_pairs = (self.matched_pairs + 1).min(self.config.pairs);
            self.update_label(s);
            self.timers.schedule(s.now_ms, self.config.fade_ms, Action::Fade(a, b));
            if self.matched_pairs == self.config.pairs && self.stopped_at.is_none() {
                self.stopped_at = Some(s.now_ms);
                self.timers.schedule(s.now_ms, self.config.complete_ms, Action::Finish);
            }
        } else {
            s.play(Cue::MatchError);
            self.timers.schedule(s.now_ms, self.config.flip_back_ms, Action::FlipBack(a, b));
        }
    }

    fn finish(&mut self, s: &mut Session<'_>) {
        if self.completion.is_some() {
            return;
        }
        let stopped = self.stopped_at.unwrap_or(s.now_ms);
        let elapsed = elapsed_secs(self.started_at, stopped);
        let new_best = record_best_time(s.store, &self.config.best_time_key, elapsed);
        let best = s.store.best_time(&self.config.best_time_key).unwrap_or(elapsed);
        log::info!("memory round cleared in {elapsed}s (best {best}s)");
        self.completion = Some(Completion {
            mode: GameMode::Memory,
            elapsed_secs: elapsed,
            best_secs: best,
            new_best,
        });
        s.celebrate();
        self.timers.schedule(s.now_ms, self.config.summary_ms, Action::Summary);
        self.timers.schedule(s.now_ms, self.config.teardown_ms, Action::Teardown);
    }
}

impl Scheduled for MemoryPairs {
    type Action = Action;

    fn timers_mut(&mut self) -> &mut Timers<Action> {
        &mut self.timers
    }

    fn fire(&mut self, action: Action, s: &mut Session<'_>) -> Result<(), GameError> {
        match action {
            Action::Compare => self.compare(s),
            Action::Fade(a, b) => {
                s.surface.show_feedback(a, Visual::Fade);
                s.surface.show_feedback(b, Visual::Fade);
                self.timers.schedule(s.now_ms, self.config.remove_ms, Action::Remove(a, b));
            }
            Action::Remove(a, b) => {
                self.cards.retain(|c| c.handle != a && c.handle != b);
                s.surface.remove_token(a);
                s.surface.remove_token(b);
            }
            Action::FlipBack(a, b) => {
                for handle in [a, b] {
                    if self.face_of(handle) == Some(Face::Flipped) {
                        self.set_face(s, handle, Face::FaceDown, Visual::FaceDown);
                    }
                }
            }
            Action::Finish => self.finish(s),
            Action::Summary => {
                if let Some(done) = &self.completion {
                    s.surface.set_label(&done.summary("🎉 Congratulations! 🎉"));
                }
            }
            Action::Teardown => {
                self.stop(s);
                let idle = self.idle_label(&*s.store);
                s.surface.set_label(&idle);
            }
        }
        Ok(())
    }
}

impl RoundEngine for MemoryPairs {
    fn mode(&self) -> GameMode {
        GameMode::Memory
    }

    fn start(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        self.stop(s);
        self.matched_pairs = 0;
        self.stopped_at = None;
        self.completion = None;
        self.started_at = s.now_ms;
        s.audio.resume();
        if let Err(err) = self.deal(s) {
            self.stop(s);
            return Err(err);
        }
        self.running = true;
        log::info!("memory round started with {} pairs", self.config.pairs);
        self.update_label(s);
        Ok(())
    }

    fn stop(&mut self, s: &mut Session<'_>) {
        self.timers.reset();
        self.clear_cards(s);
        self.running = false;
    }

    fn on_click(&mut self, handle: Handle, s: &mut Session<'_>) -> Result<(), GameError> {
        if self.pending.len() >= 2 || self.face_of(handle) != Some(Face::FaceDown) {
            return Ok(());
        }
        self.set_face(s, handle, Face::Flipped, Visual::FaceUp);
        s.play(Cue::Flip);
        self.pending.push(handle);
        if self.pending.len() == 2 {
            self.timers.schedule(s.now_ms, self.config.reveal_ms, Action::Compare);
        }
        Ok(())
    }

    fn tick(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        self.run_due(s)
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn live_count(&self) -> usize {
        self.cards.len()
    }

    fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    fn idle_label(&self, store: &dyn BestTimeStore) -> String {
        format!("🧠 Memory game{}", best_suffix(store, &self.config.best_time_key))
    }

    fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testkit::Rig;

    fn started(rig: &mut Rig) -> MemoryPairs {
        let mut engine = MemoryPairs::new(MemoryConfig::default());
        engine.start(&mut rig.session()).unwrap();
        engine
    }

    /// Handles of one matching pair and one card of the other pair.
    fn pair_and_other(engine: &MemoryPairs) -> ((Handle, Handle), Handle) {
        let first = engine.cards[0];
        let twin = engine.cards.iter().skip(1).find(|c| c.token == first.token).unwrap();
        let other = engine.cards.iter().find(|c| c.token != first.token).unwrap();
        ((first.handle, twin.handle), other.handle)
    }

    #[test]
    fn oversized_deck_fails_without_starting() {
        let mut rig = Rig::new(30);
        let mut engine = MemoryPairs::new(MemoryConfig { pairs: 60, ..MemoryConfig::default() });
        let err = engine.start(&mut rig.session()).unwrap_err();
        assert!(matches!(err, GameError::InsufficientPool(_)));
        assert!(!engine.is_running());
        assert_eq!(engine.live_count(), 0);
        assert_eq!(engine.pending_timers(), 0);
        assert_eq!(rig.surface.live_count(), 0);
    }

    #[test]
    fn deals_doubled_distinct_tokens() {
        let mut rig = Rig::new(31);
        let engine = started(&mut rig);
        let mut tokens = rig.surface.tokens();
        assert_eq!(tokens.len(), 4);
        tokens.sort();
        assert_eq!(tokens[0], tokens[1]);
        assert_eq!(tokens[2], tokens[3]);
        assert_ne!(tokens[0], tokens[2]);
        assert!(engine.cards.iter().all(|c| c.face == Face::FaceDown));
    }

    #[test]
    fn matching_pair_is_kept_then_removed() {
        let mut rig = Rig::new(32);
        let mut engine = started(&mut rig);
        let ((a, b), _) = pair_and_other(&engine);

        engine.on_click(a, &mut rig.at(100.0)).unwrap();
        engine.on_click(b, &mut rig.at(200.0)).unwrap();
        assert_eq!(rig.sink.cues(), vec![Cue::Flip, Cue::Flip]);

        engine.tick(&mut rig.at(800.0)).unwrap();
        assert_eq!(engine.face_of(a), Some(Face::Matched));
        assert_eq!(engine.face_of(b), Some(Face::Matched));
        assert_eq!(engine.matched_pairs(), 1);
        assert_eq!(rig.sink.cues().last(), Some(&Cue::Success));

        engine.tick(&mut rig.at(1300.0)).unwrap();
        assert_eq!(rig.surface.placed(a).unwrap().visual, Some(Visual::Fade));
        engine.tick(&mut rig.at(1600.0)).unwrap();
        assert!(rig.surface.placed(a).is_none());
        assert_eq!(engine.live_count(), 2);
    }

    #[test]
    fn mismatch_flips_back_after_delay() {
        let mut rig = Rig::new(33);
        let mut engine = started(&mut rig);
        let ((a, _), other) = pair_and_other(&engine);

        engine.on_click(a, &mut rig.session()).unwrap();
        engine.on_click(other, &mut rig.session()).unwrap();
        engine.tick(&mut rig.at(600.0)).unwrap();
        assert_eq!(rig.sink.cues().last(), Some(&Cue::MatchError));
        assert_eq!(engine.face_of(a), Some(Face::Flipped));

        engine.tick(&mut rig.at(1599.0)).unwrap();
        assert_eq!(engine.face_of(other), Some(Face::Flipped));
        engine.tick(&mut rig.at(1600.0)).unwrap();
        assert_eq!(engine.face_of(a), Some(Face::FaceDown));
        assert_eq!(engine.face_of(other), Some(Face::FaceDown));
        assert_eq!(engine.matched_pairs(), 0);
    }

    #[test]
    fn third_click_and_repeat_clicks_are_ignored() {
        let mut rig = Rig::new(34);
        let mut engine = started(&mut rig);
        let ((a, b), other) = pair_and_other(&engine);

        engine.on_click(a, &mut rig.session()).unwrap();
        engine.on_click(a, &mut rig.session()).unwrap();
        assert_eq!(rig.sink.cues().len(), 1);
        engine.on_click(other, &mut rig.session()).unwrap();
        engine.on_click(b, &mut rig.session()).unwrap();
        assert_eq!(rig.sink.cues().len(), 2);
        assert_eq!(engine.face_of(b), Some(Face::FaceDown));
        assert_eq!(engine.pending_timers(), 1);
    }

    #[test]
    fn completion_fires_once_with_stopped_clock() {
        let mut rig = Rig::new(35);
        let mut engine = started(&mut rig);
        let tokens: Vec<Token> = {
            let mut t: Vec<Token> = engine.cards.iter().map(|c| c.token).collect();
            t.sort();
            t.dedup();
            t
        };

        let mut now = 0.0;
        for token in tokens {
            let pair: Vec<Handle> =
                engine.cards.iter().filter(|c| c.token == token).map(|c| c.handle).collect();
            now += 2000.0;
            engine.on_click(pair[0], &mut rig.at(now)).unwrap();
            engine.on_click(pair[1], &mut rig.at(now)).unwrap();
            engine.tick(&mut rig.at(now + 600.0)).unwrap();
        }
        assert_eq!(engine.matched_pairs(), 2);
        assert!(engine.completion().is_none());

        // Final match at 4600; the clock stops there even though we tick later.
        engine.tick(&mut rig.at(5600.0)).unwrap();
        let done = engine.completion().cloned().unwrap();
        assert_eq!(done.elapsed_secs, 4);
        assert!(done.new_best);
        assert_eq!(rig.store.best_time("memoryGameBestTime"), Some(4));
        assert_eq!(rig.surface.celebrations().len(), 1);

        engine.tick(&mut rig.at(6100.0)).unwrap();
        assert!(rig.surface.label().contains("Time: 0:04"));
        engine.tick(&mut rig.at(8100.0)).unwrap();
        assert!(!engine.is_running());
        assert_eq!(engine.live_count(), 0);
        assert_eq!(engine.pending_timers(), 0);
        assert!(rig.surface.label().contains("🏆 0:04"));
        assert_eq!(rig.surface.celebrations().len(), 1);
        assert_eq!(engine.completion(), Some(&done));
    }
}
