//! Find-the-target rounds.
//!
//! `Challenge` keeps up to four targets and a stream of spawning tokens;
//! `Simple` deals one target and three decoys at fixed spots and re-deals
//! after every hit.

use rand::Rng;
use rand::seq::SliceRandom;

use super::instance::{Instances, scatter};
use super::timers::{Scheduled, Timers};
use super::RoundEngine;
use crate::catalog::{CategoryFilter, Token, random_distinct, random_token};
use crate::config::{ChallengeConfig, SimpleConfig};
use crate::error::{GameError, InsufficientPool};
use crate::mode::GameMode;
use crate::session::Session;
use crate::surface::{BestTimeStore, Handle, Position, Visual};
use crate::tone::Cue;

/// Option spots of a simple round, as fractions of the play area.
const SIMPLE_SPOTS: [(f64, f64); 4] = [(0.2, 0.2), (0.6, 0.2), (0.2, 0.6), (0.6, 0.6)];

#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Challenge(ChallengeConfig),
    Simple(SimpleConfig),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Action {
    Spawn,
    Expire(Handle),
    Celebrate,
    Redeal,
}

pub struct TargetMatch {
    variant: Variant,
    targets: Vec<Token>,
    score: u32,
    instances: Instances,
    timers: Timers<Action>,
    running: bool,
    /// Simple only: the round's target was hit and a re-deal is pending.
    resolved: bool,
}

impl TargetMatch {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            targets: Vec::new(),
            score: 0,
            instances: Instances::default(),
            timers: Timers::default(),
            running: false,
            resolved: false,
        }
    }

    pub fn targets(&self) -> &[Token] {
        &self.targets
    }

    /// Simple rounds always draw from the whole catalog.
    fn categories(&self) -> &CategoryFilter {
        match &self.variant {
            Variant::Challenge(c) => &c.categories,
            Variant::Simple(_) => &CategoryFilter::All,
        }
    }

    fn points(&self) -> u32 {
        match &self.variant {
            Variant::Challenge(c) => c.points_per_hit,
            Variant::Simple(c) => c.points_per_hit,
        }
    }

    fn pool(&self, s: &Session<'_>) -> Vec<Token> {
        s.catalog.pool(self.categories())
    }

    fn update_label(&self, s: &mut Session<'_>) {
        let targets: Vec<&str> = self.targets.iter().map(|t| t.glyph()).collect();
        s.surface.set_label(&format!(
            "<span class=\"targets\">{}</span> Score: {}",
            targets.join(" "),
            self.score
        ));
    }

    /// Draws a fresh set of distinct targets.
    fn pick_targets(&mut self, count: usize, s: &mut Session<'_>) -> Result<(), GameError> {
        let pool = self.pool(s);
        self.targets = random_distinct(&pool, count, &[], s.rng)?;
        Ok(())
    }

    // --- Challenge ---

    fn spawn(&mut self, config: &ChallengeConfig, s: &mut Session<'_>) -> Result<(), GameError> {
        if self.instances.len() >= config.max_live {
            return Ok(());
        }
        let target_visible = self.instances.iter().any(|i| self.targets.contains(&i.token));
        let pool = self.pool(s);
        let decoy = random_distinct(&pool, 1, &self.targets, s.rng).ok().and_then(|d| d.first().copied());
        let show_target = !target_visible || decoy.is_none() || s.rng.gen_bool(config.target_chance);
        let token = match decoy {
            Some(decoy) if !show_target => decoy,
            _ => random_token(&self.targets, s.rng)?,
        };
        let at = scatter(s.surface.client_area(), config.edge_margin, config.edge_offset, s.rng);
        let handle = self.instances.place(s, token, at, config.token_size);
        self.timers.schedule(s.now_ms, config.expire_ms, Action::Expire(handle));
        Ok(())
    }

    /// Swaps `found` for a token that is not any current target.
    fn replace_target(&mut self, found: Token, s: &mut Session<'_>) -> Result<(), GameError> {
        let pool = self.pool(s);
        let drawn = random_distinct(&pool, 1, &self.targets, s.rng)?;
        if let (Some(slot), Some(&next)) = (self.targets.iter_mut().find(|t| **t == found), drawn.first()) {
            log::debug!("target {found} replaced by {next}");
            *slot = next;
        }
        Ok(())
    }

    // --- Simple ---

    fn deal_round(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        let pool = self.pool(s);
        let target = random_token(&pool, s.rng)?;
        let mut options = random_distinct(&pool, SIMPLE_SPOTS.len() - 1, &[target], s.rng)?;
        options.push(target);
        options.shuffle(s.rng);
        self.deal(target, &options, s);
        Ok(())
    }

    /// Lays out `options` on the fixed spots with `target` as the answer.
    fn deal(&mut self, target: Token, options: &[Token], s: &mut Session<'_>) {
        let size = match &self.variant {
            Variant::Simple(c) => c.token_size,
            Variant::Challenge(c) => c.token_size,
        };
        self.instances.clear(s);
        self.targets = vec![target];
        self.resolved = false;
        let (w, h) = s.surface.client_area();
        for (token, (fx, fy)) in options.iter().zip(SIMPLE_SPOTS) {
            self.instances.place(s, *token, Position::new(w * fx, h * fy), size);
        }
        self.update_label(s);
    }

    /// First deal of a round: targets and an initial spawn, or the first
    /// simple option set.
    fn open_round(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        match self.variant.clone() {
            Variant::Challenge(config) => {
                self.pick_targets(config.targets, s)?;
                self.update_label(s);
                self.spawn(&config, s)?;
                self.timers.schedule(s.now_ms, config.spawn_interval_ms, Action::Spawn);
            }
            Variant::Simple(_) => self.deal_round(s)?,
        }
        Ok(())
    }

    fn reset_round(&mut self, s: &mut Session<'_>) {
        self.timers.reset();
        self.instances.clear(s);
        self.targets.clear();
        self.score = 0;
        self.resolved = false;
    }
}

impl Scheduled for TargetMatch {
    type Action = Action;

    fn timers_mut(&mut self) -> &mut Timers<Action> {
        &mut self.timers
    }

    fn fire(&mut self, action: Action, s: &mut Session<'_>) -> Result<(), GameError> {
        match (action, self.variant.clone()) {
            (Action::Spawn, Variant::Challenge(config)) => {
                self.spawn(&config, s)?;
                self.timers.schedule(s.now_ms, config.spawn_interval_ms, Action::Spawn);
            }
            (Action::Expire(handle), _) => {
                self.instances.remove(s, handle);
            }
            (Action::Celebrate, Variant::Simple(config)) => {
                s.celebrate();
                self.timers.schedule(s.now_ms, config.next_round_ms, Action::Redeal);
            }
            (Action::Redeal, Variant::Simple(_)) => self.deal_round(s)?,
            (other, _) => log::warn!("{other:?} does not apply to this variant"),
        }
        Ok(())
    }
}

impl RoundEngine for TargetMatch {
    fn mode(&self) -> GameMode {
        match self.variant {
            Variant::Challenge(_) => GameMode::Challenge,
            Variant::Simple(_) => GameMode::Simple,
        }
    }

    fn start(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        self.reset_round(s);
        s.audio.resume();
        if let Err(err) = self.open_round(s) {
            self.stop(s);
            self.targets.clear();
            return Err(err);
        }
        self.running = true;
        log::info!("{} round started", self.mode());
        Ok(())
    }

    fn stop(&mut self, s: &mut Session<'_>) {
        self.timers.reset();
        self.instances.clear(s);
        self.running = false;
    }

    fn on_click(&mut self, handle: Handle, s: &mut Session<'_>) -> Result<(), GameError> {
        let Some(hit) = self.instances.live(handle) else {
            return Ok(());
        };
        if self.resolved {
            return Ok(());
        }
        if !self.targets.contains(&hit.token) {
            s.play(Cue::Error);
            s.surface.show_feedback(handle, Visual::Shake);
            return Ok(());
        }

        self.score += self.points();
        s.play_token(hit.token);
        match self.variant.clone() {
            Variant::Challenge(_) => {
                s.celebrate();
                self.instances.remove(s, handle);
                self.replace_target(hit.token, s)?;
            }
            Variant::Simple(config) => {
                self.resolved = true;
                self.instances.resolve(s, handle, Visual::Vanish);
                self.timers.schedule(s.now_ms, config.vanish_ms, Action::Celebrate);
            }
        }
        self.update_label(s);
        Ok(())
    }

    fn tick(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        self.run_due(s)
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn live_count(&self) -> usize {
        self.instances.len()
    }

    fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    fn idle_label(&self, _store: &dyn BestTimeStore) -> String {
        match self.variant {
            Variant::Challenge(_) => "🎯 Find the emojis! Press Start".to_string(),
            Variant::Simple(_) => "🔎 Find the emoji! Press Start".to_string(),
        }
    }

    fn score(&self) -> Option<u32> {
        Some(self.score)
    }

    /// Challenge only. Any accepted change restarts from zero, even an
    /// unchanged filter; a filter too small for the targets is refused and
    /// leaves the round untouched.
    fn set_categories(&mut self, filter: CategoryFilter, s: &mut Session<'_>) -> Result<(), GameError> {
        let Variant::Challenge(config) = &mut self.variant else {
            log::debug!("category filter ignored in simple rounds");
            return Ok(());
        };
        let available = s.catalog.pool(&filter).len();
        if available < config.min_pool() {
            log::warn!("category filter {filter:?} leaves only {available} tokens");
            return Err(InsufficientPool { requested: config.min_pool(), available }.into());
        }
        config.categories = filter;
        log::info!("categories changed, resetting challenge round");
        if self.running {
            self.start(s)
        } else {
            self.reset_round(s);
            Ok(())
        }
    }
}
