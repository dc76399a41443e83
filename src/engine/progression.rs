//! Ten-level ladder: find every copy of the target in a growing grid.

use rand::seq::SliceRandom;

use super::instance::{Instances, fit_cell, grid};
use super::timers::{Scheduled, Timers};
use super::{Completion, RoundEngine, best_suffix, elapsed_secs};
use crate::catalog::{Token, random_distinct, random_token};
use crate::config::LevelsConfig;
use crate::error::GameError;
use crate::mode::GameMode;
use crate::session::Session;
use crate::surface::{BestTimeStore, Handle, Visual, record_best_time};
use crate::tone::Cue;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelSpec {
    pub level: u8,
    pub cells: usize,
    pub columns: usize,
    pub rows: usize,
    pub targets: usize,
    pub token_size: f64,
}

impl LevelSpec {
    /// Target copies placed on the grid. The first five levels hide one.
    pub fn required(&self) -> usize {
        if self.level <= 5 { 1 } else { self.targets }
    }
}

const fn level(level: u8, columns: usize, rows: usize, targets: usize, token_size: f64) -> LevelSpec {
    LevelSpec { level, cells: columns * rows, columns, rows, targets, token_size }
}

pub static LEVELS: [LevelSpec; 10] = [
    level(1, 2, 2, 1, 80.0),
    level(2, 4, 2, 1, 70.0),
    level(3, 4, 4, 2, 65.0),
    level(4, 4, 4, 2, 65.0),
    level(5, 8, 4, 3, 60.0),
    level(6, 8, 4, 3, 60.0),
    level(7, 8, 4, 4, 55.0),
    level(8, 8, 4, 4, 55.0),
    level(9, 8, 8, 5, 50.0),
    level(10, 8, 8, 6, 50.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Action {
    LevelComplete,
    Advance,
    Summary,
}

pub struct Progression {
    config: LevelsConfig,
    /// Index into [`LEVELS`].
    level: usize,
    target: Option<Token>,
    found: usize,
    started_at: f64,
    completion: Option<Completion>,
    instances: Instances,
    timers: Timers<Action>,
    running: bool,
}

impl Progression {
    pub fn new(config: LevelsConfig) -> Self {
        Self {
            config,
            level: 0,
            target: None,
            found: 0,
            started_at: 0.0,
            completion: None,
            instances: Instances::default(),
            timers: Timers::default(),
            running: false,
        }
    }

    pub fn current_level(&self) -> &'static LevelSpec {
        &LEVELS[self.level]
    }

    pub fn target(&self) -> Option<Token> {
        self.target
    }

    pub fn found(&self) -> usize {
        self.found
    }

    fn level_done(&self) -> bool {
        self.found >= self.current_level().required()
    }

    fn build_level(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        let spec = self.current_level();
        let required = spec.required();
        let catalog = s.catalog;
        let all = catalog.all_tokens();
        let target = random_token(all, s.rng)?;
        let mut cells = vec![target; required];
        cells.extend(random_distinct(all, spec.cells - required, &[target], s.rng)?);
        cells.shuffle(s.rng);

        self.instances.clear(s);
        self.target = Some(target);
        self.found = 0;

        let area = s.surface.client_area();
        let cell = fit_cell(area, spec.columns, spec.rows, self.config.spacing, self.config.fill_ratio, spec.token_size);
        for (token, at) in cells.into_iter().zip(grid(area, spec.columns, spec.rows, cell, self.config.spacing)) {
            self.instances.place(s, token, at, cell);
        }
        log::debug!("level {} with target {target} x{required}", spec.level);
        self.update_label(s);
        Ok(())
    }

    fn update_label(&self, s: &mut Session<'_>) {
        let spec = self.current_level();
        let glyph = self.target.map(Token::glyph).unwrap_or("");
        let best = best_suffix(&*s.store, &self.config.best_time_key);
        let progress = if spec.required() > 1 {
            format!("Level {} - find {} more!", spec.level, spec.required() - self.found)
        } else {
            format!("Level {}/{}", spec.level, LEVELS.len())
        };
        s.surface.set_label(&format!("<span class=\"targets\">{glyph}</span> {progress}{best}"));
    }

    fn finish(&mut self, s: &mut Session<'_>) {
        if self.completion.is_some() {
            return;
        }
        self.instances.clear(s);
        let elapsed = elapsed_secs(self.started_at, s.now_ms);
        let new_best = record_best_time(s.store, &self.config.best_time_key, elapsed);
        let best = s.store.best_time(&self.config.best_time_key).unwrap_or(elapsed);
        log::info!("all levels cleared in {elapsed}s (best {best}s)");
        self.completion = Some(Completion {
            mode: GameMode::Levels,
            elapsed_secs: elapsed,
            best_secs: best,
            new_best,
        });
        s.celebrate();
        self.timers.schedule(s.now_ms, self.config.summary_ms, Action::Summary);
    }
}

impl Scheduled for Progression {
    type Action = Action;

    fn timers_mut(&mut self) -> &mut Timers<Action> {
        &mut self.timers
    }

    fn fire(&mut self, action: Action, s: &mut Session<'_>) -> Result<(), GameError> {
        match action {
            Action::LevelComplete => {
                s.celebrate();
                self.timers.schedule(s.now_ms, self.config.advance_ms, Action::Advance);
            }
            Action::Advance if self.level + 1 >= LEVELS.len() => self.finish(s),
            Action::Advance => {
                self.level += 1;
                log::info!("advancing to level {}", self.current_level().level);
                self.build_level(s)?;
            }
            Action::Summary => {
                if let Some(done) = &self.completion {
                    s.surface.set_label(&done.summary("🎉 All 10 levels done! 🎉"));
                }
                self.running = false;
            }
        }
        Ok(())
    }
}

impl RoundEngine for Progression {
    fn mode(&self) -> GameMode {
        GameMode::Levels
    }

    fn start(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        self.stop(s);
        self.level = 0;
        self.completion = None;
        self.started_at = s.now_ms;
        s.audio.resume();
        if let Err(err) = self.build_level(s) {
            self.stop(s);
            return Err(err);
        }
        self.running = true;
        log::info!("levels started");
        Ok(())
    }

    fn stop(&mut self, s: &mut Session<'_>) {
        self.timers.reset();
        self.instances.clear(s);
        self.target = None;
        self.running = false;
    }

    fn on_click(&mut self, handle: Handle, s: &mut Session<'_>) -> Result<(), GameError> {
        let Some(hit) = self.instances.live(handle) else {
            return Ok(());
        };
        if self.level_done() {
            return Ok(());
        }
        if Some(hit.token) != self.target {
            s.play(Cue::Error);
            s.surface.show_feedback(handle, Visual::Shake);
            return Ok(());
        }

        self.found += 1;
        s.play_token(hit.token);
        self.instances.resolve(s, handle, Visual::Found);
        self.update_label(s);
        if self.level_done() {
            self.timers.schedule(s.now_ms, self.config.level_complete_ms, Action::LevelComplete);
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
        self.instances.len()
    }

    fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    fn idle_label(&self, store: &dyn BestTimeStore) -> String {
        format!("🎈 Levels: find the emoji!{}", best_suffix(store, &self.config.best_time_key))
    }

    fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }
}
