//! Free play: tokens pop up at random spots, every click is a hit.

use rand::seq::SliceRandom;

use super::instance::{Instances, scatter};
use super::timers::{Scheduled, Timers};
use super::RoundEngine;
use crate::catalog::random_token;
use crate::config::FreeSpawnConfig;
use crate::error::GameError;
use crate::mode::GameMode;
use crate::session::Session;
use crate::surface::{BestTimeStore, Celebration, Handle, Visual};

/// Background colours for the hit flash.
pub const CELEBRATION_COLORS: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Action {
    Spawn,
    Expire(Handle),
    Vanish(Handle),
}

pub struct FreeSpawn {
    config: FreeSpawnConfig,
    instances: Instances,
    timers: Timers<Action>,
    running: bool,
}

impl FreeSpawn {
    pub fn new(config: FreeSpawnConfig) -> Self {
        Self { config, instances: Instances::default(), timers: Timers::default(), running: false }
    }

    fn spawn(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        if self.instances.len() >= self.config.max_live {
            return Ok(());
        }
        let token = random_token(s.catalog.all_tokens(), s.rng)?;
        let at = scatter(s.surface.client_area(), self.config.edge_margin, self.config.edge_offset, s.rng);
        let handle = self.instances.place(s, token, at, self.config.token_size);
        self.timers.schedule(s.now_ms, self.config.expire_ms, Action::Expire(handle));
        Ok(())
    }
}

impl Scheduled for FreeSpawn {
    type Action = Action;

    fn timers_mut(&mut self) -> &mut Timers<Action> {
        &mut self.timers
    }

    fn fire(&mut self, action: Action, s: &mut Session<'_>) -> Result<(), GameError> {
        match action {
            Action::Spawn => {
                self.spawn(s)?;
                self.timers.schedule(s.now_ms, self.config.spawn_interval_ms, Action::Spawn);
            }
            Action::Expire(handle) => {
                // A token already hit is left to its vanish step.
                if self.instances.live(handle).is_some() {
                    self.instances.remove(s, handle);
                }
            }
            Action::Vanish(handle) => {
                self.instances.remove(s, handle);
                let color = CELEBRATION_COLORS.choose(s.rng).copied().unwrap_or(CELEBRATION_COLORS[0]);
                s.surface.pulse_celebration(&Celebration::flash(color));
            }
        }
        Ok(())
    }
}

impl RoundEngine for FreeSpawn {
    fn mode(&self) -> GameMode {
        GameMode::Free
    }

    fn start(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        self.stop(s);
        s.audio.resume();
        s.surface.set_label("✨ Click the emojis! ✨");
        if let Err(err) = self.spawn(s) {
            self.stop(s);
            return Err(err);
        }
        self.timers.schedule(s.now_ms, self.config.spawn_interval_ms, Action::Spawn);
        self.running = true;
        log::info!("free play started");
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
        s.play_token(hit.token);
        self.instances.resolve(s, handle, Visual::Vanish);
        self.timers.schedule(s.now_ms, self.config.vanish_ms, Action::Vanish(handle));
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
        "🎲 Free play: press Start!".to_string()
    }
}
