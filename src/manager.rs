//! Top-level coordinator: owns every collaborator and exactly one engine.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::{Catalog, CategoryFilter};
use crate::config::GameConfig;
use crate::engine::{
    Completion, FreeSpawn, MemoryPairs, Progression, RoundEngine, TargetMatch, Variant,
};
use crate::error::GameError;
use crate::mode::GameMode;
use crate::session::Session;
use crate::surface::{BestTimeStore, Handle, Surface};
use crate::tone::ToneSynth;

/// Host input, in the form the browser glue queues it.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    NextMode,
    SelectMode(GameMode),
    ToggleRunning,
    ToggleSound,
    Click(Handle),
    SetCategories(CategoryFilter),
}

pub struct ModeManager<S: Surface, B: BestTimeStore> {
    catalog: Catalog,
    config: GameConfig,
    surface: S,
    store: B,
    audio: ToneSynth,
    rng: StdRng,
    mode: GameMode,
    engine: Box<dyn RoundEngine>,
}

fn engine_for(mode: GameMode, config: &GameConfig) -> Box<dyn RoundEngine> {
    match mode {
        GameMode::Free => Box::new(FreeSpawn::new(config.free_spawn.clone())),
        GameMode::Challenge => Box::new(TargetMatch::new(Variant::Challenge(config.challenge.clone()))),
        GameMode::Simple => Box::new(TargetMatch::new(Variant::Simple(config.simple.clone()))),
        GameMode::Levels => Box::new(Progression::new(config.levels.clone())),
        GameMode::Memory => Box::new(MemoryPairs::new(config.memory.clone())),
    }
}

impl<S: Surface, B: BestTimeStore> ModeManager<S, B> {
    /// Validates `config`, then loads `config.initial_mode` idle and shows
    /// its label.
    pub fn new(config: GameConfig, surface: S, store: B, mut audio: ToneSynth) -> Result<Self, GameError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        audio.set_enabled(config.sound_enabled);
        let mode = config.initial_mode;
        let engine = engine_for(mode, &config);
        let mut manager = Self {
            catalog: Catalog::standard(),
            config,
            surface,
            store,
            audio,
            rng,
            mode,
            engine,
        };
        manager.show_idle_label();
        log::info!("loaded {mode} mode");
        Ok(manager)
    }

    /// Runs `f` against the active engine with a session at `now_ms`.
    fn with_engine<R>(&mut self, now_ms: f64, f: impl FnOnce(&mut dyn RoundEngine, &mut Session<'_>) -> R) -> R {
        let mut session = Session {
            surface: &mut self.surface,
            audio: &mut self.audio,
            store: &mut self.store,
            catalog: &self.catalog,
            rng: &mut self.rng,
            now_ms,
        };
        f(self.engine.as_mut(), &mut session)
    }

    fn show_idle_label(&mut self) {
        let label = self.engine.idle_label(&self.store);
        self.surface.set_label(&label);
    }

    pub fn apply(&mut self, command: Command, now_ms: f64) -> Result<(), GameError> {
        match command {
            Command::NextMode => {
                self.next_mode(now_ms);
                Ok(())
            }
            Command::SelectMode(mode) => {
                self.select_mode(mode, now_ms);
                Ok(())
            }
            Command::ToggleRunning => self.toggle_running(now_ms),
            Command::ToggleSound => {
                self.toggle_sound();
                Ok(())
            }
            Command::Click(handle) => self.click(handle, now_ms),
            Command::SetCategories(filter) => self.set_categories(filter, now_ms),
        }
    }

    /// Tears down the current round and loads the next mode of the cycle.
    pub fn next_mode(&mut self, now_ms: f64) -> GameMode {
        let next = self.mode.next();
        self.select_mode(next, now_ms);
        next
    }

    /// Tears down the current round and loads `mode` idle.
    pub fn select_mode(&mut self, mode: GameMode, now_ms: f64) {
        self.with_engine(now_ms, |engine, s| engine.stop(s));
        if self.engine.live_count() != 0 || self.engine.pending_timers() != 0 {
            log::warn!("{} engine left state behind after stop", self.mode);
        }
        self.engine = engine_for(mode, &self.config);
        self.mode = mode;
        self.show_idle_label();
        log::info!("switched to {mode} mode");
    }

    /// Starts the loaded engine, or stops it if it is running.
    pub fn toggle_running(&mut self, now_ms: f64) -> Result<(), GameError> {
        if self.engine.is_running() {
            self.with_engine(now_ms, |engine, s| engine.stop(s));
            self.show_idle_label();
            log::info!("{} stopped", self.mode);
            Ok(())
        } else {
            self.with_engine(now_ms, |engine, s| engine.start(s))
        }
    }

    /// Flips the sound flag and returns the new state.
    pub fn toggle_sound(&mut self) -> bool {
        let on = !self.audio.is_enabled();
        let now = self.audio.set_enabled(on);
        log::info!("sound {}", if now { "on" } else { "off" });
        now
    }

    pub fn click(&mut self, handle: Handle, now_ms: f64) -> Result<(), GameError> {
        self.with_engine(now_ms, |engine, s| engine.on_click(handle, s))
    }

    pub fn tick(&mut self, now_ms: f64) -> Result<(), GameError> {
        self.with_engine(now_ms, |engine, s| engine.tick(s))
    }

    /// Relayed to a challenge engine; other modes ignore it.
    pub fn set_categories(&mut self, filter: CategoryFilter, now_ms: f64) -> Result<(), GameError> {
        if self.mode != GameMode::Challenge {
            log::debug!("category filter ignored in {} mode", self.mode);
            return Ok(());
        }
        self.with_engine(now_ms, |engine, s| engine.set_categories(filter, s))
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn sound_enabled(&self) -> bool {
        self.audio.is_enabled()
    }

    pub fn score(&self) -> Option<u32> {
        self.engine.score()
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.engine.completion()
    }

    pub fn live_count(&self) -> usize {
        self.engine.live_count()
    }

    pub fn pending_timers(&self) -> usize {
        self.engine.pending_timers()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn store(&self) -> &B {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessSurface, MemoryStore, RecordingSink};

    fn manager(config: GameConfig) -> (ModeManager<HeadlessSurface, MemoryStore>, RecordingSink) {
        let sink = RecordingSink::default();
        let audio = ToneSynth::new(Box::new(sink.clone())).with_seed(1);
        let config = GameConfig { seed: Some(42), ..config };
        (ModeManager::new(config, HeadlessSurface::default(), MemoryStore::default(), audio).unwrap(), sink)
    }

    #[test]
    fn loads_initial_mode_idle() {
        let (m, _) = manager(GameConfig::default());
        assert_eq!(m.mode(), GameMode::Challenge);
        assert!(!m.is_running());
        assert!(m.surface().label().contains("Find the emojis"));
    }

    #[test]
    fn rejects_unvalidated_config() {
        let mut config = GameConfig::default();
        config.challenge.target_chance = 1.5;
        let built = ModeManager::new(config, HeadlessSurface::default(), MemoryStore::default(), ToneSynth::unavailable("test"));
        assert!(matches!(built, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn refused_filter_keeps_round_playable() {
        let (mut m, _) = manager(GameConfig::default());
        let err = m.set_categories(CategoryFilter::Only(vec![]), 0.0).unwrap_err();
        assert!(matches!(err, GameError::InsufficientPool(_)));
        m.toggle_running(0.0).unwrap();
        assert!(m.is_running());
        assert!(m.live_count() > 0);
    }

    #[test]
    fn switching_while_running_leaves_nothing_behind() {
        let (mut m, _) = manager(GameConfig::default());
        m.toggle_running(0.0).unwrap();
        m.tick(3000.0).unwrap();
        assert!(m.surface().live_count() > 0);

        assert_eq!(m.next_mode(3100.0), GameMode::Levels);
        assert_eq!(m.surface().live_count(), 0);
        assert_eq!(m.live_count(), 0);
        assert_eq!(m.pending_timers(), 0);
        assert!(!m.is_running());

        m.toggle_running(3200.0).unwrap();
        assert_eq!(m.surface().live_count(), 4);
    }

    #[test]
    fn toggle_running_stops_and_restores_idle_label() {
        let (mut m, _) = manager(GameConfig { initial_mode: GameMode::Memory, ..GameConfig::default() });
        m.toggle_running(0.0).unwrap();
        assert!(m.surface().label().contains("0/2"));
        m.toggle_running(10.0).unwrap();
        assert!(!m.is_running());
        assert_eq!(m.surface().live_count(), 0);
        assert_eq!(m.surface().label(), "🧠 Memory game");
    }

    #[test]
    fn sound_toggle_gates_every_cue() {
        let (mut m, sink) = manager(GameConfig { initial_mode: GameMode::Free, ..GameConfig::default() });
        assert!(!m.toggle_sound());
        m.toggle_running(0.0).unwrap();
        let handle = m.surface().handles()[0];
        m.click(handle, 10.0).unwrap();
        assert!(sink.cues().is_empty());
        assert!(m.toggle_sound());
    }

    #[test]
    fn commands_route_through_apply() {
        let (mut m, _) = manager(GameConfig::default());
        m.apply(Command::SelectMode(GameMode::Simple), 0.0).unwrap();
        assert_eq!(m.mode(), GameMode::Simple);
        m.apply(Command::ToggleRunning, 0.0).unwrap();
        assert_eq!(m.surface().live_count(), 4);
        m.apply(Command::NextMode, 0.0).unwrap();
        assert_eq!(m.mode(), GameMode::Challenge);
        assert_eq!(m.surface().live_count(), 0);
    }
}
