//! Round engines: one per game mode, all driven through [`RoundEngine`].

mod free_spawn;
mod instance;
mod memory;
mod progression;
mod target_match;
mod timers;

pub use free_spawn::{CELEBRATION_COLORS, FreeSpawn};
pub use instance::{Instance, Instances, Liveness};
pub use memory::{Face, MemoryPairs};
pub use progression::{LEVELS, LevelSpec, Progression};
pub use target_match::{TargetMatch, Variant};
pub use timers::{Fired, Timers};

use crate::catalog::CategoryFilter;
use crate::error::GameError;
use crate::mode::GameMode;
use crate::session::Session;
use crate::surface::{BestTimeStore, Handle, format_clock};

/// Result of a finished timed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub mode: GameMode,
    pub elapsed_secs: u64,
    pub best_secs: u64,
    pub new_best: bool,
}

impl Completion {
    /// Summary label shown after a timed game.
    pub fn summary(&self, headline: &str) -> String {
        format!(
            "{headline}<br>⏱️ Time: {}<br>🏆 Best: {}{}",
            format_clock(self.elapsed_secs),
            format_clock(self.best_secs),
            if self.new_best { " (NEW RECORD!)" } else { "" }
        )
    }
}

/// Lifecycle shared by every mode.
///
/// `start` always begins a fresh round, `stop` always leaves nothing on the
/// surface and nothing in the timer queue. Clicks on handles the engine does
/// not own, or no longer considers live, are ignored.
pub trait RoundEngine {
    fn mode(&self) -> GameMode;

    fn start(&mut self, s: &mut Session<'_>) -> Result<(), GameError>;

    fn stop(&mut self, s: &mut Session<'_>);

    fn on_click(&mut self, handle: Handle, s: &mut Session<'_>) -> Result<(), GameError>;

    /// Fires every timer due at `s.now_ms`.
    fn tick(&mut self, s: &mut Session<'_>) -> Result<(), GameError>;

    fn is_running(&self) -> bool;

    /// Instances currently on the surface.
    fn live_count(&self) -> usize;

    fn pending_timers(&self) -> usize;

    /// Label shown while the mode is loaded but not running.
    fn idle_label(&self, store: &dyn BestTimeStore) -> String;

    fn score(&self) -> Option<u32> {
        None
    }

    fn completion(&self) -> Option<&Completion> {
        None
    }

    /// Restricts the token pool. Only challenge rounds use categories.
    fn set_categories(&mut self, _filter: CategoryFilter, _s: &mut Session<'_>) -> Result<(), GameError> {
        Ok(())
    }
}

/// `" | 🏆 m:ss"` when a best time exists.
pub(crate) fn best_suffix(store: &dyn BestTimeStore, key: &str) -> String {
    store
        .best_time(key)
        .map(|best| format!(" | 🏆 {}", format_clock(best)))
        .unwrap_or_default()
}

/// Whole seconds between two clock readings.
pub(crate) fn elapsed_secs(from_ms: f64, to_ms: f64) -> u64 {
    ((to_ms - from_ms).max(0.0) / 1000.0).floor() as u64
}

#[cfg(test)]
pub(crate) mod testkit {
    //! A session assembled from headless parts.

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::catalog::Catalog;
    use crate::headless::{HeadlessSurface, MemoryStore, RecordingSink};
    use crate::session::Session;
    use crate::tone::ToneSynth;

    pub struct Rig {
        pub surface: HeadlessSurface,
        pub audio: ToneSynth,
        pub sink: RecordingSink,
        pub store: MemoryStore,
        pub catalog: Catalog,
        pub rng: StdRng,
        pub now_ms: f64,
    }

    impl Rig {
        pub fn new(seed: u64) -> Self {
            let sink = RecordingSink::default();
            Self {
                surface: HeadlessSurface::default(),
                audio: ToneSynth::new(Box::new(sink.clone())).with_seed(seed),
                sink,
                store: MemoryStore::default(),
                catalog: Catalog::standard(),
                rng: StdRng::seed_from_u64(seed),
                now_ms: 0.0,
            }
        }

        pub fn session(&mut self) -> Session<'_> {
            Session {
                surface: &mut self.surface,
                audio: &mut self.audio,
                store: &mut self.store,
                catalog: &self.catalog,
                rng: &mut self.rng,
                now_ms: self.now_ms,
            }
        }

        /// Moves the clock to `now_ms` and returns a session at that time.
        pub fn at(&mut self, now_ms: f64) -> Session<'_> {
            self.now_ms = now_ms;
            self.session()
        }
    }
}
