//! Host-side collaborators: where tokens are drawn and where best times live.

use crate::catalog::Token;

/// Opaque id of a placed token, issued by the [`Surface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visual state changes an engine can request on a placed token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visual {
    /// Transient wrong-answer wobble.
    Shake,
    /// Shrink-out played before a hit token is removed.
    Vanish,
    /// Found target: shrunk, faded, no longer clickable.
    Found,
    FaceUp,
    FaceDown,
    Matched,
    /// Matched card fading before removal.
    Fade,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Celebration {
    pub message: Option<String>,
    pub color: Option<&'static str>,
    pub duration_ms: f64,
}

impl Celebration {
    pub const WELL_DONE: &'static str = "🎉 Well done! 🎉";

    pub fn message(text: impl Into<String>) -> Self {
        Self { message: Some(text.into()), color: None, duration_ms: 2000.0 }
    }

    pub fn flash(color: &'static str) -> Self {
        Self { message: None, color: Some(color), duration_ms: 600.0 }
    }
}

/// Rendering collaborator. Clicks flow the other way: the host calls
/// `ModeManager::click` with the handle it was given.
pub trait Surface {
    fn place_token(&mut self, token: Token, at: Position, size: f64) -> Handle;
    fn remove_token(&mut self, handle: Handle);
    /// Width and height of the play area.
    fn client_area(&self) -> (f64, f64);
    fn set_label(&mut self, markup: &str);
    fn pulse_celebration(&mut self, celebration: &Celebration);
    fn show_feedback(&mut self, handle: Handle, visual: Visual);
}

/// Key-value store for per-mode best times, in whole seconds.
pub trait BestTimeStore {
    fn best_time(&self, key: &str) -> Option<u64>;
    fn set_best_time(&mut self, key: &str, seconds: u64);
}

/// Stores `seconds` under `key` if there is no previous best or it is
/// strictly lower. Returns whether the record changed.
pub fn record_best_time(store: &mut dyn BestTimeStore, key: &str, seconds: u64) -> bool {
    match store.best_time(key) {
        Some(best) if seconds >= best => false,
        _ => {
            store.set_best_time(key, seconds);
            true
        }
    }
}

/// `m:ss`
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::MemoryStore;

    #[test]
    fn best_time_only_improves() {
        let mut store = MemoryStore::default();
        assert!(record_best_time(&mut store, "k", 30));
        assert!(!record_best_time(&mut store, "k", 30));
        assert!(!record_best_time(&mut store, "k", 31));
        assert!(record_best_time(&mut store, "k", 12));
        assert_eq!(store.best_time("k"), Some(12));
        assert_eq!(store.best_time("other"), None);
    }

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(600), "10:00");
    }
}
