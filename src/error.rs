//! Error types shared by the catalog, the engines and the browser glue.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Raised when a sampling request asks for more distinct tokens than the
/// pool holds once exclusions are removed. This is a contract violation
/// (misconfigured level or category filter), never a transient condition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot draw {requested} distinct tokens from a pool of {available}")]
pub struct InsufficientPool {
    pub requested: usize,
    pub available: usize,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error(transparent)]
    InsufficientPool(#[from] InsufficientPool),

    #[error("audio output unavailable: {0}")]
    AudioUnavailable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("browser environment error: {0}")]
    Dom(String),
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::InvalidConfig(err.to_string())
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Maps a failed `web-sys` call into [`GameError::Dom`].
pub(crate) fn dom_err(context: &str, err: JsValue) -> GameError {
    GameError::Dom(format!("{context}: {err:?}"))
}
