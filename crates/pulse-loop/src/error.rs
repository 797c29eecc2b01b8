use thiserror::Error;

use crate::driver::ItemKey;

/// Errors reported by the render loop.
///
/// Callback failures are not errors at this level: they are isolated per item
/// and logged (see [`PanicPolicy`](crate::PanicPolicy)).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoopError {
    #[error("no render loop item registered under {0}")]
    UnknownKey(ItemKey),

    #[error("a render loop item with id `{0}` is already registered")]
    DuplicateId(String),

    #[error("render loop is mid-tick and cannot be borrowed")]
    Reentrant,
}
