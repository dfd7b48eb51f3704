//! Cursors: durable record of which feed items were already acted on
//!
//! # Contract
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | load (file absent) | write the empty default, return it |
//! | load (file corrupt) | log, return the empty default, never fail |
//! | save | write `<file>.tmp`, then rename over `<file>` |
//!
//! Corruption resets history on purpose: the watcher keeps notifying and
//! may repeat old notices, it never stops.
//!
//! Cursors are loaded at the start of every cycle and saved at its end;
//! nothing is held in memory between cycles.

mod file;
mod quest;
mod tx;

pub use file::JsonFile;
pub use quest::{QuestCursor, QuestCursorStore};
pub use tx::{TxCursor, TxCursorStore};
