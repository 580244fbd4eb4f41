//! Speech-to-script alignment
//!
//! Tracks where a speaker is within a prepared script. The script is split
//! into sentences once, and each final transcript is matched against them by
//! token overlap:
//!
//! ```text
//!   final transcript ──> align() ──> matched sentence ──> Cursor ──> display
//!                          │
//!            current ── next ── full scan
//! ```
//!
//! The matcher itself is stateless; [`ScriptFollower`] owns the cursor and
//! the only policy decisions (finals only, forward-by-one advancement).

pub mod cursor;
pub mod engine;
pub mod script;

pub use cursor::{Cursor, ScriptFollower};
pub use engine::align;
pub use script::{segment, Script, Sentence};
