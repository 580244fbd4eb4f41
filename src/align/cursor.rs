//! Reading cursor and the script follower
//!
//! The cursor is the one piece of alignment state: which sentence the
//! speaker is currently on. [`ScriptFollower`] ties a [`Script`], the cursor,
//! and the matcher together into the thing a display actually drives.

use tracing::debug;

use crate::protocol::TranscriptEvent;

use super::engine::align;
use super::script::Script;

/// Current reading position within a script
///
/// Advancement is forward-by-one from a confirmed match: when sentence `n`
/// is heard, the cursor moves to `n + 1` so the display leads the speaker.
/// It never advances past the last sentence and never re-announces the
/// position it is already at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    current: usize,
    sentence_count: usize,
}

impl Cursor {
    pub fn new(sentence_count: usize) -> Self {
        Self {
            current: 0,
            sentence_count,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Advance past a matched sentence.
    ///
    /// Returns the new position if the cursor moved, `None` if the match
    /// lands the cursor where it already is or past the end of the script.
    pub fn apply_match(&mut self, match_index: usize) -> Option<usize> {
        let proposed = match_index + 1;
        if proposed < self.sentence_count && proposed != self.current {
            self.current = proposed;
            Some(self.current)
        } else {
            None
        }
    }

    /// Jump to an explicit position, clamped to the script.
    pub fn set(&mut self, index: usize) {
        self.current = index.min(self.sentence_count.saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Drives a cursor through a script from incoming transcripts
///
/// Only final transcripts move the cursor; interim results are too unstable
/// to act on and are ignored outright.
#[derive(Debug, Clone, Default)]
pub struct ScriptFollower {
    script: Script,
    cursor: Cursor,
}

impl ScriptFollower {
    pub fn new(text: impl Into<String>) -> Self {
        let script = Script::new(text);
        let cursor = Cursor::new(script.len());
        Self { script, cursor }
    }

    /// Replace the script. The cursor resets to the top.
    pub fn set_script(&mut self, text: impl Into<String>) {
        self.script.set_text(text);
        self.cursor = Cursor::new(self.script.len());
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn cursor(&self) -> usize {
        self.cursor.current()
    }

    /// Manually move the cursor, e.g. from an operator scrubbing the display.
    ///
    /// The new position sticks: subsequent transcripts align relative to it.
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor.set(index);
    }

    /// Feed one transcript event. Returns the new cursor position if it
    /// advanced.
    pub fn on_transcript(&mut self, event: &TranscriptEvent) -> Option<usize> {
        if !event.is_final {
            return None;
        }

        let matched = align(self.script.sentences(), self.cursor.current(), &event.text)?;
        let moved = self.cursor.apply_match(matched);

        if let Some(position) = moved {
            debug!(
                matched,
                position,
                participant = %event.participant_identity,
                "cursor advanced"
            );
        }

        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "Hello there. How are you today? That wraps it up.";

    #[test]
    fn test_cursor_advances_past_matched_sentence() {
        let mut follower = ScriptFollower::new(SCRIPT);
        assert_eq!(follower.cursor(), 0);

        let moved = follower.on_transcript(&TranscriptEvent::final_text("hello there", "host"));
        assert_eq!(moved, Some(1));
        assert_eq!(follower.cursor(), 1);
    }

    #[test]
    fn test_cursor_holds_at_last_sentence() {
        let mut follower = ScriptFollower::new(SCRIPT);
        follower.set_cursor(2);

        // Matching the final sentence has nowhere to advance to
        let moved =
            follower.on_transcript(&TranscriptEvent::final_text("that wraps it up", "host"));
        assert_eq!(moved, None);
        assert_eq!(follower.cursor(), 2);
    }

    #[test]
    fn test_no_match_leaves_cursor_in_place() {
        let mut follower = ScriptFollower::new(SCRIPT);
        follower.set_cursor(1);

        let moved = follower.on_transcript(&TranscriptEvent::final_text(
            "completely off script banter",
            "host",
        ));
        assert_eq!(moved, None);
        assert_eq!(follower.cursor(), 1);
    }

    #[test]
    fn test_interim_transcripts_are_ignored() {
        let mut follower = ScriptFollower::new(SCRIPT);

        let moved = follower.on_transcript(&TranscriptEvent::interim_text("hello there", "host"));
        assert_eq!(moved, None);
        assert_eq!(follower.cursor(), 0);
    }

    #[test]
    fn test_manual_override_persists() {
        let mut follower = ScriptFollower::new(SCRIPT);
        follower.set_cursor(2);
        assert_eq!(follower.cursor(), 2);

        // A match at the overridden position still obeys the no-advance rule
        let moved =
            follower.on_transcript(&TranscriptEvent::final_text("that wraps it up", "host"));
        assert_eq!(moved, None);
        assert_eq!(follower.cursor(), 2);

        // And a match behind it can still pull the cursor back via full scan
        let moved = follower.on_transcript(&TranscriptEvent::final_text("hello there.", "host"));
        assert_eq!(moved, Some(1));
    }

    #[test]
    fn test_set_cursor_clamps_to_script() {
        let mut follower = ScriptFollower::new(SCRIPT);
        follower.set_cursor(99);
        assert_eq!(follower.cursor(), 2);
    }

    #[test]
    fn test_set_script_resets_cursor() {
        let mut follower = ScriptFollower::new(SCRIPT);
        follower.on_transcript(&TranscriptEvent::final_text("hello there", "host"));
        assert_eq!(follower.cursor(), 1);

        follower.set_script("A new script. With new lines.");
        assert_eq!(follower.cursor(), 0);
        assert_eq!(follower.script().len(), 2);
    }

    #[test]
    fn test_no_advance_to_same_position() {
        let mut follower = ScriptFollower::new(SCRIPT);
        follower.set_cursor(1);

        // Sentence 0 matched, proposed position 1 == current 1: no movement
        let moved = follower.on_transcript(&TranscriptEvent::final_text("hello there.", "host"));
        assert_eq!(moved, None);
        assert_eq!(follower.cursor(), 1);
    }

    #[test]
    fn test_empty_script_never_advances() {
        let mut follower = ScriptFollower::new("");
        let moved = follower.on_transcript(&TranscriptEvent::final_text("hello", "host"));
        assert_eq!(moved, None);
        assert_eq!(follower.cursor(), 0);
    }
}
