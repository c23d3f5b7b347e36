//! # Detection Stability Tracking
//!
//! Rolling counters used to decide when a detection is "confirmed". The
//! increment rules live in the detection loop ([`crate::worker`]); this
//! module only defines the state and its reset primitives, so every new
//! prompt and every stopped session starts from an identical baseline.

/// How many pitch estimates the rolling window keeps.
pub const PITCH_WINDOW: usize = 10;

/// Consecutive-match counters for note and chord detection.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityState {
    /// Consecutive frames that agreed on the same note.
    pub stable_note_count: u32,
    /// The note those frames agreed on.
    pub last_note: Option<String>,
    /// Last chord name reported by the external chord detector.
    pub last_chord: String,
    /// Consecutive detections that agreed on the same chord.
    pub stable_chord_count: u32,
}

impl StabilityState {
    pub fn reset() -> Self {
        Self {
            stable_note_count: 0,
            last_note: None,
            last_chord: String::new(),
            stable_chord_count: 0,
        }
    }
}

impl Default for StabilityState {
    fn default() -> Self {
        Self::reset()
    }
}

/// Per-prompt tracking state: stability counters plus the silence counter,
/// the rolling pitch window, and the performance-prompt flags.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptCycleState {
    pub stability: StabilityState,
    /// Consecutive frames with no detectable pitch.
    pub consecutive_silence: u32,
    /// Rolling window of the most recent pitch estimates, newest last.
    pub last_pitches: Vec<f32>,
    /// Set once the current performance prompt has been judged.
    pub performance_prompt_resolved: bool,
    /// Whether that judgment was a match.
    pub performance_prompt_matched: bool,
}

impl PromptCycleState {
    /// Fresh baseline for a new prompt. The pitch window is a new
    /// allocation on every call, never aliased from a previous cycle.
    pub fn reset() -> Self {
        Self {
            stability: StabilityState::reset(),
            consecutive_silence: 0,
            last_pitches: Vec::new(),
            performance_prompt_resolved: false,
            performance_prompt_matched: false,
        }
    }
}

impl Default for PromptCycleState {
    fn default() -> Self {
        Self::reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stability_reset_is_the_documented_baseline() {
        let state = StabilityState::reset();
        assert_eq!(state.stable_note_count, 0);
        assert_eq!(state.last_note, None);
        assert_eq!(state.last_chord, "");
        assert_eq!(state.stable_chord_count, 0);
    }

    #[test]
    fn cycle_reset_allocates_a_fresh_window() {
        let mut first = PromptCycleState::reset();
        first.last_pitches.push(440.0);
        first.consecutive_silence = 7;

        let second = PromptCycleState::reset();
        assert!(second.last_pitches.is_empty());
        assert_eq!(second.consecutive_silence, 0);
        assert!(!second.performance_prompt_resolved);
        assert!(!second.performance_prompt_matched);
        // The first cycle's window is untouched by the new reset.
        assert_eq!(first.last_pitches, vec![440.0]);
    }
}
