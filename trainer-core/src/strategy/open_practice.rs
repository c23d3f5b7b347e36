//! Constant prompts for open and rhythm practice. No target, the player
//! just plays.

use crate::session::SessionContext;

use super::{ChallengeStrategy, DetectionMode, NextOutcome, Prompt};

/// Emits the same untargeted prompt forever.
pub struct OpenPracticeStrategy {
    text: &'static str,
    mode: DetectionMode,
}

impl OpenPracticeStrategy {
    /// Free play: the tuner follows whatever is played.
    pub fn free_play() -> Self {
        Self {
            text: "Play anything and the tuner follows along.",
            mode: DetectionMode::SingleNote,
        }
    }

    /// Rhythm practice: strum along with the metronome.
    pub fn rhythm_practice() -> Self {
        Self {
            text: "Strum along with the metronome.",
            mode: DetectionMode::Chord,
        }
    }
}

impl ChallengeStrategy for OpenPracticeStrategy {
    fn detection_mode(&self) -> DetectionMode {
        self.mode
    }

    fn next(&mut self, _ctx: &mut SessionContext) -> NextOutcome {
        NextOutcome::Prompt(Prompt::untargeted(self.text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_are_constant_and_untargeted() {
        let mut strategy = OpenPracticeStrategy::free_play();
        let mut ctx = SessionContext::default();
        for _ in 0..3 {
            match strategy.next(&mut ctx) {
                NextOutcome::Prompt(p) => {
                    assert_eq!(p.target_note, None);
                    assert!(p.target_chord_notes.is_empty());
                    assert_eq!(p.display_text, "Play anything and the tuner follows along.");
                }
                other => panic!("expected prompt, got {:?}", other),
            }
        }
        assert_eq!(strategy.detection_mode(), DetectionMode::SingleNote);
        assert_eq!(
            OpenPracticeStrategy::rhythm_practice().detection_mode(),
            DetectionMode::Chord
        );
    }
}
