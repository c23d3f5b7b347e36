//! Sequence walkers: scale practice and chord progressions.
//!
//! Both step an index through a resolved sequence held in the session
//! context, and both signal completion through `NextOutcome::Completed`
//! when a non-looping pass reaches the end.

use std::collections::BTreeMap;

use crate::session::SessionContext;

use super::{ChallengeStrategy, ChordShape, DetectionMode, NextOutcome, Prompt};

/// Steps through `ctx.scale_notes`, one note per prompt.
pub struct ScaleStrategy {
    /// Loop back to the start instead of completing.
    looping: bool,
}

impl ScaleStrategy {
    pub fn new(looping: bool) -> Self {
        Self { looping }
    }
}

impl ChallengeStrategy for ScaleStrategy {
    fn detection_mode(&self) -> DetectionMode {
        DetectionMode::SingleNote
    }

    fn next(&mut self, ctx: &mut SessionContext) -> NextOutcome {
        if ctx.scale_notes.is_empty() {
            return NextOutcome::Failed("No scale is selected.".to_string());
        }

        if ctx.scale_index >= ctx.scale_notes.len() {
            ctx.scale_index = 0;
            if !self.looping {
                return NextOutcome::Completed("Scale complete. Nice work!".to_string());
            }
        }

        let note = ctx.scale_notes[ctx.scale_index].clone();
        let position = ctx.scale_index + 1;
        ctx.scale_index += 1;
        NextOutcome::Prompt(Prompt {
            display_text: format!(
                "Play {} ({} of {})",
                note,
                position,
                ctx.scale_notes.len()
            ),
            target_note: Some(note),
            ..Prompt::default()
        })
    }
}

/// Steps through `ctx.progression`, one chord per prompt, resolving each
/// chord name against the injected chord dictionary.
pub struct ProgressionStrategy {
    chords: BTreeMap<String, ChordShape>,
    looping: bool,
}

impl ProgressionStrategy {
    pub fn new(chords: BTreeMap<String, ChordShape>, looping: bool) -> Self {
        Self { chords, looping }
    }
}

impl ChallengeStrategy for ProgressionStrategy {
    fn detection_mode(&self) -> DetectionMode {
        DetectionMode::Chord
    }

    fn next(&mut self, ctx: &mut SessionContext) -> NextOutcome {
        if ctx.progression.is_empty() {
            return NextOutcome::Failed("No chord progression is selected.".to_string());
        }

        if ctx.progression_index >= ctx.progression.len() {
            ctx.progression_index = 0;
            if !self.looping {
                return NextOutcome::Completed("Progression complete!".to_string());
            }
        }

        let name = ctx.progression[ctx.progression_index].clone();
        let Some(shape) = self.chords.get(&name) else {
            return NextOutcome::Failed(format!("Chord {} is not in the library.", name));
        };

        let position = ctx.progression_index + 1;
        ctx.progression_index += 1;
        NextOutcome::Prompt(Prompt::chord(
            format!("Play {} ({} of {})", name, position, ctx.progression.len()),
            shape,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(name: &str) -> ChordShape {
        ChordShape {
            name: name.to_string(),
            notes: vec!["A".into(), "C".into(), "E".into()],
            fingering: vec![None, Some(0), Some(2), Some(2), Some(1), Some(0)],
        }
    }

    #[test]
    fn scale_walks_and_completes() {
        let mut strategy = ScaleStrategy::new(false);
        let mut ctx = SessionContext::default();
        ctx.scale_notes = vec!["C4".into(), "D4".into(), "E4".into()];

        for expected in ["C4", "D4", "E4"] {
            match strategy.next(&mut ctx) {
                NextOutcome::Prompt(p) => assert_eq!(p.target_note.as_deref(), Some(expected)),
                other => panic!("expected prompt, got {:?}", other),
            }
        }
        assert!(matches!(strategy.next(&mut ctx), NextOutcome::Completed(_)));
        // Completion rewinds, so the next call starts over.
        match strategy.next(&mut ctx) {
            NextOutcome::Prompt(p) => assert_eq!(p.target_note.as_deref(), Some("C4")),
            other => panic!("expected prompt, got {:?}", other),
        }
    }

    #[test]
    fn looping_scale_never_completes() {
        let mut strategy = ScaleStrategy::new(true);
        let mut ctx = SessionContext::default();
        ctx.scale_notes = vec!["C4".into(), "D4".into()];

        for _ in 0..5 {
            assert!(matches!(strategy.next(&mut ctx), NextOutcome::Prompt(_)));
        }
    }

    #[test]
    fn empty_scale_fails() {
        let mut strategy = ScaleStrategy::new(false);
        let mut ctx = SessionContext::default();
        assert!(matches!(strategy.next(&mut ctx), NextOutcome::Failed(_)));
    }

    #[test]
    fn progression_resolves_chords_and_completes() {
        let mut chords = BTreeMap::new();
        chords.insert("Am".to_string(), shape("Am"));
        chords.insert("Dm".to_string(), shape("Dm"));
        let mut strategy = ProgressionStrategy::new(chords, false);
        let mut ctx = SessionContext::default();
        ctx.progression = vec!["Am".into(), "Dm".into()];

        match strategy.next(&mut ctx) {
            NextOutcome::Prompt(p) => {
                assert_eq!(p.base_chord_name.as_deref(), Some("Am"));
                assert_eq!(p.display_text, "Play Am (1 of 2)");
                assert!(!p.target_chord_fingering.is_empty());
            }
            other => panic!("expected prompt, got {:?}", other),
        }
        assert!(matches!(strategy.next(&mut ctx), NextOutcome::Prompt(_)));
        assert!(matches!(strategy.next(&mut ctx), NextOutcome::Completed(_)));
    }

    #[test]
    fn unknown_chord_fails() {
        let mut strategy = ProgressionStrategy::new(BTreeMap::new(), false);
        let mut ctx = SessionContext::default();
        ctx.progression = vec!["F#dim7".into()];
        assert!(matches!(strategy.next(&mut ctx), NextOutcome::Failed(_)));
    }
}
