//! Random chord prompts from the injected chord dictionary.

use crate::session::SessionContext;

use super::{
    pick_index, ChallengeStrategy, ChordShape, DetectionMode, NextOutcome, Prompt,
    UniformSource,
};

const MAX_REDRAWS: usize = 8;

/// Uniform random chord prompts with anti-repeat.
///
/// A shape without a fingering diagram can still be practiced when it is a
/// single tone; that degraded case goes out as a single-note prompt so the
/// tuner can track it.
pub struct ChordStrategy {
    shapes: Vec<ChordShape>,
    source: Box<dyn UniformSource>,
    last: Option<String>,
}

impl ChordStrategy {
    pub fn new(shapes: Vec<ChordShape>, source: Box<dyn UniformSource>) -> Self {
        Self { shapes, source, last: None }
    }
}

impl ChallengeStrategy for ChordStrategy {
    fn detection_mode(&self) -> DetectionMode {
        DetectionMode::Chord
    }

    fn next(&mut self, _ctx: &mut SessionContext) -> NextOutcome {
        if self.shapes.is_empty() {
            return NextOutcome::Failed("No chords match the current filters.".to_string());
        }

        let mut chosen = &self.shapes[pick_index(self.source.as_mut(), self.shapes.len())];
        if self.shapes.len() > 1 {
            let mut redraws = 0;
            while Some(&chosen.name) == self.last.as_ref() && redraws < MAX_REDRAWS {
                chosen = &self.shapes[pick_index(self.source.as_mut(), self.shapes.len())];
                redraws += 1;
            }
        }

        let chosen = chosen.clone();
        self.last = Some(chosen.name.clone());

        // Degraded case: a one-tone "chord" without a diagram becomes a
        // single-note prompt.
        if chosen.fingering.is_empty() && chosen.notes.len() == 1 {
            return NextOutcome::Prompt(Prompt {
                display_text: format!("Play {}", chosen.name),
                target_note: Some(chosen.notes[0].clone()),
                base_chord_name: Some(chosen.name),
                ..Prompt::default()
            });
        }

        NextOutcome::Prompt(Prompt::chord(format!("Play {}", chosen.name), &chosen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::FixedSource;

    fn shapes() -> Vec<ChordShape> {
        vec![
            ChordShape {
                name: "Am".into(),
                notes: vec!["A".into(), "C".into(), "E".into()],
                fingering: vec![None, Some(0), Some(2), Some(2), Some(1), Some(0)],
            },
            ChordShape {
                name: "E5".into(),
                notes: vec!["E".into()],
                fingering: Vec::new(),
            },
        ]
    }

    #[test]
    fn draws_a_chord_prompt() {
        let mut strategy =
            ChordStrategy::new(shapes(), Box::new(FixedSource::new(vec![0.0])));
        let mut ctx = SessionContext::default();
        match strategy.next(&mut ctx) {
            NextOutcome::Prompt(p) => {
                assert_eq!(p.base_chord_name.as_deref(), Some("Am"));
                assert_eq!(p.target_chord_notes.len(), 3);
                assert_eq!(p.target_chord_fingering.len(), 6);
            }
            other => panic!("expected prompt, got {:?}", other),
        }
    }

    #[test]
    fn single_tone_without_diagram_degrades_to_single_note() {
        let mut strategy =
            ChordStrategy::new(shapes(), Box::new(FixedSource::new(vec![0.9])));
        let mut ctx = SessionContext::default();
        match strategy.next(&mut ctx) {
            NextOutcome::Prompt(p) => {
                assert_eq!(p.target_note.as_deref(), Some("E"));
                assert!(p.target_chord_notes.is_empty());
                assert!(p.target_chord_fingering.is_empty());
                assert_eq!(p.base_chord_name.as_deref(), Some("E5"));
            }
            other => panic!("expected prompt, got {:?}", other),
        }
    }

    #[test]
    fn avoids_immediate_repeats() {
        let mut strategy = ChordStrategy::new(
            shapes(),
            Box::new(FixedSource::new(vec![0.0, 0.0, 0.9])),
        );
        let mut ctx = SessionContext::default();
        let first = strategy.next(&mut ctx);
        let second = strategy.next(&mut ctx);
        match (first, second) {
            (NextOutcome::Prompt(a), NextOutcome::Prompt(b)) => {
                assert_ne!(a.base_chord_name, b.base_chord_name);
            }
            other => panic!("expected two prompts, got {:?}", other),
        }
    }

    #[test]
    fn empty_dictionary_fails() {
        let mut strategy =
            ChordStrategy::new(Vec::new(), Box::new(FixedSource::new(vec![0.0])));
        let mut ctx = SessionContext::default();
        assert!(matches!(strategy.next(&mut ctx), NextOutcome::Failed(_)));
    }
}
