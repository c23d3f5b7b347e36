//! Random single-note targets with anti-repeat.

use crate::session::SessionContext;

use super::{
    pick_index, ChallengeStrategy, DetectionMode, FretCandidate, NextOutcome, Prompt,
    UniformSource,
};

/// How many redraws the anti-repeat rule allows before giving up and
/// accepting a repeat.
const MAX_REDRAWS: usize = 8;

/// Uniform random (note, string) prompts that avoid asking for the same
/// pair twice in a row.
pub struct RandomNoteStrategy {
    candidates: Vec<FretCandidate>,
    source: Box<dyn UniformSource>,
    last: Option<FretCandidate>,
}

impl RandomNoteStrategy {
    pub fn new(candidates: Vec<FretCandidate>, source: Box<dyn UniformSource>) -> Self {
        Self { candidates, source, last: None }
    }
}

impl ChallengeStrategy for RandomNoteStrategy {
    fn detection_mode(&self) -> DetectionMode {
        DetectionMode::SingleNote
    }

    fn next(&mut self, _ctx: &mut SessionContext) -> NextOutcome {
        if self.candidates.is_empty() {
            return NextOutcome::Failed(
                "No playable notes match the current filters.".to_string(),
            );
        }

        let mut chosen = &self.candidates[pick_index(self.source.as_mut(), self.candidates.len())];
        if self.candidates.len() > 1 {
            let mut redraws = 0;
            while Some(chosen) == self.last.as_ref() && redraws < MAX_REDRAWS {
                chosen = &self.candidates[pick_index(self.source.as_mut(), self.candidates.len())];
                redraws += 1;
            }
        }

        let chosen = chosen.clone();
        self.last = Some(chosen.clone());
        NextOutcome::Prompt(Prompt::single_note(
            format!("Play {} on string {}", chosen.note, chosen.string),
            chosen.note,
            chosen.string,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::FixedSource;

    fn pool() -> Vec<FretCandidate> {
        vec![
            FretCandidate { note: "E2".into(), string: 6 },
            FretCandidate { note: "A2".into(), string: 5 },
            FretCandidate { note: "D3".into(), string: 4 },
        ]
    }

    #[test]
    fn empty_pool_fails() {
        let mut strategy =
            RandomNoteStrategy::new(Vec::new(), Box::new(FixedSource::new(vec![0.0])));
        let mut ctx = SessionContext::default();
        assert!(matches!(strategy.next(&mut ctx), NextOutcome::Failed(_)));
    }

    #[test]
    fn consecutive_prompts_differ() {
        // The source keeps pointing at index 0; the anti-repeat redraw
        // walks it forward on the second call.
        let mut strategy = RandomNoteStrategy::new(
            pool(),
            Box::new(FixedSource::new(vec![0.0, 0.0, 0.5])),
        );
        let mut ctx = SessionContext::default();

        let first = match strategy.next(&mut ctx) {
            NextOutcome::Prompt(p) => p,
            other => panic!("expected prompt, got {:?}", other),
        };
        let second = match strategy.next(&mut ctx) {
            NextOutcome::Prompt(p) => p,
            other => panic!("expected prompt, got {:?}", other),
        };
        assert_ne!(first.target_note, second.target_note);
    }

    #[test]
    fn prompt_carries_note_and_string() {
        let mut strategy =
            RandomNoteStrategy::new(pool(), Box::new(FixedSource::new(vec![0.4])));
        let mut ctx = SessionContext::default();
        match strategy.next(&mut ctx) {
            NextOutcome::Prompt(p) => {
                assert_eq!(p.target_note.as_deref(), Some("A2"));
                assert_eq!(p.target_string, Some(5));
                assert_eq!(p.display_text, "Play A2 on string 5");
            }
            other => panic!("expected prompt, got {:?}", other),
        }
    }
}
