//! Interval-ear prompts: name an interval above a root, target the note
//! that lands on.

use crate::session::SessionContext;
use crate::tuning;

use super::{
    pick_index, ChallengeStrategy, DetectionMode, FretCandidate, NextOutcome, Prompt,
    UniformSource,
};

/// How many root/interval combinations one `next()` call may try before
/// reporting failure. Keeps the search bounded on sparse pools.
const MAX_ATTEMPTS: usize = 20;

/// An interval the strategy may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalChoice {
    pub semitones: i32,
    pub name: &'static str,
}

/// Default interval set: the ones that matter early in ear training.
pub const DEFAULT_INTERVALS: [IntervalChoice; 6] = [
    IntervalChoice { semitones: 3, name: "minor third" },
    IntervalChoice { semitones: 4, name: "major third" },
    IntervalChoice { semitones: 5, name: "perfect fourth" },
    IntervalChoice { semitones: 7, name: "perfect fifth" },
    IntervalChoice { semitones: 9, name: "major sixth" },
    IntervalChoice { semitones: 12, name: "octave" },
];

/// Pairs a random root with a random interval, retrying until the landing
/// note is actually playable on the instrument.
pub struct IntervalStrategy {
    candidates: Vec<FretCandidate>,
    intervals: Vec<IntervalChoice>,
    source: Box<dyn UniformSource>,
}

impl IntervalStrategy {
    pub fn new(
        candidates: Vec<FretCandidate>,
        intervals: Vec<IntervalChoice>,
        source: Box<dyn UniformSource>,
    ) -> Self {
        Self { candidates, intervals, source }
    }

    /// Finds a pool candidate sounding the given note, if any.
    fn playable(&self, note: &str) -> Option<&FretCandidate> {
        self.candidates.iter().find(|c| c.note == note)
    }
}

impl ChallengeStrategy for IntervalStrategy {
    fn detection_mode(&self) -> DetectionMode {
        DetectionMode::SingleNote
    }

    fn next(&mut self, _ctx: &mut SessionContext) -> NextOutcome {
        if self.candidates.is_empty() || self.intervals.is_empty() {
            return NextOutcome::Failed(
                "No playable notes match the current filters.".to_string(),
            );
        }

        for _ in 0..MAX_ATTEMPTS {
            let root =
                self.candidates[pick_index(self.source.as_mut(), self.candidates.len())].clone();
            let interval =
                self.intervals[pick_index(self.source.as_mut(), self.intervals.len())];

            let Some(root_midi) = tuning::parse_note(&root.note) else {
                continue;
            };
            let partner_note = tuning::note_name(root_midi + interval.semitones);
            if let Some(partner) = self.playable(&partner_note) {
                let partner = partner.clone();
                return NextOutcome::Prompt(Prompt::single_note(
                    format!("Play a {} up from {}", interval.name, root.note),
                    partner.note,
                    partner.string,
                ));
            }
        }

        NextOutcome::Failed(
            "Could not build an interval from the current note pool.".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::FixedSource;

    fn pool() -> Vec<FretCandidate> {
        vec![
            FretCandidate { note: "A2".into(), string: 5 },
            FretCandidate { note: "E3".into(), string: 4 },
            FretCandidate { note: "A3".into(), string: 3 },
        ]
    }

    #[test]
    fn finds_a_playable_pair() {
        // Root A2 plus a perfect fifth lands on E3, which the pool
        // contains.
        let intervals = vec![
            IntervalChoice { semitones: 7, name: "perfect fifth" },
            IntervalChoice { semitones: 12, name: "octave" },
        ];
        let mut strategy = IntervalStrategy::new(
            pool(),
            intervals,
            Box::new(FixedSource::new(vec![0.0, 0.0])),
        );
        let mut ctx = SessionContext::default();

        match strategy.next(&mut ctx) {
            NextOutcome::Prompt(p) => {
                assert_eq!(p.display_text, "Play a perfect fifth up from A2");
                assert_eq!(p.target_note.as_deref(), Some("E3"));
                assert_eq!(p.target_string, Some(4));
            }
            other => panic!("expected prompt, got {:?}", other),
        }
    }

    #[test]
    fn gives_up_after_bounded_retries() {
        // A tritone never lands inside this pool, so every attempt misses.
        let intervals = vec![IntervalChoice { semitones: 6, name: "tritone" }];
        let mut strategy = IntervalStrategy::new(
            pool(),
            intervals,
            Box::new(FixedSource::new(vec![0.0, 0.4, 0.9])),
        );
        let mut ctx = SessionContext::default();
        assert!(matches!(strategy.next(&mut ctx), NextOutcome::Failed(_)));
    }

    #[test]
    fn empty_configuration_fails_immediately() {
        let mut strategy = IntervalStrategy::new(
            Vec::new(),
            DEFAULT_INTERVALS.to_vec(),
            Box::new(FixedSource::new(vec![0.0])),
        );
        let mut ctx = SessionContext::default();
        assert!(matches!(strategy.next(&mut ctx), NextOutcome::Failed(_)));
    }
}
