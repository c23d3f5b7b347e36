//! Arpeggio stepping with reordering patterns and root-position interval
//! labels.

use crate::session::SessionContext;

use super::{ChallengeStrategy, ChordShape, DetectionMode, NextOutcome, Prompt};

/// How the chord tones are reordered before stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpeggioPattern {
    Ascending,
    Descending,
    /// Up then back down, without repeating the top or bottom note.
    Palindrome,
    RotateOne,
    /// Rotate by two; chords with fewer than three tones fall back to a
    /// rotate-by-one.
    RotateTwo,
}

/// Reorders root-position chord tones according to the pattern.
pub fn reorder(notes: &[String], pattern: ArpeggioPattern) -> Vec<String> {
    match pattern {
        ArpeggioPattern::Ascending => notes.to_vec(),
        ArpeggioPattern::Descending => notes.iter().rev().cloned().collect(),
        ArpeggioPattern::Palindrome => {
            let mut sequence = notes.to_vec();
            if notes.len() > 2 {
                sequence.extend(notes[1..notes.len() - 1].iter().rev().cloned());
            }
            sequence
        }
        ArpeggioPattern::RotateOne => rotate(notes, 1),
        ArpeggioPattern::RotateTwo => {
            if notes.len() < 3 {
                rotate(notes, 1)
            } else {
                rotate(notes, 2)
            }
        }
    }
}

fn rotate(notes: &[String], by: usize) -> Vec<String> {
    if notes.is_empty() {
        return Vec::new();
    }
    let by = by % notes.len();
    let mut sequence = notes[by..].to_vec();
    sequence.extend_from_slice(&notes[..by]);
    sequence
}

/// Labels a chord tone by its root-position index.
pub fn interval_label(index: usize) -> String {
    match index {
        0 => "Root".to_string(),
        1 => "Third".to_string(),
        2 => "Fifth".to_string(),
        3 => "Seventh".to_string(),
        n => format!("Note {}", n + 1),
    }
}

/// Steps one chord's tones in the configured pattern, forever. The step
/// position lives in `ctx.arpeggio_index` so the start preflight can reset
/// it between sessions.
pub struct ArpeggioStrategy {
    shape: ChordShape,
    pattern: ArpeggioPattern,
}

impl ArpeggioStrategy {
    pub fn new(shape: ChordShape, pattern: ArpeggioPattern) -> Self {
        Self { shape, pattern }
    }
}

impl ChallengeStrategy for ArpeggioStrategy {
    fn detection_mode(&self) -> DetectionMode {
        DetectionMode::SingleNote
    }

    fn next(&mut self, ctx: &mut SessionContext) -> NextOutcome {
        if self.shape.notes.is_empty() {
            return NextOutcome::Failed(format!(
                "Chord {} has no tones to arpeggiate.",
                self.shape.name
            ));
        }

        let sequence = reorder(&self.shape.notes, self.pattern);
        let step = ctx.arpeggio_index % sequence.len();
        let note = sequence[step].clone();

        // Label by where the tone sits in the root-position voicing, not
        // where the pattern put it.
        let label = self
            .shape
            .notes
            .iter()
            .position(|n| *n == note)
            .map(interval_label)
            .unwrap_or_else(|| "Note".to_string());

        ctx.arpeggio_index += 1;
        NextOutcome::Prompt(Prompt {
            display_text: format!("Play the {} of {} ({})", label, self.shape.name, note),
            target_note: Some(note),
            base_chord_name: Some(self.shape.name.clone()),
            ..Prompt::default()
        })
    }
}
