//! # Challenge Strategy Contract
//!
//! Every practice mode plugs in a strategy: a fixed detection mode plus a
//! `next()` that produces the following prompt. Strategies are capability
//! objects, not an inheritance tree; a mode that reuses another mode's
//! generator delegates to it explicitly.
//!
//! `next()` returns a tagged [`NextOutcome`] directly; there is no "null
//! plus pending message" side channel. All cross-prompt session state
//! travels through the explicit [`SessionContext`](crate::session::SessionContext)
//! so tests can drive strategies with plain fixtures.

use crate::session::SessionContext;

mod adaptive;
mod arpeggio;
mod chord;
mod interval;
mod melody;
mod open_practice;
mod sequence;
mod single_note;

pub use adaptive::AdaptiveStrategy;
pub use arpeggio::{interval_label, reorder, ArpeggioPattern, ArpeggioStrategy};
pub use chord::ChordStrategy;
pub use interval::{IntervalChoice, IntervalStrategy, DEFAULT_INTERVALS};
pub use melody::{MelodyEvent, MelodyStrategy, MelodyTrack};
pub use open_practice::OpenPracticeStrategy;
pub use sequence::{ProgressionStrategy, ScaleStrategy};
pub use single_note::RandomNoteStrategy;

/// Whether a challenge expects one simultaneous note or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMode {
    SingleNote,
    Chord,
}

/// One playable (note, string) pair from the instrument's fretboard.
///
/// The fretboard dictionary itself is external static data; strategies are
/// handed the candidate pairs that survive the current filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FretCandidate {
    /// Note name with octave, e.g. "C#4".
    pub note: String,
    /// String index, 1 = highest-pitched string.
    pub string: u8,
}

/// A chord voicing from the external chord dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordShape {
    /// Display name, e.g. "Am" or "Cmaj7".
    pub name: String,
    /// Chord tones in root position, low to high.
    pub notes: Vec<String>,
    /// Fret per string, `None` for a muted string.
    pub fingering: Vec<Option<u8>>,
}

/// A challenge prompt, immutable once produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prompt {
    /// What the player is asked to do.
    pub display_text: String,
    /// Target note for single-note detection.
    pub target_note: Option<String>,
    /// String the target note should be played on.
    pub target_string: Option<u8>,
    /// Chord tones the external chord detector should match.
    pub target_chord_notes: Vec<String>,
    /// Fingering diagram for the chord prompt.
    pub target_chord_fingering: Vec<Option<u8>>,
    /// Chord name without voicing decoration.
    pub base_chord_name: Option<String>,
    /// Notes of the current melody event, when stepping a melody.
    pub target_melody_event_notes: Option<Vec<String>>,
}

impl Prompt {
    /// Prompt targeting one note on one string.
    pub fn single_note(display_text: String, note: String, string: u8) -> Self {
        Prompt {
            display_text,
            target_note: Some(note),
            target_string: Some(string),
            ..Prompt::default()
        }
    }

    /// Prompt targeting a full chord voicing. Chord prompts always carry a
    /// fingering; the degraded single-note case goes through
    /// [`Prompt::single_note`] instead.
    pub fn chord(display_text: String, shape: &ChordShape) -> Self {
        Prompt {
            display_text,
            target_chord_notes: shape.notes.clone(),
            target_chord_fingering: shape.fingering.clone(),
            base_chord_name: Some(shape.name.clone()),
            ..Prompt::default()
        }
    }

    /// Prompt with no detection target, for open practice.
    pub fn untargeted(display_text: String) -> Self {
        Prompt { display_text, ..Prompt::default() }
    }
}

/// What `next()` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum NextOutcome {
    /// The next challenge.
    Prompt(Prompt),
    /// The sequence finished; the session shows the message and stops.
    Completed(String),
    /// No prompt can be generated under the current configuration.
    Failed(String),
}

/// The shared strategy contract.
pub trait ChallengeStrategy {
    /// Detection mode this strategy's prompts are matched under.
    fn detection_mode(&self) -> DetectionMode;
    /// Produces the next prompt, advancing any sequence state in `ctx`.
    fn next(&mut self, ctx: &mut SessionContext) -> NextOutcome;
}

/// One uniform draw in `[0, 1)` per call. Strategies take their randomness
/// through this seam so a fixed sequence makes selection deterministic.
pub trait UniformSource {
    fn next_f64(&mut self) -> f64;
}

/// Thread-local RNG behind the [`UniformSource`] seam.
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl UniformSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        use rand::Rng;
        rand::rng().random::<f64>()
    }
}

/// Maps one uniform draw onto an index in `[0, len)`.
pub(crate) fn pick_index(source: &mut dyn UniformSource, len: usize) -> usize {
    debug_assert!(len > 0);
    let raw = (source.next_f64() * len as f64) as usize;
    raw.min(len - 1)
}

#[cfg(test)]
pub(crate) struct FixedSource {
    values: Vec<f64>,
    cursor: usize,
}

#[cfg(test)]
impl FixedSource {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }
}

#[cfg(test)]
impl UniformSource for FixedSource {
    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
