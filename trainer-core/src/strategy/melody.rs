//! Melody stepping: one prompt per melody event, with a single-note
//! fallback for the tuner display.

use crate::session::SessionContext;

use super::{ChallengeStrategy, DetectionMode, NextOutcome, Prompt};

/// One moment of a melody; usually a single note, sometimes a double stop.
#[derive(Debug, Clone, PartialEq)]
pub struct MelodyEvent {
    pub notes: Vec<String>,
}

/// A melody fetched from the external library by id and instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct MelodyTrack {
    pub name: String,
    pub events: Vec<MelodyEvent>,
}

/// Walks a melody event by event, completing at the end.
pub struct MelodyStrategy {
    track: MelodyTrack,
    position: usize,
}

impl MelodyStrategy {
    pub fn new(track: MelodyTrack) -> Self {
        Self { track, position: 0 }
    }
}

impl ChallengeStrategy for MelodyStrategy {
    fn detection_mode(&self) -> DetectionMode {
        DetectionMode::Chord
    }

    fn next(&mut self, _ctx: &mut SessionContext) -> NextOutcome {
        if self.track.events.is_empty() {
            return NextOutcome::Failed(format!("Melody {} has no events.", self.track.name));
        }

        if self.position >= self.track.events.len() {
            self.position = 0;
            return NextOutcome::Completed(format!("{} complete!", self.track.name));
        }

        let event = self.track.events[self.position].clone();
        let position = self.position + 1;
        self.position += 1;

        // Visual fallback: a one-note event can drive the tuner directly.
        let target_note = if event.notes.len() == 1 {
            Some(event.notes[0].clone())
        } else {
            None
        };

        NextOutcome::Prompt(Prompt {
            display_text: format!(
                "{}: play {} ({} of {})",
                self.track.name,
                event.notes.join(" + "),
                position,
                self.track.events.len()
            ),
            target_note,
            target_melody_event_notes: Some(event.notes),
            ..Prompt::default()
        })
    }
}
