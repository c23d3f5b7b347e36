//! # Musical Tuning Module
//!
//! Note-name and frequency math for the ear trainer. All frequency
//! calculations take the calibrated A4 reference as an argument instead of
//! assuming 440 Hz, so a successful calibration is picked up by every later
//! note mapping.
//!
//! ## Features
//! - Note-name table spanning A0 to C8
//! - Equal temperament frequencies relative to a calibrated A4
//! - Cent deviation calculations for tuner feedback
//! - Note-name parsing ("C#4", "Bb2") to MIDI numbers

use once_cell::sync::Lazy;

/// MIDI number of A0, the lowest note in the table.
const MIDI_LOW: i32 = 21;
/// MIDI number of C8, the highest note in the table.
const MIDI_HIGH: i32 = 108;
/// MIDI number of A4, the calibration anchor.
const MIDI_A4: i32 = 69;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Statically computed note names for the A0..C8 span.
///
/// Only the names are static; frequencies depend on the calibrated A4 and
/// are always computed on demand.
static NAMES: Lazy<Vec<String>> = Lazy::new(|| {
    (MIDI_LOW..=MIDI_HIGH).map(note_name).collect()
});

/// Returns the name ("C#4", "A2") for a MIDI note number.
pub fn note_name(midi: i32) -> String {
    let class = midi.rem_euclid(12) as usize;
    let octave = midi / 12 - 1;
    format!("{}{}", NOTE_NAMES[class], octave)
}

/// Equal temperament frequency of a MIDI note relative to a calibrated A4.
pub fn note_frequency(midi: i32, a4: f32) -> f32 {
    a4 * 2.0_f32.powf((midi - MIDI_A4) as f32 / 12.0)
}

/// Parses a note name like "A4", "C#3", or "Bb2" into a MIDI number.
///
/// # Returns
/// * `Some(midi)` - Parsed MIDI note number
/// * `None` - Not a recognizable note name
pub fn parse_note(name: &str) -> Option<i32> {
    let name = name.trim();
    let mut chars = name.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let base = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest: String = chars.collect();
    let (accidental, octave_str) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest.as_str()),
    };
    let octave: i32 = octave_str.parse().ok()?;
    Some((octave + 1) * 12 + base + accidental)
}

/// Strips the octave digits from a note name, leaving the pitch class.
pub fn pitch_class(name: &str) -> &str {
    name.trim_end_matches(|c: char| c.is_ascii_digit() || c == '-')
}

/// Finds the closest note to a frequency, given the calibrated A4.
///
/// Searches the A0..C8 span for the note whose equal-temperament frequency
/// is nearest the input. Used for automatic note detection in the
/// practice loop.
///
/// # Arguments
/// * `freq` - Input frequency in Hz
/// * `a4` - Calibrated A4 reference in Hz
///
/// # Returns
/// * `(note_name, target_frequency)` - Closest note and its target frequency
pub fn find_nearest_note(freq: f32, a4: f32) -> (String, f32) {
    let raw = MIDI_A4 as f32 + 12.0 * (freq / a4).log2();
    let midi = (raw.round() as i32).clamp(MIDI_LOW, MIDI_HIGH);
    let name = NAMES[(midi - MIDI_LOW) as usize].clone();
    (name, note_frequency(midi, a4))
}

/// Calculates the deviation from a target frequency in cents.
///
/// Positive values indicate sharpness, negative values indicate flatness;
/// 100 cents is one semitone.
pub fn cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}
