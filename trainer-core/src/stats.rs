//! # Note Statistics & Profile Persistence
//!
//! Per-(note, string) accuracy and timing aggregates. The adaptive
//! strategy reads them to bias prompt selection toward weak spots; the
//! shell persists them between sessions through the profile helpers here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};

/// Historical results for one (note, string) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteStat {
    pub attempts: u32,
    pub correct: u32,
    /// Summed response time across all attempts, in milliseconds.
    pub total_time_ms: f64,
}

impl NoteStat {
    /// Records one attempt and how long it took.
    pub fn record(&mut self, correct: bool, elapsed_ms: f64) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
        self.total_time_ms += elapsed_ms;
    }

    /// Fraction of attempts that missed, in `[0, 1]`. Untried pairs read
    /// as zero; the adaptive strategy handles them through its cold-start
    /// weight instead.
    pub fn error_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        1.0 - f64::from(self.correct) / f64::from(self.attempts)
    }

    /// Mean response time per attempt, in milliseconds.
    pub fn average_time_ms(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.total_time_ms / f64::from(self.attempts)
    }
}

/// Map key for a (note, string) pair, e.g. `"C#4@2"`.
pub fn stat_key(note: &str, string: u8) -> String {
    format!("{}@{}", note, string)
}

/// Everything the trainer persists between sessions.
///
/// A BTreeMap keeps the serialized output sorted, which keeps saved
/// profiles diffable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerProfile {
    /// Calibrated A4 reference in Hz.
    pub calibrated_a4: f32,
    /// Keyed by [`stat_key`].
    pub note_stats: BTreeMap<String, NoteStat>,
    /// Best timed-mode score per practice mode.
    pub high_scores: BTreeMap<String, u32>,
}

impl Default for TrainerProfile {
    fn default() -> Self {
        Self {
            calibrated_a4: 440.0,
            note_stats: BTreeMap::new(),
            high_scores: BTreeMap::new(),
        }
    }
}

/// Saves a trainer profile as pretty-printed JSON.
pub fn save_profile(profile: &TrainerProfile, path: &str) -> anyhow::Result<()> {
    let json_string = serde_json::to_string_pretty(profile)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Loads a previously saved trainer profile.
pub fn load_profile(path: &str) -> anyhow::Result<TrainerProfile> {
    let mut file = File::open(path)?;
    let mut data = String::new();
    file.read_to_string(&mut data)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_updates_the_aggregates() {
        let mut stat = NoteStat::default();
        stat.record(true, 1200.0);
        stat.record(false, 2400.0);
        stat.record(true, 900.0);

        assert_eq!(stat.attempts, 3);
        assert_eq!(stat.correct, 2);
        assert!((stat.error_rate() - 1.0 / 3.0).abs() < 1e-9);
        assert!((stat.average_time_ms() - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn untried_pairs_read_as_neutral() {
        let stat = NoteStat::default();
        assert_eq!(stat.error_rate(), 0.0);
        assert_eq!(stat.average_time_ms(), 0.0);
    }

    #[test]
    fn profile_round_trips_through_json() {
        let mut profile = TrainerProfile::default();
        profile.calibrated_a4 = 441.5;
        profile
            .note_stats
            .insert(stat_key("E2", 6), NoteStat { attempts: 4, correct: 3, total_time_ms: 5200.0 });
        profile.high_scores.insert("timed-notes".to_string(), 42);

        let json = serde_json::to_string_pretty(&profile).unwrap();
        let restored: TrainerProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.calibrated_a4, 441.5);
        assert_eq!(restored.note_stats[&stat_key("E2", 6)].attempts, 4);
        assert_eq!(restored.high_scores["timed-notes"], 42);
    }
}
