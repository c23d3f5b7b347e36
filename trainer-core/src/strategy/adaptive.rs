//! Adaptive prompt selection: pairs the player keeps missing, answers
//! slowly, or has never tried come up more often.

use crate::session::SessionContext;
use crate::stats::{stat_key, NoteStat};

use super::{ChallengeStrategy, DetectionMode, FretCandidate, NextOutcome, Prompt, UniformSource};

/// Weight for a (note, string) pair with no recorded attempts. Sits above
/// every history with an error rate under two thirds at instant response,
/// so new material gets drawn early without drowning out real weak spots.
const COLD_START_WEIGHT: f64 = 5.0;

/// How strongly the historical error rate inflates a pair's weight.
const ERROR_RATE_WEIGHT: f64 = 6.0;

/// How strongly slow answers inflate a pair's weight.
const SLOW_RESPONSE_WEIGHT: f64 = 2.0;

/// Response times are capped here before normalizing; beyond this the
/// player was clearly searching, and more delay says nothing new.
const RESPONSE_TIME_CEILING_MS: f64 = 8000.0;

/// Weight of one candidate given its history.
///
/// Monotonically increasing in both the error rate and the average
/// response time; a perfect, instant history bottoms out at 1.0.
fn candidate_weight(stat: Option<&NoteStat>) -> f64 {
    match stat {
        None => COLD_START_WEIGHT,
        Some(stat) if stat.attempts == 0 => COLD_START_WEIGHT,
        Some(stat) => {
            let slowness =
                stat.average_time_ms().min(RESPONSE_TIME_CEILING_MS) / RESPONSE_TIME_CEILING_MS;
            1.0 + ERROR_RATE_WEIGHT * stat.error_rate() + SLOW_RESPONSE_WEIGHT * slowness
        }
    }
}

/// Weighted random (note, string) prompts biased toward weak spots.
///
/// The candidate pool is every playable pair under the current filters;
/// selection walks the cumulative weights with a single uniform draw, so a
/// fixed [`UniformSource`] makes the choice fully deterministic.
pub struct AdaptiveStrategy {
    candidates: Vec<FretCandidate>,
    source: Box<dyn UniformSource>,
}

impl AdaptiveStrategy {
    pub fn new(candidates: Vec<FretCandidate>, source: Box<dyn UniformSource>) -> Self {
        Self { candidates, source }
    }
}

impl ChallengeStrategy for AdaptiveStrategy {
    fn detection_mode(&self) -> DetectionMode {
        DetectionMode::SingleNote
    }

    fn next(&mut self, ctx: &mut SessionContext) -> NextOutcome {
        if self.candidates.is_empty() {
            return NextOutcome::Failed(
                "No playable notes match the current filters.".to_string(),
            );
        }

        let weights: Vec<f64> = self
            .candidates
            .iter()
            .map(|c| candidate_weight(ctx.note_stats.get(&stat_key(&c.note, c.string))))
            .collect();
        let total: f64 = weights.iter().sum();

        // One uniform draw against the cumulative weights.
        let mut target = self.source.next_f64() * total;
        let mut chosen = self.candidates.len() - 1;
        for (index, weight) in weights.iter().enumerate() {
            target -= weight;
            if target < 0.0 {
                chosen = index;
                break;
            }
        }

        let candidate = self.candidates[chosen].clone();
        NextOutcome::Prompt(Prompt::single_note(
            format!("Play {} on string {}", candidate.note, candidate.string),
            candidate.note,
            candidate.string,
        ))
    }
}
