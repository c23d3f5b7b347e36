//! # Tuning Calibration Module
//!
//! Derives the session's A4 reference from a burst of open-A-string pitch
//! samples. The player plucks the open A string, the detection loop feeds
//! every estimate into [`CalibrationState::samples`], and finishing the
//! burst either commits a new reference or schedules a retry.
//!
//! All decision functions here are pure; committing the reference and
//! driving the modal are separate steps performed by the caller.

use crate::delay::DelayGate;

/// Delay before the calibration modal advances after an outcome, in ms.
pub const OUTCOME_DELAY_MS: u64 = 2000;

/// Fixed retry message. Detail about why the attempt failed stays in the
/// outcome context, never in front of the player.
pub const RETRY_MESSAGE: &str = "No usable pitch detected. Pluck the open A string and let it ring.";

/// Expected open-A-string frequency and octave for the active tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenAInfo {
    /// Frequency of the open A string in Hz, before calibration.
    pub expected_frequency: f32,
    /// Octave of the open A string (2 on a guitar, 4 on a ukulele).
    pub octave: i32,
}

/// Parses the open-A string label of a tuning, e.g. `"A2"` or `"A4"`.
///
/// Invalid or missing input falls back to A4 at 440 Hz, so a broken tuning
/// table degrades to the canonical reference instead of poisoning
/// calibration.
pub fn open_a_tuning_info(a_label: Option<&str>) -> OpenAInfo {
    let octave = a_label
        .and_then(|label| label.strip_prefix('A'))
        .and_then(|digits| digits.parse::<i32>().ok());

    match octave {
        Some(octave) => OpenAInfo {
            expected_frequency: 440.0 * 2.0_f32.powi(octave - 4),
            octave,
        },
        None => OpenAInfo {
            expected_frequency: 440.0,
            octave: 4,
        },
    }
}

/// Computes the A4 reference from one burst of open-A pitch samples.
///
/// Non-finite and non-positive samples are discarded before averaging; the
/// mean is then transposed from the open string's octave up to A4.
///
/// # Returns
/// * `Some(a4)` - Calibrated A4 reference in Hz
/// * `None` - No usable samples in the burst
pub fn compute_reference(samples: &[f32], open_a_octave: i32) -> Option<f32> {
    let usable: Vec<f32> = samples
        .iter()
        .copied()
        .filter(|s| s.is_finite() && *s > 0.0)
        .collect();
    if usable.is_empty() {
        return None;
    }
    let mean = usable.iter().sum::<f32>() / usable.len() as f32;
    Some(mean * 2.0_f32.powi(4 - open_a_octave))
}

/// Outcome of finishing one calibration attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationOutcome {
    /// Try again after the delay. `context` names the failure for the log.
    Retry {
        message: &'static str,
        delay_ms: u64,
        context: &'static str,
    },
    /// Commit `calibrated_a4` and close after the delay.
    Success {
        message: String,
        delay_ms: u64,
        calibrated_a4: f32,
    },
}

/// Decides how one calibration attempt ends.
///
/// # Arguments
/// * `has_samples` - Whether the burst collected any samples at all
/// * `calibrated_a4` - Result of [`compute_reference`] over the burst
pub fn finish_outcome(has_samples: bool, calibrated_a4: Option<f32>) -> CalibrationOutcome {
    if !has_samples {
        return CalibrationOutcome::Retry {
            message: RETRY_MESSAGE,
            delay_ms: OUTCOME_DELAY_MS,
            context: "empty-samples",
        };
    }
    match calibrated_a4 {
        None => CalibrationOutcome::Retry {
            message: RETRY_MESSAGE,
            delay_ms: OUTCOME_DELAY_MS,
            context: "invalid-samples",
        },
        Some(a4) => CalibrationOutcome::Success {
            message: format!("Calibration complete. A4 = {:.2} Hz", a4),
            delay_ms: OUTCOME_DELAY_MS,
            calibrated_a4: a4,
        },
    }
}

/// Mutable state of one calibration flow.
#[derive(Debug, Default)]
pub struct CalibrationState {
    /// Set while the modal is open and samples are being collected.
    pub in_progress: bool,
    /// Pitch samples collected during the current burst.
    pub samples: Vec<f32>,
    /// Gate for the pending retry/success delay.
    pub delay: DelayGate,
}

/// Collaborators the calibration teardown drives.
pub trait CalibrationHooks {
    fn hide_modal(&self);
    /// Stop listening; `keep_stream_open` leaves the device stream paused
    /// instead of releasing it.
    fn stop_listening(&self, keep_stream_open: bool);
}

/// Tears down the calibration flow.
///
/// Always hides the modal, clears the in-progress flag and the sample
/// buffer, and invalidates any pending delayed outcome. The stream is kept
/// open exactly when no concurrent practice session holds the listening
/// flag, so calibration never yanks the microphone out from under a
/// running session.
pub fn close_session(
    state: &mut CalibrationState,
    session_listening: bool,
    hooks: &dyn CalibrationHooks,
) {
    hooks.hide_modal();
    state.in_progress = false;
    state.samples.clear();
    state.delay.cancel();
    hooks.stop_listening(!session_listening);
}
