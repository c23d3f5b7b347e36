//! # Rhythm Timing Evaluator
//!
//! Scores a detected event's offset against a periodic beat reference.
//! The metronome itself runs outside this crate; the evaluator only sees a
//! read-only snapshot of it and the timestamp of the played event.

/// Strictness of the timing judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RhythmMode {
    Strict,
    #[default]
    Normal,
    Loose,
}

/// On-beat and feedback windows for a mode, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhythmThresholds {
    /// Offsets within this window count as on the beat.
    pub on_beat_ms: f64,
    /// Offsets within this window still get early/late feedback; beyond it
    /// the hit is way off.
    pub feedback_ms: f64,
}

pub fn thresholds(mode: RhythmMode) -> RhythmThresholds {
    match mode {
        RhythmMode::Strict => RhythmThresholds { on_beat_ms: 55.0, feedback_ms: 120.0 },
        RhythmMode::Loose => RhythmThresholds { on_beat_ms: 130.0, feedback_ms: 240.0 },
        RhythmMode::Normal => RhythmThresholds { on_beat_ms: 90.0, feedback_ms: 180.0 },
    }
}

/// Read-only view of the external metronome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhythmSnapshot {
    pub is_running: bool,
    /// Timestamp of the most recent beat, if one has fired.
    pub last_beat_at_ms: Option<f64>,
    /// Beat period in milliseconds.
    pub interval_ms: f64,
}

/// How one hit relates to the beat grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingVerdict {
    OnBeat,
    Early,
    Late,
    TooEarly,
    TooLate,
}

impl TimingVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            TimingVerdict::OnBeat => "On beat",
            TimingVerdict::Early => "Early",
            TimingVerdict::Late => "Late",
            TimingVerdict::TooEarly => "Too early",
            TimingVerdict::TooLate => "Too late",
        }
    }

    /// On-beat hits succeed; everything else reads as an error tone.
    pub fn is_success(&self) -> bool {
        matches!(self, TimingVerdict::OnBeat)
    }
}

/// Judgment for one played event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingResult {
    pub verdict: TimingVerdict,
    /// Signed offset to the nearer beat, in milliseconds.
    pub offset_ms: i64,
}

/// Scores one event against the beat grid.
///
/// The offset is measured to whichever of the previous beat and the next
/// expected beat is nearer in absolute value, so a hit just before the
/// next click reads as early rather than hopelessly late.
///
/// # Returns
/// * `Some(result)` - Judged offset and verdict
/// * `None` - Metronome not running, no beat yet, or a degenerate interval
pub fn evaluate(now_ms: f64, snapshot: &RhythmSnapshot, mode: RhythmMode) -> Option<TimingResult> {
    if !snapshot.is_running || snapshot.interval_ms <= 0.0 {
        return None;
    }
    let last_beat = snapshot.last_beat_at_ms?;

    let offset_to_last = now_ms - last_beat;
    let offset_to_next = now_ms - (last_beat + snapshot.interval_ms);
    let chosen = if offset_to_next.abs() < offset_to_last.abs() {
        offset_to_next
    } else {
        offset_to_last
    };
    let offset_ms = chosen.round() as i64;

    let limits = thresholds(mode);
    let magnitude = offset_ms.abs() as f64;
    let verdict = if magnitude <= limits.on_beat_ms {
        TimingVerdict::OnBeat
    } else if magnitude <= limits.feedback_ms {
        if offset_ms < 0 { TimingVerdict::Early } else { TimingVerdict::Late }
    } else if offset_ms < 0 {
        TimingVerdict::TooEarly
    } else {
        TimingVerdict::TooLate
    };

    Some(TimingResult { verdict, offset_ms })
}

/// Formats a judgment for the result line, e.g. `"Strum: Late (+110ms)"`.
/// The sign is shown only for positive offsets; negative offsets carry
/// their own minus.
pub fn format_feedback(result: &TimingResult, label: &str) -> String {
    let sign = if result.offset_ms > 0 { "+" } else { "" };
    format!(
        "{}: {} ({}{}ms)",
        label,
        result.verdict.label(),
        sign,
        result.offset_ms
    )
}
