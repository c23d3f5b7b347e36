//! # Session Lifecycle Planner
//!
//! Pure decision functions for the session's lifecycle transitions: start
//! preflight, next-prompt transition, time-up, and full reset. Each planner
//! returns a value object describing what should happen; the shell commits
//! the plan against the UI, audio, and storage collaborators it owns.

use std::collections::BTreeMap;

use crate::guard::{ErrorGuard, SessionHooks};
use crate::stats::NoteStat;
use crate::strategy::{DetectionMode, Prompt};
use crate::tracking::PromptCycleState;
use crate::MessageTone;

/// Whether the session runs free-form or against the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeMode {
    Free,
    Timed,
}

/// Shown when a progression-based mode is started without a resolvable
/// progression.
pub const PROGRESSION_ERROR: &str = "Select a chord progression first.";

/// Shown when the selected mode has no strategy behind it.
pub const MODE_UNAVAILABLE_ERROR: &str = "This practice mode is not available.";

/// Mutable session state shared by every strategy call.
///
/// Strategies receive this context by reference instead of reading module
/// globals, so tests can drive them with plain fixtures.
#[derive(Debug, Default)]
pub struct SessionContext {
    /// Calibrated A4 reference; written only by a successful calibration.
    pub calibrated_a4: f32,
    /// Tracking state for the current prompt cycle.
    pub cycle: PromptCycleState,
    /// The prompt currently in front of the player.
    pub current_prompt: Option<Prompt>,
    /// Resolved scale for the scale-practice mode.
    pub scale_notes: Vec<String>,
    pub scale_index: usize,
    /// Resolved chord sequence for the progression mode.
    pub progression: Vec<String>,
    pub progression_index: usize,
    /// Step position inside the active arpeggio.
    pub arpeggio_index: usize,
    /// Historical per-(note, string) results, persisted externally.
    pub note_stats: BTreeMap<String, NoteStat>,
}

impl SessionContext {
    /// Returns the session to its pre-start baseline.
    ///
    /// Every collection is a fresh allocation; the calibrated reference and
    /// the note statistics survive, since they outlive individual sessions.
    pub fn reset(&mut self) {
        self.cycle = PromptCycleState::reset();
        self.current_prompt = None;
        self.scale_notes = Vec::new();
        self.scale_index = 0;
        self.progression = Vec::new();
        self.progression_index = 0;
        self.arpeggio_index = 0;
    }
}

/// Which buttons the shell should enable while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMatrix {
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub hint_enabled: bool,
    pub sound_enabled: bool,
}

/// Countdown parameters for the timed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedParams {
    pub enabled: bool,
    pub duration_secs: u32,
    pub score: u32,
}

/// Everything the start preflight decided.
#[derive(Debug, Clone, PartialEq)]
pub struct StartPlan {
    pub buttons: ButtonMatrix,
    pub timed: TimedParams,
    pub progression_required: bool,
    pub progression_valid: bool,
    /// Resolved chord sequence, empty when unresolved or not required.
    pub progression: Vec<String>,
    pub reset_arpeggio_index: bool,
    pub should_start: bool,
    pub error_message: Option<&'static str>,
}

/// Start preflight: button disablement, timed parameters, progression
/// resolution, and whether the session may start at all.
///
/// `progression_key` is `None` when the selected mode does not use
/// progressions; `Some(key)` requires the key to resolve to a non-empty
/// sequence in `progression_table`.
pub fn plan_start(
    mode: PracticeMode,
    detection: DetectionMode,
    progression_key: Option<&str>,
    progression_table: &BTreeMap<String, Vec<String>>,
    timed_duration_secs: u32,
) -> StartPlan {
    let progression_required = progression_key.is_some();
    let progression: Vec<String> = progression_key
        .and_then(|key| progression_table.get(key))
        .cloned()
        .unwrap_or_default();
    let progression_valid = !progression.is_empty();
    let blocked = progression_required && !progression_valid;

    StartPlan {
        buttons: ButtonMatrix {
            start_enabled: false,
            stop_enabled: true,
            hint_enabled: detection == DetectionMode::SingleNote,
            sound_enabled: false,
        },
        timed: TimedParams {
            enabled: mode == PracticeMode::Timed,
            duration_secs: timed_duration_secs,
            score: 0,
        },
        progression_required,
        progression_valid,
        progression,
        reset_arpeggio_index: true,
        should_start: !blocked,
        error_message: blocked.then_some(PROGRESSION_ERROR),
    }
}

/// What the session should do after asking the strategy for a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPromptAction {
    Continue,
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NextPromptPlan {
    pub action: NextPromptAction,
    pub error_message: Option<&'static str>,
    pub tuner_visible: bool,
    pub should_reset_tuner: bool,
}

/// Next-prompt transition: stop with an error when there is no strategy,
/// stop quietly when the strategy produced nothing, otherwise continue.
///
/// The tuner is only relevant for single-note detection, and only once a
/// strategy exists; a missing-strategy stop leaves it hidden.
pub fn plan_next_prompt(
    has_strategy: bool,
    detection: DetectionMode,
    has_prompt: bool,
) -> NextPromptPlan {
    if !has_strategy {
        return NextPromptPlan {
            action: NextPromptAction::Stop,
            error_message: Some(MODE_UNAVAILABLE_ERROR),
            tuner_visible: false,
            should_reset_tuner: false,
        };
    }

    let tuner = detection == DetectionMode::SingleNote;
    NextPromptPlan {
        action: if has_prompt { NextPromptAction::Continue } else { NextPromptAction::Stop },
        error_message: None,
        tuner_visible: tuner,
        should_reset_tuner: tuner,
    }
}

/// Decision for the end of a timed session.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUpPlan {
    pub message: String,
    pub persist_high_score: bool,
    pub next_high_score: u32,
}

pub fn plan_time_up(score: u32, high_score: u32) -> TimeUpPlan {
    let persist = score > high_score;
    TimeUpPlan {
        message: format!("Time's Up! Final Score: {}", score),
        persist_high_score: persist,
        next_high_score: if persist { score } else { high_score },
    }
}

/// Collaborators the countdown drives.
pub trait CountdownHooks {
    /// Pushes the remaining seconds to the UI.
    fn show_remaining(&self, secs: i32) -> anyhow::Result<()>;
    fn clear_timer(&self);
    fn stop_listening(&self);
    fn persist_high_score(&self, score: u32) -> anyhow::Result<()>;
    fn show_result(&self, message: &str, tone: MessageTone);
}

/// Commits a time-up plan: the timer and the microphone always go down
/// first, the high score is persisted only when the plan says so, and the
/// plan's message is reported last.
pub fn execute_time_up(plan: &TimeUpPlan, hooks: &dyn CountdownHooks) -> anyhow::Result<()> {
    hooks.clear_timer();
    hooks.stop_listening();
    if plan.persist_high_score {
        hooks.persist_high_score(plan.next_high_score)?;
    }
    hooks.show_result(&plan.message, MessageTone::Success);
    Ok(())
}

/// Live countdown state for a timed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownState {
    pub remaining_secs: i32,
    pub score: u32,
    pub high_score: u32,
}

/// One countdown tick: decrement, publish, and fire time-up at zero.
///
/// Collaborator failures during the tick are routed to the error guard
/// tagged "timed interval tick"; they never propagate to the timer driver.
pub fn run_timed_tick(
    countdown: &mut CountdownState,
    hooks: &dyn CountdownHooks,
    guard: &ErrorGuard,
    session_hooks: &dyn SessionHooks,
) {
    if let Err(error) = try_tick(countdown, hooks) {
        guard.report(session_hooks, "timed interval tick", &error);
    }
}

fn try_tick(countdown: &mut CountdownState, hooks: &dyn CountdownHooks) -> anyhow::Result<()> {
    countdown.remaining_secs -= 1;
    hooks.show_remaining(countdown.remaining_secs)?;
    if countdown.remaining_secs <= 0 {
        let plan = plan_time_up(countdown.score, countdown.high_score);
        execute_time_up(&plan, hooks)?;
        countdown.high_score = plan.next_high_score;
    }
    Ok(())
}
