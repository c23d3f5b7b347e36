//! # Detection Worker
//!
//! The serially-driven detection loop: audio frames come in on a channel,
//! each one runs through the pitch estimator, and the stability rules turn
//! raw estimates into confirmed notes. Frame processing itself is a pure
//! function over [`PromptCycleState`], so the increment rules are testable
//! without threads or audio hardware; the thread wrapper only moves data.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::pitch::{self, EstimateConfig};
use crate::tracking::{PromptCycleState, PITCH_WINDOW};
use crate::tuning;

/// Consecutive matching frames required before a note counts as played.
pub const STABLE_FRAMES_REQUIRED: u32 = 3;

/// What one frame of audio did to the detection state.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    /// No detectable pitch in this frame.
    Silence,
    /// A pitch was detected but has not been stable long enough yet.
    NoteHeld { note: String, cents: f32, frames: u32 },
    /// The same note held for [`STABLE_FRAMES_REQUIRED`] frames.
    NoteConfirmed { note: String, cents: f32 },
}

/// Applies one audio frame to the prompt-cycle state.
///
/// Silence increments the silence counter and breaks the stability run. A
/// detected pitch feeds the rolling window and either extends the current
/// run or starts a new one; the confirmation event fires exactly once, on
/// the frame that completes the run.
pub fn process_frame(
    frame: &[f32],
    sample_rate: f32,
    a4: f32,
    cycle: &mut PromptCycleState,
    config: &EstimateConfig,
) -> DetectionEvent {
    let Some(frequency) = pitch::estimate(frame, sample_rate, config) else {
        cycle.consecutive_silence += 1;
        cycle.stability.stable_note_count = 0;
        return DetectionEvent::Silence;
    };

    cycle.consecutive_silence = 0;
    cycle.last_pitches.push(frequency);
    if cycle.last_pitches.len() > PITCH_WINDOW {
        cycle.last_pitches.remove(0);
    }

    let (note, target_freq) = tuning::find_nearest_note(frequency, a4);
    let cents = tuning::cents_deviation(frequency, target_freq);

    if cycle.stability.last_note.as_deref() == Some(note.as_str()) {
        cycle.stability.stable_note_count += 1;
    } else {
        cycle.stability.last_note = Some(note.clone());
        cycle.stability.stable_note_count = 1;
    }

    if cycle.stability.stable_note_count == STABLE_FRAMES_REQUIRED {
        DetectionEvent::NoteConfirmed { note, cents }
    } else {
        DetectionEvent::NoteHeld {
            note,
            cents,
            frames: cycle.stability.stable_note_count,
        }
    }
}

/// Control messages for the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerControl {
    /// A new prompt went up; start the cycle from the baseline.
    ResetCycle,
    Shutdown,
}

/// Handle to the detection worker thread.
pub struct DetectionWorker {
    control_tx: Sender<WorkerControl>,
    thread_handle: Option<JoinHandle<()>>,
}

impl DetectionWorker {
    /// Spawns the worker.
    ///
    /// Frames received on `frames` are processed against a fresh
    /// [`PromptCycleState`]; every resulting event goes out on `events`.
    /// The worker exits when `Shutdown` arrives or either channel closes.
    pub fn spawn(
        frames: Receiver<Vec<f32>>,
        events: Sender<DetectionEvent>,
        sample_rate: f32,
        a4: f32,
    ) -> Self {
        let (control_tx, control_rx) = crossbeam_channel::bounded(4);
        let thread_handle = thread::spawn(move || {
            let config = EstimateConfig::default();
            let mut cycle = PromptCycleState::reset();
            eprintln!("[WORKER] Detection worker started");

            loop {
                crossbeam_channel::select! {
                    recv(frames) -> msg => match msg {
                        Ok(frame) => {
                            let event =
                                process_frame(&frame, sample_rate, a4, &mut cycle, &config);
                            if events.send(event).is_err() {
                                eprintln!("[WORKER] Event channel closed");
                                break;
                            }
                        }
                        Err(_) => {
                            eprintln!("[WORKER] Frame channel closed");
                            break;
                        }
                    },
                    recv(control_rx) -> msg => match msg {
                        Ok(WorkerControl::ResetCycle) => {
                            cycle = PromptCycleState::reset();
                        }
                        Ok(WorkerControl::Shutdown) | Err(_) => {
                            eprintln!("[WORKER] Shutting down");
                            break;
                        }
                    },
                }
            }
        });

        Self { control_tx, thread_handle: Some(thread_handle) }
    }

    /// Starts the next prompt cycle from the baseline.
    pub fn reset_cycle(&self) {
        let _ = self.control_tx.send(WorkerControl::ResetCycle);
    }

    /// Stops the worker and waits for the thread to finish.
    pub fn stop(&mut self) {
        let _ = self.control_tx.send(WorkerControl::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DetectionWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
