// src/progress.rs
//! Fake-progress driver shown while the real analysis request is pending.
//!
//! Steps light up on fixed timers because backend latency is unknown. When
//! the real request finishes the timers are cancelled and the panel is
//! reconciled with the actual outcome.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Activation offsets for each step, in milliseconds.
pub const STEP_DELAYS_MS: [u64; 4] = [0, 2000, 4500, 7000];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressStep {
    ReadingResume,
    ExtractingSkills,
    MatchingRequirements,
    GeneratingInsights,
}

impl ProgressStep {
    pub const ALL: [ProgressStep; 4] = [
        ProgressStep::ReadingResume,
        ProgressStep::ExtractingSkills,
        ProgressStep::MatchingRequirements,
        ProgressStep::GeneratingInsights,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProgressStep::ReadingResume => "Reading your resume",
            ProgressStep::ExtractingSkills => "Extracting skills",
            ProgressStep::MatchingRequirements => "Matching job requirements",
            ProgressStep::GeneratingInsights => "Generating insights",
        }
    }

    fn index(&self) -> usize {
        match self {
            ProgressStep::ReadingResume => 0,
            ProgressStep::ExtractingSkills => 1,
            ProgressStep::MatchingRequirements => 2,
            ProgressStep::GeneratingInsights => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StepState {
    Pending,
    Active,
    Done,
}

/// Receives every visible change of the progress panel.
pub trait ProgressSink: Send + Sync {
    fn on_step(&self, step: ProgressStep, state: StepState);
    fn on_visibility(&self, visible: bool);
}

/// Sink for callers that do not render progress.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_step(&self, _step: ProgressStep, _state: StepState) {}
    fn on_visibility(&self, _visible: bool) {}
}

struct PanelState {
    steps: [StepState; 4],
    visible: bool,
    cancelled: bool,
    timers: Vec<JoinHandle<()>>,
}

impl PanelState {
    /// Move a step forward. Returns false when the move would regress.
    fn advance(&mut self, step: ProgressStep, to: StepState) -> bool {
        let current = &mut self.steps[step.index()];
        if *current >= to {
            return false;
        }
        *current = to;
        true
    }
}

struct Shared {
    state: Mutex<PanelState>,
    sink: Arc<dyn ProgressSink>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PanelState> {
        // A panicking sink must not wedge the panel.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set(&self, state: &mut PanelState, step: ProgressStep, to: StepState) {
        if state.advance(step, to) {
            self.sink.on_step(step, to);
        }
    }

    /// Timer callback for step `i`. Runs entirely under the lock, and does
    /// nothing once the reporter has been cancelled.
    fn fire(&self, index: usize) {
        let mut state = self.lock();
        if state.cancelled {
            return;
        }

        let step = ProgressStep::ALL[index];
        if state.steps[index] == StepState::Done {
            return;
        }
        self.set(&mut state, step, StepState::Active);
        if index > 0 {
            self.set(&mut state, ProgressStep::ALL[index - 1], StepState::Done);
        }
        debug!("Progress step active: {}", step.label());
    }

    fn cancel_timers(&self, state: &mut PanelState) {
        state.cancelled = true;
        for timer in state.timers.drain(..) {
            timer.abort();
        }
    }
}

/// Handle to one run of the progress panel.
pub struct ProgressReporter {
    shared: Arc<Shared>,
}

impl ProgressReporter {
    /// Reveal the panel and schedule the step timers. Must be called from
    /// within a tokio runtime.
    pub fn start(sink: Arc<dyn ProgressSink>) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(PanelState {
                steps: [StepState::Pending; 4],
                visible: true,
                cancelled: false,
                timers: Vec::with_capacity(STEP_DELAYS_MS.len()),
            }),
            sink,
        });

        {
            let mut state = shared.lock();
            shared.sink.on_visibility(true);

            for (index, delay_ms) in STEP_DELAYS_MS.iter().copied().enumerate() {
                let task_shared = Arc::clone(&shared);
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    task_shared.fire(index);
                });
                state.timers.push(timer);
            }
        }

        Self { shared }
    }

    /// Real work finished: stop the timers and mark every step done.
    pub fn complete_success(&self) {
        let mut state = self.shared.lock();
        self.shared.cancel_timers(&mut state);
        for step in ProgressStep::ALL {
            self.shared.set(&mut state, step, StepState::Done);
        }
    }

    /// Real work failed: stop the timers and hide the panel.
    pub fn complete_failure(&self) {
        let mut state = self.shared.lock();
        self.shared.cancel_timers(&mut state);
        if state.visible {
            state.visible = false;
            self.shared.sink.on_visibility(false);
        }
        warn!("Progress panel hidden after failed analysis");
    }

    pub fn step_state(&self, step: ProgressStep) -> StepState {
        self.shared.lock().steps[step.index()]
    }

    pub fn snapshot(&self) -> Vec<(ProgressStep, StepState)> {
        let state = self.shared.lock();
        ProgressStep::ALL
            .iter()
            .map(|step| (*step, state.steps[step.index()]))
            .collect()
    }

    pub fn is_visible(&self) -> bool {
        self.shared.lock().visible
    }

    pub fn is_finished(&self) -> bool {
        self.shared.lock().cancelled
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        self.shared.cancel_timers(&mut state);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every event so tests can check ordering and monotonicity.
    #[derive(Default)]
    pub struct RecordingSink {
        pub events: Mutex<Vec<(ProgressStep, StepState)>>,
        pub visibility: Mutex<Vec<bool>>,
    }

    impl ProgressSink for RecordingSink {
        fn on_step(&self, step: ProgressStep, state: StepState) {
            self.events.lock().unwrap().push((step, state));
        }

        fn on_visibility(&self, visible: bool) {
            self.visibility.lock().unwrap().push(visible);
        }
    }

    impl RecordingSink {
        pub fn assert_monotonic(&self) {
            let events = self.events.lock().unwrap();
            for step in ProgressStep::ALL {
                let states: Vec<_> = events
                    .iter()
                    .filter(|(s, _)| *s == step)
                    .map(|(_, st)| *st)
                    .collect();
                assert!(
                    states.windows(2).all(|w| w[0] < w[1]),
                    "{:?} regressed: {:?}",
                    step,
                    states
                );
            }
        }

        /// Last state reported for each step, `Pending` if never reported.
        pub fn final_states(&self) -> Vec<StepState> {
            let events = self.events.lock().unwrap();
            ProgressStep::ALL
                .iter()
                .map(|step| {
                    events
                        .iter()
                        .rev()
                        .find(|(s, _)| s == step)
                        .map(|(_, state)| *state)
                        .unwrap_or(StepState::Pending)
                })
                .collect()
        }
    }
}
