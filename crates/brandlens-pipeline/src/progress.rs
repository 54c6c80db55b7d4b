//! Run progress reporting.
//!
//! [`PhaseProgress`] counts completed steps across the phases of a run and
//! turns each step into a [`ProgressEvent`] for a [`ProgressSink`]. Counters
//! are atomics so concurrent source tasks can report without locking.
//! Reporting is purely observational and never affects the run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::state::RunState;

/// One phase and the number of steps it is expected to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSpec {
    pub state: RunState,
    pub steps: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: RunState,
    /// Zero-based index of `phase` within the run's phases.
    pub phase_index: usize,
    pub total_phases: usize,
    pub step: String,
    pub completed: usize,
    pub total: usize,
    /// Overall completion, capped at 100.
    pub percent: u8,
    pub elapsed: Duration,
    /// `None` until at least one step has completed.
    pub eta: Option<Duration>,
}

/// Receives progress notifications.
pub trait ProgressSink: Send + Sync {
    fn on_phase(&self, _phase: RunState, _index: usize, _total_phases: usize) {}

    fn on_event(&self, event: &ProgressEvent);
}

/// Logs progress at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_phase(&self, phase: RunState, index: usize, total_phases: usize) {
        tracing::info!(
            phase = %phase,
            "phase {}/{}",
            index + 1,
            total_phases
        );
    }

    fn on_event(&self, event: &ProgressEvent) {
        tracing::info!(
            phase = %event.phase,
            completed = event.completed,
            total = event.total,
            percent = event.percent,
            elapsed_secs = event.elapsed.as_secs(),
            eta_secs = event.eta.map(|d| d.as_secs()),
            "{}",
            event.step
        );
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn on_event(&self, _event: &ProgressEvent) {}
}

#[derive(Debug)]
pub struct PhaseProgress {
    phases: Vec<PhaseSpec>,
    current_phase: AtomicUsize,
    completed: AtomicUsize,
    total_steps: usize,
    started: Instant,
}

impl PhaseProgress {
    #[must_use]
    pub fn new(phases: Vec<PhaseSpec>) -> Self {
        let total_steps = phases.iter().map(|p| p.steps).sum();
        Self {
            phases,
            current_phase: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            total_steps,
            started: Instant::now(),
        }
    }

    /// The phase layout of one run: a step for discovery, one per requested
    /// source, one for metrics, one for analysis when enabled, and one for
    /// persistence.
    #[must_use]
    pub fn for_run(sources: usize, ai_enabled: bool) -> Self {
        Self::new(vec![
            PhaseSpec {
                state: RunState::Discovering,
                steps: 1,
            },
            PhaseSpec {
                state: RunState::Retrieving,
                steps: sources,
            },
            PhaseSpec {
                state: RunState::ComputingMetrics,
                steps: 1,
            },
            PhaseSpec {
                state: RunState::AnalyzingAi,
                steps: usize::from(ai_enabled),
            },
            PhaseSpec {
                state: RunState::Persisting,
                steps: 1,
            },
        ])
    }

    #[must_use]
    pub fn total_phases(&self) -> usize {
        self.phases.len()
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    #[must_use]
    pub fn completed_steps(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Mark `state` as the current phase and tell the sink. Unknown phases
    /// are logged and leave the current phase unchanged.
    pub fn start_phase(&self, state: RunState, sink: &dyn ProgressSink) {
        match self.phases.iter().position(|p| p.state == state) {
            Some(index) => {
                self.current_phase.store(index, Ordering::Relaxed);
                sink.on_phase(state, index, self.phases.len());
            }
            None => tracing::debug!(phase = %state, "phase not tracked by progress"),
        }
    }

    /// Record one completed step and report it.
    pub fn step(&self, description: impl Into<String>, sink: &dyn ProgressSink) -> ProgressEvent {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let index = self.current_phase.load(Ordering::Relaxed);
        let phase = self.phases.get(index).map_or(RunState::Idle, |p| p.state);
        let elapsed = self.started.elapsed();

        let event = ProgressEvent {
            phase,
            phase_index: index,
            total_phases: self.phases.len(),
            step: description.into(),
            completed,
            total: self.total_steps,
            percent: percent(completed, self.total_steps),
            elapsed,
            eta: eta(elapsed, completed, self.total_steps),
        };
        sink.on_event(&event);
        event
    }
}

fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (completed.saturating_mul(100) / total).min(100);
    u8::try_from(pct).unwrap_or(100)
}

#[allow(clippy::cast_precision_loss)]
fn eta(elapsed: Duration, completed: usize, total: usize) -> Option<Duration> {
    if completed == 0 {
        return None;
    }
    let remaining = total.saturating_sub(completed);
    Some(elapsed.mul_f64(remaining as f64 / completed as f64))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        phases: Mutex<Vec<(RunState, usize)>>,
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for Recorder {
        fn on_phase(&self, phase: RunState, index: usize, _total_phases: usize) {
            self.phases.lock().unwrap().push((phase, index));
        }

        fn on_event(&self, event: &ProgressEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn run_layout_counts_steps() {
        assert_eq!(PhaseProgress::for_run(3, true).total_steps(), 7);
        assert_eq!(PhaseProgress::for_run(3, false).total_steps(), 6);
        assert_eq!(PhaseProgress::for_run(0, false).total_phases(), 5);
    }

    #[test]
    fn steps_report_phase_and_percent() {
        let sink = Recorder::default();
        let progress = PhaseProgress::for_run(2, false);

        progress.start_phase(RunState::Discovering, &sink);
        progress.step("resolved", &sink);
        progress.start_phase(RunState::Retrieving, &sink);
        let event = progress.step("instagram done", &sink);

        assert_eq!(event.phase, RunState::Retrieving);
        assert_eq!(event.phase_index, 1);
        assert_eq!((event.completed, event.total), (2, 5));
        assert_eq!(event.percent, 40);
        assert!(event.eta.is_some());

        let phases = sink.phases.lock().unwrap();
        assert_eq!(
            *phases,
            vec![(RunState::Discovering, 0), (RunState::Retrieving, 1)]
        );
        assert_eq!(sink.events.lock().unwrap().len(), 2);
    }

    #[test]
    fn percent_is_capped() {
        let sink = NoopProgressSink;
        let progress = PhaseProgress::new(vec![PhaseSpec {
            state: RunState::Retrieving,
            steps: 1,
        }]);
        progress.step("one", &sink);
        let event = progress.step("extra", &sink);
        assert_eq!(event.percent, 100);
        assert_eq!(event.eta, Some(Duration::ZERO));
    }

    #[test]
    fn empty_layout_is_complete() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(eta(Duration::from_secs(1), 0, 4), None);
    }

    #[test]
    fn concurrent_steps_are_all_counted() {
        let progress = std::sync::Arc::new(PhaseProgress::for_run(64, false));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let progress = std::sync::Arc::clone(&progress);
                std::thread::spawn(move || {
                    for _ in 0..8 {
                        progress.step("source", &NoopProgressSink);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(progress.completed_steps(), 64);
    }
}
