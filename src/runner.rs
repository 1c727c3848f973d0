//! Multi-stage growth simulation with progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use snafu::{Location, ResultExt as _, Snafu};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinHandle};

use crate::model::{ChannelStats, GrowthDelta};
use crate::session::{Session, SessionError};
use crate::validate::SimulationHours;

/// Names of the stages, in the order they run.
pub const STAGES: [&str; 8] = [
    "Analysis",
    "Targeting",
    "Optimization",
    "Launch",
    "Ad setup",
    "Engagement",
    "Analytics collection",
    "Monetization",
];

/// Progress update emitted right before a stage runs.
#[derive(Debug, Clone, PartialEq)]
pub struct StageProgress {
    pub stage: &'static str,
    /// 1-based index of the stage.
    pub current: usize,
    pub total: usize,
    /// Statistics as of the start of the stage.
    pub stats: ChannelStats,
}

/// Receives progress updates. Delivery is best effort; a sink that went away does not stop the
/// simulation.
pub trait ProgressSink {
    fn report(&mut self, progress: StageProgress);
}

impl ProgressSink for UnboundedSender<StageProgress> {
    fn report(&mut self, progress: StageProgress) {
        if self.send(progress).is_err() {
            tracing::debug!("progress receiver dropped");
        }
    }
}

impl<F: FnMut(StageProgress)> ProgressSink for F {
    fn report(&mut self, progress: StageProgress) {
        self(progress)
    }
}

/// Shared flag that asks a running simulation to stop after the current stage.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagedOutcome {
    /// Sum of the deltas of every stage that ran.
    pub delta: GrowthDelta,
    pub stages_run: usize,
    pub cancelled: bool,
    pub stats: ChannelStats,
    /// Whether the run contained the first growth step ever recorded for the account.
    pub first_run: bool,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RunnerError {
    #[snafu(display("stage '{stage}' failed: {source}"))]
    Stage {
        stage: &'static str,
        source: SessionError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("simulation task did not finish: {source}"))]
    Join {
        source: JoinError,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Splits `hours` evenly over the stages and runs one growth step per stage.
///
/// The flag is checked before every stage; stages that already ran stay applied. A failing stage
/// aborts the run, and earlier stages stay applied as well.
#[tracing::instrument(skip(session, sink, cancel), fields(account = %session.account().id))]
pub async fn run_staged(
    session: &mut Session,
    hours: SimulationHours,
    sink: &mut impl ProgressSink,
    cancel: &CancelFlag,
    delay: Duration,
) -> Result<StagedOutcome, RunnerError> {
    let per_stage = hours.as_f64() / STAGES.len() as f64;

    let mut delta = GrowthDelta::default();
    let mut stages_run = 0;
    let mut first_run = false;

    for (index, stage) in STAGES.iter().copied().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(stage, stages_run, "simulation cancelled");
            break;
        }

        sink.report(StageProgress {
            stage,
            current: index + 1,
            total: STAGES.len(),
            stats: *session.stats(),
        });

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let report = session
            .simulate_growth(per_stage)
            .await
            .context(StageSnafu { stage })?;

        delta += report.delta;
        first_run |= report.first_run;
        stages_run += 1;
    }

    Ok(StagedOutcome {
        delta,
        stages_run,
        cancelled: stages_run < STAGES.len(),
        stats: *session.stats(),
        first_run,
    })
}

/// A staged simulation running on its own task.
///
/// The session moves into the task for the duration of the run and is handed back by [join], so a
/// session can never run two simulations at once.
///
/// [join]: SimulationTask::join
#[derive(Debug)]
pub struct SimulationTask {
    pub progress: UnboundedReceiver<StageProgress>,
    cancel: CancelFlag,
    handle: JoinHandle<(Session, Result<StagedOutcome, RunnerError>)>,
}

impl SimulationTask {
    pub fn spawn(mut session: Session, hours: SimulationHours, delay: Duration) -> Self {
        let (mut sender, progress) = mpsc::unbounded_channel();
        let cancel = CancelFlag::new();

        let flag = cancel.clone();
        let handle = tokio::spawn(async move {
            let outcome = run_staged(&mut session, hours, &mut sender, &flag, delay).await;
            (session, outcome)
        });

        Self {
            progress,
            cancel,
            handle,
        }
    }

    pub fn canceller(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the run to finish and returns the session together with the outcome.
    pub async fn join(self) -> Result<(Session, Result<StagedOutcome, RunnerError>), RunnerError> {
        self.handle.await.context(JoinSnafu)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::growth;
    use crate::session::tests::fresh_session;

    fn hours(value: u32) -> SimulationHours {
        SimulationHours::new(value).unwrap()
    }

    #[tokio::test]
    async fn every_stage_reports_progress_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("hajime", dir.path(), 10).await;

        let mut events = Vec::new();
        let mut sink = |progress: StageProgress| events.push(progress);
        let outcome = run_staged(
            &mut session,
            hours(8),
            &mut sink,
            &CancelFlag::new(),
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(outcome.stages_run, 8);
        assert!(!outcome.cancelled);
        assert!(outcome.first_run);

        let indices: Vec<usize> = events.iter().map(|event| event.current).collect();
        assert_eq!(indices, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(events.iter().all(|event| event.total == 8));
        assert_eq!(events[0].stage, "Analysis");
        assert_eq!(events[7].stage, "Monetization");
        assert_eq!(events[0].stats, ChannelStats::default());

        let history = session.simulation_history(100).await.unwrap();
        assert_eq!(history.len(), 8);
        assert!(history.iter().all(|record| record.hours == 1.0));
    }

    #[tokio::test]
    async fn aggregate_matches_the_individual_steps() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("raden", dir.path(), 77).await;

        let outcome = run_staged(
            &mut session,
            hours(12),
            &mut |_: StageProgress| {},
            &CancelFlag::new(),
            Duration::ZERO,
        )
        .await
        .unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let mut stats = ChannelStats::default();
        let mut expected = GrowthDelta::default();
        for _ in 0..8 {
            let (delta, updated) = growth::simulate_growth(&stats, 1.5, &mut rng);
            expected += delta;
            stats = updated;
        }

        assert_eq!(outcome.delta, expected);
        assert_eq!(outcome.stats, stats);
        assert_eq!(session.stats(), &stats);

        let recorded: GrowthDelta = session
            .simulation_history(100)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.delta)
            .sum();
        assert_eq!(recorded, expected);
    }

    #[tokio::test]
    async fn cancelling_keeps_the_stages_already_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("ao", dir.path(), 12).await;

        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let mut seen = Vec::new();
        let mut sink = |progress: StageProgress| {
            seen.push(progress.current);
            if progress.current == 3 {
                flag.cancel();
            }
        };

        let outcome = run_staged(&mut session, hours(24), &mut sink, &cancel, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(seen, [1, 2, 3]);
        assert!(outcome.cancelled);
        assert_eq!(outcome.stages_run, 3);
        assert_eq!(session.simulation_history(100).await.unwrap().len(), 3);
        assert_eq!(
            session.store().latest_stats(&session.account().id).await.unwrap(),
            Some(outcome.stats)
        );
    }

    #[tokio::test]
    async fn cancelled_before_start_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("kaela", dir.path(), 13).await;

        let cancel = CancelFlag::new();
        cancel.cancel();

        let outcome = run_staged(
            &mut session,
            hours(1),
            &mut |_: StageProgress| {},
            &cancel,
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(outcome.stages_run, 0);
        assert_eq!(outcome.delta, GrowthDelta::default());
        assert_eq!(outcome.stats, ChannelStats::default());
        assert!(!outcome.first_run);
    }

    #[tokio::test]
    async fn boundary_durations_run_all_stages() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("kobo", dir.path(), 14).await;

        for value in [SimulationHours::MIN, SimulationHours::MAX] {
            let outcome = run_staged(
                &mut session,
                hours(value),
                &mut |_: StageProgress| {},
                &CancelFlag::new(),
                Duration::ZERO,
            )
            .await
            .unwrap();
            assert_eq!(outcome.stages_run, 8);
        }

        assert!(SimulationHours::new(0).is_err());
        assert!(SimulationHours::new(73).is_err());
    }

    #[tokio::test]
    async fn spawned_task_hands_the_session_back() {
        let dir = tempfile::tempdir().unwrap();
        let session = fresh_session("zeta", dir.path(), 15).await;

        let mut task = SimulationTask::spawn(session, hours(4), Duration::ZERO);

        let mut seen = Vec::new();
        while let Some(progress) = task.progress.recv().await {
            seen.push(progress.current);
        }
        assert_eq!(seen, [1, 2, 3, 4, 5, 6, 7, 8]);

        let (session, outcome) = task.join().await.unwrap();
        let outcome = outcome.unwrap();
        assert_eq!(session.stats(), &outcome.stats);
        assert_eq!(outcome.stages_run, 8);
    }

    #[tokio::test]
    async fn spawned_task_can_be_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let session = fresh_session("kaela", dir.path(), 16).await;

        let mut task = SimulationTask::spawn(session, hours(72), Duration::from_millis(20));

        let first = task.progress.recv().await.unwrap();
        assert_eq!(first.current, 1);
        task.cancel();

        let (_, outcome) = task.join().await.unwrap();
        let outcome = outcome.unwrap();
        assert!(outcome.cancelled);
        assert!(outcome.stages_run < 8);
    }
}
