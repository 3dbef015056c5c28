//! Job scheduler infrastructure for background tasks.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Job frequency for scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFrequency {
    /// Run every N seconds (at least one).
    Seconds(u64),
    /// Run every hour.
    Hourly,
}

impl JobFrequency {
    /// Get the duration between job executions.
    pub fn duration(&self) -> Duration {
        match self {
            JobFrequency::Seconds(secs) => Duration::from_secs((*secs).max(1)),
            JobFrequency::Hourly => Duration::from_secs(3600),
        }
    }
}

/// Trait for implementing background jobs.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    /// The name of this job (used for logging and metric labels).
    fn name(&self) -> &'static str;

    /// The frequency at which this job should run.
    fn frequency(&self) -> JobFrequency;

    /// Whether the first run happens at startup instead of one period later.
    fn run_on_start(&self) -> bool {
        false
    }

    /// Execute the job. Returns Ok(()) on success, Err with message on failure.
    async fn execute(&self) -> Result<(), String>;
}

/// Background job scheduler.
///
/// Each job runs on its own tokio interval; runs of the same job never
/// overlap. Long-lived workers can share the shutdown signal through
/// [`JobScheduler::shutdown_signal`] and be awaited with [`JobScheduler::track`].
pub struct JobScheduler {
    jobs: Vec<Arc<dyn Job>>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    pub fn register<J: Job + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    /// Receiver that flips to `true` when shutdown starts.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Adds a task spawned outside the scheduler to the shutdown wait.
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.handles.push(handle);
    }

    /// Spawns one loop per registered job.
    pub fn start(&mut self) {
        info!(jobs = self.jobs.len(), "Starting job scheduler");

        for job in &self.jobs {
            let handle = tokio::spawn(run_job(Arc::clone(job), self.shutdown_signal()));
            self.handles.push(handle);
        }
    }

    /// Signals every job and tracked task to stop. Returns immediately.
    pub fn shutdown(&self) {
        info!("Initiating job scheduler shutdown");
        self.shutdown_tx.send_replace(true);
    }

    /// Waits for jobs and tracked tasks to finish, at most `timeout`.
    pub async fn wait_for_shutdown(self, timeout: Duration) {
        let pending = self.handles.len();
        let all_done = async {
            for handle in self.handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Background task panicked");
                }
            }
        };

        match tokio::time::timeout(timeout, all_done).await {
            Ok(()) => info!(tasks = pending, "Background tasks stopped"),
            Err(_) => warn!(timeout = ?timeout, "Background task shutdown timed out"),
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_job(job: Arc<dyn Job>, mut shutdown: watch::Receiver<bool>) {
    let name = job.name();
    let frequency = job.frequency();
    let mut interval = tokio::time::interval(frequency.duration());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately.
    if !job.run_on_start() {
        interval.tick().await;
    }

    info!(job = name, frequency = ?frequency, "Job scheduled");
    let mut failure_streak: u32 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                failure_streak = run_once(job.as_ref(), failure_streak).await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!(job = name, "Job shutting down");
                    break;
                }
            }
        }
    }
}

/// Runs the job once and returns the updated failure streak.
///
/// Only the first failure of a streak is logged at error level, so a job
/// polling every second against a dead dependency does not flood the log.
async fn run_once(job: &dyn Job, failure_streak: u32) -> u32 {
    let name = job.name();
    let start = Instant::now();
    let result = job.execute().await;
    let elapsed = start.elapsed();

    histogram!("hostwatch_job_duration_seconds", "job" => name).record(elapsed.as_secs_f64());
    let elapsed_ms = elapsed.as_millis() as u64;

    match result {
        Ok(()) => {
            counter!("hostwatch_job_runs_total", "job" => name, "outcome" => "success")
                .increment(1);
            if failure_streak > 0 {
                info!(job = name, failures = failure_streak, "Job recovered");
            } else {
                debug!(job = name, elapsed_ms, "Job completed");
            }
            0
        }
        Err(e) => {
            counter!("hostwatch_job_runs_total", "job" => name, "outcome" => "failure")
                .increment(1);
            if failure_streak == 0 {
                error!(job = name, elapsed_ms, error = %e, "Job failed");
            } else {
                debug!(job = name, failures = failure_streak + 1, error = %e, "Job still failing");
            }
            failure_streak.saturating_add(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FlakyJob {
        runs: Arc<AtomicUsize>,
        failing: AtomicBool,
        eager: bool,
    }

    impl FlakyJob {
        fn new(runs: Arc<AtomicUsize>, failing: bool, eager: bool) -> Self {
            Self {
                runs,
                failing: AtomicBool::new(failing),
                eager,
            }
        }
    }

    #[async_trait::async_trait]
    impl Job for FlakyJob {
        fn name(&self) -> &'static str {
            "flaky"
        }

        fn frequency(&self) -> JobFrequency {
            JobFrequency::Seconds(1)
        }

        fn run_on_start(&self) -> bool {
            self.eager
        }

        async fn execute(&self) -> Result<(), String> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                Err("status source down".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_job_frequency_duration() {
        assert_eq!(JobFrequency::Seconds(30).duration(), Duration::from_secs(30));
        assert_eq!(JobFrequency::Seconds(0).duration(), Duration::from_secs(1));
        assert_eq!(JobFrequency::Hourly.duration(), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_failure_streak_counts_and_resets() {
        let job = FlakyJob::new(Arc::new(AtomicUsize::new(0)), true, false);

        let streak = run_once(&job, 0).await;
        assert_eq!(streak, 1);
        let streak = run_once(&job, streak).await;
        assert_eq!(streak, 2);

        job.failing.store(false, Ordering::SeqCst);
        assert_eq!(run_once(&job, streak).await, 0);
        assert_eq!(job.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_eager_job_runs_at_startup() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = JobScheduler::new();
        scheduler.register(FlakyJob::new(Arc::clone(&runs), false, true));
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        scheduler.shutdown();
        scheduler.wait_for_shutdown(Duration::from_secs(2)).await;
    }

    #[tokio::test]
    async fn test_failing_job_keeps_running() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = JobScheduler::new();
        scheduler.register(FlakyJob::new(Arc::clone(&runs), true, true));
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(runs.load(Ordering::SeqCst) >= 2);

        scheduler.shutdown();
        scheduler.wait_for_shutdown(Duration::from_secs(2)).await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_tracked_tasks() {
        let mut scheduler = JobScheduler::new();
        let mut signal = scheduler.shutdown_signal();
        let stopped = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&stopped);

        scheduler.track(tokio::spawn(async move {
            while !*signal.borrow() {
                if signal.changed().await.is_err() {
                    break;
                }
            }
            flag.fetch_add(1, Ordering::SeqCst);
        }));

        scheduler.shutdown();
        scheduler.wait_for_shutdown(Duration::from_secs(2)).await;
        assert_eq!(stopped.load(Ordering::SeqCst), 1);
    }
}
