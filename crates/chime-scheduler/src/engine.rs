use std::sync::{Arc, Mutex};
use std::time::Duration;

use chime_core::config::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_WORK_SECS};
use chime_core::{Job, JobStore, Notifier, Result, RuleSpec, WorkHandler};
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::runner::{Runner, SimulatedWork};

/// Facade over the job set and the poll loop's lifecycle.
///
/// Holds the authoritative in-memory set; the store is a write-behind copy
/// refreshed after every add and every reschedule.
pub struct Engine {
    jobs: Arc<Mutex<Vec<Job>>>,
    store: Arc<dyn JobStore>,
    notifier: Arc<dyn Notifier>,
    work: Arc<dyn WorkHandler>,
    poll_interval: Duration,
    loop_handle: Option<(watch::Sender<bool>, JoinHandle<()>)>,
}

impl Engine {
    /// Build an engine over `store` and `notifier`, loading the initial job
    /// set. A load failure is fatal — there is no state to schedule from.
    pub fn new(store: Arc<dyn JobStore>, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let jobs = store.load()?;
        info!(count = jobs.len(), "job set loaded");
        Ok(Self {
            jobs: Arc::new(Mutex::new(jobs)),
            store,
            notifier,
            work: Arc::new(SimulatedWork::new(Duration::from_secs(DEFAULT_WORK_SECS))),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            loop_handle: None,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Swap the work step, e.g. for a different simulated delay.
    pub fn with_work(mut self, work: Arc<dyn WorkHandler>) -> Self {
        self.work = work;
        self
    }

    /// Validate `spec`, append the new job and persist the whole set.
    ///
    /// No uniqueness check — duplicate names are scheduled independently. No
    /// past-time check either: a time-of-day already behind us is due on the
    /// very next scan (catch up, don't skip).
    pub fn add_job(&self, name: &str, command: &str, spec: &RuleSpec) -> Result<Job> {
        let (rule, first_run) = spec.resolve(Utc::now())?;
        let job = Job::new(name, command, rule, first_run);

        let snapshot = {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.push(job.clone());
            jobs.clone()
        };
        self.store.save(&snapshot)?;

        info!(job = %name, next_run = %job.next_run.to_rfc3339(), "job added");
        Ok(job)
    }

    /// Snapshot of the current set. `running` reflects the instant of the
    /// snapshot only.
    pub fn list_jobs(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().clone()
    }

    /// Launch the poll loop as a background task. A second call while the
    /// loop is alive is a no-op.
    pub fn start(&mut self) {
        if self.loop_handle.is_some() {
            return;
        }
        let (tx, rx) = watch::channel(false);
        let runner = Runner::new(
            Arc::clone(&self.jobs),
            Arc::clone(&self.store),
            Arc::clone(&self.notifier),
            Arc::clone(&self.work),
            self.poll_interval,
        );
        let handle = tokio::spawn(runner.run(rx));
        self.loop_handle = Some((tx, handle));
        info!("engine started");
    }

    /// Signal the loop to stop and wait until it has. After this returns no
    /// new dispatch can occur; execution units already in flight are not
    /// drained and may still be completing.
    pub async fn stop(&mut self) {
        if let Some((tx, handle)) = self.loop_handle.take() {
            let _ = tx.send(true);
            if let Err(e) = handle.await {
                warn!(error = %e, "scheduler loop task failed");
            }
            info!("engine stopped");
        }
    }
}
