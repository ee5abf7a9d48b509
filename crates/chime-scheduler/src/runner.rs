use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chime_core::{Job, JobStore, Notifier, Rule, WorkHandler};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::recurrence::next_trigger;

/// Default stand-in for real command execution: sleep for a fixed duration.
pub struct SimulatedWork {
    delay: Duration,
}

impl SimulatedWork {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl WorkHandler for SimulatedWork {
    async fn run(&self, job_name: &str, _command: &str) -> chime_core::Result<()> {
        debug!(job = %job_name, "simulating work");
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// The scheduling loop: scans the shared job set at a fixed cadence and spawns
/// one execution unit per due job.
///
/// The set is an append-only arena — jobs are pushed and never removed, so an
/// index handed to an execution unit stays valid for the life of the process.
/// One mutex guards every mutation: the scan's dispatch flip, `add_job` from
/// the engine, and each unit's reschedule.
pub(crate) struct Runner {
    jobs: Arc<Mutex<Vec<Job>>>,
    store: Arc<dyn JobStore>,
    notifier: Arc<dyn Notifier>,
    work: Arc<dyn WorkHandler>,
    poll_interval: Duration,
}

impl Runner {
    pub(crate) fn new(
        jobs: Arc<Mutex<Vec<Job>>>,
        store: Arc<dyn JobStore>,
        notifier: Arc<dyn Notifier>,
        work: Arc<dyn WorkHandler>,
        poll_interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            jobs,
            store,
            notifier,
            work,
            poll_interval,
        })
    }

    /// Poll until `shutdown` broadcasts `true`. The flag is observed at the
    /// top of each cadence iteration; the in-progress scan always finishes.
    /// In-flight execution units are not waited on.
    pub(crate) async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!("scheduler loop started");
        let mut tick = tokio::time::interval(self.poll_interval);
        // Cadence is "at least every poll_interval", not a compensated clock.
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = tick.tick() => Self::scan(&self, Utc::now()),
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler loop shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One pass over the job set: dispatch every job that is due and idle.
    /// Dispatch happens under the lock; the unit bodies run outside it.
    fn scan(this: &Arc<Self>, now: DateTime<Utc>) {
        let mut jobs = this.jobs.lock().unwrap();
        for idx in 0..jobs.len() {
            if jobs[idx].is_due(now) {
                jobs[idx].running = true;
                debug!(job = %jobs[idx].name, next_run = %jobs[idx].next_run, "dispatching due job");
                tokio::spawn(Arc::clone(this).execute(idx));
            }
        }
    }

    /// One execution unit: notify, do the work, reschedule, persist.
    async fn execute(self: Arc<Self>, idx: usize) {
        let (name, command) = {
            let jobs = self.jobs.lock().unwrap();
            (jobs[idx].name.clone(), jobs[idx].command.clone())
        };

        self.notifier.notify_start(&name);

        if let Err(e) = self.work.run(&name, &command).await {
            warn!(job = %name, error = %e, "work step failed; job will still be rescheduled");
        }

        // Reschedule from the previous next_run, not wall-clock now, so the
        // schedule does not drift by the execution time. `running` is cleared
        // here regardless of how the work step went.
        let (snapshot, next) = {
            let mut jobs = self.jobs.lock().unwrap();
            let job = &mut jobs[idx];
            let last = job.next_run;
            job.next_run = next_trigger(&job.rule, last);
            if matches!(job.rule, Rule::Once { .. }) {
                // A Once rule never advances next_run; without this the job
                // would be due again one scan later, forever.
                job.done = true;
            }
            job.running = false;
            let next = (!job.done).then_some(job.next_run);
            (jobs.clone(), next)
        };

        self.notifier.notify_complete(&name, next);

        if let Err(e) = self.store.save(&snapshot) {
            error!(job = %name, error = %e, "failed to persist job set after run");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{wait_for, Event, FailingStore, FailingWork, MemStore, RecordingNotifier};
    use chrono::Duration as ChronoDuration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    struct Harness {
        jobs: Arc<Mutex<Vec<Job>>>,
        store: Arc<MemStore>,
        notifier: Arc<RecordingNotifier>,
        shutdown: watch::Sender<bool>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Harness {
        fn start(jobs: Vec<Job>, work_delay: Duration) -> Self {
            Self::start_with(jobs, Arc::new(SimulatedWork::new(work_delay)), None)
        }

        fn start_with(
            jobs: Vec<Job>,
            work: Arc<dyn WorkHandler>,
            store_override: Option<Arc<dyn JobStore>>,
        ) -> Self {
            let jobs = Arc::new(Mutex::new(jobs));
            let store = Arc::new(MemStore::default());
            let notifier = Arc::new(RecordingNotifier::default());
            let runner = Runner::new(
                Arc::clone(&jobs),
                store_override.unwrap_or_else(|| store.clone() as Arc<dyn JobStore>),
                notifier.clone(),
                work,
                ms(20),
            );
            let (shutdown, rx) = watch::channel(false);
            let handle = tokio::spawn(runner.run(rx));
            Self {
                jobs,
                store,
                notifier,
                shutdown,
                handle,
            }
        }

        async fn stop(self) -> (Arc<Mutex<Vec<Job>>>, Arc<MemStore>, Arc<RecordingNotifier>) {
            self.shutdown.send(true).unwrap();
            self.handle.await.unwrap();
            (self.jobs, self.store, self.notifier)
        }
    }

    #[tokio::test]
    async fn due_job_is_dispatched_and_advances_from_previous_trigger() {
        let t0 = Utc::now() - ChronoDuration::seconds(2);
        let job = Job::new("backup", "echo task", Rule::Interval { seconds: 5 }, t0);

        let h = Harness::start(vec![job], ms(10));
        let notifier = h.notifier.clone();
        wait_for(move || notifier.completes() >= 1).await;
        let (jobs, store, notifier) = h.stop().await;

        let jobs = jobs.lock().unwrap();
        // Advanced from the previous next_run, not from completion time.
        assert_eq!(jobs[0].next_run, t0 + ChronoDuration::seconds(5));
        assert!(!jobs[0].running);
        assert!(!jobs[0].done);
        assert!(store.save_count() >= 1);
        assert_eq!(
            notifier.events()[0],
            Event::Start("backup".to_string()),
        );
    }

    #[tokio::test]
    async fn running_job_is_never_dispatched() {
        let mut job = Job::new(
            "stuck",
            "echo task",
            Rule::Daily,
            Utc::now() - ChronoDuration::hours(1),
        );
        job.running = true;

        let h = Harness::start(vec![job], ms(10));
        tokio::time::sleep(ms(150)).await;
        let (_, _, notifier) = h.stop().await;
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn future_job_is_not_dispatched() {
        let job = Job::new(
            "later",
            "echo task",
            Rule::Hourly,
            Utc::now() + ChronoDuration::hours(1),
        );
        let h = Harness::start(vec![job], ms(10));
        tokio::time::sleep(ms(150)).await;
        let (_, _, notifier) = h.stop().await;
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn once_job_fires_exactly_once_and_is_retired() {
        let at = Utc::now() - ChronoDuration::seconds(1);
        let job = Job::new("alarm", "echo task", Rule::Once { at }, at);

        let h = Harness::start(vec![job], ms(10));
        let notifier = h.notifier.clone();
        wait_for(move || notifier.completes() >= 1).await;
        // Several more scans pass; the job must not fire again.
        tokio::time::sleep(ms(150)).await;
        let (jobs, _, notifier) = h.stop().await;

        assert_eq!(notifier.starts(), 1);
        let jobs = jobs.lock().unwrap();
        assert!(jobs[0].done);
        assert!(!jobs[0].running);
        assert!(notifier
            .events()
            .contains(&Event::Complete("alarm".to_string(), None)));
    }

    #[tokio::test]
    async fn simultaneously_due_jobs_overlap() {
        let past = Utc::now() - ChronoDuration::seconds(3);
        let jobs = vec![
            Job::new("first", "echo task", Rule::Interval { seconds: 3600 }, past),
            Job::new("second", "echo task", Rule::Interval { seconds: 3600 }, past),
        ];

        let h = Harness::start(jobs, ms(100));
        let notifier = h.notifier.clone();
        wait_for(move || notifier.completes() >= 2).await;
        let (_, _, notifier) = h.stop().await;

        // With a 100 ms work step and a 20 ms cadence, both starts land before
        // either completion — the two units ran concurrently.
        let events = notifier.events();
        assert!(matches!(events[0], Event::Start(_)));
        assert!(matches!(events[1], Event::Start(_)));
    }

    #[tokio::test]
    async fn work_failure_still_reschedules_and_clears_running() {
        let t0 = Utc::now() - ChronoDuration::seconds(2);
        let job = Job::new("flaky", "echo task", Rule::Interval { seconds: 600 }, t0);

        let h = Harness::start_with(vec![job], Arc::new(FailingWork), None);
        let notifier = h.notifier.clone();
        wait_for(move || notifier.completes() >= 1).await;
        let (jobs, _, _) = h.stop().await;

        let jobs = jobs.lock().unwrap();
        assert!(!jobs[0].running);
        assert_eq!(jobs[0].next_run, t0 + ChronoDuration::seconds(600));
    }

    #[tokio::test]
    async fn save_failure_does_not_stall_the_loop_or_roll_back() {
        let t0 = Utc::now() - ChronoDuration::seconds(2);
        let job = Job::new("unsaved", "echo task", Rule::Interval { seconds: 600 }, t0);

        let h = Harness::start_with(
            vec![job],
            Arc::new(SimulatedWork::new(ms(10))),
            Some(Arc::new(FailingStore)),
        );
        let notifier = h.notifier.clone();
        wait_for(move || notifier.completes() >= 1).await;
        let (jobs, _, _) = h.stop().await;

        // In-memory advancement survives the failed save.
        let jobs = jobs.lock().unwrap();
        assert_eq!(jobs[0].next_run, t0 + ChronoDuration::seconds(600));
        assert!(!jobs[0].running);
    }

    #[tokio::test]
    async fn stop_halts_all_further_dispatches() {
        // Interval of 1 s with a far-past anchor: due again on almost every scan.
        let job = Job::new(
            "ticker",
            "echo task",
            Rule::Interval { seconds: 1 },
            Utc::now() - ChronoDuration::seconds(60),
        );

        let h = Harness::start(vec![job], ms(10));
        let notifier = h.notifier.clone();
        wait_for(move || notifier.starts() >= 1).await;
        let (_, _, notifier) = h.stop().await;

        // Allow any in-flight unit to finish, then take the baseline.
        tokio::time::sleep(ms(50)).await;
        let starts = notifier.starts();
        tokio::time::sleep(ms(200)).await;
        assert_eq!(notifier.starts(), starts);
    }
}
