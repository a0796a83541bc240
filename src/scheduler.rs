use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::interfaces::scheduler::ScheduledJob;

/// Runs registered jobs on their own tokio interval loops. A failed run is
/// logged and the loop keeps ticking.
pub struct Scheduler {
    jobs: Vec<Arc<dyn ScheduledJob>>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            handles: Vec::new(),
        }
    }

    pub fn register_job(&mut self, job: Arc<dyn ScheduledJob>) {
        self.jobs.push(job);
    }

    pub fn start(&mut self) {
        for job in &self.jobs {
            let job = job.clone();
            let handle = tokio::spawn(async move {
                let mut ticker = tokio::time::interval(job.interval());
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                // The first tick fires immediately; skip it so jobs start one
                // full interval after boot.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    debug!(job = job.name(), "running scheduled job");
                    if let Err(err) = job.run().await {
                        error!(job = job.name(), error = %err, "scheduled job failed");
                    }
                }
            });
            self.handles.push(handle);
        }
    }

    pub fn stop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
