use std::{collections::BTreeMap, fmt};

use crate::process::{child::terminate_all, Stage};

/// Background jobs are identified by the pid of their last stage.
pub type JobId = u32;

/// A detached pipeline. Every stage is tracked, the job is finished once all of
/// them have exited.
#[derive(Debug)]
pub struct BackgroundJob {
    id: JobId,
    label: String,
    stages: Vec<Stage>,
}

impl BackgroundJob {
    /// Returns `None` when there is no running stage to take an id from.
    pub fn new(label: impl Into<String>, stages: Vec<Stage>) -> Option<Self> {
        let id = stages.last()?.id()?;

        Some(Self {
            id,
            label: label.into(),
            stages,
        })
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn poll_finished(&mut self) -> bool {
        // poll every stage so each one gets reaped as soon as it exits
        self.stages
            .iter_mut()
            .fold(true, |done, stage| stage.has_exited() && done)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedJob {
    pub id: JobId,
    pub label: String,
}

impl fmt::Display for FinishedJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] Done", self.id)
    }
}

/// Tracks background jobs for one session. Only ever touched from the
/// session's own task.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: BTreeMap<JobId, BackgroundJob>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job: BackgroundJob) -> JobId {
        let id = job.id;
        debug!(id, label = %job.label, stages = job.stages.len(), "registered background job");
        self.jobs.insert(id, job);
        id
    }

    /// Removes and returns every job whose stages have all exited. Never
    /// blocks.
    pub fn poll_and_reap(&mut self) -> Vec<FinishedJob> {
        let finished = self
            .jobs
            .iter_mut()
            .filter_map(|(id, job)| job.poll_finished().then_some(*id))
            .collect::<Vec<_>>();

        finished
            .into_iter()
            .filter_map(|id| self.jobs.remove(&id))
            .map(|job| {
                debug!(id = job.id, "background job finished");
                FinishedJob {
                    id: job.id,
                    label: job.label,
                }
            })
            .collect()
    }

    /// Kills and reaps every tracked stage. The registry is empty afterwards.
    pub async fn kill_all(&mut self) {
        for (id, mut job) in std::mem::take(&mut self.jobs) {
            debug!(id, "killing background job");
            terminate_all(&mut job.stages).await;
        }
    }

    pub fn list(&self) -> impl Iterator<Item = (JobId, &str)> {
        self.jobs.iter().map(|(id, job)| (*id, job.label()))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
