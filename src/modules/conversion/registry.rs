use super::model::{run_id, ConversionJob, JobUpdate};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_RETENTION: Duration = Duration::from_secs(10 * 60);

/// Storage for conversion job state, shared by HTTP handlers and the orchestrator.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, movie_id: Uuid) -> ConversionJob;

    /// Merges `update` into the job. Unknown ids are ignored.
    async fn update(&self, job_id: &str, update: JobUpdate);

    /// Current snapshot. Terminal jobs past retention are evicted and reported missing.
    async fn get(&self, job_id: &str) -> Option<ConversionJob>;

    /// Drops every terminal job past retention, returning how many were removed.
    async fn sweep_expired(&self) -> usize;
}

pub struct InMemoryJobRegistry {
    jobs: RwLock<HashMap<String, ConversionJob>>,
    retention: Duration,
}

impl Default for InMemoryJobRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl InMemoryJobRegistry {
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention,
        }
    }

    fn is_expired(&self, job: &ConversionJob, now: OffsetDateTime) -> bool {
        match job.completed_at {
            Some(done) if job.status.is_terminal() => now - done > self.retention,
            _ => false,
        }
    }

    pub(crate) async fn get_at(&self, job_id: &str, now: OffsetDateTime) -> Option<ConversionJob> {
        let mut jobs = self.jobs.write().await;
        let expired = jobs.get(job_id).map(|job| self.is_expired(job, now))?;
        if expired {
            jobs.remove(job_id);
            debug!(job_id, "Evicted expired conversion job");
            return None;
        }
        jobs.get(job_id).cloned()
    }

    pub(crate) async fn sweep_at(&self, now: OffsetDateTime) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !self.is_expired(job, now));
        before - jobs.len()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }
}

#[async_trait]
impl JobStore for InMemoryJobRegistry {
    async fn create(&self, movie_id: Uuid) -> ConversionJob {
        let now = OffsetDateTime::now_utc();
        let mut jobs = self.jobs.write().await;

        let base = run_id(movie_id, now);
        let mut id = base.clone();
        let mut n = 1;
        while jobs.contains_key(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }

        let job = ConversionJob::new(id.clone(), movie_id, now);
        jobs.insert(id, job.clone());
        job
    }

    async fn update(&self, job_id: &str, update: JobUpdate) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(job_id) {
            Some(job) => job.apply(update),
            None => debug!(job_id, "Ignoring update for unknown conversion job"),
        }
    }

    async fn get(&self, job_id: &str) -> Option<ConversionJob> {
        self.get_at(job_id, OffsetDateTime::now_utc()).await
    }

    async fn sweep_expired(&self) -> usize {
        self.sweep_at(OffsetDateTime::now_utc()).await
    }
}
