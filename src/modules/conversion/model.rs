use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

/// Snapshot of one asynchronous conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionJob {
    pub id: String,
    pub status: JobStatus,
    /// 0-100. Non-decreasing by construction of the orchestrator, not enforced here.
    pub progress: u8,
    pub message: String,
    pub movie_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub completed_at: Option<OffsetDateTime>,
}

impl ConversionJob {
    pub fn new(id: String, movie_id: Uuid, now: OffsetDateTime) -> Self {
        Self {
            id,
            status: JobStatus::Processing,
            progress: 0,
            message: "Starting conversion...".to_string(),
            movie_id,
            started_at: now,
            completed_at: None,
        }
    }

    pub fn apply(&mut self, update: JobUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(progress) = update.progress {
            self.progress = progress.min(100);
        }
        if let Some(message) = update.message {
            self.message = message;
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = Some(completed_at);
        }
    }
}

/// Partial job fields merged by [`ConversionJob::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub message: Option<String>,
    pub completed_at: Option<OffsetDateTime>,
}

impl JobUpdate {
    pub fn progress(progress: u8, message: impl Into<String>) -> Self {
        Self {
            progress: Some(progress),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn completed(message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            message: Some(message.into()),
            completed_at: Some(OffsetDateTime::now_utc()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Error),
            message: Some(message.into()),
            completed_at: Some(OffsetDateTime::now_utc()),
            ..Default::default()
        }
    }
}

/// Identifier of a conversion run: the movie id plus the submission time in milliseconds.
pub fn run_id(movie_id: Uuid, now: OffsetDateTime) -> String {
    format!("{}_{}", movie_id, now.unix_timestamp_nanos() / 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn update_merges_only_supplied_fields() {
        let mut job = ConversionJob::new("j".into(), Uuid::nil(), OffsetDateTime::now_utc());
        job.apply(JobUpdate::progress(5, "Starting HD encode"));
        job.apply(JobUpdate::message("HD encode failed"));

        assert_eq!(job.progress, 5);
        assert_eq!(job.message, "HD encode failed");
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn terminal_updates_stamp_completion() {
        let mut job = ConversionJob::new("j".into(), Uuid::nil(), OffsetDateTime::now_utc());
        job.apply(JobUpdate::failed("Catalog update failed"));
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.status.is_terminal());
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn run_id_uses_millisecond_timestamp() {
        let id = run_id(Uuid::nil(), datetime!(2024-01-01 00:00:00.123 UTC));
        assert_eq!(id, format!("{}_1704067200123", Uuid::nil()));
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let job = ConversionJob::new("j".into(), Uuid::nil(), datetime!(2024-01-01 00:00 UTC));
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "processing");
        assert_eq!(json["progress"], 0);
        assert_eq!(json["startedAt"], "2024-01-01T00:00:00Z");
        assert!(json.get("completedAt").is_none());
        assert_eq!(json["movieId"], Uuid::nil().to_string());
    }
}
