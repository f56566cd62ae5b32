use crate::common::error::{AppError, AppResult};
use crate::common::upload::remove_quietly;
use crate::infrastructure::storage::media::{MediaPaths, StoredPath};
use crate::modules::conversion::encoder::{EncodeError, EncodeRequest, RenditionEncoder, RenditionProfile};
use crate::modules::conversion::model::{run_id, ConversionJob, JobUpdate};
use crate::modules::conversion::registry::JobStore;
use crate::modules::movie::model::{Movie, Quality};
use crate::modules::movie::repository::CatalogStore;
use crate::state::AppState;
use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const HD_BAND: (f64, f64) = (5.0, 0.45);
const SD_BAND: (f64, f64) = (50.0, 0.49);

/// How a conversion run reacts to a rendition that fails to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionPolicy {
    pub tolerate_partial_rendition_failure: bool,
}

impl ConversionPolicy {
    /// Keep going after a failed rendition and record whatever was produced.
    pub const TOLERANT: Self = Self {
        tolerate_partial_rendition_failure: true,
    };

    /// Abandon the run, leaving the catalog untouched, on the first failed rendition.
    pub const STRICT: Self = Self {
        tolerate_partial_rendition_failure: false,
    };
}

#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub movie_id: Uuid,
    pub source: StoredPath,
    pub run_id: String,
    pub job_id: Option<String>,
    pub policy: ConversionPolicy,
    /// Record `source` as the source rendition when the title has none yet.
    pub adopt_source: bool,
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{quality} encode failed: {source}")]
    Encode {
        quality: &'static str,
        #[source]
        source: EncodeError,
    },

    #[error("catalog update failed: {0:#}")]
    Persist(anyhow::Error),
}

/// Drives HD then SD encodes of a source file and records the results in the catalog.
#[derive(Clone)]
pub struct Transcoder {
    catalog: Arc<dyn CatalogStore>,
    jobs: Arc<dyn JobStore>,
    encoder: Arc<dyn RenditionEncoder>,
    media: MediaPaths,
}

impl Transcoder {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        jobs: Arc<dyn JobStore>,
        encoder: Arc<dyn RenditionEncoder>,
        media: MediaPaths,
    ) -> Self {
        Self {
            catalog,
            jobs,
            encoder,
            media,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.catalog.clone(),
            state.jobs.clone(),
            state.encoder.clone(),
            state.media.clone(),
        )
    }

    async fn load_movie(&self, movie_id: Uuid) -> AppResult<Movie> {
        self.catalog
            .find(movie_id)
            .await
            .map_err(AppError::Store)?
            .ok_or_else(|| AppError::MovieNotFound {
                movie_id: movie_id.to_string(),
            })
    }

    /// Starts a tracked, failure-tolerant conversion of a staged file.
    ///
    /// Returns as soon as the job is registered; encoding continues in the background.
    pub async fn start_tracked(&self, movie_id: Uuid, video_path: &str) -> AppResult<ConversionJob> {
        self.load_movie(movie_id).await?;

        let source = self.media.resolve_staged(video_path).ok_or_else(|| {
            AppError::Validation("videoPath must name a file under videos/local".to_string())
        })?;
        if !tokio::fs::try_exists(&source.absolute).await.unwrap_or(false) {
            return Err(AppError::FileNotFound {
                movie_id: movie_id.to_string(),
                video_path: video_path.to_string(),
            });
        }
        tokio::fs::create_dir_all(self.media.converted_dir()).await?;

        let job = self.jobs.create(movie_id).await;
        let plan = ConversionPlan {
            movie_id,
            source,
            run_id: job.id.clone(),
            job_id: Some(job.id.clone()),
            policy: ConversionPolicy::TOLERANT,
            adopt_source: true,
        };

        info!("🎬 Conversion {} started for movie {}", job.id, movie_id);
        let worker = self.clone();
        tokio::spawn(async move {
            let _ = worker.run(plan).await;
        });
        Ok(job)
    }

    /// Starts an untracked, strict re-encode of a title's recorded source rendition.
    ///
    /// Returns the source path being converted.
    pub async fn start_strict(&self, movie_id: Uuid) -> AppResult<String> {
        let movie = self.load_movie(movie_id).await?;

        let Some(source_path) = movie.videos.source.clone() else {
            return Err(AppError::VideoNotFound {
                movie_id: movie_id.to_string(),
                requested_quality: Quality::Source.as_str().to_string(),
                available_qualities: movie.videos.available(),
            });
        };

        let absolute = match self.media.resolve(&source_path) {
            Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => path,
            _ => {
                return Err(AppError::FileNotFound {
                    movie_id: movie_id.to_string(),
                    video_path: source_path,
                });
            }
        };
        tokio::fs::create_dir_all(self.media.converted_dir()).await?;

        let plan = ConversionPlan {
            movie_id,
            source: StoredPath {
                absolute,
                relative: source_path.clone(),
            },
            run_id: run_id(movie_id, OffsetDateTime::now_utc()),
            job_id: None,
            policy: ConversionPolicy::STRICT,
            adopt_source: false,
        };

        info!("🎬 Re-encode of movie {} started from {}", movie_id, source_path);
        let worker = self.clone();
        tokio::spawn(async move {
            let _ = worker.run(plan).await;
        });
        Ok(source_path)
    }

    /// Runs a conversion to completion. Job state, when tracked, ends terminal.
    pub async fn run(&self, plan: ConversionPlan) -> Result<Movie, ConversionError> {
        let tolerant = plan.policy.tolerate_partial_rendition_failure;
        let mut produced: Vec<(Quality, StoredPath)> = Vec::new();

        for (profile, band) in [(RenditionProfile::HD, HD_BAND), (RenditionProfile::SD, SD_BAND)] {
            self.track(
                &plan,
                JobUpdate::progress(band.0 as u8, format!("Starting {} encode", profile.label())),
            )
            .await;

            match self.encode_stage(&plan, profile, band).await {
                Ok(output) => {
                    info!("✅ {} rendition ready for movie {}", profile.label(), plan.movie_id);
                    produced.push((profile.quality, output));
                }
                Err(e) if tolerant => {
                    warn!("⚠️ {} encode failed for movie {}: {}", profile.label(), plan.movie_id, e);
                    self.track(&plan, JobUpdate::message(format!("{} encode failed: {}", profile.label(), e)))
                        .await;
                }
                Err(e) => {
                    error!("❌ {} encode failed for movie {}: {}", profile.label(), plan.movie_id, e);
                    for (_, output) in &produced {
                        remove_quietly(&output.absolute).await;
                    }
                    let err = ConversionError::Encode {
                        quality: profile.quality.as_str(),
                        source: e,
                    };
                    self.track(&plan, JobUpdate::failed(err.to_string())).await;
                    return Err(err);
                }
            }
        }

        self.track(&plan, JobUpdate::progress(99, "Updating catalog")).await;

        match self.persist(&plan, produced).await {
            Ok(movie) => {
                info!("✅ Conversion finished for movie {}", plan.movie_id);
                self.track(&plan, JobUpdate::completed("Conversion completed")).await;
                Ok(movie)
            }
            Err(e) => {
                error!("❌ Failed to record renditions for movie {}: {:#}", plan.movie_id, e);
                let err = ConversionError::Persist(e);
                self.track(&plan, JobUpdate::failed(err.to_string())).await;
                Err(err)
            }
        }
    }

    async fn encode_stage(
        &self,
        plan: &ConversionPlan,
        profile: RenditionProfile,
        band: (f64, f64),
    ) -> Result<StoredPath, EncodeError> {
        let output = self.media.rendition_output(&plan.run_id, profile.quality);
        let request = EncodeRequest {
            input: plan.source.absolute.clone(),
            output: output.absolute.clone(),
            profile,
        };

        let (tx, mut rx) = mpsc::channel::<f64>(32);
        let encode = self.encoder.encode(request, tx);
        tokio::pin!(encode);

        let result = loop {
            tokio::select! {
                biased;
                Some(percent) = rx.recv() => self.report(plan, profile, band, percent).await,
                result = &mut encode => break result,
            }
        };
        while let Ok(percent) = rx.try_recv() {
            self.report(plan, profile, band, percent).await;
        }

        result.map(|_| output)
    }

    async fn report(&self, plan: &ConversionPlan, profile: RenditionProfile, band: (f64, f64), percent: f64) {
        let overall = stage_progress(band, percent);
        debug!(
            "Movie {} {} encode at {:.1}% (overall {}%)",
            plan.movie_id,
            profile.label(),
            percent,
            overall
        );
        self.track(
            plan,
            JobUpdate::progress(overall, format!("Converting to {}: {}%", profile.label(), percent.round())),
        )
        .await;
    }

    /// Re-reads the record so concurrent edits made during encoding survive.
    async fn persist(&self, plan: &ConversionPlan, produced: Vec<(Quality, StoredPath)>) -> anyhow::Result<Movie> {
        let mut movie = self
            .catalog
            .find(plan.movie_id)
            .await?
            .ok_or_else(|| anyhow!("movie {} no longer exists", plan.movie_id))?;

        if plan.adopt_source && movie.videos.source.is_none() {
            movie.videos.set(Quality::Source, plan.source.relative.clone());
        }
        for (quality, output) in produced {
            if tokio::fs::try_exists(&output.absolute).await.unwrap_or(false) {
                movie.videos.set(quality, output.relative);
            } else {
                warn!("Rendition {} vanished before it could be recorded", output.relative);
            }
        }

        self.catalog.save(&movie).await?;
        Ok(movie)
    }

    async fn track(&self, plan: &ConversionPlan, update: JobUpdate) {
        if let Some(job_id) = &plan.job_id {
            self.jobs.update(job_id, update).await;
        }
    }
}

fn stage_progress(band: (f64, f64), percent: f64) -> u8 {
    let (base, scale) = band;
    (base + (percent.clamp(0.0, 100.0) * scale).round()).clamp(0.0, 100.0) as u8
}

/// Periodically evicts expired conversion jobs until the process exits.
pub fn spawn_job_sweeper(jobs: Arc<dyn JobStore>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = jobs.sweep_expired().await;
            if removed > 0 {
                debug!("🧹 Evicted {} expired conversion jobs", removed);
            }
        }
    })
}
