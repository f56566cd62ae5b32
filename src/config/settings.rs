use crate::config::env::{self, EnvKey};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

#[derive(Clone, Debug, Deserialize)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,
    pub media_root: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub encode_timeout: Option<Duration>,
    pub max_upload_bytes: u64,
    pub job_retention: Duration,
    pub job_sweep_interval: Option<Duration>,
    pub admin_seed: Option<AdminSeed>,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let encode_timeout_secs: u64 = env::get_parsed(EnvKey::EncodeTimeoutSecs, 0);
        let sweep_secs: u64 = env::get_parsed(EnvKey::JobSweepIntervalSecs, 60);

        let admin_seed = match (env::get_opt(EnvKey::AdminEmail), env::get_opt(EnvKey::AdminPassword)) {
            (Some(email), Some(password)) => Some(AdminSeed {
                email,
                password,
                name: env::get_or(EnvKey::AdminName, "Admin"),
            }),
            _ => None,
        };

        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 5000),
            database_url: env::get(EnvKey::DatabaseUrl)
                .with_context(|| format!("{} must be set", EnvKey::DatabaseUrl.as_str()))?,
            jwt_secret: env::get(EnvKey::JwtSecret)
                .with_context(|| format!("{} must be set", EnvKey::JwtSecret.as_str()))?,
            jwt_expires_in_days: env::get_parsed(EnvKey::JwtExpiresInDays, 90),
            media_root: PathBuf::from(env::get_or(EnvKey::MediaRoot, ".")),
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, "ffmpeg"),
            ffprobe_path: env::get_or(EnvKey::FfprobePath, "ffprobe"),
            encode_timeout: (encode_timeout_secs > 0).then(|| Duration::from_secs(encode_timeout_secs)),
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES),
            job_retention: Duration::from_secs(env::get_parsed(EnvKey::JobRetentionSecs, 600)),
            job_sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            admin_seed,
        })
    }
}
