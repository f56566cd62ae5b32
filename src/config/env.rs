use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    DatabaseUrl,
    JwtSecret,
    JwtExpiresInDays,
    MediaRoot,
    FfmpegPath,
    FfprobePath,
    EncodeTimeoutSecs,
    MaxUploadBytes,
    JobRetentionSecs,
    JobSweepIntervalSecs,
    AdminEmail,
    AdminPassword,
    AdminName,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::DatabaseUrl => "DATABASE_URL",
            EnvKey::JwtSecret => "JWT_SECRET",
            EnvKey::JwtExpiresInDays => "JWT_EXPIRES_IN_DAYS",
            EnvKey::MediaRoot => "MEDIA_ROOT",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::FfprobePath => "FFPROBE_PATH",
            EnvKey::EncodeTimeoutSecs => "ENCODE_TIMEOUT_SECS",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
            EnvKey::JobRetentionSecs => "JOB_RETENTION_SECS",
            EnvKey::JobSweepIntervalSecs => "JOB_SWEEP_INTERVAL_SECS",
            EnvKey::AdminEmail => "ADMIN_EMAIL",
            EnvKey::AdminPassword => "ADMIN_PASSWORD",
            EnvKey::AdminName => "ADMIN_NAME",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_opt(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
