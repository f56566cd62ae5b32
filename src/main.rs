use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vod_catalog::config::settings::AppConfig;
use vod_catalog::infrastructure::db::pool::{connect_to_db, run_migrations};
use vod_catalog::modules::auth::service::AuthService;
use vod_catalog::modules::conversion::encoder::FfmpegEncoder;
use vod_catalog::modules::conversion::registry::InMemoryJobRegistry;
use vod_catalog::modules::movie::repository::MovieRepository;
use vod_catalog::modules::watchlist::repository::WatchlistRepository;
use vod_catalog::state::AppState;
use vod_catalog::workers::transcoder::spawn_job_sweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vod_catalog=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting server...");

    let config = AppConfig::new()?;
    let db = connect_to_db(&config.database_url).await?;
    run_migrations(&db).await?;

    let encoder = FfmpegEncoder::new(config.ffmpeg_path.clone(), config.ffprobe_path.clone())
        .with_timeout(config.encode_timeout);
    let jobs = Arc::new(InMemoryJobRegistry::new(config.job_retention));

    let state = AppState::new(
        config,
        db.clone(),
        Arc::new(MovieRepository::new(db.clone())),
        Arc::new(WatchlistRepository::new(db)),
        jobs,
        Arc::new(encoder),
    );

    state.media.ensure_layout().await?;
    info!("📁 Media root: {}", state.media.root().display());

    if let Some(seed) = &state.config.admin_seed {
        if let Err(e) = AuthService::ensure_admin(&state, seed).await {
            warn!("⚠️ Could not seed admin account: {:#}", e);
        }
    }

    if let Some(every) = state.config.job_sweep_interval {
        spawn_job_sweeper(state.jobs.clone(), every);
    }

    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let app = vod_catalog::app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("✅ Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
