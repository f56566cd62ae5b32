use crate::modules::auth::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::modules::conversion::dto::{ConversionStartedResponse, ConvertLocalVideoRequest, ReencodeStartedResponse};
use crate::modules::conversion::model::{ConversionJob, JobStatus};
use crate::modules::movie::dto::{CreateMovieRequest, LocalVideosResponse, MovieResponse, UpdateMovieRequest};
use crate::modules::movie::model::{Movie, MovieCategory, QualityBadge, RenditionSet};
use crate::modules::watchlist::dto::{WatchlistAddResponse, WatchlistClearResponse, WatchlistRemoveResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::handler::register,
        crate::modules::auth::handler::login,
        crate::modules::auth::handler::get_me,
        crate::modules::auth::handler::list_users,
        crate::modules::movie::handler::list_movies,
        crate::modules::movie::handler::list_by_category,
        crate::modules::movie::handler::get_movie,
        crate::modules::movie::handler::create_movie,
        crate::modules::movie::handler::update_movie,
        crate::modules::movie::handler::delete_movie,
        crate::modules::movie::handler::upload_movie_video,
        crate::modules::movie::stream_handler::stream_movie,
        crate::modules::conversion::handler::list_local_videos,
        crate::modules::conversion::handler::convert_local_video,
        crate::modules::conversion::handler::conversion_status,
        crate::modules::conversion::handler::convert_movie,
        crate::modules::watchlist::handler::get_watchlist,
        crate::modules::watchlist::handler::add_to_watchlist,
        crate::modules::watchlist::handler::remove_from_watchlist,
        crate::modules::watchlist::handler::clear_watchlist,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, AuthResponse, UserResponse,
            Movie, MovieCategory, QualityBadge, RenditionSet,
            CreateMovieRequest, UpdateMovieRequest, MovieResponse, LocalVideosResponse,
            ConvertLocalVideoRequest, ConversionStartedResponse, ReencodeStartedResponse,
            ConversionJob, JobStatus,
            WatchlistAddResponse, WatchlistRemoveResponse, WatchlistClearResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Accounts and bearer tokens"),
        (name = "Movies", description = "Catalog records, uploads and streaming"),
        (name = "Conversion", description = "HD/SD rendition jobs"),
        (name = "Watchlist", description = "Per-user saved titles")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
