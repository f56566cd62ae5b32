use super::dto::{CreateMovieRequest, MovieResponse, UpdateMovieRequest};
use super::service::MovieService;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    get,
    path = "/api/movies",
    responses(
        (status = 200, description = "List Movies", body = ApiResponse<Vec<MovieResponse>>),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Movies"
)]
pub async fn list_movies(State(state): State<AppState>) -> impl IntoResponse {
    match MovieService::list_movies(state).await {
        Ok(res) => ApiSuccess(ApiResponse::success(res, "Movies retrieved successfully"), StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/movies/category/{type}",
    params(
        ("type" = String, Path, description = "trending, popular or newReleases")
    ),
    responses(
        (status = 200, description = "Movies in category", body = ApiResponse<Vec<MovieResponse>>)
    ),
    tag = "Movies"
)]
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> impl IntoResponse {
    match MovieService::list_by_category(state, category).await {
        Ok(res) => ApiSuccess(ApiResponse::success(res, "Movies retrieved successfully"), StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    params(
        ("id" = String, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Get Movie", body = ApiResponse<MovieResponse>),
        (status = 404, description = "Movie Not Found")
    ),
    tag = "Movies"
)]
pub async fn get_movie(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match MovieService::get_movie(state, id).await {
        Ok(res) => ApiSuccess(ApiResponse::success(res, "Movie retrieved successfully"), StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie Created", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Bad Request"),
        (status = 403, description = "Admin role required")
    ),
    tag = "Movies",
    security(("bearer_auth" = []))
)]
pub async fn create_movie(
    State(state): State<AppState>,
    Json(req): Json<CreateMovieRequest>,
) -> impl IntoResponse {
    match MovieService::create_movie(state, req).await {
        Ok(res) => ApiSuccess(ApiResponse::success(res, "Movie created successfully"), StatusCode::CREATED).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/movies/{id}",
    params(
        ("id" = String, Path, description = "Movie ID")
    ),
    request_body = UpdateMovieRequest,
    responses(
        (status = 200, description = "Movie Updated", body = ApiResponse<MovieResponse>),
        (status = 404, description = "Movie Not Found")
    ),
    tag = "Movies",
    security(("bearer_auth" = []))
)]
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMovieRequest>,
) -> impl IntoResponse {
    match MovieService::update_movie(state, id, req).await {
        Ok(res) => ApiSuccess(ApiResponse::success(res, "Movie updated successfully"), StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/movies/{id}",
    params(
        ("id" = String, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie Deleted"),
        (status = 404, description = "Movie Not Found")
    ),
    tag = "Movies",
    security(("bearer_auth" = []))
)]
pub async fn delete_movie(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match MovieService::delete_movie(state, id).await {
        Ok(()) => ApiSuccess(ApiResponse::success((), "Movie deleted"), StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/movies/{id}/upload",
    params(
        ("id" = String, Path, description = "Movie ID")
    ),
    request_body(content_type = "multipart/form-data", description = "Video file in the `video` field"),
    responses(
        (status = 200, description = "Video uploaded", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Missing, oversized or unsupported file"),
        (status = 404, description = "Movie Not Found")
    ),
    tag = "Movies",
    security(("bearer_auth" = []))
)]
pub async fn upload_movie_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> impl IntoResponse {
    match MovieService::upload_video(state, id, multipart).await {
        Ok(res) => ApiSuccess(ApiResponse::success(res, "Video uploaded successfully"), StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{body_json, sample_movie, TestApp};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;

    const BOUNDARY: &str = "vodboundary";

    fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
        Request::post(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn catalog_crud_round() {
        let app = TestApp::new().await;
        let admin = app.admin_token();

        let created = app
            .send(json_request(
                "POST",
                "/api/movies",
                Some(&admin),
                json!({
                    "title": "Persona",
                    "poster": "posters/persona.jpg",
                    "description": "Two women",
                    "genres": "Drama",
                    "year": "1966",
                    "type": "popular"
                }),
            ))
            .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let body = body_json(created).await;
        assert_eq!(body["status"], "success");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let patched = app
            .send(json_request(
                "PATCH",
                &format!("/api/movies/{}", id),
                Some(&admin),
                json!({ "rating": "18+" }),
            ))
            .await;
        assert_eq!(patched.status(), StatusCode::OK);
        let body = body_json(patched).await;
        assert_eq!(body["data"]["rating"], "18+");
        assert_eq!(body["data"]["title"], "Persona");

        let listed = body_json(
            app.send(Request::get("/api/movies/category/popular").body(Body::empty()).unwrap())
                .await,
        )
        .await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);

        let deleted = app
            .send(json_request("DELETE", &format!("/api/movies/{}", id), Some(&admin), json!({})))
            .await;
        assert_eq!(deleted.status(), StatusCode::OK);

        let gone = app
            .send(Request::get(format!("/api/movies/{}", id)).body(Body::empty()).unwrap())
            .await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_requires_admin_and_valid_fields() {
        let app = TestApp::new().await;

        let anonymous = app
            .send(json_request("POST", "/api/movies", None, json!({ "title": "X" })))
            .await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let user = app
            .send(json_request("POST", "/api/movies", Some(&app.user_token()), json!({ "title": "X" })))
            .await;
        assert_eq!(user.status(), StatusCode::FORBIDDEN);

        let invalid = app
            .send(json_request(
                "POST",
                "/api/movies",
                Some(&app.admin_token()),
                json!({ "title": "", "poster": "p", "description": "d", "genres": "g", "year": "2000" }),
            ))
            .await;
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(invalid).await["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_id_is_movie_not_found() {
        let app = TestApp::new().await;
        let response = app
            .send(Request::get("/api/movies/42").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "MOVIE_NOT_FOUND");
        assert_eq!(body["movieId"], "42");
    }

    #[tokio::test]
    async fn upload_stores_file_and_records_source() {
        let app = TestApp::new().await;
        let movie = app.catalog.insert(sample_movie("Vertigo")).await;

        let response = app
            .send(upload(
                &format!("/api/movies/{}/upload", movie.id),
                &app.admin_token(),
                multipart_body("video", "vertigo.mkv", "video/x-matroska", b"matroska bytes"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let expected = format!("videos/{}_original.mkv", movie.id);
        let body = body_json(response).await;
        assert_eq!(body["data"]["videos"]["fhd"], expected);
        assert_eq!(body["data"]["videoPath"], expected);
        assert_eq!(std::fs::read(app.media_path(&expected)).unwrap(), b"matroska bytes");
    }

    #[tokio::test]
    async fn upload_rejects_wrong_type_without_writing() {
        let app = TestApp::new().await;
        let movie = app.catalog.insert(sample_movie("Rope")).await;

        let response = app
            .send(upload(
                &format!("/api/movies/{}/upload", movie.id),
                &app.admin_token(),
                multipart_body("video", "rope.png", "image/png", b"png"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "INVALID_FILE_TYPE");
        assert!(app.uploaded_files().is_empty());
    }

    #[tokio::test]
    async fn upload_for_unknown_movie_writes_nothing() {
        let app = TestApp::new().await;
        let response = app
            .send(upload(
                &format!("/api/movies/{}/upload", uuid::Uuid::new_v4()),
                &app.admin_token(),
                multipart_body("video", "a.mp4", "video/mp4", b"data"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(app.uploaded_files().is_empty());
    }

    #[tokio::test]
    async fn upload_without_video_field_is_rejected() {
        let app = TestApp::new().await;
        let movie = app.catalog.insert(sample_movie("Notorious")).await;
        let response = app
            .send(upload(
                &format!("/api/movies/{}/upload", movie.id),
                &app.admin_token(),
                multipart_body("poster", "a.mp4", "video/mp4", b"data"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.uploaded_files().is_empty());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_and_removed() {
        let app = TestApp::with_upload_limit(16).await;
        let movie = app.catalog.insert(sample_movie("Frenzy")).await;

        let response = app
            .send(upload(
                &format!("/api/movies/{}/upload", movie.id),
                &app.admin_token(),
                multipart_body("video", "frenzy.mp4", "video/mp4", &[7u8; 64]),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "FILE_TOO_LARGE");
        assert!(app.uploaded_files().is_empty());

        let stored = app.catalog.get(movie.id).await.unwrap();
        assert!(stored.videos.source.is_none());
    }

    #[tokio::test]
    async fn failed_catalog_write_removes_uploaded_file() {
        let app = TestApp::new().await;
        let movie = app.catalog.insert(sample_movie("Psycho")).await;
        app.catalog.fail_saves(true);

        let response = app
            .send(upload(
                &format!("/api/movies/{}/upload", movie.id),
                &app.admin_token(),
                multipart_body("video", "psycho.mp4", "video/mp4", b"data"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "DATABASE_ERROR");
        assert!(app.uploaded_files().is_empty());
    }

    async fn movie_with_source(app: &TestApp, title: &str) -> (uuid::Uuid, String) {
        let mut movie = sample_movie(title);
        let source = format!("videos/{}_original.mp4", movie.id);
        movie.videos.source = Some(source.clone());
        app.write_media(&source, b"previous source");
        (app.catalog.insert(movie).await.id, source)
    }

    #[tokio::test]
    async fn oversized_reupload_keeps_previous_source() {
        let app = TestApp::with_upload_limit(16).await;
        let (id, source) = movie_with_source(&app, "Marnie").await;

        let response = app
            .send(upload(
                &format!("/api/movies/{}/upload", id),
                &app.admin_token(),
                multipart_body("video", "marnie.mp4", "video/mp4", &[7u8; 64]),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let stored = app.catalog.get(id).await.unwrap();
        assert_eq!(stored.videos.source.as_deref(), Some(source.as_str()));
        assert_eq!(std::fs::read(app.media_path(&source)).unwrap(), b"previous source");
        assert_eq!(app.uploaded_files(), vec![format!("{}_original.mp4", id)]);
    }

    #[tokio::test]
    async fn reupload_with_failed_catalog_write_keeps_previous_source() {
        let app = TestApp::new().await;
        let (id, source) = movie_with_source(&app, "Topaz").await;
        app.catalog.fail_saves(true);

        let response = app
            .send(upload(
                &format!("/api/movies/{}/upload", id),
                &app.admin_token(),
                multipart_body("video", "topaz.mp4", "video/mp4", b"replacement"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(std::fs::read(app.media_path(&source)).unwrap(), b"previous source");
        assert_eq!(app.uploaded_files(), vec![format!("{}_original.mp4", id)]);
    }

    #[tokio::test]
    async fn reupload_replaces_source_in_place() {
        let app = TestApp::new().await;
        let (id, source) = movie_with_source(&app, "Saboteur").await;

        let response = app
            .send(upload(
                &format!("/api/movies/{}/upload", id),
                &app.admin_token(),
                multipart_body("video", "saboteur.mp4", "video/mp4", b"replacement"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(std::fs::read(app.media_path(&source)).unwrap(), b"replacement");
        assert_eq!(app.uploaded_files(), vec![format!("{}_original.mp4", id)]);
    }

    #[tokio::test]
    async fn declared_oversize_body_is_refused_before_reading() {
        let app = TestApp::with_upload_limit(16).await;
        let movie = app.catalog.insert(sample_movie("Lifeboat")).await;
        let body = multipart_body("video", "lifeboat.mp4", "video/mp4", &vec![0u8; 1024 * 1024 + 64]);

        let mut request = upload(&format!("/api/movies/{}/upload", movie.id), &app.admin_token(), body.clone());
        request
            .headers_mut()
            .insert(header::CONTENT_LENGTH, body.len().into());
        let response = app.send(request).await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(app.uploaded_files().is_empty());
    }
}
