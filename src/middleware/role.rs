use crate::common::error::AppError;
use crate::modules::auth::dto::TokenClaims;
use crate::modules::auth::model::UserRole;
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

pub async fn admin_guard(
    Extension(claims): Extension<TokenClaims>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if claims.role != UserRole::Admin {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(req).await)
}
