use super::dto::{AuthResponse, LoginRequest, RegisterRequest, TokenClaims, UserResponse};
use super::model::{User, UserRole};
use super::repository::AuthRepository;
use crate::common::error::{AppError, AppResult};
use crate::common::security;
use crate::config::settings::{AdminSeed, AppConfig};
use crate::modules::movie::service::validation_message;
use crate::state::AppState;
use anyhow::anyhow;
use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct AuthService;

impl AuthService {
    pub async fn register(state: AppState, req: RegisterRequest) -> AppResult<AuthResponse> {
        req.validate()
            .map_err(|e| AppError::Validation(validation_message(&e)))?;

        let password_hash = security::hash_password(&req.password)?;
        let user = AuthRepository::create_user(
            &state.db,
            req.name.trim(),
            &normalize_email(&req.email),
            &password_hash,
            UserRole::User,
        )
        .await
        .map_err(AppError::Store)?
        .ok_or_else(|| AppError::Conflict("User already exists".to_string()))?;

        info!("👤 Registered user {}", user.email);
        Self::respond_with_token(&state.config, user)
    }

    pub async fn login(state: AppState, req: LoginRequest) -> AppResult<AuthResponse> {
        req.validate()
            .map_err(|e| AppError::Validation(validation_message(&e)))?;

        let user = AuthRepository::find_user_by_email(&state.db, &normalize_email(&req.email))
            .await
            .map_err(AppError::Store)?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        security::verify_password(&req.password, &user.password_hash)
            .map_err(|_| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        Self::respond_with_token(&state.config, user)
    }

    pub async fn me(state: AppState, user_id: Uuid) -> AppResult<UserResponse> {
        AuthRepository::find_user_by_id(&state.db, user_id)
            .await
            .map_err(AppError::Store)?
            .map(UserResponse::from)
            .ok_or(AppError::UserNotFound)
    }

    pub async fn list_users(state: AppState) -> AppResult<Vec<UserResponse>> {
        let users = AuthRepository::list_users(&state.db)
            .await
            .map_err(AppError::Store)?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Creates the configured admin account unless its email is already taken.
    pub async fn ensure_admin(state: &AppState, seed: &AdminSeed) -> anyhow::Result<()> {
        let email = normalize_email(&seed.email);
        if let Some(existing) = AuthRepository::find_user_by_email(&state.db, &email).await? {
            if existing.role != UserRole::Admin {
                tracing::warn!("⚠️ Admin seed email {} belongs to a non-admin account", email);
            }
            return Ok(());
        }

        let password_hash = security::hash_password(&seed.password)?;
        if AuthRepository::create_user(&state.db, &seed.name, &email, &password_hash, UserRole::Admin)
            .await?
            .is_some()
        {
            info!("👑 Created admin account {}", email);
        }
        Ok(())
    }

    fn respond_with_token(config: &AppConfig, user: User) -> AppResult<AuthResponse> {
        let token = Self::create_access_token(config, user.id, user.role)?;
        Ok(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            token,
        })
    }

    pub fn create_access_token(config: &AppConfig, user_id: Uuid, role: UserRole) -> AppResult<String> {
        let now = get_current_timestamp() as usize;
        let lifetime = config.jwt_expires_in_days.max(1) as usize * 24 * 60 * 60;

        let claims = TokenClaims {
            sub: user_id,
            role,
            exp: now + lifetime,
            iat: now,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow!("Failed to sign token: {}", e)))
    }
}
