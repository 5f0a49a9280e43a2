use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures_util::future::LocalBoxFuture;
use sea_orm::DatabaseConnection;

use crate::auth::jwt;
use crate::db::users::find_or_create_from_auth;
use crate::errors::AppError;
use crate::models::users::{self, CreateUserFromAuth, Roles};

pub struct AuthenticatedUser(pub users::Model);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let bearer = BearerAuth::from_request(&req, payload);

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let bearer = bearer.await.map_err(|_| {
                AppError::Unauthorized("Authorization header must be: Bearer <token>".to_string())
            })?;

            // 2. Validate the JWT against the shared secret.
            let secret = req.app_data::<web::Data<JwtSecret>>().ok_or_else(|| {
                tracing::error!("JwtSecret missing from app data");
                AppError::Unauthorized("Authentication is not configured".to_string())
            })?;

            let claims = jwt::validate_token(bearer.token(), &secret.0)
                .map_err(|e| AppError::Unauthorized(format!("Invalid token: {e}")))?;

            // 3. Extract user info from claims.
            let user_id = claims.user_id().map_err(AppError::Unauthorized)?;

            // 4. Get the database connection.
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| {
                    tracing::error!("DatabaseConnection missing from app data");
                    AppError::Unauthorized("Authentication is not configured".to_string())
                })?;

            // 5. Find or create the user.
            let user = find_or_create_from_auth(
                db.get_ref(),
                CreateUserFromAuth {
                    id: user_id,
                    email: claims.email,
                    role: Roles::from_claim(claims.role.as_deref()),
                },
            )
            .await?;

            Ok(AuthenticatedUser(user))
        })
    }
}

/// Wrapper type to store the JWT secret in Actix app data.
#[derive(Clone)]
pub struct JwtSecret(pub String);
