use actix_web::{web, HttpResponse};
use bcrypt::DEFAULT_COST;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::user::{NewUser, User};
use crate::schema::users;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; the password hash never leaves the database layer.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            name: u.name,
            email: u.email,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/users/register
///
/// Registers a new user. The password is bcrypt-hashed before it is stored;
/// hashing runs on the blocking pool together with the insert.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Missing name, email or password"),
        (status = 409, description = "Email is already registered"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn register_user(
    pool: web::Data<DbPool>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    if body.name.trim().is_empty() || body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::InvalidRequest(
            "name, email and password are required".to_string(),
        ));
    }

    let user = web::block(move || {
        let password_hash = bcrypt::hash(&body.password, DEFAULT_COST)?;

        let mut conn = pool.get()?;
        let user: User = diesel::insert_into(users::table)
            .values(&NewUser {
                id: Uuid::new_v4(),
                name: body.name,
                email: body.email,
                password_hash,
            })
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    DatabaseErrorKind::UniqueViolation,
                    _,
                ) => AppError::Conflict("Email is already registered".to_string()),
                other => other.into(),
            })?;

        Ok::<_, AppError>(user)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully",
        "user": UserResponse::from(user)
    })))
}

/// POST /api/users/login
///
/// Verifies the password against the stored bcrypt hash. Unknown email and
/// wrong password produce the same 401 so the response does not reveal
/// which of the two was wrong.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn login_user(
    pool: web::Data<DbPool>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let user = web::block(move || {
        let mut conn = pool.get()?;
        let user: Option<User> = users::table
            .filter(users::email.eq(&body.email))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        let user = user.ok_or(AppError::InvalidCredentials)?;

        if !bcrypt::verify(&body.password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        Ok::<_, AppError>(user)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "user": UserResponse::from(user)
    })))
}
