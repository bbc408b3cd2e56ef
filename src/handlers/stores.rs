use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::products::ProductResponse;
use crate::models::product::Product;
use crate::models::store::{NewStore, Store};
use crate::schema::{products, stores};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStoreRequest {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub verification_status: String,
    pub created_at: String,
}

impl From<Store> for StoreResponse {
    fn from(s: Store) -> Self {
        StoreResponse {
            id: s.id,
            user_id: s.user_id,
            name: s.name,
            description: s.description,
            verification_status: s.verification_status,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/stores
///
/// Opens a store for a user. A user can have at most one store (unique
/// constraint); stores are created already verified.
#[utoipa::path(
    post,
    path = "/api/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created", body = StoreResponse),
        (status = 400, description = "Missing store name or unknown user"),
        (status = 409, description = "User already has a store"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "stores"
)]
pub async fn create_store(
    pool: web::Data<DbPool>,
    body: web::Json<CreateStoreRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    if body.name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Store name must not be empty".to_string(),
        ));
    }

    let store = web::block(move || {
        let mut conn = pool.get()?;
        let store: Store = diesel::insert_into(stores::table)
            .values(&NewStore {
                id: Uuid::new_v4(),
                user_id: body.user_id,
                name: body.name,
                description: body.description,
                verification_status: "verified".to_string(),
            })
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    DatabaseErrorKind::UniqueViolation,
                    _,
                ) => AppError::Conflict("User already has a store".to_string()),
                diesel::result::Error::DatabaseError(
                    DatabaseErrorKind::ForeignKeyViolation,
                    _,
                ) => AppError::InvalidRequest("Unknown user".to_string()),
                other => other.into(),
            })?;
        Ok::<_, AppError>(store)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(StoreResponse::from(store)))
}

/// GET /api/stores/by-user/{user_id}
///
/// Looks up the store owned by a user.
#[utoipa::path(
    get,
    path = "/api/stores/by-user/{user_id}",
    params(("user_id" = Uuid, Path, description = "Owner's user UUID")),
    responses(
        (status = 200, description = "Store found", body = StoreResponse),
        (status = 404, description = "User has no store"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "stores"
)]
pub async fn get_store_by_user(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let store = web::block(move || {
        let mut conn = pool.get()?;
        let store: Option<Store> = stores::table
            .filter(stores::user_id.eq(user_id))
            .select(Store::as_select())
            .first(&mut conn)
            .optional()?;
        Ok::<_, AppError>(store)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match store {
        Some(s) => Ok(HttpResponse::Ok().json(StoreResponse::from(s))),
        None => Err(AppError::NotFound("Store")),
    }
}

/// GET /api/stores/{store_id}/products
///
/// Returns the store's products, newest first. An unknown store yields an
/// empty list rather than a 404.
#[utoipa::path(
    get,
    path = "/api/stores/{store_id}/products",
    params(("store_id" = Uuid, Path, description = "Store UUID")),
    responses(
        (status = 200, description = "The store's products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "stores"
)]
pub async fn list_store_products(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let store_id = path.into_inner();

    let rows = web::block(move || {
        let mut conn = pool.get()?;
        let rows: Vec<Product> = products::table
            .filter(products::store_id.eq(store_id))
            .select(Product::as_select())
            .order(products::created_at.desc())
            .load(&mut conn)?;
        Ok::<_, AppError>(rows)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<ProductResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}
