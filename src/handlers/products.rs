use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::product::{NewProduct, Product, ProductChanges};
use crate::schema::products;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub store_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub unit: String,
    pub stock: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub unit: String,
    pub stock: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub store_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub unit: String,
    pub stock: i32,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            store_id: p.store_id,
            category_id: p.category_id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            unit: p.unit,
            stock: p.stock,
            image_url: p.image_url,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid price '{}': {}", raw, e)))
}

fn validate_listing(name: &str, stock: i32) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Product name must not be empty".to_string(),
        ));
    }
    if stock < 0 {
        return Err(AppError::InvalidRequest(
            "Stock must not be negative".to_string(),
        ));
    }
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/products
///
/// Returns every product in the catalog, newest first.
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        let rows: Vec<Product> = products::table
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

/// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let product = web::block(move || {
        let mut conn = pool.get()?;
        let product: Option<Product> = products::table
            .find(product_id)
            .select(Product::as_select())
            .first(&mut conn)
            .optional()?;
        Ok::<_, AppError>(product)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(p) => Ok(HttpResponse::Ok().json(ProductResponse::from(p))),
        None => Err(AppError::NotFound("Product")),
    }
}

/// POST /api/products
///
/// Lists a new product for a store.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid price, stock, name, or unknown store/category"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn create_product(
    pool: web::Data<DbPool>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    validate_listing(&body.name, body.stock)?;
    let price = parse_price(&body.price)?;

    let product = web::block(move || {
        let mut conn = pool.get()?;
        let product: Product = diesel::insert_into(products::table)
            .values(&NewProduct {
                id: Uuid::new_v4(),
                store_id: body.store_id,
                category_id: body.category_id,
                name: body.name,
                description: body.description,
                price,
                unit: body.unit,
                stock: body.stock,
                image_url: body.image_url,
            })
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    DatabaseErrorKind::ForeignKeyViolation,
                    _,
                ) => AppError::InvalidRequest("Unknown store or category".to_string()),
                other => other.into(),
            })?;
        Ok::<_, AppError>(product)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// PUT /api/products/{id}
///
/// Replaces the seller-editable fields of a product. The stock value is an
/// absolute restock, not a delta.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid price, stock or name"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn update_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.into_inner();
    validate_listing(&body.name, body.stock)?;
    let price = parse_price(&body.price)?;

    let product = web::block(move || {
        let mut conn = pool.get()?;
        let product: Option<Product> = diesel::update(products::table.find(product_id))
            .set(&ProductChanges {
                name: body.name,
                description: body.description,
                price,
                unit: body.unit,
                stock: body.stock,
                image_url: body.image_url,
            })
            .get_result(&mut conn)
            .optional()?;
        Ok::<_, AppError>(product)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(p) => Ok(HttpResponse::Ok().json(ProductResponse::from(p))),
        None => Err(AppError::NotFound("Product")),
    }
}

/// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        let deleted: Option<Product> = diesel::delete(products::table.find(product_id))
            .get_result(&mut conn)
            .optional()?;
        Ok::<_, AppError>(deleted)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match deleted {
        Some(p) => Ok(HttpResponse::Ok().json(json!({
            "message": format!("Product '{}' deleted", p.name)
        }))),
        None => Err(AppError::NotFound("Product")),
    }
}
