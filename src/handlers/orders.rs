use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::checkout::{self, LineItem, PlaceOrder};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::order::Order;
use crate::models::order_line::OrderLine;
use crate::schema::{order_lines, orders, products, users};

/// Statuses an order may be moved to after placement. No transition table
/// is enforced; any listed status can follow any other.
const ORDER_STATUSES: [&str; 5] = ["NEW", "PROCESSING", "SHIPPED", "COMPLETED", "CANCELLED"];

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub user_id: Uuid,
    /// Decimal total as a string to avoid floating-point issues, e.g. "24.50"
    pub total: String,
    pub shipping_address: String,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total: String,
    pub shipping_address: String,
    pub status: String,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreOrderResponse {
    pub order_id: Uuid,
    pub buyer_name: String,
    pub total: String,
    pub status: String,
    pub created_at: String,
}

fn order_response(order: Order, lines: Vec<OrderLine>) -> OrderResponse {
    OrderResponse {
        id: order.id,
        customer_id: order.customer_id,
        total: order.total.to_string(),
        shipping_address: order.shipping_address,
        status: order.status,
        created_at: order.created_at.to_rfc3339(),
        lines: lines
            .into_iter()
            .map(|l| OrderLineResponse {
                id: l.id,
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price.to_string(),
            })
            .collect(),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Places an order. Stock verification, stock decrement, and the order and
/// line inserts all happen in one database transaction; on any failure
/// nothing is committed.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Empty cart, bad quantity or bad total"),
        (status = 404, description = "A product in the cart does not exist"),
        (status = 409, description = "Insufficient stock for a product in the cart"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn place_order(
    pool: web::Data<DbPool>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let total = BigDecimal::from_str(&body.total)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid total '{}': {}", body.total, e)))?;

    let request = PlaceOrder {
        customer_id: body.user_id,
        total,
        shipping_address: body.shipping_address,
        items: body
            .items
            .into_iter()
            .map(|i| LineItem {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect(),
    };

    let order_id = web::block(move || checkout::place_order(&pool, request))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({
        "message": "Order placed successfully",
        "order_id": order_id
    })))
}

/// GET /api/orders/{id}
///
/// Returns the order header together with its lines.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let result = web::block(move || {
        let mut conn = pool.get()?;

        let order: Option<Order> = orders::table
            .find(order_id)
            .select(Order::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok::<_, AppError>(None);
        };

        let lines: Vec<OrderLine> = order_lines::table
            .filter(order_lines::order_id.eq(order.id))
            .select(OrderLine::as_select())
            .load(&mut conn)?;

        Ok(Some((order, lines)))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some((order, lines)) => Ok(HttpResponse::Ok().json(order_response(order, lines))),
        None => Err(AppError::NotFound("Order")),
    }
}

/// PUT /api/orders/{id}/status
///
/// Moves an order to a new status. Placement always starts orders at NEW;
/// everything after that goes through here.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = OrderResponse),
        (status = 400, description = "Unknown status value"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status = body.into_inner().status;

    if !ORDER_STATUSES.contains(&status.as_str()) {
        return Err(AppError::InvalidRequest(format!(
            "Unknown status '{}', expected one of {:?}",
            status, ORDER_STATUSES
        )));
    }

    let order = web::block(move || {
        let mut conn = pool.get()?;
        let order: Option<Order> = diesel::update(orders::table.find(order_id))
            .set(orders::status.eq(status))
            .get_result(&mut conn)
            .optional()?;
        Ok::<_, AppError>(order)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match order {
        Some(o) => Ok(HttpResponse::Ok().json(order_response(o, vec![]))),
        None => Err(AppError::NotFound("Order")),
    }
}

/// GET /api/stores/{store_id}/orders
///
/// Returns every order containing at least one of the store's products,
/// newest first, with the buyer's name attached.
#[utoipa::path(
    get,
    path = "/api/stores/{store_id}/orders",
    params(("store_id" = Uuid, Path, description = "Store UUID")),
    responses(
        (status = 200, description = "Orders involving the store", body = [StoreOrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_store_orders(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let store_id = path.into_inner();

    let rows = web::block(move || {
        let mut conn = pool.get()?;
        let rows: Vec<(Order, String)> = orders::table
            .inner_join(users::table)
            .filter(
                orders::id.eq_any(
                    order_lines::table
                        .inner_join(products::table)
                        .filter(products::store_id.eq(store_id))
                        .select(order_lines::order_id),
                ),
            )
            .order(orders::created_at.desc())
            .select((Order::as_select(), users::name))
            .load(&mut conn)?;
        Ok::<_, AppError>(rows)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<StoreOrderResponse> = rows
        .into_iter()
        .map(|(o, buyer_name)| StoreOrderResponse {
            order_id: o.id,
            buyer_name,
            total: o.total.to_string(),
            status: o.status,
            created_at: o.created_at.to_rfc3339(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(items))
}
