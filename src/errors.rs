use actix_web::HttpResponse;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

use crate::checkout::CheckoutError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Insufficient stock for product {product_id}")]
    InsufficientStock { product_id: uuid::Uuid },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                AppError::Conflict(info.message().to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::InvalidRequest(msg) => AppError::InvalidRequest(msg),
            CheckoutError::ProductNotFound(_) => AppError::NotFound("Product"),
            CheckoutError::InsufficientStock { product_id, .. } => {
                AppError::InsufficientStock { product_id }
            }
            CheckoutError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::InvalidRequest(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::InvalidCredentials => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Conflict(_) => HttpResponse::Conflict().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::InsufficientStock { .. } => HttpResponse::Conflict().json(
                serde_json::json!({
                    "error": self.to_string()
                }),
            ),
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use uuid::Uuid;

    #[test]
    fn invalid_request_returns_400() {
        let resp = AppError::InvalidRequest("cart is empty".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_credentials_returns_401() {
        let resp = AppError::InvalidCredentials.error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Product").error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_returns_409() {
        let resp = AppError::Conflict("duplicate".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn insufficient_stock_returns_409() {
        let err = AppError::InsufficientStock {
            product_id: Uuid::new_v4(),
        };
        assert_eq!(err.error_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_error_returns_500_with_generic_body() {
        let err = AppError::Internal("connection refused".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_display_names_the_entity() {
        assert_eq!(AppError::NotFound("Store").to_string(), "Store not found");
    }

    #[test]
    fn checkout_empty_cart_maps_to_invalid_request() {
        let app_err: AppError = CheckoutError::InvalidRequest("cart is empty".into()).into();
        assert!(matches!(app_err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn checkout_missing_product_maps_to_not_found() {
        let app_err: AppError = CheckoutError::ProductNotFound(Uuid::new_v4()).into();
        assert!(matches!(app_err, AppError::NotFound("Product")));
    }

    #[test]
    fn checkout_insufficient_stock_maps_to_conflict() {
        let app_err: AppError = CheckoutError::InsufficientStock {
            product_id: Uuid::new_v4(),
            requested: 5,
            available: 2,
        }
        .into();
        assert!(matches!(app_err, AppError::InsufficientStock { .. }));
    }

    #[test]
    fn checkout_storage_maps_to_internal() {
        let app_err: AppError = CheckoutError::Storage("oops".into()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }
}
