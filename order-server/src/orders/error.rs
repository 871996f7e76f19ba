use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

use crate::db::repository::RepoError;

/// Order lifecycle errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Order total is out of range")]
    TotalOutOfRange,

    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Invalid quantity {quantity} for menu item {food_id}")]
    InvalidQuantity { food_id: String, quantity: i64 },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Menu item not found: {0}")]
    FoodNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already claimed: {0}")]
    AlreadyClaimed(String),

    #[error("Order already completed: {0}")]
    AlreadyCompleted(String),

    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Order {0} is not claimed by the caller")]
    NotClaimant(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Coarse error taxonomy shared by every order operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderErrorKind {
    Validation,
    NotFound,
    Conflict,
    Forbidden,
    Transaction,
    Internal,
}

impl OrderError {
    pub fn kind(&self) -> OrderErrorKind {
        match self {
            OrderError::Validation(_)
            | OrderError::MissingField(_)
            | OrderError::TotalOutOfRange
            | OrderError::EmptyOrder
            | OrderError::InvalidQuantity { .. } => OrderErrorKind::Validation,
            OrderError::TableNotFound(_)
            | OrderError::FoodNotFound(_)
            | OrderError::OrderNotFound(_) => OrderErrorKind::NotFound,
            OrderError::AlreadyClaimed(_)
            | OrderError::AlreadyCompleted(_)
            | OrderError::InvalidTransition { .. } => OrderErrorKind::Conflict,
            OrderError::NotClaimant(_) => OrderErrorKind::Forbidden,
            OrderError::Transaction(_) => OrderErrorKind::Transaction,
            OrderError::Database(_) => OrderErrorKind::Internal,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::Validation(_) => ErrorCode::ValidationFailed,
            OrderError::MissingField(_) => ErrorCode::RequiredField,
            OrderError::TotalOutOfRange => ErrorCode::ValueOutOfRange,
            OrderError::EmptyOrder => ErrorCode::OrderEmpty,
            OrderError::InvalidQuantity { .. } => ErrorCode::FoodInvalidQuantity,
            OrderError::TableNotFound(_) => ErrorCode::TableNotFound,
            OrderError::FoodNotFound(_) => ErrorCode::FoodNotFound,
            OrderError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            OrderError::AlreadyClaimed(_) => ErrorCode::OrderAlreadyClaimed,
            OrderError::AlreadyCompleted(_) => ErrorCode::OrderAlreadyCompleted,
            OrderError::InvalidTransition { .. } => ErrorCode::OrderInvalidTransition,
            OrderError::NotClaimant(_) => ErrorCode::OrderNotClaimant,
            OrderError::Transaction(_) => ErrorCode::TransactionFailed,
            OrderError::Database(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<RepoError> for OrderError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(msg) => OrderError::Validation(msg),
            RepoError::NotFound(msg) | RepoError::Duplicate(msg) | RepoError::Database(msg) => {
                OrderError::Database(msg)
            }
        }
    }
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Database(err.to_string())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let app = AppError::with_message(code, message);
        match err {
            OrderError::TableNotFound(id) => app.with_detail("table_id", id),
            OrderError::FoodNotFound(id) => app.with_detail("food_id", id),
            OrderError::InvalidQuantity { food_id, quantity } => app
                .with_detail("food_id", food_id)
                .with_detail("quantity", quantity),
            OrderError::OrderNotFound(id)
            | OrderError::AlreadyClaimed(id)
            | OrderError::AlreadyCompleted(id)
            | OrderError::NotClaimant(id) => app.with_detail("order_id", id),
            OrderError::InvalidTransition { order_id, from, .. } => app
                .with_detail("order_id", order_id)
                .with_detail("status", from.as_str()),
            OrderError::Transaction(_) | OrderError::Database(_) => {
                tracing::error!(error = %app.message, "Order storage failure");
                app
            }
            OrderError::MissingField(field) => app.with_detail("field", field),
            OrderError::Validation(_) | OrderError::TotalOutOfRange | OrderError::EmptyOrder => app,
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
