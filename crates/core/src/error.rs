//! Domain error model.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::id::IngredientId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant describes a deterministic failure that was detected before
/// any catalog state was touched. Commands never report an error after having
/// applied part of their effect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A command could not be built from its inputs (missing reference,
    /// negative quantity, empty name, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Order fulfillment found an ingredient whose stock does not cover the
    /// aggregated demand of the order.
    #[error(
        "insufficient stock for ingredient {ingredient_id}: required {required}, available {available}"
    )]
    InsufficientStock {
        ingredient_id: IngredientId,
        required: Decimal,
        available: Decimal,
    },

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A domain invariant was violated (illegal transition, state drift).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Decimal arithmetic on `what` left the representable range.
    pub fn out_of_range(what: impl core::fmt::Display) -> Self {
        Self::Validation(format!("{what} is out of range"))
    }

    pub fn insufficient_stock(
        ingredient_id: IngredientId,
        required: Decimal,
        available: Decimal,
    ) -> Self {
        Self::InsufficientStock {
            ingredient_id,
            required,
            available,
        }
    }

    /// Missing amount for an [`DomainError::InsufficientStock`] error.
    pub fn shortfall(&self) -> Option<Decimal> {
        match self {
            Self::InsufficientStock {
                required,
                available,
                ..
            } => Some(*required - *available),
            _ => None,
        }
    }

    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, Self::InsufficientStock { .. })
    }
}
