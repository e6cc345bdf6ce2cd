//! Strongly-typed identifiers used across the domain.
//!
//! Catalog identifiers are short human-assigned codes ("SALT", "SOUP"), so they
//! wrap a `String` rather than a UUID. Order identifiers can be generated.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of an ingredient.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(String);

/// Identifier of a dish.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DishId(String);

/// Identifier of a combo.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComboId(String);

/// Identifier of an order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

macro_rules! impl_string_id {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::validation(format!(
                        "{} cannot be empty",
                        $name
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_string_id!(IngredientId, "IngredientId");
impl_string_id!(DishId, "DishId");
impl_string_id!(ComboId, "ComboId");
impl_string_id!(OrderId, "OrderId");

impl OrderId {
    /// Generate a fresh order identifier.
    ///
    /// Uses UUIDv7 (time-ordered) so generated ids sort by creation time.
    /// Prefer passing ids explicitly in tests for determinism.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_rejects_blank() {
        let id: DishId = "  SOUP ".parse().unwrap();
        assert_eq!(id.as_str(), "SOUP");
        assert!(matches!(
            "   ".parse::<IngredientId>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn generated_order_ids_are_unique() {
        assert_ne!(OrderId::generate(), OrderId::generate());
    }
}
