//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing records, stock shortfalls). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A named record does not exist (`kind` is "dish", "ingredient", ...).
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// Inventory cannot cover a requirement.
    #[error("not enough '{ingredient}' in inventory (required: {required}, available: {available})")]
    InsufficientStock {
        ingredient: String,
        required: f64,
        available: f64,
    },

    /// A conflicting record already exists.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn dish_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "dish",
            name: name.into(),
        }
    }

    pub fn ingredient_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "ingredient",
            name: name.into(),
        }
    }

    pub fn insufficient_stock(ingredient: impl Into<String>, required: f64, available: f64) -> Self {
        Self::InsufficientStock {
            ingredient: ingredient.into(),
            required,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_record() {
        assert_eq!(
            DomainError::dish_not_found("Paneer Tikka").to_string(),
            "dish 'Paneer Tikka' not found"
        );
        assert_eq!(
            DomainError::insufficient_stock("tomato", 10.0, 4.0).to_string(),
            "not enough 'tomato' in inventory (required: 10, available: 4)"
        );
    }
}
