//! Ingredient name normalization.

use serde::{Deserialize, Serialize};

/// Case-insensitive lookup key for an ingredient.
///
/// Detector labels and stored ingredient names are compared through this key
/// (trimmed, lower-cased). The stored display name is kept separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientKey(String);

impl IngredientKey {
    pub fn from_label(label: &str) -> Self {
        Self(label.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
