use serde::{Deserialize, Serialize};

use crate::recipe::Recipe;

/// A dish on the menu.
///
/// Menu rows are edited out-of-band; the service only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub dish_name: String,
    pub price: f64,
    pub ingredients: Recipe,
    pub category: String,
    pub vegetarian: bool,
    pub img_link: Option<String>,
}

/// Public view of a dish: ingredient names without quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuListing {
    pub dish_name: String,
    pub price: f64,
    pub ingredients: Vec<String>,
    pub category: String,
    pub vegetarian: bool,
    pub img_link: Option<String>,
}

impl MenuItem {
    pub fn listing(&self) -> MenuListing {
        MenuListing {
            dish_name: self.dish_name.clone(),
            price: self.price,
            ingredients: self.ingredients.ingredient_names(),
            category: self.category.clone(),
            vegetarian: self.vegetarian,
            img_link: self.img_link.clone(),
        }
    }
}
