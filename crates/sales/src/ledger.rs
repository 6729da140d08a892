use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::HolidayCalendar;

/// Servings of one dish sold on one day.
///
/// There is at most one record per `(date, dish_name)`; later sales on the same
/// day are added to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub dish_name: String,
    pub sales: i64,
    pub day: u32,
    pub month: u32,
    pub is_weekend: bool,
    pub is_holiday: bool,
}

impl SalesRecord {
    pub fn first_sale(date: NaiveDate, dish_name: impl Into<String>, servings: i64, holidays: &HolidayCalendar) -> Self {
        let fields = holidays.fields_for(date);
        Self {
            date,
            dish_name: dish_name.into(),
            sales: servings,
            day: fields.day,
            month: fields.month,
            is_weekend: fields.is_weekend,
            is_holiday: fields.is_holiday,
        }
    }

    pub fn absorb(&mut self, servings: i64) {
        self.sales += servings;
    }
}
