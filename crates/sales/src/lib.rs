//! Sales domain module: the per-day ledger, order fulfillment and forecasts.
//!
//! This crate contains business rules for sales, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod calendar;
pub mod fulfillment;
pub mod ledger;
pub mod prediction;
pub mod window;

pub use calendar::{CalendarFields, HolidayCalendar};
pub use fulfillment::{FulfillmentPlan, FulfillmentReceipt, plan_fulfillment};
pub use ledger::SalesRecord;
pub use prediction::Prediction;
pub use window::{DateRange, SalesWindow};
