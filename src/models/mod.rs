//! Bookkeeping records persisted through the generic repositories.

mod budget;
mod category;
mod expense;

pub use budget::{Budget, Period, PeriodParseError};
pub use category::Category;
pub use expense::Expense;
