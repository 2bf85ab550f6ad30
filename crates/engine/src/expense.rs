//! The module contains the `Expense` type, the record kept in the backing file.
use core::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Format of the `date` field, both on disk and on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A dated, categorized amount of money spent.
///
/// The date is kept as text: a record with an unparsable date is still a
/// valid record, it only drops out of the monthly views.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(rename = "expense_id")]
    pub id: u64,
    pub category: String,
    pub amount: f64,
    pub date: String,
}

impl Expense {
    /// Build a record. A missing or empty `date` becomes today's local date.
    pub fn new(id: u64, category: String, amount: f64, date: Option<String>) -> Self {
        let date = date
            .filter(|date| !date.is_empty())
            .unwrap_or_else(today);
        Self {
            id,
            category,
            amount,
            date,
        }
    }

    /// Parsed `date`, `None` when it is not `YYYY-MM-DD`.
    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {:.2} {}",
            self.id, self.date, self.amount, self.category
        )
    }
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}
