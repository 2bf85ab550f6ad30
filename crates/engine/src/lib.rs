use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};

pub use aggregate::{DebugSnapshot, MonthSummary, Totals};
pub use error::EngineError;
pub use expense::{DATE_FORMAT, Expense};
pub use store::Store;

pub mod aggregate;
mod error;
mod expense;
mod store;

type ResultEngine<T> = Result<T, EngineError>;

/// Number of trailing months in [`Engine::previous_months`].
pub const DEFAULT_MONTH_COUNT: u32 = 3;

/// Default backing file, relative to the working directory.
pub const DEFAULT_PATH: &str = "expenses.json";

/// Owns the expense collection and answers every query on it.
///
/// Mutations need `&mut self`: callers sharing an engine put it behind a
/// lock, which is the only arbitration between writers.
#[derive(Debug)]
pub struct Engine {
    store: Store,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Backing file of the store.
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Record a new expense and persist it before returning.
    ///
    /// Input is not validated: callers reject empty categories and
    /// non-positive amounts beforehand.
    pub fn add_expense(
        &mut self,
        category: &str,
        amount: f64,
        date: Option<&str>,
    ) -> ResultEngine<Expense> {
        self.store
            .add(category, amount, date.map(ToString::to_string))
    }

    /// Delete the expense `id` after re-reading the backing file.
    ///
    /// Returns the number of removed records (0 for an unknown id).
    pub fn delete_expense(&mut self, id: u64) -> ResultEngine<usize> {
        self.store.delete(id)
    }

    /// Re-read the backing file. On error the collection is empty.
    pub fn reload(&mut self) -> ResultEngine<usize> {
        self.store.load()
    }

    pub fn expenses(&self) -> &[Expense] {
        self.store.expenses()
    }

    /// Distinct dates, most recent first.
    pub fn dates(&self) -> Vec<String> {
        self.store.dates()
    }

    pub fn sum_by_category(&self) -> Totals {
        aggregate::sum_by_category(self.expenses())
    }

    pub fn sum_by_date(&self) -> BTreeMap<String, f64> {
        aggregate::sum_by_date(self.expenses())
    }

    pub fn sum_by_category_for_date(&self, date: &str) -> Totals {
        aggregate::sum_by_category_for_date(self.expenses(), date)
    }

    pub fn monthly_breakdown(&self, reference: NaiveDate, month_count: u32) -> Vec<MonthSummary> {
        aggregate::monthly_breakdown(self.expenses(), reference, month_count)
    }

    /// The current month and the two before it.
    pub fn previous_months(&self) -> Vec<MonthSummary> {
        self.monthly_breakdown(Local::now().date_naive(), DEFAULT_MONTH_COUNT)
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot {
        aggregate::debug_snapshot(self.expenses())
    }
}

/// The builder for `Engine`
#[derive(Debug)]
pub struct EngineBuilder {
    path: PathBuf,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
        }
    }
}

impl EngineBuilder {
    /// Pass the backing file
    pub fn path(mut self, path: impl Into<PathBuf>) -> EngineBuilder {
        self.path = path.into();
        self
    }

    /// Construct `Engine`
    ///
    /// Creates the parent directory of the backing file if needed. A missing
    /// or malformed file is not an error: the engine starts empty.
    pub fn build(self) -> ResultEngine<Engine> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let store = Store::open(self.path);
        tracing::info!(
            "loaded {} expenses from {}",
            store.expenses().len(),
            store.path().display()
        );
        Ok(Engine { store })
    }
}
