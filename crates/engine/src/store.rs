//! File-backed record store.
//!
//! The whole collection lives in memory and is written back to a single JSON
//! file after every mutation. There is no append log and no atomic replace:
//! a crash in the middle of [`Store::save`] can truncate the file.
use std::{
    collections::BTreeSet,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{EngineError, Expense, ResultEngine};

#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    expenses: Vec<Expense>,
    /// Last load failed to read the file; it must not be overwritten.
    unreadable: bool,
}

impl Store {
    /// Open the store at `path` and load it.
    ///
    /// A missing file gives an empty store. An unreadable or malformed file
    /// also gives an empty store; the failure is logged by [`Store::load`].
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            expenses: Vec::new(),
            unreadable: false,
        };
        let _ = store.load();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory collection with the content of the backing file.
    ///
    /// Returns the number of loaded records. On error the collection is left
    /// empty: nothing is recovered from a partially valid file.
    pub fn load(&mut self) -> ResultEngine<usize> {
        self.expenses.clear();
        self.unreadable = false;

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{} not found, starting empty", self.path.display());
                return Ok(0);
            }
            Err(err) => {
                tracing::warn!(
                    "cannot read {}, starting empty: {err}",
                    self.path.display()
                );
                self.unreadable = true;
                return Err(EngineError::Storage(err));
            }
        };

        match serde_json::from_str::<Vec<Expense>>(&content) {
            Ok(expenses) => {
                self.expenses = expenses;
                tracing::debug!(
                    "loaded {} expenses from {}",
                    self.expenses.len(),
                    self.path.display()
                );
                Ok(self.expenses.len())
            }
            Err(err) => {
                tracing::warn!(
                    "malformed expenses file {}, starting empty: {err}",
                    self.path.display()
                );
                Err(EngineError::Malformed(err))
            }
        }
    }

    /// Overwrite the backing file with the whole collection.
    pub fn save(&self) -> ResultEngine<()> {
        let content = serde_json::to_string_pretty(&self.expenses).map_err(|err| {
            tracing::error!("cannot encode expenses: {err}");
            EngineError::Serialize(err)
        })?;

        fs::write(&self.path, content).map_err(|err| {
            tracing::error!("cannot write {}: {err}", self.path.display());
            EngineError::Storage(err)
        })
    }

    /// Id the next added record will get: highest id plus one, `1` when empty.
    pub fn next_id(&self) -> u64 {
        self.expenses
            .iter()
            .map(|expense| expense.id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Append a new record and persist the collection.
    ///
    /// Nothing is validated here. If the file cannot be written the record is
    /// dropped again, so memory never holds what the file does not. A file
    /// that could not be read is retried first and never overwritten.
    pub fn add(
        &mut self,
        category: impl Into<String>,
        amount: f64,
        date: Option<String>,
    ) -> ResultEngine<Expense> {
        if self.unreadable {
            self.reload_for_write()?;
        }

        let expense = Expense::new(self.next_id(), category.into(), amount, date);
        self.expenses.push(expense.clone());

        if let Err(err) = self.save() {
            self.expenses.pop();
            return Err(err);
        }

        tracing::info!("added expense {expense}");
        Ok(expense)
    }

    /// Reload from disk, remove every record with `id` and persist.
    ///
    /// Returns how many records were removed; an unknown id removes nothing
    /// and is not an error. A malformed file counts as empty, an unreadable
    /// one fails the delete before anything is written.
    pub fn delete(&mut self, id: u64) -> ResultEngine<usize> {
        self.reload_for_write()?;
        self.remove(id)
    }

    /// Reload before a write. A malformed file is already logged and leaves
    /// the collection empty; any other failure is returned.
    fn reload_for_write(&mut self) -> ResultEngine<()> {
        match self.load() {
            Ok(_) | Err(EngineError::Malformed(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Remove `id` from memory and persist, restoring the collection if the
    /// file cannot be written.
    fn remove(&mut self, id: u64) -> ResultEngine<usize> {
        let before = self.expenses.clone();
        self.expenses.retain(|expense| expense.id != id);
        let removed = before.len() - self.expenses.len();

        if let Err(err) = self.save() {
            self.expenses = before;
            return Err(err);
        }

        if removed == 0 {
            tracing::debug!("no expense with id {id} to delete");
        } else {
            tracing::info!("deleted expense {id}");
        }
        Ok(removed)
    }

    /// Records in insertion order.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Distinct dates, most recent first.
    pub fn dates(&self) -> Vec<String> {
        self.expenses
            .iter()
            .map(|expense| expense.date.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .rev()
            .map(ToString::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("expenses.json"));
        (dir, store)
    }

    #[test]
    fn ids_follow_max_plus_one() {
        let (_dir, mut store) = store();
        assert_eq!(store.next_id(), 1);

        let first = store.add("Food", 1.0, Some("2025-01-01".into())).unwrap();
        let second = store.add("Food", 2.0, Some("2025-01-02".into())).unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        store.delete(1).unwrap();
        let third = store.add("Food", 3.0, None).unwrap();
        assert_eq!(third.id, 3);
    }

    #[test]
    fn deleting_the_maximum_reuses_its_id() {
        let (_dir, mut store) = store();
        store.add("Food", 1.0, None).unwrap();
        store.add("Food", 2.0, None).unwrap();

        store.delete(2).unwrap();
        let again = store.add("Food", 5.0, None).unwrap();
        assert_eq!(again.id, 2);
    }

    #[test]
    fn dates_are_distinct_and_descending() {
        let (_dir, mut store) = store();
        for date in ["2025-01-01", "2025-02-15", "2025-01-20", "2025-02-15"] {
            store.add("Food", 1.0, Some(date.to_string())).unwrap();
        }

        assert_eq!(store.dates(), ["2025-02-15", "2025-01-20", "2025-01-01"]);
    }

    #[test]
    fn malformed_file_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        fs::write(&path, "[{\"expense_id\": 1, \"category\": \"Food\"}]").unwrap();

        let mut store = Store::open(&path);
        assert!(store.expenses().is_empty());
        assert!(matches!(store.load(), Err(EngineError::Malformed(_))));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let (_dir, mut store) = store();
        assert_eq!(store.load().unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn failed_save_rolls_back_add() {
        let (dir, mut store) = store();
        store.add("Food", 1.0, Some("2025-01-01".into())).unwrap();
        let expected = store.expenses().to_vec();

        // The backing path is now a directory, so the write fails.
        store.path = dir.path().to_path_buf();
        let err = store.add("Rent", 2.0, None).unwrap_err();
        assert!(matches!(err, EngineError::Storage(_)));
        assert_eq!(store.expenses(), expected);
    }

    #[test]
    fn failed_save_rolls_back_delete() {
        let (dir, mut store) = store();
        store.add("Food", 1.0, Some("2025-01-01".into())).unwrap();
        store.add("Rent", 2.0, Some("2025-01-02".into())).unwrap();
        let expected = store.expenses().to_vec();

        // Point the store at a directory so the write after removal fails.
        store.path = dir.path().to_path_buf();
        let err = store.remove(1).unwrap_err();
        assert!(matches!(err, EngineError::Storage(_)));
        assert_eq!(store.expenses(), expected);
    }

    #[test]
    fn unreadable_file_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        let bytes = b"[{\"expense_id\": 1, \"category\": \"\xff\", \"amount\": 1.0, \"date\": \"2025-01-01\"}]";
        fs::write(&path, bytes).unwrap();

        let mut store = Store::open(&path);
        assert!(store.expenses().is_empty());

        assert!(matches!(store.delete(1), Err(EngineError::Storage(_))));
        assert!(matches!(
            store.add("Food", 1.0, None),
            Err(EngineError::Storage(_))
        ));
        assert!(store.expenses().is_empty());
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }
}
