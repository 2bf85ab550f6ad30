//! Grouped sums over a collection of expenses.
//!
//! Every function here is a pure fold over a slice; the views are computed
//! independently, so one record counts towards each view it matches.
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::Expense;

/// Totals keyed by label, kept in order of first occurrence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Totals {
    entries: Vec<(String, f64)>,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `key`, appending the key if it is new.
    pub fn add(&mut self, key: &str, amount: f64) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, total)) => *total += amount,
            None => self.entries.push((key.to_string(), amount)),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find_map(|(k, total)| (k == key).then_some(*total))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, total)| (k.as_str(), *total))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every key's total.
    pub fn grand_total(&self) -> f64 {
        self.entries.iter().map(|(_, total)| total).sum()
    }
}

impl IntoIterator for Totals {
    type Item = (String, f64);
    type IntoIter = std::vec::IntoIter<(String, f64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Spending of one calendar month.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthSummary {
    /// Human readable month, e.g. `March 2025`.
    pub label: String,
    pub year: i32,
    /// 1 to 12.
    pub month: u32,
    pub total: f64,
    pub categories: Totals,
}

impl MonthSummary {
    fn empty(year: i32, month: u32) -> Self {
        Self {
            label: month_label(year, month),
            year,
            month,
            total: 0.0,
            categories: Totals::new(),
        }
    }
}

/// Raw view of the collection grouped by month (`YYYY-MM`) and by day.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugSnapshot {
    pub total_expenses: usize,
    pub by_month: BTreeMap<String, Vec<Expense>>,
    pub by_date: BTreeMap<String, Vec<Expense>>,
    pub expenses: Vec<Expense>,
}

pub fn sum_by_category(expenses: &[Expense]) -> Totals {
    expenses.iter().fold(Totals::new(), |mut totals, expense| {
        totals.add(&expense.category, expense.amount);
        totals
    })
}

/// Totals per date, ascending by date.
pub fn sum_by_date(expenses: &[Expense]) -> BTreeMap<String, f64> {
    expenses.iter().fold(BTreeMap::new(), |mut totals, expense| {
        *totals.entry(expense.date.clone()).or_insert(0.0) += expense.amount;
        totals
    })
}

/// Like [`sum_by_category`], restricted to records dated exactly `date`.
pub fn sum_by_category_for_date(expenses: &[Expense], date: &str) -> Totals {
    expenses
        .iter()
        .filter(|expense| expense.date == date)
        .fold(Totals::new(), |mut totals, expense| {
            totals.add(&expense.category, expense.amount);
            totals
        })
}

/// One summary per calendar month, starting at the month of `reference` and
/// walking back `month_count` months.
///
/// The result always has `month_count` entries, most recent first; months
/// without records have a zero total. Records with an unparsable date are
/// skipped.
pub fn monthly_breakdown(
    expenses: &[Expense],
    reference: NaiveDate,
    month_count: u32,
) -> Vec<MonthSummary> {
    let mut months = Vec::with_capacity(month_count as usize);
    let (mut year, mut month) = (reference.year(), reference.month());
    for _ in 0..month_count {
        months.push(MonthSummary::empty(year, month));
        (year, month) = previous_month(year, month);
    }

    for expense in expenses {
        let Some(date) = expense.naive_date() else {
            tracing::debug!("skipping expense {} with invalid date", expense.id);
            continue;
        };
        if let Some(summary) = months
            .iter_mut()
            .find(|m| m.year == date.year() && m.month == date.month())
        {
            summary.total += expense.amount;
            summary.categories.add(&expense.category, expense.amount);
        }
    }

    months
}

pub fn debug_snapshot(expenses: &[Expense]) -> DebugSnapshot {
    let mut snapshot = DebugSnapshot {
        total_expenses: expenses.len(),
        expenses: expenses.to_vec(),
        ..Default::default()
    };

    for expense in expenses.iter().filter(|e| !e.date.is_empty()) {
        let month = expense.date.get(..7).unwrap_or(&expense.date);
        snapshot
            .by_month
            .entry(month.to_string())
            .or_default()
            .push(expense.clone());
        snapshot
            .by_date
            .entry(expense.date.clone())
            .or_default()
            .push(expense.clone());
    }

    snapshot
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(id: u64, category: &str, amount: f64, date: &str) -> Expense {
        Expense::new(id, category.to_string(), amount, Some(date.to_string()))
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense(1, "Food", 12.5, "2025-01-10"),
            expense(2, "Food", 7.5, "2025-01-11"),
            expense(3, "Rent", 800.0, "2024-12-01"),
            expense(4, "Travel", 120.25, "2024-11-30"),
            expense(5, "Food", 4.0, "2024-10-02"),
            expense(6, "Misc", 9.0, "not a date"),
        ]
    }

    #[test]
    fn category_totals_keep_first_occurrence_order() {
        let totals = sum_by_category(&sample());
        let keys: Vec<_> = totals.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["Food", "Rent", "Travel", "Misc"]);
        assert_eq!(totals.get("Food"), Some(24.0));
    }

    #[test]
    fn food_example() {
        let expenses = &sample()[..2];
        let by_category = sum_by_category(expenses);
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category.get("Food"), Some(20.0));

        let by_date = sum_by_date(expenses);
        assert_eq!(
            by_date.into_iter().collect::<Vec<_>>(),
            [
                ("2025-01-10".to_string(), 12.5),
                ("2025-01-11".to_string(), 7.5)
            ]
        );
    }

    #[test]
    fn folds_agree_on_grand_total() {
        let expenses = sample();
        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        let by_category = sum_by_category(&expenses).grand_total();
        let by_date: f64 = sum_by_date(&expenses).values().sum();

        assert!((by_category - total).abs() < 1e-9);
        assert!((by_date - total).abs() < 1e-9);
    }

    #[test]
    fn date_filter_matches_exactly() {
        let expenses = sample();
        let totals = sum_by_category_for_date(&expenses, "2025-01-10");
        assert_eq!(totals.iter().collect::<Vec<_>>(), [("Food", 12.5)]);

        assert!(sum_by_category_for_date(&expenses, "2025-01").is_empty());
    }

    #[test]
    fn monthly_breakdown_rolls_over_the_year() {
        let reference = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let months = monthly_breakdown(&sample(), reference, 3);

        let labels: Vec<_> = months.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, ["January 2025", "December 2024", "November 2024"]);
        assert_eq!(
            months.iter().map(|m| (m.year, m.month)).collect::<Vec<_>>(),
            [(2025, 1), (2024, 12), (2024, 11)]
        );
        assert_eq!(months[0].total, 20.0);
        assert_eq!(months[1].categories.get("Rent"), Some(800.0));
        assert_eq!(months[2].total, 120.25);
    }

    #[test]
    fn monthly_breakdown_keeps_empty_months() {
        let reference = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap();
        let months = monthly_breakdown(&sample(), reference, 3);

        assert_eq!(months.len(), 3);
        assert!(months.iter().all(|m| m.total == 0.0 && m.categories.is_empty()));
    }

    #[test]
    fn monthly_breakdown_honours_month_count() {
        let reference = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let months = monthly_breakdown(&sample(), reference, 4);
        assert_eq!(months.len(), 4);
        assert_eq!(months[3].label, "October 2024");
        assert_eq!(months[3].total, 4.0);

        assert!(monthly_breakdown(&sample(), reference, 0).is_empty());
    }

    #[test]
    fn debug_snapshot_groups_by_month_and_date() {
        let mut expenses = sample();
        expenses.push(Expense {
            id: 7,
            category: "Food".to_string(),
            amount: 1.0,
            date: String::new(),
        });

        let snapshot = debug_snapshot(&expenses);
        assert_eq!(snapshot.total_expenses, 7);
        assert_eq!(snapshot.by_month["2025-01"].len(), 2);
        assert_eq!(snapshot.by_date["2024-12-01"][0].id, 3);
        assert!(snapshot.by_month.contains_key("not a d"));
        assert!(!snapshot.by_date.contains_key(""));
        assert_eq!(snapshot.expenses.len(), 7);
    }
}
