use std::{collections::BTreeMap, fmt, marker::PhantomData};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

/// JSON object that keeps the order of its keys.
///
/// Category totals are listed in order of first occurrence and monthly
/// summaries most recent first; a plain map would sort them.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find_map(|(k, v)| (k == key).then_some(v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(entry) = access.next_entry()? {
            entries.push(entry);
        }
        Ok(OrderedMap(entries))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// Plain `{"status": ...}` body used by the mutating endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Status {
    pub status: String,
}

pub mod expense {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub expense_id: u64,
        pub category: String,
        pub amount: f64,
        pub date: String,
    }

    /// Amount as sent by a form: either a JSON number or its text.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum AmountInput {
        Number(f64),
        Text(String),
    }

    /// Request body of `POST /add_expense`.
    ///
    /// Every field is optional here so that a missing one is reported by
    /// name instead of as a generic decoding failure.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub category: Option<String>,
        pub amount: Option<AmountInput>,
        pub date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub status: String,
        pub expense_id: u64,
    }
}

pub mod chart {
    use super::*;
    use crate::expense::ExpenseView;

    /// Response of `GET /get_chart_data/{date}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChartData {
        pub expenses_by_category: OrderedMap<f64>,
        /// Most recent first.
        pub all_dates: Vec<String>,
        /// `all` or the requested date.
        pub selected_date: String,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthExpenses {
        pub total: f64,
        pub categories: OrderedMap<f64>,
        pub year: i32,
        pub month: u32,
    }

    /// Month label (`March 2025`) to its summary, most recent first.
    pub type MonthlyExpenses = OrderedMap<MonthExpenses>;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebugExpenses {
        pub total_expenses: usize,
        pub expenses_by_month: BTreeMap<String, Vec<ExpenseView>>,
        pub expenses_by_date: BTreeMap<String, Vec<ExpenseView>>,
        pub all_expenses: Vec<ExpenseView>,
    }
}
