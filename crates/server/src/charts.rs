//! Chart API endpoints

use std::collections::BTreeMap;

use api_types::{
    OrderedMap,
    chart::{ChartData, DebugExpenses, MonthExpenses, MonthlyExpenses},
    expense::ExpenseView,
};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{expenses::map_expense, server::ServerState};

/// Path segment selecting the unfiltered category chart.
const ALL_DATES: &str = "all";

fn map_totals(totals: engine::Totals) -> OrderedMap<f64> {
    totals.into_iter().collect()
}

fn map_month(month: engine::MonthSummary) -> (String, MonthExpenses) {
    (
        month.label,
        MonthExpenses {
            total: month.total,
            categories: map_totals(month.categories),
            year: month.year,
            month: month.month,
        },
    )
}

fn map_groups(groups: BTreeMap<String, Vec<engine::Expense>>) -> BTreeMap<String, Vec<ExpenseView>> {
    groups
        .into_iter()
        .map(|(key, expenses)| (key, expenses.iter().map(map_expense).collect()))
        .collect()
}

/// Category totals for every expense (`all`) or for a single day.
pub async fn chart_data(
    State(state): State<ServerState>,
    Path(date): Path<String>,
) -> Json<ChartData> {
    let engine = state.engine.read().await;
    let totals = if date == ALL_DATES {
        engine.sum_by_category()
    } else {
        engine.sum_by_category_for_date(&date)
    };

    Json(ChartData {
        expenses_by_category: map_totals(totals),
        all_dates: engine.dates(),
        selected_date: date,
    })
}

/// Totals per day, oldest first.
pub async fn by_date(State(state): State<ServerState>) -> Json<BTreeMap<String, f64>> {
    Json(state.engine.read().await.sum_by_date())
}

/// Current month and the two before it, most recent first.
pub async fn previous_months(State(state): State<ServerState>) -> Json<MonthlyExpenses> {
    let months = state.engine.read().await.previous_months();
    Json(months.into_iter().map(map_month).collect())
}

pub async fn debug(State(state): State<ServerState>) -> Json<DebugExpenses> {
    let snapshot = state.engine.read().await.debug_snapshot();

    Json(DebugExpenses {
        total_expenses: snapshot.total_expenses,
        expenses_by_month: map_groups(snapshot.by_month),
        expenses_by_date: map_groups(snapshot.by_date),
        all_expenses: snapshot.expenses.iter().map(map_expense).collect(),
    })
}
