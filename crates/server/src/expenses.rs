//! Expenses API endpoints.

use api_types::{
    Status,
    expense::{AmountInput, ExpenseCreated, ExpenseNew, ExpenseView},
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use chrono::NaiveDate;

use crate::{
    ServerError,
    server::{ServerState, with_engine_mut},
};

pub(crate) fn map_expense(expense: &engine::Expense) -> ExpenseView {
    ExpenseView {
        expense_id: expense.id,
        category: expense.category.clone(),
        amount: expense.amount,
        date: expense.date.clone(),
    }
}

/// Fields of an `ExpenseNew` that passed validation.
#[derive(Debug, PartialEq)]
struct ValidExpense {
    category: String,
    amount: f64,
    date: String,
}

fn invalid(message: &str) -> ServerError {
    ServerError::Validation(message.to_string())
}

/// Check a new expense before it reaches the engine.
///
/// Checks run in a fixed order and the first failure wins: category, amount
/// presence, date presence, amount format, amount sign, date format. A
/// numeric zero counts as a missing amount, the text `"0"` as non-positive.
fn validate(payload: ExpenseNew) -> Result<ValidExpense, ServerError> {
    let category = payload.category.as_deref().map(str::trim).unwrap_or_default();
    if category.is_empty() {
        return Err(invalid("Category is required"));
    }

    let amount = match payload.amount {
        None => return Err(invalid("Amount is required")),
        Some(AmountInput::Number(value)) if value == 0.0 => {
            return Err(invalid("Amount is required"));
        }
        Some(AmountInput::Text(text)) if text.trim().is_empty() => {
            return Err(invalid("Amount is required"));
        }
        Some(amount) => amount,
    };

    let date = payload.date.as_deref().map(str::trim).unwrap_or_default();
    if date.is_empty() {
        return Err(invalid("Date is required"));
    }

    let amount = match amount {
        AmountInput::Number(value) => value,
        AmountInput::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("Invalid amount format"))?,
    };
    if !amount.is_finite() {
        return Err(invalid("Invalid amount format"));
    }
    if amount <= 0.0 {
        return Err(invalid("Amount must be positive"));
    }

    if NaiveDate::parse_from_str(date, engine::DATE_FORMAT).is_err() {
        return Err(invalid("Invalid date format, expected YYYY-MM-DD"));
    }

    Ok(ValidExpense {
        category: category.to_string(),
        amount,
        date: date.to_string(),
    })
}

pub async fn list(State(state): State<ServerState>) -> Json<Vec<ExpenseView>> {
    let engine = state.engine.read().await;
    Json(engine.expenses().iter().map(map_expense).collect())
}

pub async fn add(
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseNew>, JsonRejection>,
) -> Result<Json<ExpenseCreated>, ServerError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!("rejected add_expense body: {rejection}");
        invalid("No data received")
    })?;
    let expense = validate(payload)?;

    let created = with_engine_mut(&state, move |engine| {
        engine.add_expense(&expense.category, expense.amount, Some(expense.date.as_str()))
    })
    .await?;

    Ok(Json(ExpenseCreated {
        status: "Expense added successfully".to_string(),
        expense_id: created.id,
    }))
}

pub async fn delete(
    State(state): State<ServerState>,
    expense_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Status>, ServerError> {
    let Path(expense_id) = expense_id.map_err(|rejection| {
        tracing::debug!("rejected delete_expense id: {rejection}");
        invalid("Invalid expense id")
    })?;
    with_engine_mut(&state, move |engine| engine.delete_expense(expense_id)).await?;

    Ok(Json(Status {
        status: "Expense deleted successfully".to_string(),
    }))
}
