//! Defines the endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, LedgerConfig,
    db::lock_connection,
    endpoints::{self, format_endpoint},
    transaction::{core::NewTransaction, ledger::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Controls whether the company must exist.
    pub ledger_config: LedgerConfig,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            ledger_config: state.ledger_config,
        }
    }
}

/// A route handler for recording a new transaction.
///
/// The balance of the transaction is calculated from the company's ledger.
/// Responds with the created transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    body: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(new_transaction) = body?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(new_transaction, &state.ledger_config, &connection)?;
    tracing::info!(
        "Created transaction {} for company {} with balance {}",
        transaction.id,
        transaction.company_id,
        transaction.balance
    );

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format_endpoint(endpoints::TRANSACTION, transaction.id))],
        Json(transaction),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
    use time::macros::date;
    use uuid::Uuid;

    use crate::{
        LedgerConfig, Transaction,
        test_utils::{must_create_test_connection, parse_json_body},
        transaction::{
            core::NewTransaction, create_endpoint::CreateTransactionState,
            create_transaction_endpoint, get_transaction,
        },
    };

    fn get_test_state(ledger_config: LedgerConfig) -> CreateTransactionState {
        CreateTransactionState {
            db_connection: Arc::new(Mutex::new(must_create_test_connection())),
            ledger_config,
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_test_state(LedgerConfig::default());
        let new_transaction = NewTransaction {
            date: date!(2025 - 07 - 04),
            kg: 20.0,
            rate: 5.0,
            amount: 100.0,
            taxi: 3.0,
            cash: 30.0,
            company_id: Uuid::new_v4(),
        };

        let response =
            create_transaction_endpoint(State(state.clone()), Ok(Json(new_transaction.clone())))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let transaction: Transaction = parse_json_body(response).await;
        assert_eq!(transaction.balance, 70.0);
        assert_eq!(transaction.amount, new_transaction.amount);
        assert_eq!(transaction.company_id, new_transaction.company_id);
        assert_eq!(
            get_transaction(transaction.id, &state.db_connection.lock().unwrap()),
            Ok(transaction)
        );
    }

    #[tokio::test]
    async fn unknown_company_is_rejected_when_required() {
        let state = get_test_state(LedgerConfig {
            require_known_company: true,
            ..Default::default()
        });
        let new_transaction = NewTransaction {
            date: date!(2025 - 07 - 04),
            kg: 0.0,
            rate: 0.0,
            amount: 1.0,
            taxi: 0.0,
            cash: 0.0,
            company_id: Uuid::new_v4(),
        };

        let response = create_transaction_endpoint(State(state), Ok(Json(new_transaction)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
