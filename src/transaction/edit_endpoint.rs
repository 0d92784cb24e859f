use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, BalancePolicy, Error, Transaction,
    database_id::parse_id,
    db::lock_connection,
    transaction::{core::TransactionUpdate, ledger::update_transaction},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Whether later balances are recalculated.
    pub balance_policy: BalancePolicy,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            balance_policy: state.ledger_config.balance_policy,
        }
    }
}

/// A route handler for updating a transaction, responds with the updated transaction.
///
/// See [BalancePolicy] for how the balances of later transactions are handled.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<String>,
    body: Result<Json<TransactionUpdate>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let transaction_id = parse_id(&transaction_id)?;
    let Json(update) = body?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction =
        update_transaction(transaction_id, update, state.balance_policy, &connection)?;
    tracing::info!(
        "Updated transaction {transaction_id} with policy {:?}",
        state.balance_policy
    );

    Ok(Json(transaction))
}
