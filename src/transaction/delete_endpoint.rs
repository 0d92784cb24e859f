use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, BalancePolicy, Error, database_id::parse_id, db::lock_connection,
    transaction::ledger::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// Whether later balances are recalculated.
    balance_policy: BalancePolicy,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            balance_policy: state.ledger_config.balance_policy,
        }
    }
}

/// A route handler for deleting a transaction, responds with a confirmation message.
///
/// Responds with 404 if the transaction does not exist, e.g. it was already deleted.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Value>, Error> {
    let transaction_id = parse_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(transaction_id, state.balance_policy, &connection)?;
    tracing::info!(
        "Deleted transaction {transaction_id} with policy {:?}",
        state.balance_policy
    );

    Ok(Json(json!({
        "message": format!("Transaction with ID {transaction_id} deleted successfully")
    })))
}
