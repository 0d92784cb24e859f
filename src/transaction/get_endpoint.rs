use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, Transaction,
    database_id::parse_id,
    db::lock_connection,
    transaction::core::{get_all_transactions, get_transaction},
};

/// The state needed to fetch transactions.
#[derive(Debug, Clone)]
pub struct GetTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing every transaction in ledger order.
pub async fn list_transactions_endpoint(
    State(state): State<GetTransactionState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_transactions(&connection).map(Json)
}

/// A route handler for getting a transaction by its ID.
///
/// This function will return the status code 404 if the requested resource does not exist.
pub async fn get_transaction_endpoint(
    State(state): State<GetTransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Transaction>, Error> {
    let transaction_id = parse_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(transaction_id, &connection).map(Json)
}
