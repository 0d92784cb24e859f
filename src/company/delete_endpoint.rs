//! Defines the endpoint for deleting a company.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, CompanyDeletePolicy, Error, company::core::delete_company, database_id::parse_id,
    db::lock_connection,
};

/// The state needed to delete a company.
#[derive(Debug, Clone)]
pub struct DeleteCompanyState {
    /// The database connection for managing companies.
    db_connection: Arc<Mutex<Connection>>,
    /// What to do with the company's transactions.
    delete_policy: CompanyDeletePolicy,
}

impl FromRef<AppState> for DeleteCompanyState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            delete_policy: state.ledger_config.company_delete_policy,
        }
    }
}

/// A route handler for deleting a company, responds with a confirmation message.
pub async fn delete_company_endpoint(
    State(state): State<DeleteCompanyState>,
    Path(company_id): Path<String>,
) -> Result<Json<Value>, Error> {
    let company_id = parse_id(&company_id)?;
    let connection = lock_connection(&state.db_connection)?;

    delete_company(company_id, state.delete_policy, &connection)?;
    tracing::info!(
        "Deleted company {company_id} with policy {:?}",
        state.delete_policy
    );

    Ok(Json(json!({
        "message": format!("Company with ID {company_id} deleted successfully")
    })))
}
