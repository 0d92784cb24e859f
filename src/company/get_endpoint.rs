//! Defines the endpoints for fetching companies.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Company, Error,
    company::core::{get_all_companies, get_company},
    database_id::parse_id,
    db::lock_connection,
};

/// The state needed to fetch companies.
#[derive(Debug, Clone)]
pub struct GetCompanyState {
    /// The database connection for managing companies.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetCompanyState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing every company.
pub async fn list_companies_endpoint(
    State(state): State<GetCompanyState>,
) -> Result<Json<Vec<Company>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_companies(&connection).map(Json)
}

/// A route handler for fetching a single company, responds with 404 if it does not exist.
pub async fn get_company_endpoint(
    State(state): State<GetCompanyState>,
    Path(company_id): Path<String>,
) -> Result<Json<Company>, Error> {
    let company_id = parse_id(&company_id)?;
    let connection = lock_connection(&state.db_connection)?;

    get_company(company_id, &connection).map(Json)
}
