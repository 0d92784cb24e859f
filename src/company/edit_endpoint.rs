//! Defines the endpoint for updating a company.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Company, Error,
    company::core::{CompanyForm, update_company},
    database_id::parse_id,
    db::lock_connection,
};

/// The state needed to edit a company.
#[derive(Debug, Clone)]
pub struct EditCompanyState {
    /// The database connection for managing companies.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCompanyState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for replacing the name and image of a company.
///
/// Responds with the updated company, or 404 if the company does not exist.
pub async fn edit_company_endpoint(
    State(state): State<EditCompanyState>,
    Path(company_id): Path<String>,
    body: Result<Json<CompanyForm>, JsonRejection>,
) -> Result<Json<Company>, Error> {
    let company_id = parse_id(&company_id)?;
    let Json(form) = body?;
    let connection = lock_connection(&state.db_connection)?;

    let company = update_company(company_id, &form, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Could not update company {company_id}: {error}");
        }
    })?;

    Ok(Json(company))
}
