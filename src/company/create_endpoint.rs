//! Defines the endpoint for creating a new company.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    company::core::{CompanyForm, create_company},
    db::lock_connection,
    endpoints::{self, format_endpoint},
};

/// The state needed to create a company.
#[derive(Debug, Clone)]
pub struct CreateCompanyState {
    /// The database connection for managing companies.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCompanyState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new company, responds with the created company.
pub async fn create_company_endpoint(
    State(state): State<CreateCompanyState>,
    body: Result<Json<CompanyForm>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(form) = body?;
    let connection = lock_connection(&state.db_connection)?;

    let company = create_company(&form, &connection).inspect_err(|error| {
        tracing::error!("Could not create company with {form:?}: {error}");
    })?;
    tracing::info!("Created company {}", company.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format_endpoint(endpoints::COMPANY, company.id))],
        Json(company),
    ))
}
