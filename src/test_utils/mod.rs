#![allow(missing_docs)]

use axum::{body::Body, http::Response};
use axum_test::TestServer;
use rusqlite::Connection;
use serde::de::DeserializeOwned;

use crate::{AppState, LedgerConfig, build_router, initialize_db};

#[track_caller]
pub(crate) fn must_create_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    initialize_db(&connection).expect("could not initialize test DB");

    connection
}

pub(crate) fn get_test_server(ledger_config: LedgerConfig) -> TestServer {
    let connection =
        Connection::open_in_memory().expect("Could not open database in memory.");
    let state = AppState::new(connection, ledger_config).expect("Could not create app state.");

    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

pub(crate) async fn parse_json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("could not read response body");

    serde_json::from_slice(&body).expect("could not parse response body as JSON")
}
