//! Application router configuration.

use axum::{Router, routing::get};

use crate::{
    AppState,
    company::{
        create_company_endpoint, delete_company_endpoint, edit_company_endpoint,
        get_company_endpoint, list_companies_endpoint,
    },
    endpoints,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::COMPANIES,
            get(list_companies_endpoint).post(create_company_endpoint),
        )
        .route(
            endpoints::COMPANY,
            get(get_company_endpoint)
                .put(edit_company_endpoint)
                .delete(delete_company_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}


#[cfg(test)]
mod transaction_route_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use uuid::Uuid;

    use crate::{
        BalancePolicy, Company, LedgerConfig, Transaction,
        endpoints::{self, format_endpoint},
        test_utils::get_test_server,
    };

    async fn create_company(server: &TestServer) -> Company {
        server
            .post(endpoints::COMPANIES)
            .json(&json!({ "name": "Dawn Pineapples" }))
            .await
            .json()
    }

    async fn create_transaction(
        server: &TestServer,
        company_id: Uuid,
        amount: f64,
        cash: f64,
    ) -> Transaction {
        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "date": "2025-08-20",
                "kg": 12.5,
                "rate": 8.0,
                "amount": amount,
                "taxi": 2.0,
                "cash": cash,
                "company_id": company_id,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json()
    }

    #[tokio::test]
    async fn balance_carries_forward_across_requests() {
        let server = get_test_server(LedgerConfig::default());
        let company = create_company(&server).await;

        let first = create_transaction(&server, company.id, 100.0, 30.0).await;
        let second = create_transaction(&server, company.id, 50.0, 20.0).await;

        assert_eq!(first.balance, 70.0);
        assert_eq!(second.balance, 100.0);
    }

    #[tokio::test]
    async fn client_supplied_balance_is_ignored_on_create() {
        let server = get_test_server(LedgerConfig::default());

        let transaction: Transaction = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "date": "2025-08-20",
                "amount": 100.0,
                "cash": 30.0,
                "balance": 1_000_000.0,
                "company_id": Uuid::new_v4(),
            }))
            .await
            .json();

        assert_eq!(transaction.balance, 70.0);
    }

    #[tokio::test]
    async fn never_seen_company_starts_from_zero() {
        let server = get_test_server(LedgerConfig::default());

        let transaction = create_transaction(&server, Uuid::new_v4(), 100.0, 30.0).await;

        assert_eq!(transaction.balance, 70.0);
    }

    #[tokio::test]
    async fn never_seen_company_is_rejected_when_required() {
        let server = get_test_server(LedgerConfig {
            require_known_company: true,
            ..Default::default()
        });

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "date": "2025-08-20",
                "amount": 100.0,
                "company_id": Uuid::new_v4(),
            }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn create_then_fetch_is_identical() {
        let server = get_test_server(LedgerConfig::default());
        let company = create_company(&server).await;
        let created = create_transaction(&server, company.id, 100.0, 30.0).await;

        let fetched: Transaction = server
            .get(&format_endpoint(endpoints::TRANSACTION, created.id))
            .await
            .json();
        let listed: Vec<Transaction> = server.get(endpoints::TRANSACTIONS).await.json();

        assert_eq!(created, fetched);
        assert_eq!(listed, vec![fetched]);
    }

    #[tokio::test]
    async fn unknown_transaction_is_not_found() {
        let server = get_test_server(LedgerConfig::default());

        server
            .get(&format_endpoint(endpoints::TRANSACTION, Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn update_does_not_change_other_balances_by_default() {
        let server = get_test_server(LedgerConfig::default());
        let company = create_company(&server).await;
        let first = create_transaction(&server, company.id, 100.0, 30.0).await;
        let second = create_transaction(&server, company.id, 50.0, 20.0).await;

        let updated: Transaction = server
            .put(&format_endpoint(endpoints::TRANSACTION, first.id))
            .json(&json!({
                "date": "2025-08-21",
                "amount": 500.0,
                "cash": 0.0,
                "balance": 500.0,
            }))
            .await
            .json();
        let second_after: Transaction = server
            .get(&format_endpoint(endpoints::TRANSACTION, second.id))
            .await
            .json();

        assert_eq!(updated.balance, 500.0);
        assert!(updated.updated_at >= first.updated_at);
        assert_eq!(second_after.balance, second.balance);
    }

    #[tokio::test]
    async fn cascade_update_recalculates_later_balances() {
        let server = get_test_server(LedgerConfig {
            balance_policy: BalancePolicy::Cascade,
            ..Default::default()
        });
        let company = create_company(&server).await;
        let first = create_transaction(&server, company.id, 100.0, 30.0).await;
        let second = create_transaction(&server, company.id, 50.0, 20.0).await;

        server
            .put(&format_endpoint(endpoints::TRANSACTION, first.id))
            .json(&json!({
                "date": "2025-08-20",
                "amount": 200.0,
                "cash": 30.0,
            }))
            .await
            .assert_status_ok();
        let second_after: Transaction = server
            .get(&format_endpoint(endpoints::TRANSACTION, second.id))
            .await
            .json();

        assert_eq!(second_after.balance, 200.0);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let server = get_test_server(LedgerConfig::default());
        let transaction = create_transaction(&server, Uuid::new_v4(), 1.0, 0.0).await;
        let path = format_endpoint(endpoints::TRANSACTION, transaction.id);

        server.delete(&path).await.assert_status_ok();
        server.delete(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let server = get_test_server(LedgerConfig::default());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "date": "yesterday", "amount": "lots" }))
            .await;

        response.assert_status_bad_request();
    }
}
