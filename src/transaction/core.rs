//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{CompanyId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// One entry in a company's ledger: a trade together with the running
/// balance owed after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The business date the transaction applies to.
    ///
    /// This is not the ledger order, see [Transaction::created_at].
    pub date: Date,
    /// The quantity traded in kilograms.
    pub kg: f64,
    /// The price per kilogram.
    pub rate: f64,
    /// The value of the trade.
    ///
    /// Supplied by the client. It is not checked against `kg * rate`.
    pub amount: f64,
    /// Transport charges for the trade.
    pub taxi: f64,
    /// The amount paid in cash against this transaction.
    pub cash: f64,
    /// The running balance for the company after this transaction.
    pub balance: f64,
    /// The company the transaction was made with.
    pub company_id: CompanyId,
    /// When the transaction was recorded. Transactions are ordered by this
    /// field within a company's ledger.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The request body for recording a new transaction.
///
/// There is no balance field: the balance of a new transaction is always
/// calculated from the company's ledger and any value sent by the client is
/// ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTransaction {
    /// The business date of the transaction.
    pub date: Date,
    /// The quantity traded in kilograms.
    #[serde(default)]
    pub kg: f64,
    /// The price per kilogram.
    #[serde(default)]
    pub rate: f64,
    /// The value of the trade.
    pub amount: f64,
    /// Transport charges.
    #[serde(default)]
    pub taxi: f64,
    /// The amount paid in cash.
    #[serde(default)]
    pub cash: f64,
    /// The company the transaction was made with.
    pub company_id: CompanyId,
}

/// The request body for updating a transaction.
///
/// The company of a transaction cannot be changed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionUpdate {
    /// The business date of the transaction.
    pub date: Date,
    /// The quantity traded in kilograms.
    #[serde(default)]
    pub kg: f64,
    /// The price per kilogram.
    #[serde(default)]
    pub rate: f64,
    /// The value of the trade.
    pub amount: f64,
    /// Transport charges.
    #[serde(default)]
    pub taxi: f64,
    /// The amount paid in cash.
    #[serde(default)]
    pub cash: f64,
    /// The balance to store under [BalancePolicy::Snapshot](crate::BalancePolicy::Snapshot).
    ///
    /// `None` keeps the stored balance. Ignored under
    /// [BalancePolicy::Cascade](crate::BalancePolicy::Cascade).
    #[serde(default)]
    pub balance: Option<f64>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns selected by every query that is mapped with [map_transaction_row].
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, date, kg, rate, amount, taxi, cash, balance, company_id, created_at, updated_at";

/// Create the transaction table in the database.
///
/// The reference to the company is not enforced by a foreign key since
/// transactions may outlive their company, see
/// [CompanyDeletePolicy::Orphan](crate::CompanyDeletePolicy::Orphan).
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id BLOB PRIMARY KEY,
                date TEXT NOT NULL,
                kg REAL NOT NULL,
                rate REAL NOT NULL,
                amount REAL NOT NULL,
                taxi REAL NOT NULL,
                cash REAL NOT NULL,
                balance REAL NOT NULL,
                company_id BLOB NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    // Used for finding the previous balance of a company.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_company_created \
        ON transactions(company_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let kg = row.get(2)?;
    let rate = row.get(3)?;
    let amount = row.get(4)?;
    let taxi = row.get(5)?;
    let cash = row.get(6)?;
    let balance = row.get(7)?;
    let company_id = row.get(8)?;
    let created_at = row.get(9)?;
    let updated_at = row.get(10)?;

    Ok(Transaction {
        id,
        date,
        kg,
        rate,
        amount,
        taxi,
        cash,
        balance,
        company_id,
        created_at,
        updated_at,
    })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"
        ))?
        .query_row(params![id], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve every transaction in ledger order, i.e. by creation time.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY created_at ASC, rowid ASC"
        ))?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the number of transactions recorded against a company.
pub fn count_company_transactions(
    company_id: CompanyId,
    connection: &Connection,
) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(*) FROM transactions WHERE company_id = ?1",
            params![company_id],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

type RowsAffected = usize;

/// Delete every transaction recorded against a company.
pub fn delete_company_transactions(
    company_id: CompanyId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM transactions WHERE company_id = ?1",
            params![company_id],
        )
        .map_err(Error::from)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use time::macros::date;
    use uuid::Uuid;

    use crate::{
        Error, LedgerConfig,
        test_utils::must_create_test_connection,
        transaction::{
            NewTransaction, count_company_transactions, create_transaction,
            delete_company_transactions, get_all_transactions, get_transaction,
        },
    };

    fn new_transaction(amount: f64, company_id: Uuid) -> NewTransaction {
        NewTransaction {
            date: date!(2025 - 06 - 15),
            kg: 2.0,
            rate: amount / 2.0,
            amount,
            taxi: 1.5,
            cash: 0.0,
            company_id,
        }
    }

    #[test]
    fn get_returns_created_transaction() {
        let conn = must_create_test_connection();
        let company_id = Uuid::new_v4();
        let created = create_transaction(
            new_transaction(12.5, company_id),
            &LedgerConfig::default(),
            &conn,
        )
        .unwrap();

        let got = get_transaction(created.id, &conn).unwrap();

        assert_eq!(created, got);
        assert_eq!(got.date, date!(2025 - 06 - 15));
        assert_eq!(got.taxi, 1.5);
        assert_eq!(got.company_id, company_id);
    }

    #[test]
    fn get_missing_transaction_is_not_found() {
        let conn = must_create_test_connection();

        assert_eq!(get_transaction(Uuid::new_v4(), &conn), Err(Error::NotFound));
    }

    #[test]
    fn lists_transactions_in_creation_order() {
        let conn = must_create_test_connection();
        let company_id = Uuid::new_v4();
        let config = LedgerConfig::default();
        let mut want_ids = Vec::new();
        for amount in [3.0, 1.0, 2.0] {
            let transaction =
                create_transaction(new_transaction(amount, company_id), &config, &conn).unwrap();
            want_ids.push(transaction.id);
        }

        let got_ids: Vec<Uuid> = get_all_transactions(&conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();

        assert_eq!(want_ids, got_ids);
    }

    #[test]
    fn counts_and_deletes_per_company() {
        let conn = must_create_test_connection();
        let config = LedgerConfig::default();
        let company_id = Uuid::new_v4();
        let other_company_id = Uuid::new_v4();
        for _ in 0..3 {
            create_transaction(new_transaction(1.0, company_id), &config, &conn).unwrap();
        }
        create_transaction(new_transaction(1.0, other_company_id), &config, &conn).unwrap();

        assert_eq!(count_company_transactions(company_id, &conn), Ok(3));
        assert_eq!(delete_company_transactions(company_id, &conn), Ok(3));
        assert_eq!(count_company_transactions(company_id, &conn), Ok(0));
        assert_eq!(count_company_transactions(other_company_id, &conn), Ok(1));
    }
}
