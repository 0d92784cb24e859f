//! The running balance of a company's transactions.
//!
//! A company's ledger is its transactions ordered by `created_at`, with
//! insertion order breaking ties. The date of a transaction plays no part in
//! the ordering. Each transaction stores the balance after it:
//!
//! ```text
//! balance = previous balance + amount - cash
//! ```
//!
//! where the previous balance is zero for the first transaction.
//!
//! Under [BalancePolicy::Snapshot] a stored balance is only correct at the
//! moment it is written. Updating or deleting a transaction does not touch
//! the transactions after it, so their balances go stale. Under
//! [BalancePolicy::Cascade] every later balance is recalculated instead.

use rusqlite::{
    Connection, OptionalExtension, Transaction as SqlTransaction, TransactionBehavior, params,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    BalancePolicy, Error, LedgerConfig,
    company::company_exists,
    database_id::{CompanyId, TransactionId},
    transaction::core::{
        NewTransaction, TRANSACTION_COLUMNS, Transaction, TransactionUpdate, map_transaction_row,
    },
};

/// Where a transaction sits in its company's ledger.
#[derive(Debug, Clone, Copy)]
struct LedgerPosition {
    company_id: CompanyId,
    created_at: OffsetDateTime,
    rowid: i64,
}

fn next_balance(previous_balance: f64, amount: f64, cash: f64) -> f64 {
    previous_balance + amount - cash
}

/// Get the balance of the most recently created transaction for a company.
///
/// A company without transactions has a balance of zero.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails. An empty ledger is not
/// an error.
pub fn previous_balance(company_id: CompanyId, connection: &Connection) -> Result<f64, Error> {
    let balance = connection
        .query_row(
            "SELECT balance FROM transactions WHERE company_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            params![company_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok(balance.unwrap_or(0.0))
}

/// Record a new transaction, carrying forward the company's balance.
///
/// Looking up the previous balance and inserting the new transaction happen
/// in one immediate database transaction, so two transactions created at
/// the same time cannot both build on the same previous balance.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownCompany] if [LedgerConfig::require_known_company] is set
///   and the company does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    config: &LedgerConfig,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let company_id = new_transaction.company_id;

    if config.require_known_company && !company_exists(company_id, &sql_transaction)? {
        return Err(Error::UnknownCompany(company_id));
    }

    let balance = next_balance(
        previous_balance(company_id, &sql_transaction)?,
        new_transaction.amount,
        new_transaction.cash,
    );
    let now = OffsetDateTime::now_utc();

    let transaction = sql_transaction
        .prepare(&format!(
            "INSERT INTO transactions ({TRANSACTION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                Uuid::new_v4(),
                new_transaction.date,
                new_transaction.kg,
                new_transaction.rate,
                new_transaction.amount,
                new_transaction.taxi,
                new_transaction.cash,
                balance,
                company_id,
                now,
                now,
            ],
            map_transaction_row,
        )?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Update the fields of an existing transaction.
///
/// Under [BalancePolicy::Snapshot] the balance is taken from `update` (or
/// left as is) and no other transaction is changed, even though the balances
/// of later transactions for the company were derived from the old values.
/// Under [BalancePolicy::Cascade] the balance in `update` is ignored: the
/// transaction's balance is recalculated from the one before it, followed by
/// every later transaction of the company.
///
/// `updated_at` never moves backwards, even if the system clock does.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    update: TransactionUpdate,
    policy: BalancePolicy,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let position = get_ledger_position(id, &sql_transaction)?;
    let (stored_balance, stored_updated_at): (f64, OffsetDateTime) = sql_transaction.query_row(
        "SELECT balance, updated_at FROM transactions WHERE id = ?1",
        params![id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let balance = match policy {
        BalancePolicy::Snapshot => update.balance.unwrap_or(stored_balance),
        BalancePolicy::Cascade => next_balance(
            balance_before(&position, &sql_transaction)?,
            update.amount,
            update.cash,
        ),
    };
    let updated_at = OffsetDateTime::now_utc().max(stored_updated_at);

    let transaction = sql_transaction
        .prepare(&format!(
            "UPDATE transactions
            SET \
                date = ?1, \
                kg = ?2, \
                rate = ?3, \
                amount = ?4, \
                taxi = ?5, \
                cash = ?6, \
                balance = ?7, \
                updated_at = ?8 \
            WHERE id = ?9
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                update.date,
                update.kg,
                update.rate,
                update.amount,
                update.taxi,
                update.cash,
                balance,
                updated_at,
                id,
            ],
            map_transaction_row,
        )?;

    if policy == BalancePolicy::Cascade {
        let recalculated = recalculate_from(&position, balance, &sql_transaction)?;
        tracing::debug!("Recalculated {recalculated} balances after updating transaction {id}");
    }

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Delete a transaction.
///
/// Under [BalancePolicy::Snapshot] the transactions after it keep balances
/// that include the deleted transaction. Under [BalancePolicy::Cascade] they
/// are recalculated from the balance of the transaction before the deleted
/// one.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction, e.g. it was
///   already deleted,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    policy: BalancePolicy,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let position = get_ledger_position(id, &sql_transaction)?;

    sql_transaction.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;

    if policy == BalancePolicy::Cascade {
        let opening_balance = balance_before(&position, &sql_transaction)?;
        let recalculated = recalculate_from(&position, opening_balance, &sql_transaction)?;
        tracing::debug!("Recalculated {recalculated} balances after deleting transaction {id}");
    }

    sql_transaction.commit()?;

    Ok(())
}

fn get_ledger_position(id: TransactionId, connection: &Connection) -> Result<LedgerPosition, Error> {
    connection
        .query_row(
            "SELECT company_id, created_at, rowid FROM transactions WHERE id = ?1",
            params![id],
            |row| {
                Ok(LedgerPosition {
                    company_id: row.get(0)?,
                    created_at: row.get(1)?,
                    rowid: row.get(2)?,
                })
            },
        )
        .map_err(Error::from)
}

/// The balance of the transaction immediately before `position` in its
/// company's ledger, or zero if there is none.
fn balance_before(position: &LedgerPosition, connection: &Connection) -> Result<f64, Error> {
    let balance = connection
        .query_row(
            "SELECT balance FROM transactions
             WHERE company_id = ?1 AND (created_at < ?2 OR (created_at = ?2 AND rowid < ?3))
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            params![position.company_id, position.created_at, position.rowid],
            |row| row.get(0),
        )
        .optional()?;

    Ok(balance.unwrap_or(0.0))
}

/// Rewrite the balance of every transaction after `position` in its
/// company's ledger, starting from `opening_balance`.
///
/// Returns the number of transactions that were rewritten.
fn recalculate_from(
    position: &LedgerPosition,
    opening_balance: f64,
    connection: &Connection,
) -> Result<usize, Error> {
    let later_entries: Vec<(i64, f64, f64)> = connection
        .prepare(
            "SELECT rowid, amount, cash FROM transactions
             WHERE company_id = ?1 AND (created_at > ?2 OR (created_at = ?2 AND rowid > ?3))
             ORDER BY created_at ASC, rowid ASC",
        )?
        .query_map(
            params![position.company_id, position.created_at, position.rowid],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?
        .collect::<Result<_, _>>()?;

    let mut update_balance =
        connection.prepare("UPDATE transactions SET balance = ?1 WHERE rowid = ?2")?;
    let mut balance = opening_balance;

    for (rowid, amount, cash) in &later_entries {
        balance = next_balance(balance, *amount, *cash);
        update_balance.execute(params![balance, rowid])?;
    }

    Ok(later_entries.len())
}
