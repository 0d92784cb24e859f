//! Defines the company model and its database queries.

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CompanyDeletePolicy, Error,
    database_id::CompanyId,
    transaction::{count_company_transactions, delete_company_transactions},
};

/// A counterparty that transactions are recorded against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// The ID of the company.
    pub id: CompanyId,
    /// The display name of the company.
    pub name: String,
    /// A URL or other reference to an image of the company, e.g. a logo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The request body for creating or updating a company.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyForm {
    /// The display name of the company.
    pub name: String,
    /// An optional image reference.
    #[serde(default)]
    pub image: Option<String>,
}

pub fn create_company_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS companies (
            id BLOB PRIMARY KEY,
            name TEXT NOT NULL,
            image_url TEXT
        )",
        (),
    )?;

    Ok(())
}

pub fn map_company_row(row: &Row) -> Result<Company, rusqlite::Error> {
    let id = row.get(0)?;
    let name = row.get(1)?;
    let image = row.get(2)?;

    Ok(Company { id, name, image })
}

/// Insert a new company with a freshly generated ID.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn create_company(form: &CompanyForm, connection: &Connection) -> Result<Company, Error> {
    let company = connection
        .prepare(
            "INSERT INTO companies (id, name, image_url) VALUES (?1, ?2, ?3)
             RETURNING id, name, image_url",
        )?
        .query_row(
            params![Uuid::new_v4(), form.name, form.image],
            map_company_row,
        )?;

    Ok(company)
}

/// Retrieve a company by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a company,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_company(id: CompanyId, connection: &Connection) -> Result<Company, Error> {
    connection
        .query_row(
            "SELECT id, name, image_url FROM companies WHERE id = ?1",
            params![id],
            map_company_row,
        )
        .map_err(Error::from)
}

/// Retrieve all companies, ordered by name.
pub fn get_all_companies(connection: &Connection) -> Result<Vec<Company>, Error> {
    connection
        .prepare("SELECT id, name, image_url FROM companies ORDER BY name ASC, rowid ASC")?
        .query_map([], map_company_row)?
        .map(|maybe_company| maybe_company.map_err(Error::from))
        .collect()
}

pub fn company_exists(id: CompanyId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Overwrite the name and image of the company `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a company,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_company(
    id: CompanyId,
    form: &CompanyForm,
    connection: &Connection,
) -> Result<Company, Error> {
    connection
        .prepare(
            "UPDATE companies SET name = ?1, image_url = ?2 WHERE id = ?3
             RETURNING id, name, image_url",
        )?
        .query_row(params![form.name, form.image, id], map_company_row)
        .map_err(Error::from)
}

/// Delete the company `id`, handling its transactions according to `policy`.
///
/// The check for transactions and the delete happen in one database
/// transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a company,
/// - [Error::CompanyHasTransactions] if `policy` is [CompanyDeletePolicy::Restrict]
///   and the company has transactions,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_company(
    id: CompanyId,
    policy: CompanyDeletePolicy,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let rows_affected =
        sql_transaction.execute("DELETE FROM companies WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    match policy {
        CompanyDeletePolicy::Orphan => {}
        CompanyDeletePolicy::Restrict => {
            if count_company_transactions(id, &sql_transaction)? > 0 {
                return Err(Error::CompanyHasTransactions(id));
            }
        }
        CompanyDeletePolicy::Cascade => {
            let deleted = delete_company_transactions(id, &sql_transaction)?;
            tracing::debug!("Deleted {deleted} transactions along with company {id}");
        }
    }

    sql_transaction.commit()?;

    Ok(())
}
