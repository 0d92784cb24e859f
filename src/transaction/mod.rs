//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the request bodies for creating and updating transactions
//! - The ledger functions that calculate running balances
//! - Route handlers for the transaction API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod ledger;

pub use self::core::{
    NewTransaction, Transaction, TransactionUpdate, count_company_transactions,
    create_transaction_table, delete_company_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::{get_transaction_endpoint, list_transactions_endpoint};

#[cfg(test)]
pub use self::core::{get_all_transactions, get_transaction};
#[cfg(test)]
pub use ledger::create_transaction;
