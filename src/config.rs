//! Settings that control how the ledger treats edits and deletes.

use clap::ValueEnum;

/// How stored balances react to an existing transaction being updated or
/// deleted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BalancePolicy {
    /// Balances are snapshots taken when a transaction is created.
    ///
    /// Updates write the balance supplied by the client and deletes leave
    /// later transactions alone, so later balances can go stale.
    #[default]
    Snapshot,
    /// Updates and deletes recalculate the balance of every later
    /// transaction for the same company.
    Cascade,
}

/// What happens to a company's transactions when the company is deleted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompanyDeletePolicy {
    /// Delete the company and leave its transactions pointing at a missing
    /// company.
    #[default]
    Orphan,
    /// Refuse to delete a company that has transactions.
    Restrict,
    /// Delete the company's transactions along with the company.
    Cascade,
}

/// Ledger behaviour shared by the request handlers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// See [BalancePolicy].
    pub balance_policy: BalancePolicy,
    /// See [CompanyDeletePolicy].
    pub company_delete_policy: CompanyDeletePolicy,
    /// Reject transactions whose company ID does not refer to a company.
    ///
    /// When unset, a transaction for an unknown company starts a fresh
    /// ledger with a zero opening balance.
    pub require_known_company: bool,
}
