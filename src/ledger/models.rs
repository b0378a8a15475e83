//! Ledger data model
//!
//! String forms of the enums match the values stored in PostgreSQL
//! (`transactions.type`, `transactions.status`, `ledger_entries.direction`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::validation::ReferenceId;
use crate::core_types::{EntryId, TransactionId, WalletId};

/// Logical operation a transaction records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Transfer,
    TopUp,
    Bonus,
    Spend,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Transfer => "transfer",
            TransactionType::TopUp => "topup",
            TransactionType::Bonus => "bonus",
            TransactionType::Spend => "spend",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transfer" => Ok(TransactionType::Transfer),
            "topup" => Ok(TransactionType::TopUp),
            "bonus" => Ok(TransactionType::Bonus),
            "spend" => Ok(TransactionType::Spend),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

/// Transaction status
///
/// Only terminal-success rows are ever written; a failed attempt leaves no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(TransactionStatus::Completed),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// Side of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }

    /// Signed effect of an entry of `amount` on the wallet balance
    #[inline]
    pub fn signed(&self, amount: i64) -> i64 {
        match self {
            Direction::Debit => -amount,
            Direction::Credit => amount,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Direction::Debit),
            "credit" => Ok(Direction::Credit),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// Committed transfer record, unique per `reference_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub reference_id: ReferenceId,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// New completed transaction stamped with the current time
    pub fn completed(reference_id: ReferenceId, tx_type: TransactionType) -> Self {
        Self {
            id: TransactionId::new_v4(),
            reference_id,
            tx_type,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }
}

/// One half of a double-entry record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub transaction_id: TransactionId,
    pub wallet_id: WalletId,
    pub direction: Direction,
    /// Always positive
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Debit and credit entries for one transaction
    pub fn pair(
        transaction_id: TransactionId,
        debit_wallet: WalletId,
        credit_wallet: WalletId,
        amount: i64,
    ) -> [LedgerEntry; 2] {
        let now = Utc::now();
        [
            LedgerEntry {
                id: EntryId::new_v4(),
                transaction_id,
                wallet_id: debit_wallet,
                direction: Direction::Debit,
                amount,
                created_at: now,
            },
            LedgerEntry {
                id: EntryId::new_v4(),
                transaction_id,
                wallet_id: credit_wallet,
                direction: Direction::Credit,
                amount,
                created_at: now,
            },
        ]
    }
}
