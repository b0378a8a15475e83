//! Core types used throughout the system
//!
//! Identifiers for the ledger's rows. Wallets, users, transactions and
//! entries are UUID-keyed; assets use the small integer key assigned by the
//! `assets` table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wallet ID - opaque, globally unique, immutable after provisioning.
///
/// # Ordering
/// `Ord` follows the byte order of the UUID, which is the same order as the
/// lexicographic order of its canonical lower-case string form. The transfer
/// engine relies on this to lock wallet pairs in a direction-independent
/// order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct WalletId(Uuid);

impl WalletId {
    /// Generate a new random WalletId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the inner UUID value
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for WalletId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl From<Uuid> for WalletId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// User ID - owner of non-system wallets.
pub type UserId = Uuid;

/// Asset ID - primary key of the `assets` table.
pub type AssetId = i32;

/// Transaction ID - one per committed transfer.
pub type TransactionId = Uuid;

/// Ledger entry ID - two per transaction.
pub type EntryId = Uuid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_id_order_matches_string_order() {
        let a: WalletId = "00000000-0000-0000-0000-00000000000a".parse().unwrap();
        let b: WalletId = "00000000-0000-0000-0000-0000000000b0".parse().unwrap();
        let c: WalletId = "f0000000-0000-0000-0000-000000000000".parse().unwrap();

        for (x, y) in [(a, b), (b, c), (a, c)] {
            assert_eq!(x.cmp(&y), x.to_string().cmp(&y.to_string()));
        }
    }

    #[test]
    fn test_wallet_id_parse_invalid() {
        assert!("not-a-uuid".parse::<WalletId>().is_err());
    }

    #[test]
    fn test_wallet_id_serde_transparent() {
        let id: WalletId = "00000000-0000-0000-0000-000000000001".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000001\"");
    }
}
