//! Append-only history of spin outcomes.
//!
//! Entries keep their legacy JSON field names (`timestamp`, `userId`) so
//! ledgers written by earlier deployments load unchanged. Persistence goes
//! through the [`LedgerStore`] seam; a failed append is logged and dropped
//! rather than aborting the spin that produced it.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// One recorded spin outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unix epoch milliseconds at the moment the spin settled.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    /// Name of the winning option.
    pub result: String,
    /// Display name of whoever triggered the spin.
    pub user: String,
    /// Stable identifier derived from the display name.
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(timestamp_ms: i64, result: impl Into<String>, user: impl Into<String>) -> Self {
        let user = user.into();
        let user_id = user_id_for(&user);
        Self {
            timestamp_ms,
            result: result.into(),
            user,
            user_id,
        }
    }
}

/// Derive a stable hex identifier from a display name (FNV-1a 64).
#[must_use]
pub fn user_id_for(user: &str) -> String {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for byte in user.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{hash:016x}")
}

/// Persistence seam for the outcome ledger.
pub trait LedgerStore {
    type Error: std::error::Error;

    /// Append one entry durably.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the append cannot be persisted.
    fn append(&mut self, entry: &HistoryEntry) -> Result<(), Self::Error>;

    /// Load the full history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the history cannot be read.
    fn read_all(&self) -> Result<Vec<HistoryEntry>, Self::Error>;
}

/// In-memory ledger; the backing vector is shared so tests can inspect it.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    entries: Rc<RefCell<Vec<HistoryEntry>>>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.borrow().clone()
    }
}

impl LedgerStore for MemoryLedger {
    type Error = Infallible;

    fn append(&mut self, entry: &HistoryEntry) -> Result<(), Self::Error> {
        self.entries.borrow_mut().push(entry.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<HistoryEntry>, Self::Error> {
        Ok(self.entries.borrow().clone())
    }
}

/// Record a settled outcome, logging and swallowing store failures so the
/// wheel stays usable when persistence is down.
pub fn record_outcome<S: LedgerStore>(
    store: &mut S,
    timestamp_ms: i64,
    result: &str,
    user: &str,
) -> HistoryEntry {
    let entry = HistoryEntry::new(timestamp_ms, result, user);
    if let Err(e) = store.append(&entry) {
        log::warn!("failed to persist outcome '{result}': {e}");
    }
    entry
}
