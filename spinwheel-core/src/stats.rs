//! Aggregations over the outcome ledger.

use std::collections::HashMap;

use crate::ledger::HistoryEntry;

/// Milliseconds in one day.
pub const DAY_MS: i64 = 86_400_000;

/// Day bucket index for a unix-millisecond timestamp.
#[must_use]
pub const fn day_index(timestamp_ms: i64) -> i64 {
    timestamp_ms.div_euclid(DAY_MS)
}

/// Win count for one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerTally {
    pub result: String,
    pub wins: u64,
}

/// Tally wins per result, ordered by descending count then name.
#[must_use]
pub fn tally_results(entries: &[HistoryEntry]) -> Vec<WinnerTally> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for entry in entries {
        *counts.entry(entry.result.as_str()).or_default() += 1;
    }
    let mut tallies: Vec<WinnerTally> = counts
        .into_iter()
        .map(|(result, wins)| WinnerTally {
            result: result.to_string(),
            wins,
        })
        .collect();
    tallies.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.result.cmp(&b.result)));
    tallies
}

/// The last `limit` entries, newest first.
#[must_use]
pub fn recent(entries: &[HistoryEntry], limit: usize) -> Vec<HistoryEntry> {
    entries.iter().rev().take(limit).cloned().collect()
}

/// Entries from the trailing window of `days` before `now_ms`, in stored
/// order. The cutoff is inclusive.
#[must_use]
pub fn window(entries: &[HistoryEntry], now_ms: i64, days: i64) -> Vec<HistoryEntry> {
    let cutoff = now_ms.saturating_sub(days.saturating_mul(DAY_MS));
    entries
        .iter()
        .filter(|entry| entry.timestamp_ms >= cutoff)
        .cloned()
        .collect()
}

/// Per-user spin activity with day-bucketed counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivity {
    pub user: String,
    pub spins: u64,
    pub last_spin_ms: i64,
    /// `(day_index, spins)` pairs in ascending day order.
    pub daily: Vec<(i64, u64)>,
}

/// Spin counts, last-seen times, and daily buckets per user, most active
/// first.
#[must_use]
pub fn user_activity(entries: &[HistoryEntry]) -> Vec<UserActivity> {
    struct Acc {
        spins: u64,
        last_spin_ms: i64,
        daily: HashMap<i64, u64>,
    }

    let mut by_user: HashMap<&str, Acc> = HashMap::new();
    for entry in entries {
        let acc = by_user.entry(entry.user.as_str()).or_insert(Acc {
            spins: 0,
            last_spin_ms: i64::MIN,
            daily: HashMap::new(),
        });
        acc.spins += 1;
        acc.last_spin_ms = acc.last_spin_ms.max(entry.timestamp_ms);
        *acc.daily.entry(day_index(entry.timestamp_ms)).or_default() += 1;
    }
    let mut activity: Vec<UserActivity> = by_user
        .into_iter()
        .map(|(user, acc)| {
            let mut daily: Vec<(i64, u64)> = acc.daily.into_iter().collect();
            daily.sort_unstable();
            UserActivity {
                user: user.to_string(),
                spins: acc.spins,
                last_spin_ms: acc.last_spin_ms,
                daily,
            }
        })
        .collect();
    activity.sort_by(|a, b| b.spins.cmp(&a.spins).then_with(|| a.user.cmp(&b.user)));
    activity
}
