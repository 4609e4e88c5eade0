//! The schedule table's row type and its status taxonomy.

use serde::{Deserialize, Serialize};

/// Status codes a `ScheduleBlock` can hold. Transitions are enforced by
/// `ScheduleRepo`/`BlockExecutor`, not by this type — the taxonomy intentionally
/// mirrors the warehouse's own sparse, signed status column rather than a
/// closed Rust enum, since `-5` is reserved and never emitted.
pub mod status {
    /// New / pending extract. Set externally.
    pub const NEW: i32 = 0;
    /// Extract succeeded; payload is in the object store.
    pub const EXTRACTED: i32 = 2;
    /// DB-Sync fully succeeded.
    pub const DB_SYNC_OK: i32 = 5;
    /// DB-Sync partial success (some trip errors).
    pub const DB_SYNC_PARTIAL: i32 = 6;
    /// Reserved, currently unused terminal status.
    pub const DB_SYNC_ALL_FAIL_RESERVED: i32 = -5;
    /// DB-Sync: all inserts failed.
    pub const DB_SYNC_ALL_FAIL: i32 = -6;
    /// Empty payload: no trips in the hour.
    pub const DB_SYNC_EMPTY: i32 = 7;
    /// Socrata upsert succeeded.
    pub const SOCRATA_OK: i32 = 8;
    /// Socrata upsert failed.
    pub const SOCRATA_FAIL: i32 = -8;

    /// True for any status a block can be persisted in after DB-Sync
    /// completes (success, partial, or all-fail).
    pub fn is_db_sync_terminal(status_id: i32) -> bool {
        matches!(status_id, DB_SYNC_OK | DB_SYNC_PARTIAL | DB_SYNC_ALL_FAIL | DB_SYNC_EMPTY)
    }

    /// True for a status a block can reach after DB-Sync from which
    /// Socrata-Sync is eligible to run.
    pub fn is_socrata_eligible(status_id: i32) -> bool {
        matches!(status_id, DB_SYNC_OK | DB_SYNC_PARTIAL)
    }
}

/// Re-exported as a namespace so call sites read `ScheduleStatus::EXTRACTED`
/// the way the original system's status table reads.
pub use status as ScheduleStatus;

/// One (provider, hour) unit of work. Created externally; mutated only
/// through `ScheduleRepo`; never deleted by this system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleBlock {
    pub schedule_id: i64,
    pub provider_id: i64,
    pub provider_name: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub status_id: i32,
    pub payload: Option<String>,
    pub message: Option<String>,
    pub records_processed: Option<i64>,
    pub records_total: Option<i64>,
    pub records_error_count: Option<i64>,
    pub rerun_flag: bool,
    pub error_payload: Option<serde_json::Value>,
}

impl ScheduleBlock {
    /// True once the block has produced a terminal status for this run
    /// (`status_id` is one of the seven terminal codes in §4.4).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status_id,
            status::DB_SYNC_OK
                | status::DB_SYNC_PARTIAL
                | status::DB_SYNC_ALL_FAIL_RESERVED
                | status::DB_SYNC_ALL_FAIL
                | status::DB_SYNC_EMPTY
                | status::SOCRATA_OK
                | status::SOCRATA_FAIL
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_sync_terminal_statuses_are_recognized() {
        assert!(status::is_db_sync_terminal(status::DB_SYNC_OK));
        assert!(status::is_db_sync_terminal(status::DB_SYNC_PARTIAL));
        assert!(status::is_db_sync_terminal(status::DB_SYNC_ALL_FAIL));
        assert!(status::is_db_sync_terminal(status::DB_SYNC_EMPTY));
        assert!(!status::is_db_sync_terminal(status::NEW));
    }

    #[test]
    fn only_db_sync_success_states_are_socrata_eligible() {
        assert!(status::is_socrata_eligible(status::DB_SYNC_OK));
        assert!(status::is_socrata_eligible(status::DB_SYNC_PARTIAL));
        assert!(!status::is_socrata_eligible(status::DB_SYNC_ALL_FAIL));
        assert!(!status::is_socrata_eligible(status::DB_SYNC_EMPTY));
    }
}
