pub mod extract;
pub mod provider_config;
pub mod runtool;
pub mod sync_db;
pub mod sync_socrata;

use chrono::NaiveDateTime;
use mds_core::PendingBlocksQuery;
use mds_domain::{MdsError, Result, ScheduleBlock, ScheduleStatus};

use crate::context::AppContext;
use crate::time_window::{expand_block_list, CivilHour};

/// Shared time-range flags carried by `extract`, `sync-db` and `sync-socrata`.
pub struct TimeArgs {
    pub time_max: NaiveDateTime,
    pub time_min: Option<NaiveDateTime>,
    pub interval: i64,
}

impl TimeArgs {
    pub fn hours(&self) -> Vec<CivilHour> {
        expand_block_list(self.time_min, self.time_max, self.interval)
    }
}

/// Looks up the schedule rows for `provider` across the hours `time_args`
/// expands to, honoring `--force` by omitting the status predicate (any
/// status is eligible) rather than requiring the stage's usual precondition.
pub async fn resolve_blocks(
    ctx: &AppContext,
    provider: &str,
    time_args: &TimeArgs,
    required_status: i32,
    force: bool,
) -> Result<Vec<ScheduleBlock>> {
    let hours = time_args.hours();
    if hours.is_empty() {
        return Ok(Vec::new());
    }

    let query = PendingBlocksQuery {
        provider_name: Some(provider.to_string()),
        status_id: if force { None } else { Some(required_status) },
        status_operator: if force { None } else { Some("_eq") },
        time_min: None,
        time_max: None,
    };

    let all_blocks = ctx.schedule_repo.pending_blocks(query).await?;
    let hour_set: std::collections::HashSet<CivilHour> = hours.into_iter().collect();

    Ok(all_blocks
        .into_iter()
        .filter(|b| hour_set.contains(&(b.year, b.month, b.day, b.hour)))
        .collect())
}

pub fn status_label(status_id: i32) -> &'static str {
    match status_id {
        s if s == ScheduleStatus::NEW => "new",
        s if s == ScheduleStatus::EXTRACTED => "extracted",
        s if s == ScheduleStatus::DB_SYNC_OK => "db-sync-ok",
        s if s == ScheduleStatus::DB_SYNC_PARTIAL => "db-sync-partial",
        s if s == ScheduleStatus::DB_SYNC_ALL_FAIL => "db-sync-all-fail",
        s if s == ScheduleStatus::DB_SYNC_EMPTY => "db-sync-empty",
        s if s == ScheduleStatus::SOCRATA_OK => "socrata-ok",
        s if s == ScheduleStatus::SOCRATA_FAIL => "socrata-fail",
        _ => "unknown",
    }
}

pub fn exit_with_invalid_args(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

pub fn map_config_missing_to_exit(err: MdsError) -> ! {
    eprintln!("fatal: {err}");
    std::process::exit(1);
}
