//! The composite `runtool` command: runs Extract, DB-Sync and Socrata-Sync
//! in order for every block in the requested window, skipping stages the
//! caller disabled.
//!
//! `--docker-args`/`--docker-mode` are accepted for interface parity with
//! the original tool's container-relaunch behavior but are not implemented
//! here: this binary runs the stages in-process rather than shelling out to
//! a Docker image.

use clap::Args;
use mds_core::PendingBlocksQuery;
use mds_domain::{ScheduleBlock, ScheduleStatus};
use tracing::info;

use crate::commands::{status_label, TimeArgs};
use crate::context::AppContext;
use crate::time_window::{parse_time_arg, CivilHour};

#[derive(Debug, Args)]
pub struct RuntoolArgs {
    #[arg(long)]
    pub provider: String,
    #[arg(long = "time-max")]
    pub time_max: String,
    #[arg(long = "time-min")]
    pub time_min: Option<String>,
    #[arg(long)]
    pub interval: Option<i64>,
    #[arg(long = "env-file")]
    pub env_file: Option<String>,
    #[arg(long = "docker-args")]
    pub docker_args: Option<String>,
    #[arg(long)]
    pub force: bool,
    #[arg(long = "incomplete-only")]
    pub incomplete_only: bool,
    #[arg(long = "docker-mode")]
    pub docker_mode: bool,
    #[arg(long = "no-logs")]
    pub no_logs: bool,
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    #[arg(long = "no-extract")]
    pub no_extract: bool,
    #[arg(long = "no-sync-db")]
    pub no_sync_db: bool,
    #[arg(long = "no-sync-socrata")]
    pub no_sync_socrata: bool,
}

pub async fn run(args: RuntoolArgs) -> anyhow::Result<()> {
    if args.docker_mode || args.docker_args.is_some() {
        eprintln!("warning: --docker-mode/--docker-args are accepted for interface parity but have no effect; running in-process");
    }

    let ctx = AppContext::bootstrap(args.env_file.as_deref()).await?;

    let time_args = TimeArgs {
        time_max: parse_time_arg(&args.time_max)?,
        time_min: args.time_min.as_deref().map(parse_time_arg).transpose()?,
        interval: args.interval.unwrap_or(1),
    };
    let hours = time_args.hours();

    let (status_id, status_operator) = if args.force {
        (None, None)
    } else if args.incomplete_only {
        (Some(ScheduleStatus::SOCRATA_OK), Some("_lt"))
    } else {
        (Some(ScheduleStatus::NEW), Some("_eq"))
    };

    let query = PendingBlocksQuery { provider_name: Some(args.provider.clone()), status_id, status_operator, ..Default::default() };
    let mut blocks = ctx.schedule_repo.pending_blocks(query).await?;
    let hour_set: std::collections::HashSet<CivilHour> = hours.into_iter().collect();
    blocks.retain(|b| hour_set.contains(&(b.year, b.month, b.day, b.hour)));
    blocks.sort_by_key(|b| (b.year, b.month, b.day, b.hour));

    if args.dry_run {
        println!("dry-run: {} block(s) would be processed for provider '{}'", blocks.len(), args.provider);
        for block in &blocks {
            println!("  schedule_id={} {}-{}-{} hour={} status={}", block.schedule_id, block.year, block.month, block.day, block.hour, status_label(block.status_id));
        }
        return Ok(());
    }

    let profile = ctx.provider_profile(&args.provider).await?;
    let client = ctx.provider_client(profile.clone())?;

    for mut block in blocks {
        if !args.no_extract && block.status_id == ScheduleStatus::NEW {
            run_stage(&mut block, "extract", ctx.executor.extract(&block, &profile, &client, args.force).await, args.no_logs);
        }
        if !args.no_sync_db && block.status_id == ScheduleStatus::EXTRACTED {
            run_stage(&mut block, "db-sync", ctx.executor.db_sync(&block, args.force).await, args.no_logs);
        }
        if !args.no_sync_socrata && ScheduleStatus::is_socrata_eligible(block.status_id) {
            run_stage(&mut block, "socrata-sync", ctx.executor.socrata_sync(&block, ctx.socrata_sink.as_ref()).await, args.no_logs);
        }
    }

    Ok(())
}

fn run_stage(block: &mut ScheduleBlock, stage: &str, result: mds_domain::Result<mds_core::StageOutcome>, no_logs: bool) {
    match result {
        Ok(outcome) => {
            block.status_id = outcome.status_id;
            if !no_logs {
                info!(schedule_id = block.schedule_id, stage, status = status_label(outcome.status_id), "stage complete");
            }
            println!("schedule_id={} stage={} status={}", block.schedule_id, stage, status_label(outcome.status_id));
        }
        Err(e) => eprintln!("schedule_id={} stage={} failed: {e}", block.schedule_id, stage),
    }
}
