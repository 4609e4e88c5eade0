use clap::Args;
use mds_domain::ScheduleStatus;
use tracing::info;

use crate::commands::{resolve_blocks, status_label, TimeArgs};
use crate::context::AppContext;
use crate::time_window::parse_time_arg;

#[derive(Debug, Args)]
pub struct SyncDbArgs {
    #[arg(long)]
    pub provider: String,
    #[arg(long = "time-max")]
    pub time_max: String,
    #[arg(long = "time-min")]
    pub time_min: Option<String>,
    #[arg(long)]
    pub interval: Option<i64>,
    #[arg(long)]
    pub force: bool,
    #[arg(long = "env-file")]
    pub env_file: Option<String>,
}

pub async fn run(args: SyncDbArgs) -> anyhow::Result<()> {
    let ctx = AppContext::bootstrap(args.env_file.as_deref()).await?;

    let time_args = TimeArgs {
        time_max: parse_time_arg(&args.time_max)?,
        time_min: args.time_min.as_deref().map(parse_time_arg).transpose()?,
        interval: args.interval.unwrap_or(1),
    };

    let blocks = resolve_blocks(&ctx, &args.provider, &time_args, ScheduleStatus::EXTRACTED, args.force).await?;
    if blocks.is_empty() {
        println!("No eligible blocks found for provider '{}' in the requested window.", args.provider);
        return Ok(());
    }

    for block in blocks {
        match ctx.executor.db_sync(&block, args.force).await {
            Ok(outcome) => {
                info!(
                    schedule_id = block.schedule_id,
                    status = status_label(outcome.status_id),
                    processed = outcome.records_processed,
                    total = outcome.records_total,
                    errors = outcome.records_error_count,
                    "db-sync complete"
                );
                println!(
                    "schedule_id={} status={} processed={}/{} errors={}",
                    block.schedule_id,
                    status_label(outcome.status_id),
                    outcome.records_processed,
                    outcome.records_total,
                    outcome.records_error_count
                );
            }
            Err(e) => eprintln!("schedule_id={} db-sync failed: {e}", block.schedule_id),
        }
    }

    Ok(())
}
