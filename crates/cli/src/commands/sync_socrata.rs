use clap::Args;
use mds_domain::ScheduleStatus;
use tracing::info;

use crate::commands::{resolve_blocks, status_label, TimeArgs};
use crate::context::AppContext;
use crate::time_window::parse_time_arg;

#[derive(Debug, Args)]
pub struct SyncSocrataArgs {
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
}

pub async fn run(args: SyncSocrataArgs) -> anyhow::Result<()> {
    let ctx = AppContext::bootstrap(args.env_file.as_deref()).await?;

    let time_args = TimeArgs {
        time_max: parse_time_arg(&args.time_max)?,
        time_min: args.time_min.as_deref().map(parse_time_arg).transpose()?,
        interval: args.interval.unwrap_or(1),
    };

    // Socrata-Sync has no status precondition: any block already synced to
    // the warehouse (DB_SYNC_OK or DB_SYNC_PARTIAL) is eligible.
    let mut blocks = resolve_blocks(&ctx, &args.provider, &time_args, ScheduleStatus::DB_SYNC_OK, true).await?;
    blocks.retain(|b| ScheduleStatus::is_socrata_eligible(b.status_id));

    if blocks.is_empty() {
        println!("No Socrata-eligible blocks found for provider '{}' in the requested window.", args.provider);
        return Ok(());
    }

    for block in blocks {
        match ctx.executor.socrata_sync(&block, ctx.socrata_sink.as_ref()).await {
            Ok(outcome) => {
                info!(schedule_id = block.schedule_id, status = status_label(outcome.status_id), "socrata-sync complete");
                println!("schedule_id={} status={} rows={}", block.schedule_id, status_label(outcome.status_id), outcome.records_processed);
            }
            Err(e) => eprintln!("schedule_id={} socrata-sync failed: {e}", block.schedule_id),
        }
    }

    Ok(())
}
