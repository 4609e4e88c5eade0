use clap::Args;
use mds_domain::ScheduleStatus;
use tracing::info;

use crate::commands::{resolve_blocks, status_label, TimeArgs};
use crate::context::AppContext;
use crate::time_window::parse_time_arg;

#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[arg(long)]
    pub provider: String,
    #[arg(long = "time-max")]
    pub time_max: String,
    #[arg(long = "time-min")]
    pub time_min: Option<String>,
    #[arg(long)]
    pub interval: Option<i64>,
    /// Accepted for interface parity with the original tool; a locally
    /// staged trips file is not currently wired into this stage.
    #[arg(long)]
    pub file: Option<String>,
    #[arg(long)]
    pub force: bool,
    #[arg(long = "env-file")]
    pub env_file: Option<String>,
}

pub async fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let ctx = AppContext::bootstrap(args.env_file.as_deref()).await?;
    let profile = ctx.provider_profile(&args.provider).await?;

    let time_args = TimeArgs {
        time_max: parse_time_arg(&args.time_max)?,
        time_min: args.time_min.as_deref().map(parse_time_arg).transpose()?,
        interval: args.interval.unwrap_or(1),
    };

    let blocks = resolve_blocks(&ctx, &args.provider, &time_args, ScheduleStatus::NEW, args.force).await?;
    if blocks.is_empty() {
        println!("No eligible blocks found for provider '{}' in the requested window.", args.provider);
        return Ok(());
    }

    let client = ctx.provider_client(profile.clone())?;
    for block in blocks {
        match ctx.executor.extract(&block, &profile, &client, args.force).await {
            Ok(outcome) => {
                info!(schedule_id = block.schedule_id, status = status_label(outcome.status_id), "extract ok");
                println!("schedule_id={} provider={} status={}", block.schedule_id, args.provider, status_label(outcome.status_id));
            }
            Err(e) => {
                eprintln!("schedule_id={} extract failed: {e}", block.schedule_id);
            }
        }
    }

    Ok(())
}
