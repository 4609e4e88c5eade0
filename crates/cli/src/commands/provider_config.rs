//! Uploads or downloads the provider configuration blob to/from the object
//! store, bypassing the `ConfigStore` cache so a human can stage a new
//! `providers.json` before the pipeline picks it up.
//!
//! `--pdb` is accepted for interface parity with the original tool (which
//! dropped into a Python debugger on this flag) but has no effect here.

use std::path::Path;

use clap::Args;
use mds_domain::{MdsError, Result};

use crate::context::AppContext;

#[derive(Debug, Args)]
pub struct ProviderConfigArgs {
    #[arg(long)]
    pub file: String,
    #[arg(long)]
    pub upload: bool,
    #[arg(long)]
    pub download: bool,
    #[arg(long = "upload-path")]
    pub upload_path: Option<String>,
    #[arg(long = "plain-text")]
    pub plain_text: bool,
    #[arg(long)]
    pub production: bool,
    #[arg(long)]
    pub pdb: bool,
    #[arg(long = "env-file")]
    pub env_file: Option<String>,
}

pub async fn run(args: ProviderConfigArgs) -> anyhow::Result<()> {
    if args.pdb {
        eprintln!("warning: --pdb is accepted for interface parity but has no effect");
    }
    if args.upload == args.download {
        anyhow::bail!("exactly one of --upload or --download must be given");
    }
    if args.production {
        eprintln!("note: --production is noted but this build always uses the literal object-store key from ATD_MDS_PROVIDERS");
    }

    let ctx = AppContext::bootstrap(args.env_file.as_deref()).await?;
    let remote_key = args.upload_path.clone().unwrap_or_else(|| ctx.env.providers_key.clone());

    if args.upload {
        upload(&ctx, &args.file, &remote_key, !args.plain_text).await?;
        println!("uploaded {} to {}", args.file, remote_key);
    } else {
        download(&ctx, &remote_key, &args.file).await?;
        println!("downloaded {} to {}", remote_key, args.file);
    }

    Ok(())
}

async fn upload(ctx: &AppContext, local_path: &str, remote_key: &str, encrypt: bool) -> Result<()> {
    let body = std::fs::read(local_path)
        .map_err(|e| MdsError::ConfigMissing(format!("cannot read {local_path}: {e}")))?;
    ctx.object_store.put(remote_key, body, encrypt).await?;
    Ok(())
}

async fn download(ctx: &AppContext, remote_key: &str, local_path: &str) -> Result<()> {
    let value = ctx.object_store.get(remote_key).await;
    let body = serde_json::to_vec_pretty(&value)
        .map_err(|e| MdsError::Internal(format!("cannot serialize downloaded blob: {e}")))?;
    if let Some(parent) = Path::new(local_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| MdsError::ConfigMissing(format!("cannot create {}: {e}", parent.display())))?;
        }
    }
    std::fs::write(local_path, body).map_err(|e| MdsError::ConfigMissing(format!("cannot write {local_path}: {e}")))?;
    Ok(())
}
